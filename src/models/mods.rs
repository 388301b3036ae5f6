use serde::{Deserialize, Serialize};

/// Mod type marking a collection: a mod whose only purpose is to group and
/// reference other mods through its rules.
pub const COLLECTION_TYPE: &str = "collection";

/// Descriptor a collection rule uses to name a member mod.
///
/// Matching against a descriptor is semantic, not identity-based: an exact
/// id when one is present, otherwise a name pattern plus an optional version
/// requirement. See [`crate::services::reference`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDescriptor {
    /// Exact mod id, when the reference pins a specific mod.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Glob-style pattern matched against the mod name (`*` wildcards).
    #[serde(rename = "fileExpression", default, skip_serializing_if = "Option::is_none")]
    pub file_expression: Option<String>,

    /// Version requirement: exact (`"1.2.3"`), prefix (`"1.2.*"`), or any (`"*"`).
    #[serde(rename = "versionMatch", default, skip_serializing_if = "Option::is_none")]
    pub version_match: Option<String>,
}

/// A rule attached to a mod. For collections, each rule references one member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModRule {
    pub reference: ReferenceDescriptor,
}

/// Metadata for one mod in the caller's registry.
///
/// The registry itself is an `IndexMap<String, ModInfo>` keyed by mod id and
/// owned by the caller; the core only reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModInfo {
    pub id: String,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<ModRule>,
}

impl ModInfo {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn is_collection(&self) -> bool {
        self.kind == COLLECTION_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_detection() {
        let mut info = ModInfo::new("my-collection");
        assert!(!info.is_collection());

        info.kind = COLLECTION_TYPE.to_string();
        assert!(info.is_collection());
    }

    #[test]
    fn test_mod_info_deserializes_type_field() {
        let info: ModInfo =
            serde_json::from_value(json!({ "id": "pack", "type": "collection" })).unwrap();
        assert!(info.is_collection());
        assert!(info.rules.is_empty());
    }

    #[test]
    fn test_reference_descriptor_field_names() {
        let reference: ReferenceDescriptor = serde_json::from_value(json!({
            "fileExpression": "SkyUI*",
            "versionMatch": "5.*",
        }))
        .unwrap();

        assert_eq!(reference.file_expression.as_deref(), Some("SkyUI*"));
        assert_eq!(reference.version_match.as_deref(), Some("5.*"));
        assert!(reference.id.is_none());
    }
}
