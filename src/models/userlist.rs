use serde::{Deserialize, Serialize};

/// A single userlist rule, global or tied to one plugin.
///
/// Field names follow the userlist.yaml format consumed by the downstream
/// rule engine: `after` for load-after constraints, `req` for requirements,
/// `inc` for incompatibilities, `tag` for tag suggestions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserlistRule {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub req: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inc: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl UserlistRule {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// The user-defined rule overrides for one game: global rules plus per-plugin
/// rules. This is the complete document shape; the in-memory instance is
/// never partially constructed and the on-disk file is always a complete
/// serialization of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserlistDocument {
    #[serde(default)]
    pub globals: Vec<UserlistRule>,

    #[serde(default)]
    pub plugins: Vec<UserlistRule>,
}

impl UserlistDocument {
    /// Empty out the named top-level section. The document has exactly two
    /// keys, so "removing" one means clearing it; unknown keys are a no-op.
    ///
    /// Returns whether the key named a section.
    pub fn clear_section(&mut self, key: &str) -> bool {
        match key {
            "globals" => {
                self.globals.clear();
                true
            }
            "plugins" => {
                self.plugins.clear();
                true
            }
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.globals.is_empty() && self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_document_is_empty() {
        let doc = UserlistDocument::default();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_clear_section() {
        let mut doc = UserlistDocument {
            globals: vec![UserlistRule::new("Global Rule")],
            plugins: vec![UserlistRule::new("SkyUI.esp")],
        };

        assert!(doc.clear_section("globals"));
        assert!(doc.globals.is_empty());
        assert_eq!(doc.plugins.len(), 1);

        assert!(!doc.clear_section("unknown"));
        assert_eq!(doc.plugins.len(), 1);
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut rule = UserlistRule::new("SkyUI.esp");
        rule.after.push("Skyrim.esm".to_string());
        rule.group = Some("Late Loaders".to_string());

        let doc = UserlistDocument {
            globals: vec![],
            plugins: vec![rule],
        };

        let yaml = serde_yaml_ng::to_string(&doc).unwrap();
        let parsed: UserlistDocument = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_yaml_parses_sparse_rules() {
        let yaml = "globals: []\nplugins:\n  - name: SkyUI.esp\n";
        let doc: UserlistDocument = serde_yaml_ng::from_str(yaml).unwrap();

        assert_eq!(doc.plugins.len(), 1);
        assert_eq!(doc.plugins[0].name, "SkyUI.esp");
        assert!(doc.plugins[0].after.is_empty());
        assert!(doc.plugins[0].group.is_none());
    }
}
