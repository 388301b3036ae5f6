use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A single entry in a load order.
///
/// Entries reference mods by a stable identifier; everything beyond that is
/// game-specific and carried through the core untouched in [`data`](Self::data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOrderEntry {
    /// Stable identifier of the mod this entry activates.
    #[serde(rename = "modId")]
    pub mod_id: String,

    /// Display name, used in diagnostics. Falls back to the mod id when empty.
    #[serde(default)]
    pub name: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Opaque game-specific payload (plugin flags, indices, ...).
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

fn default_enabled() -> bool {
    true
}

impl LoadOrderEntry {
    /// Create an entry with just a mod id, the minimal valid form.
    pub fn new<S: Into<String>>(mod_id: S) -> Self {
        Self {
            mod_id: mod_id.into(),
            name: String::new(),
            enabled: true,
            data: Value::Null,
        }
    }

    /// Name to show in user-facing diagnostics.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.mod_id
        } else {
            &self.name
        }
    }
}

/// An ordered sequence of entries. Position encodes priority: later entries
/// override earlier ones in-game. Replaced wholesale, never patched in place.
pub type LoadOrder = Vec<LoadOrderEntry>;

/// Collect the display names of an order, for diagnostics.
pub fn entry_names(order: &LoadOrder) -> Vec<String> {
    order.iter().map(|e| e.display_name().to_string()).collect()
}

/// One entry rejected by game-specific validation, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub id: String,
    pub reason: String,
}

/// A validation result a game adapter handed back in a shape the core does
/// not accept.
///
/// This is an integration defect in the adapter, not a data problem with the
/// load order, and is raised immediately rather than treated as a failed
/// validation.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("game adapter returned a malformed validation result: {detail}")]
pub struct MalformedValidationResult {
    detail: String,
}

impl MalformedValidationResult {
    fn new<S: Into<String>>(detail: S) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Checked outcome of a game adapter's validation.
///
/// Adapters report results as loose JSON values (they are pluggable and
/// often community-contributed); [`ValidationOutcome::from_raw`] converts
/// that value into this tagged form at the boundary, immediately upon
/// receipt.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// The candidate order passed validation.
    Valid,

    /// The candidate order was rejected; at least one entry is named.
    Invalid(Vec<ValidationFailure>),
}

impl ValidationOutcome {
    /// Convert a raw adapter result into a checked outcome.
    ///
    /// The adapter contract: `None` means the order is valid; anything else
    /// must be an object with a non-empty `invalid` list of `{id, reason}`
    /// records. Every other shape is a [`MalformedValidationResult`].
    pub fn from_raw(raw: Option<Value>) -> Result<Self, MalformedValidationResult> {
        let Some(value) = raw else {
            return Ok(Self::Valid);
        };

        let Value::Object(fields) = &value else {
            return Err(MalformedValidationResult::new(format!(
                "expected an object with an `invalid` list, got {}",
                json_kind(&value)
            )));
        };

        let Some(invalid) = fields.get("invalid") else {
            return Err(MalformedValidationResult::new(
                "result object has no `invalid` field",
            ));
        };

        let failures: Vec<ValidationFailure> = serde_json::from_value(invalid.clone())
            .map_err(|err| {
                MalformedValidationResult::new(format!(
                    "`invalid` is not a list of {{id, reason}} records: {err}"
                ))
            })?;

        if failures.is_empty() {
            // Contract violation: a present result must name at least one entry.
            return Err(MalformedValidationResult::new(
                "`invalid` list is empty; a present result must name at least one entry",
            ));
        }

        Ok(Self::Invalid(failures))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_name_falls_back_to_mod_id() {
        let entry = LoadOrderEntry::new("skyui");
        assert_eq!(entry.display_name(), "skyui");

        let named = LoadOrderEntry {
            name: "SkyUI".to_string(),
            ..LoadOrderEntry::new("skyui")
        };
        assert_eq!(named.display_name(), "SkyUI");
    }

    #[test]
    fn test_entry_deserializes_minimal_form() {
        let entry: LoadOrderEntry = serde_json::from_value(json!({ "modId": "skyui" })).unwrap();
        assert_eq!(entry.mod_id, "skyui");
        assert!(entry.enabled);
        assert!(entry.data.is_null());
    }

    #[test]
    fn test_from_raw_none_is_valid() {
        assert_eq!(ValidationOutcome::from_raw(None), Ok(ValidationOutcome::Valid));
    }

    #[test]
    fn test_from_raw_invalid_entries() {
        let raw = json!({ "invalid": [{ "id": "skyui", "reason": "missing master" }] });
        let outcome = ValidationOutcome::from_raw(Some(raw)).unwrap();

        match outcome {
            ValidationOutcome::Invalid(failures) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].id, "skyui");
                assert_eq!(failures[0].reason, "missing master");
            }
            other => panic!("Expected Invalid, got: {:?}", other),
        }
    }

    #[test]
    fn test_from_raw_rejects_array() {
        let err = ValidationOutcome::from_raw(Some(json!(["skyui"]))).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_from_raw_rejects_missing_invalid_field() {
        let err = ValidationOutcome::from_raw(Some(json!({ "problems": [] }))).unwrap_err();
        assert!(err.to_string().contains("no `invalid` field"));
    }

    #[test]
    fn test_from_raw_rejects_empty_invalid_list() {
        let err = ValidationOutcome::from_raw(Some(json!({ "invalid": [] }))).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_from_raw_rejects_malformed_records() {
        let raw = json!({ "invalid": [{ "plugin": "skyui" }] });
        assert!(ValidationOutcome::from_raw(Some(raw)).is_err());
    }
}
