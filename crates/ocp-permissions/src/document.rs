//! The host configuration document and the always-allow merge policy.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Marker identifying a host configuration document.
pub const CONFIG_SCHEMA_URL: &str = "https://opencode.ai/config.json";

/// Action written for every granted permission or command.
pub const ALLOW: &str = "allow";

/// A grant of exactly this single command covers the whole permission.
pub const WILDCARD: &str = "*";

/// Never widened automatically.
pub const PROTECTED_PERMISSION: &str = "edit";

/// Value of one entry in the `permission` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionRule {
    /// One action for the whole permission, e.g. `"bash": "allow"`.
    Action(String),
    /// Per-command actions, e.g. `"bash": { "git push": "allow" }`.
    Commands(IndexMap<String, String>),
}

const SCHEMA_KEY: &str = "$schema";
const PERMISSION_KEY: &str = "permission";

/// `opencode.json` as a whole: every top-level key in its original order,
/// with the `permission` section parsed into [`PermissionRule`]s.
///
/// The `permission` slot in `fields` only records the key's position; its
/// content lives in [`ConfigDocument::permission`] and is spliced back in
/// when the document is serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    pub permission: IndexMap<String, PermissionRule>,
    fields: Map<String, Value>,
}

impl Default for ConfigDocument {
    fn default() -> Self {
        let mut fields = Map::new();
        fields.insert(SCHEMA_KEY.to_string(), Value::from(CONFIG_SCHEMA_URL));
        fields.insert(PERMISSION_KEY.to_string(), Value::Null);
        Self {
            permission: IndexMap::new(),
            fields,
        }
    }
}

impl Serialize for ConfigDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            if key == PERMISSION_KEY {
                map.serialize_entry(key, &self.permission)?;
            } else {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

/// What [`ConfigDocument::grant_always`] did to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantOutcome {
    /// The permission is protected; nothing changed.
    Refused,
    /// The permission is now allowed outright.
    Blanket,
    /// The slot was absent or held a single action and now holds exactly the granted commands.
    Replaced,
    /// The granted commands were added to an existing per-command map.
    Extended,
}

impl ConfigDocument {
    /// Coerce arbitrary JSON into a document with a `permission` map.
    ///
    /// A document with the right `$schema` is kept (a missing `permission`
    /// becomes empty). Anything else is discarded for a fresh default.
    pub fn normalize(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            tracing::debug!("Discarding config that is not a JSON object");
            return Self::default();
        };

        let schema = fields.get(SCHEMA_KEY).and_then(Value::as_str);
        if schema != Some(CONFIG_SCHEMA_URL) {
            tracing::debug!("Discarding config with unexpected $schema {:?}", schema);
            return Self::default();
        }

        let permission = match fields.get_mut(PERMISSION_KEY) {
            Some(slot) => match IndexMap::<String, PermissionRule>::deserialize(&*slot) {
                Ok(permission) => {
                    *slot = Value::Null;
                    permission
                }
                Err(e) => {
                    tracing::debug!("Discarding config with malformed permission section: {e}");
                    return Self::default();
                }
            },
            None => {
                fields.insert(PERMISSION_KEY.to_string(), Value::Null);
                IndexMap::new()
            }
        };

        Self { permission, fields }
    }

    /// A top-level value other than `permission`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        if key == PERMISSION_KEY {
            return None;
        }
        self.fields.get(key)
    }

    /// Record that `commands` under `permission` are always allowed.
    ///
    /// - `edit` is refused.
    /// - `["*"]` collapses the entry to a blanket `"allow"`.
    /// - An existing per-command map is extended in place.
    /// - Otherwise the entry is replaced by a map of the granted commands,
    ///   including when it previously held a blanket action.
    pub fn grant_always(&mut self, permission: &str, commands: &[String]) -> GrantOutcome {
        if permission == PROTECTED_PERMISSION {
            return GrantOutcome::Refused;
        }

        if let [only] = commands {
            if only == WILDCARD {
                self.permission
                    .insert(permission.to_string(), PermissionRule::Action(ALLOW.to_string()));
                return GrantOutcome::Blanket;
            }
        }

        match self.permission.get_mut(permission) {
            Some(PermissionRule::Commands(existing)) => {
                for command in commands {
                    existing.insert(command.clone(), ALLOW.to_string());
                }
                GrantOutcome::Extended
            }
            _ => {
                let fresh = commands
                    .iter()
                    .map(|command| (command.clone(), ALLOW.to_string()))
                    .collect();
                self.permission
                    .insert(permission.to_string(), PermissionRule::Commands(fresh));
                GrantOutcome::Replaced
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cmds(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn doc(value: Value) -> ConfigDocument {
        ConfigDocument::normalize(value)
    }

    #[test]
    fn test_normalize_empty_object() {
        let d = doc(json!({}));
        assert_eq!(d, ConfigDocument::default());
        assert_eq!(
            serde_json::to_value(&d).unwrap(),
            json!({"$schema": CONFIG_SCHEMA_URL, "permission": {}})
        );
    }

    #[test]
    fn test_normalize_missing_permission_keeps_other_keys() {
        let d = doc(json!({"$schema": CONFIG_SCHEMA_URL, "model": "anthropic/claude"}));
        assert!(d.permission.is_empty());
        assert_eq!(d.get("model"), Some(&json!("anthropic/claude")));
    }

    #[test]
    fn test_normalize_full_document_as_is() {
        let input = json!({
            "$schema": CONFIG_SCHEMA_URL,
            "permission": {"bash": {"ls": "allow", "rm": "deny"}, "webfetch": "ask"}
        });
        let d = doc(input.clone());
        assert_eq!(serde_json::to_value(&d).unwrap(), input);
    }

    #[test]
    fn test_serialize_keeps_top_level_key_order() {
        let text = r#"{"$schema":"https://opencode.ai/config.json","model":"m","permission":{"bash":{"ls":"allow"}},"theme":"t"}"#;
        let mut d = doc(serde_json::from_str(text).unwrap());
        d.grant_always("bash", &cmds(&["git push"]));
        assert_eq!(
            serde_json::to_string(&d).unwrap(),
            r#"{"$schema":"https://opencode.ai/config.json","model":"m","permission":{"bash":{"ls":"allow","git push":"allow"}},"theme":"t"}"#
        );
    }

    #[test]
    fn test_missing_permission_appended_last() {
        let text = r#"{"model":"m","$schema":"https://opencode.ai/config.json"}"#;
        let mut d = doc(serde_json::from_str(text).unwrap());
        d.grant_always("read", &cmds(&["*"]));
        assert_eq!(
            serde_json::to_string(&d).unwrap(),
            r#"{"model":"m","$schema":"https://opencode.ai/config.json","permission":{"read":"allow"}}"#
        );
    }

    #[test]
    fn test_normalize_wrong_schema_discarded() {
        let d = doc(json!({
            "$schema": "https://example.com/other.json",
            "permission": {"bash": "allow"}
        }));
        assert_eq!(d, ConfigDocument::default());
    }

    #[test]
    fn test_normalize_malformed_permission_discarded() {
        let d = doc(json!({"$schema": CONFIG_SCHEMA_URL, "permission": {"bash": 1}}));
        assert_eq!(d, ConfigDocument::default());
        let d = doc(json!({"$schema": CONFIG_SCHEMA_URL, "permission": null}));
        assert_eq!(d, ConfigDocument::default());
    }

    #[test]
    fn test_normalize_non_object_discarded() {
        assert_eq!(doc(json!([1, 2])), ConfigDocument::default());
        assert_eq!(doc(json!("opencode")), ConfigDocument::default());
    }

    #[test]
    fn test_wildcard_always_blanket() {
        let priors = [
            json!({"$schema": CONFIG_SCHEMA_URL}),
            json!({"$schema": CONFIG_SCHEMA_URL, "permission": {"bash": "ask"}}),
            json!({"$schema": CONFIG_SCHEMA_URL, "permission": {"bash": {"ls": "allow"}}}),
        ];
        for prior in priors {
            let mut d = doc(prior);
            assert_eq!(d.grant_always("bash", &cmds(&["*"])), GrantOutcome::Blanket);
            assert_eq!(
                d.permission.get("bash"),
                Some(&PermissionRule::Action("allow".into()))
            );
        }
    }

    #[test]
    fn test_edit_never_changes_document() {
        let inputs = [
            json!({}),
            json!({"$schema": CONFIG_SCHEMA_URL, "permission": {"edit": {"a": "allow"}}}),
            json!({"$schema": CONFIG_SCHEMA_URL, "permission": {"edit": "deny"}}),
        ];
        for input in inputs {
            for grant in [cmds(&["*"]), cmds(&["a", "b"]), cmds(&[])] {
                let mut d = doc(input.clone());
                let before = d.clone();
                assert_eq!(d.grant_always("edit", &grant), GrantOutcome::Refused);
                assert_eq!(d, before);
            }
        }
    }

    #[test]
    fn test_fresh_entry_from_commands() {
        let mut d = ConfigDocument::default();
        assert_eq!(d.grant_always("bash", &cmds(&["a", "b"])), GrantOutcome::Replaced);
        assert_eq!(
            serde_json::to_value(&d.permission).unwrap(),
            json!({"bash": {"a": "allow", "b": "allow"}})
        );
    }

    #[test]
    fn test_grants_are_cumulative() {
        let mut d = doc(json!({
            "$schema": CONFIG_SCHEMA_URL,
            "permission": {"bash": {"ls": "allow", "rm *": "deny"}}
        }));
        assert_eq!(d.grant_always("bash", &cmds(&["a"])), GrantOutcome::Extended);
        assert_eq!(d.grant_always("bash", &cmds(&["b"])), GrantOutcome::Extended);
        assert_eq!(
            serde_json::to_value(&d.permission).unwrap(),
            json!({"bash": {"ls": "allow", "rm *": "deny", "a": "allow", "b": "allow"}})
        );
    }

    #[test]
    fn test_regrant_overwrites_existing_command_action() {
        let mut d = doc(json!({
            "$schema": CONFIG_SCHEMA_URL,
            "permission": {"bash": {"git push": "ask"}}
        }));
        d.grant_always("bash", &cmds(&["git push"]));
        assert_eq!(
            serde_json::to_value(&d.permission).unwrap(),
            json!({"bash": {"git push": "allow"}})
        );
    }

    #[test]
    fn test_blanket_replaced_by_narrower_grant() {
        let mut d = doc(json!({"$schema": CONFIG_SCHEMA_URL, "permission": {"bash": "allow"}}));
        assert_eq!(d.grant_always("bash", &cmds(&["ls"])), GrantOutcome::Replaced);
        assert_eq!(
            serde_json::to_value(&d.permission).unwrap(),
            json!({"bash": {"ls": "allow"}})
        );
    }

    #[test]
    fn test_wildcard_among_others_is_a_command() {
        let mut d = ConfigDocument::default();
        d.grant_always("bash", &cmds(&["*", "ls"]));
        assert_eq!(
            serde_json::to_value(&d.permission).unwrap(),
            json!({"bash": {"*": "allow", "ls": "allow"}})
        );
    }

    #[test]
    fn test_other_permissions_untouched() {
        let mut d = doc(json!({
            "$schema": CONFIG_SCHEMA_URL,
            "permission": {"webfetch": "ask", "bash": {"ls": "allow"}}
        }));
        d.grant_always("read", &cmds(&["*"]));
        assert_eq!(
            serde_json::to_value(&d.permission).unwrap(),
            json!({"webfetch": "ask", "bash": {"ls": "allow"}, "read": "allow"})
        );
    }
}
