use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Application blob attached to a member's registry entry. Only the owning
/// peer may mutate it; everyone else in the channel reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserData {
    pub display_name: String,
    pub client_signature: String,
    /// Free-form flags such as `isTalking`, carried verbatim on the wire.
    #[serde(flatten)]
    pub flags: BTreeMap<String, serde_json::Value>,
}

impl UserData {
    pub fn new(display_name: impl Into<String>, client_signature: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            client_signature: client_signature.into(),
            flags: BTreeMap::new(),
        }
    }

    /// Apply an update keyed the way the wire carries it.
    pub fn set(&mut self, key: &str, value: serde_json::Value) {
        match key {
            "displayName" => {
                if let Some(name) = value.as_str() {
                    self.display_name = name.to_owned();
                }
            }
            "clientSignature" => {
                if let Some(signature) = value.as_str() {
                    self.client_signature = signature.to_owned();
                }
            }
            _ => {
                self.flags.insert(key.to_owned(), value);
            }
        }
    }
}
