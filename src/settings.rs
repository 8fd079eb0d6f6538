//! Settings resolution: the three values every call needs, read once at construction.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use serde_json::Value;

use crate::domain::{ApiId, ApiKey, SenderNumber};

/// Keys that must be present in every settings source, in resolution order.
pub const REQUIRED_SETTINGS: [&str; 3] = [ApiId::SETTING, ApiKey::SETTING, SenderNumber::SETTING];

#[derive(Debug, thiserror::Error)]
/// Errors raised while constructing a client. None of them are recoverable at runtime.
pub enum ConfigurationError {
    /// A required setting is absent or empty.
    #[error("GABIA_SMS_SETTINGS {key} is required")]
    Missing { key: &'static str },

    /// The settings document is not a JSON object.
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The gateway endpoint override is not a valid URL.
    #[error("invalid endpoint URL {value:?}: {source}")]
    InvalidEndpoint {
        value: String,
        #[source]
        source: url::ParseError,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// A source of named string settings.
///
/// Implemented for plain string maps, JSON objects, and the process environment
/// ([`EnvSettings`]).
pub trait SettingsSource {
    /// Look up a setting; `None` when the key is unknown.
    fn setting(&self, key: &str) -> Option<String>;
}

impl<S: BuildHasher> SettingsSource for HashMap<String, String, S> {
    fn setting(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl SettingsSource for BTreeMap<String, String> {
    fn setting(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl SettingsSource for serde_json::Map<String, Value> {
    fn setting(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(value) => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
/// Reads settings from environment variables named `<prefix><KEY>`.
///
/// The default prefix is `GABIA_SMS_`, so `API_ID` is read from `GABIA_SMS_API_ID`.
pub struct EnvSettings {
    prefix: String,
}

impl EnvSettings {
    pub const DEFAULT_PREFIX: &'static str = "GABIA_SMS_";

    pub fn new() -> Self {
        Self::with_prefix(Self::DEFAULT_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn variable(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }
}

impl Default for EnvSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsSource for EnvSettings {
    fn setting(&self, key: &str) -> Option<String> {
        std::env::var(self.variable(key)).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Resolved account settings. Immutable once constructed.
pub struct Settings {
    api_id: ApiId,
    api_key: ApiKey,
    sender: SenderNumber,
}

impl Settings {
    pub fn new(api_id: ApiId, api_key: ApiKey, sender: SenderNumber) -> Self {
        Self {
            api_id,
            api_key,
            sender,
        }
    }

    /// Resolve `API_ID`, `API_KEY` and `SENDER` from `source`.
    ///
    /// Missing keys count as empty. The first empty key, in that order, fails the whole
    /// resolution.
    pub fn resolve(source: &(impl SettingsSource + ?Sized)) -> Result<Self, ConfigurationError> {
        let [api_id, api_key, sender] = REQUIRED_SETTINGS.map(|key| {
            let value = source.setting(key).unwrap_or_default();
            (key, value)
        });

        let api_id = ApiId::new(api_id.1).map_err(|_| missing(api_id.0))?;
        let api_key = ApiKey::new(api_key.1).map_err(|_| missing(api_key.0))?;
        let sender = SenderNumber::new(sender.1).map_err(|_| missing(sender.0))?;

        Ok(Self::new(api_id, api_key, sender))
    }

    /// Parse a JSON object such as `{"API_ID": "...", "API_KEY": "...", "SENDER": "..."}`
    /// and resolve it.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let object: serde_json::Map<String, Value> = serde_json::from_str(json)?;
        Self::resolve(&object)
    }

    /// Resolve from `GABIA_SMS_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::resolve(&EnvSettings::new())
    }

    pub fn api_id(&self) -> &ApiId {
        &self.api_id
    }

    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    pub fn sender(&self) -> &SenderNumber {
        &self.sender
    }
}

fn missing(key: &'static str) -> ConfigurationError {
    ConfigurationError::Missing { key }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn resolves_all_required_keys() {
        let settings = Settings::resolve(&source(&[
            ("API_ID", "id1"),
            ("API_KEY", "key1"),
            ("SENDER", "0100000000"),
        ]))
        .unwrap();

        assert_eq!(settings.api_id().as_str(), "id1");
        assert_eq!(settings.api_key().as_str(), "key1");
        assert_eq!(settings.sender().as_str(), "0100000000");
    }

    #[test]
    fn missing_key_is_named_in_error() {
        for absent in REQUIRED_SETTINGS {
            let pairs = [("API_ID", "id1"), ("API_KEY", "key1"), ("SENDER", "0100000000")]
                .into_iter()
                .filter(|(k, _)| *k != absent)
                .collect::<Vec<_>>();

            let err = Settings::resolve(&source(&pairs)).unwrap_err();
            assert!(
                matches!(err, ConfigurationError::Missing { key } if key == absent),
                "expected missing {absent}, got {err:?}"
            );
        }
    }

    // Whitespace-only values count as missing. The legacy client only rejected
    // empty values and would sign with a blank key.
    #[test]
    fn empty_values_count_as_missing() {
        let err = Settings::resolve(&source(&[
            ("API_ID", "id1"),
            ("API_KEY", "  "),
            ("SENDER", "0100000000"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::Missing { key: "API_KEY" }));
        assert_eq!(err.to_string(), "GABIA_SMS_SETTINGS API_KEY is required");
    }

    #[test]
    fn first_missing_key_wins() {
        let err = Settings::resolve(&source(&[])).unwrap_err();
        assert!(matches!(err, ConfigurationError::Missing { key: "API_ID" }));
    }

    #[test]
    fn from_json_accepts_strings_and_numbers() {
        let settings =
            Settings::from_json(r#"{"API_ID": "id1", "API_KEY": 12345, "SENDER": "0100000000"}"#)
                .unwrap();
        assert_eq!(settings.api_key().as_str(), "12345");
    }

    #[test]
    fn from_json_treats_null_and_bool_as_missing() {
        let err = Settings::from_json(r#"{"API_ID": "id1", "API_KEY": null, "SENDER": true}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::Missing { key: "API_KEY" }));
    }

    #[test]
    fn from_json_rejects_non_objects() {
        let err = Settings::from_json(r#"["API_ID"]"#).unwrap_err();
        assert!(matches!(err, ConfigurationError::Json(_)));
    }

    #[test]
    fn env_settings_prefixes_variable_names() {
        let env = EnvSettings::with_prefix("MY_SMS_");
        assert_eq!(env.variable("SENDER"), "MY_SMS_SENDER");
        assert_eq!(EnvSettings::new().variable("API_ID"), "GABIA_SMS_API_ID");
    }
}
