//! Serde data structures for the transport configuration file.
//!
//! [`TransportConfig`] is the root. It derives `Serialize` and
//! `Deserialize` with `deny_unknown_fields` for strict parsing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const fn default_timeout() -> u64 {
    5000
}

fn is_default_timeout(v: &u64) -> bool {
    *v == default_timeout()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    /// API server base URL; relative probe targets are joined onto it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Request timeout in milliseconds, applied by the CLI around the
    /// decorated transport.
    #[serde(
        default = "default_timeout",
        skip_serializing_if = "is_default_timeout"
    )]
    pub timeout: u64,

    /// Static headers set on every outgoing request.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            host: None,
            timeout: default_timeout(),
            headers: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: TransportConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, TransportConfig::default());
        assert_eq!(config.timeout, 5000);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = serde_json::from_str::<TransportConfig>(r#"{"retries": 3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn defaults_are_not_serialized() {
        let json = serde_json::to_string(&TransportConfig::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
