//! Process configuration read from the environment.

use std::path::PathBuf;

/// Fallback WhatsApp number used when no active distributor has one.
pub const DEFAULT_WHATSAPP: &str = "573001112233";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Directory holding one JSON file per store key.
    pub data_dir: PathBuf,
    pub port: u16,
    pub default_whatsapp: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            port: 8083,
            default_whatsapp: DEFAULT_WHATSAPP.to_string(),
        }
    }
}

impl Config {
    /// Reads `HB_DATA_DIR`, `PORT` and `HB_DEFAULT_WHATSAPP`, keeping the
    /// default for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            data_dir: lookup("HB_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            port: lookup("PORT").and_then(|p| p.parse().ok()).unwrap_or(defaults.port),
            default_whatsapp: lookup("HB_DEFAULT_WHATSAPP")
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(defaults.default_whatsapp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_overrides_and_bad_port() {
        let env: HashMap<&str, &str> = [("HB_DATA_DIR", "/tmp/hb"), ("PORT", "not-a-port"), ("HB_DEFAULT_WHATSAPP", "+57 300 000 0000")].into();
        let config = Config::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/hb"));
        assert_eq!(config.port, 8083);
        assert_eq!(config.default_whatsapp, "+57 300 000 0000");
    }
}
