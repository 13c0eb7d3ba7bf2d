//! Runtime configuration read from the environment (after `dotenvy::dotenv()`).

use crate::error::ConfigError;
use std::net::SocketAddr;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    /// Schema holding every table. From `DIRECTORY_SCHEMA`, default `directory`.
    pub schema: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    /// Prefix the JSON API is nested under, e.g. `/api`.
    pub api_prefix: String,
    /// Origins allowed by CORS. `*` allows any; empty disables the layer.
    pub cors_allowed_origins: Vec<String>,
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: "postgres://localhost/airline_directory".into(),
            schema: "directory".into(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            max_connections: 5,
            api_prefix: "/api".into(),
            cors_allowed_origins: Vec::new(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = AppConfig::default();
        if let Some(v) = get("DATABASE_URL") {
            cfg.database_url = v;
        }
        if let Some(v) = get("DIRECTORY_SCHEMA") {
            if !is_plain_identifier(&v) {
                return Err(ConfigError::Identifier {
                    key: "DIRECTORY_SCHEMA",
                    value: v,
                });
            }
            cfg.schema = v;
        }
        if let Some(v) = get("BIND_ADDR") {
            cfg.bind_addr = v.parse().map_err(|_| ConfigError::Invalid {
                key: "BIND_ADDR",
                value: v.clone(),
            })?;
        }
        if let Some(v) = get("DB_MAX_CONNECTIONS") {
            cfg.max_connections = v
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    key: "DB_MAX_CONNECTIONS",
                    value: v.clone(),
                })?;
        }
        if let Some(v) = get("API_PREFIX") {
            let trimmed = v.trim().trim_end_matches('/');
            cfg.api_prefix = if trimmed.is_empty() {
                String::new()
            } else if trimmed.starts_with('/') {
                trimmed.to_string()
            } else {
                format!("/{}", trimmed)
            };
        }
        if let Some(v) = get("CORS_ALLOWED_ORIGINS") {
            cfg.cors_allowed_origins = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = get("MAX_BODY_BYTES") {
            cfg.max_body_bytes = v.parse().map_err(|_| ConfigError::Invalid {
                key: "MAX_BODY_BYTES",
                value: v.clone(),
            })?;
        }
        Ok(cfg)
    }
}

/// Lowercase letters, digits and underscores, not starting with a digit.
pub fn is_plain_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = from_map(&[]).unwrap();
        assert_eq!(cfg.schema, "directory");
        assert_eq!(cfg.api_prefix, "/api");
        assert_eq!(cfg.bind_addr.port(), 8000);
        assert!(cfg.cors_allowed_origins.is_empty());
    }

    #[test]
    fn parses_overrides() {
        let cfg = from_map(&[
            ("DIRECTORY_SCHEMA", "test_schema"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("API_PREFIX", "v1/"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test"),
            ("DB_MAX_CONNECTIONS", "12"),
        ])
        .unwrap();
        assert_eq!(cfg.schema, "test_schema");
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.api_prefix, "/v1");
        assert_eq!(cfg.cors_allowed_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(cfg.max_connections, 12);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            from_map(&[("DIRECTORY_SCHEMA", "drop table")]),
            Err(ConfigError::Identifier { .. })
        ));
        assert!(from_map(&[("BIND_ADDR", "nowhere")]).is_err());
        assert!(from_map(&[("DB_MAX_CONNECTIONS", "0")]).is_err());
    }

    #[test]
    fn identifiers() {
        assert!(is_plain_identifier("directory"));
        assert!(is_plain_identifier("_t1"));
        assert!(!is_plain_identifier("1abc"));
        assert!(!is_plain_identifier("Dir"));
        assert!(!is_plain_identifier(""));
    }
}
