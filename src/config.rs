use log::warn;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Server settings, read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to (`BIND_ADDR`)
    pub bind_addr: String,
    /// Actix worker threads (`WORKERS`)
    pub workers: usize,
    /// Directory served under `/static` (`STATIC_DIR`)
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            workers: 4,
            static_dir: "./static".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset or unparseable keys keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            workers: match parse_or(&lookup, "WORKERS", defaults.workers) {
                0 => {
                    warn!("ignoring WORKERS=0, at least one worker is needed");
                    defaults.workers
                }
                n => n,
            },
            static_dir: lookup("STATIC_DIR").unwrap_or(defaults.static_dir),
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("ignoring unparseable {}={}", key, raw);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_without_environment() {
        assert_eq!(ServerConfig::from_lookup(|_| None), ServerConfig::default());
    }

    #[test]
    fn overrides_and_bad_values() {
        let env: HashMap<&str, &str> = [("BIND_ADDR", "0.0.0.0:9000"), ("WORKERS", "many")]
            .into_iter()
            .collect();
        let config = ServerConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.workers, 4);
        assert_eq!(config.static_dir, "./static");
    }

    #[test]
    fn zero_workers_falls_back() {
        let config =
            ServerConfig::from_lookup(|key| (key == "WORKERS").then(|| "0".to_string()));
        assert_eq!(config.workers, 4);
        let config =
            ServerConfig::from_lookup(|key| (key == "WORKERS").then(|| "2".to_string()));
        assert_eq!(config.workers, 2);
    }
}
