//! Application configuration loaded from environment variables.

use std::str::FromStr;

use ratings::ScyllaConfig;
use thiserror::Error;

/// Which session backend serves the read model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Scylla,
    Memory,
}

#[derive(Debug, Error)]
#[error("Unknown ratings backend `{0}`, expected `scylla` or `memory`")]
pub struct UnknownBackend(String);

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scylla" | "cassandra" => Ok(Backend::Scylla),
            "memory" => Ok(Backend::Memory),
            other => Err(UnknownBackend(other.to_string())),
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `RATINGS_BACKEND` — `scylla` or `memory` (default: `scylla`)
/// - `SCYLLA_NODES` — comma-separated contact points (default: `"127.0.0.1:9042"`)
/// - `SCYLLA_KEYSPACE` — keyspace of the ratings tables (default: `"killrvideo"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub backend: Backend,
    pub scylla: ScyllaConfig,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    ///
    /// Fails only when `RATINGS_BACKEND` names an unknown backend.
    pub fn from_env() -> Result<Self, UnknownBackend> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, UnknownBackend> {
        let defaults = Self::default();
        let backend = match lookup("RATINGS_BACKEND") {
            Some(value) => value.parse::<Backend>()?,
            None => defaults.backend,
        };
        let nodes = lookup("SCYLLA_NODES")
            .map(|v| parse_nodes(&v))
            .filter(|nodes| !nodes.is_empty())
            .unwrap_or(defaults.scylla.nodes);

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            backend,
            scylla: ScyllaConfig {
                nodes,
                keyspace: lookup("SCYLLA_KEYSPACE").unwrap_or(defaults.scylla.keyspace),
            },
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_nodes(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|node| !node.is_empty())
        .map(str::to_string)
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            backend: Backend::Scylla,
            scylla: ScyllaConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.backend, Backend::Scylla);
        assert_eq!(config.scylla.keyspace, "killrvideo");
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8081"),
            ("RATINGS_BACKEND", "Memory"),
            ("SCYLLA_NODES", "10.0.0.1:9042, 10.0.0.2:9042,"),
            ("SCYLLA_KEYSPACE", "ratings"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8081);
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(
            config.scylla.nodes,
            vec!["10.0.0.1:9042".to_string(), "10.0.0.2:9042".to_string()]
        );
        assert_eq!(config.scylla.keyspace, "ratings");
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let config = Config::from_lookup(lookup(&[("PORT", "not-a-port")])).unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_empty_nodes_fall_back() {
        let config = Config::from_lookup(lookup(&[("SCYLLA_NODES", " , ")])).unwrap();
        assert_eq!(config.scylla.nodes, ScyllaConfig::default().nodes);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result = Config::from_lookup(lookup(&[("RATINGS_BACKEND", "postgres")]));
        assert!(result.is_err());
    }
}
