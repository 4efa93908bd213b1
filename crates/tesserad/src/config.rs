//! TOML configuration for the Tessera daemon.
//!
//! Every section is optional; missing keys fall back to the defaults below.

use std::path::{Path, PathBuf};

use anyhow::{Context, ensure};
use serde::Deserialize;
use tessera_engine::TesseraNodeConfig;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Data directory and listen address.
    pub node: NodeSection,
    /// Storage backend and limits.
    pub storage: StorageSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[node]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NodeSection {
    /// Directory holding `blocks/` and `manifests/`.
    pub data_dir: PathBuf,
    /// Address for the HTTP API.
    pub listen_addr: String,
}

impl Default for NodeSection {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            listen_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// `[storage]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Backend type: `"file"` (default) or `"memory"`.
    pub backend: String,
    /// Maximum block size in bytes.
    pub block_size: u32,
    /// Largest accepted upload request, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: "file".to_string(),
            block_size: tessera_engine::DEFAULT_BLOCK_SIZE,
            max_upload_bytes: tessera_http::DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("cannot read {}", p.display()))?;
                toml::from_str(&content)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.storage.block_size > 0, "storage.block_size must be positive");
        ensure!(
            matches!(self.storage.backend.as_str(), "file" | "memory"),
            "unknown storage.backend {:?} (expected \"file\" or \"memory\")",
            self.storage.backend
        );
        Ok(())
    }

    /// Whether the node should keep everything in memory.
    pub fn is_memory(&self) -> bool {
        self.storage.backend == "memory"
    }

    /// Engine configuration derived from `[storage]`.
    pub fn node_config(&self) -> TesseraNodeConfig {
        TesseraNodeConfig {
            block_size: self.storage.block_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[node]
data_dir = "/tmp/tessera-test"
listen_addr = "127.0.0.1:9090"

[storage]
backend = "memory"
block_size = 4096
max_upload_bytes = 1048576

[log]
level = "debug"
"#;

        let config = CliConfig::from_toml(toml).unwrap();
        assert_eq!(config.node.data_dir, PathBuf::from("/tmp/tessera-test"));
        assert_eq!(config.node.listen_addr, "127.0.0.1:9090");
        assert!(config.is_memory());
        assert_eq!(config.node_config().block_size, 4096);
        assert_eq!(config.storage.max_upload_bytes, 1_048_576);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = CliConfig::from_toml("").unwrap();
        assert_eq!(config.node.data_dir, PathBuf::from("./data"));
        assert_eq!(config.node.listen_addr, "0.0.0.0:8080");
        assert!(!config.is_memory());
        assert_eq!(config.storage.block_size, 1024 * 1024);
        assert_eq!(config.storage.max_upload_bytes, 1024 * 1024 * 1024);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[storage]
block_size = 65536
"#;
        let config = CliConfig::from_toml(toml).unwrap();
        assert_eq!(config.storage.block_size, 65_536);
        // Unspecified keys get defaults.
        assert_eq!(config.storage.backend, "file");
        assert_eq!(config.node.listen_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_zero_block_size_rejected() {
        let err = CliConfig::from_toml("[storage]\nblock_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("block_size"));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(CliConfig::from_toml("[storage]\nbackend = \"s3\"\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tessera.toml");
        std::fs::write(
            &path,
            r#"
[node]
data_dir = "/srv/tessera"
listen_addr = "127.0.0.1:9999"
"#,
        )
        .unwrap();

        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config.node.data_dir, PathBuf::from("/srv/tessera"));
        assert_eq!(config.node.listen_addr, "127.0.0.1:9999");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CliConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = CliConfig::load(None).unwrap();
        assert_eq!(config.node.listen_addr, "0.0.0.0:8080");
    }
}
