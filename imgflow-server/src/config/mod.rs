//! Configuration module for imgflow-server.
//!
//! Handles loading configuration from the TOML file and CLI arguments, and
//! converting it into the runtime types the processors use.

pub mod file;

use crate::config::file::FileConfig;
use imgflow_core::config::{ExecutionConfig, WorkflowConfig};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub listen: SocketAddr,
    pub execution: ExecutionConfig,
    pub workflow: WorkflowConfig,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Build the loaded configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config)?;

        Ok(build_loaded_config(file_config))
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    let scheme = config.execution.base_url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ConfigError::ValidationError(format!(
            "execution.base_url must be http or https, got {scheme}"
        )));
    }
    if config.execution.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "execution.request_timeout_secs must be positive".into(),
        ));
    }
    if config.workflow.wait_timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "workflow.wait_timeout_secs must be positive; omit it to wait indefinitely".into(),
        ));
    }
    if config.workflow.channel_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "workflow.channel_buffer must be positive".into(),
        ));
    }
    Ok(())
}

fn build_loaded_config(file_config: FileConfig) -> LoadedConfig {
    LoadedConfig {
        listen: file_config.server.listen,
        execution: ExecutionConfig {
            base_url: file_config.execution.base_url,
            request_timeout: Duration::from_secs(file_config.execution.request_timeout_secs),
        },
        workflow: WorkflowConfig {
            wait_timeout: file_config.workflow.wait_timeout_secs.map(Duration::from_secs),
            channel_buffer: file_config.workflow.channel_buffer,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "imgflow-{}-{}.toml",
            name,
            std::process::id()
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_applies_listen_override() {
        let path = write_config(
            "override",
            r#"
[server]
listen = "127.0.0.1:3000"

[execution]
base_url = "http://127.0.0.1:9090"

[workflow]
wait_timeout_secs = 60
"#,
        );
        let listen: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        let loaded = ConfigLoader::new(&path, Some(listen)).load().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.listen, listen);
        assert_eq!(loaded.execution.request_timeout, Duration::from_secs(30));
        assert_eq!(loaded.workflow.wait_timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_zero_wait_timeout_is_rejected() {
        let path = write_config(
            "zero-timeout",
            r#"
[execution]
base_url = "http://127.0.0.1:9090"

[workflow]
wait_timeout_secs = 0
"#,
        );
        let result = ConfigLoader::new(&path, None).load();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_non_http_base_url_is_rejected() {
        let path = write_config(
            "scheme",
            r#"
[execution]
base_url = "ftp://127.0.0.1:9090"
"#,
        );
        let result = ConfigLoader::new(&path, None).load();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ConfigLoader::new("/nonexistent/imgflow-config.toml", None).load();
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
