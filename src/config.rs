//! Configuration management for the file-sharing server
//!
//! Values come from built-in defaults, an optional `config.toml`, and
//! `FILESHARE_*` environment variables, in increasing order of precedence.
//! Everything here is read once at startup.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    // ═══ NETWORK (Environment Override Supported) ═══
    /// IP address both listeners bind to
    pub bind_address: String,

    /// Port for ordinary clients (List/Get/End)
    pub data_port: u16,

    /// Port for the administrative client (List/Hide/Reveal/Terminate/End)
    pub control_port: u16,

    /// Directory whose files are shared
    pub server_root: String,

    // ═══ INTERNAL BEHAVIOR ═══
    /// Chunk size used when streaming file contents
    pub buffer_size: usize,

    /// How long a data session waits for a command before re-checking shutdown
    pub idle_timeout_ms: u64,

    /// Longest command line accepted before the connection is dropped
    pub max_line_length: usize,

    /// Upper bound on how long Terminate waits for data sessions to drain
    pub drain_timeout_secs: u64,

    /// Pause between signalling shutdown and starting to wait for the drain
    pub shutdown_grace_ms: u64,

    /// Capacity of the hidden registry request queue
    pub registry_queue_depth: usize,

    /// Default log filter when RUST_LOG is not set
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            data_port: 3333,
            control_port: 3334,
            server_root: ".".to_string(),
            buffer_size: 4096,
            idle_timeout_ms: 1000,
            max_line_length: 1024,
            drain_timeout_secs: 5,
            shutdown_grace_ms: 100,
            registry_queue_depth: 64,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        // Packaged layout first, then the working directory
        let config_paths = ["fileshare-server/config", "config"];

        let mut builder = Config::builder();
        for config_path in config_paths {
            builder = builder.add_source(File::with_name(config_path).required(false));
        }

        let settings = builder
            .add_source(Environment::with_prefix("FILESHARE").try_parsing(true))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.data_port != 0 && self.data_port == self.control_port {
            return Err(config::ConfigError::Message(
                "data_port and control_port must differ".into(),
            ));
        }

        if self.server_root.is_empty() {
            return Err(config::ConfigError::Message(
                "server_root cannot be empty".into(),
            ));
        }

        if !self.server_root_path().is_dir() {
            return Err(config::ConfigError::Message(format!(
                "server_root does not exist or is not a directory: {}",
                self.server_root
            )));
        }

        if self.buffer_size == 0 {
            return Err(config::ConfigError::Message(
                "buffer_size must be greater than 0".into(),
            ));
        }

        if self.idle_timeout_ms == 0 {
            return Err(config::ConfigError::Message(
                "idle_timeout_ms must be greater than 0".into(),
            ));
        }

        if self.max_line_length == 0 {
            return Err(config::ConfigError::Message(
                "max_line_length must be greater than 0".into(),
            ));
        }

        if self.registry_queue_depth == 0 {
            return Err(config::ConfigError::Message(
                "registry_queue_depth must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Build a configuration serving `root` on ephemeral ports of the loopback interface.
    pub fn ephemeral(root: &Path) -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            data_port: 0,
            control_port: 0,
            server_root: root.to_string_lossy().to_string(),
            ..Self::default()
        }
    }

    /// Bind address and data port as a socket address string
    pub fn data_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.data_port)
    }

    /// Bind address and control port as a socket address string
    pub fn control_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.control_port)
    }

    /// Get server root as PathBuf
    pub fn server_root_path(&self) -> PathBuf {
        PathBuf::from(&self.server_root)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}
