//! Configuration management for the pose streamer

use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_FPS, DEFAULT_HOST, DEFAULT_PATH, DEFAULT_PORT,
    DEFAULT_SCALE_FACTOR, DEFAULT_WINDOW_SIZE, DEFAULT_WRITE_TIMEOUT_MS,
};
use crate::smoothing::SmoothingWindow;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote consumer endpoint
    pub endpoint: EndpointConfig,

    /// Smoothing parameters
    pub smoothing: SmoothingConfig,

    /// Sample source parameters
    pub source: SourceConfig,
}

/// Remote endpoint configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Host name or address of the consumer
    pub host: String,

    /// TCP port of the consumer
    pub port: u16,

    /// Request path used for the WebSocket handshake
    pub path: String,

    /// TCP connect timeout in milliseconds (0 waits indefinitely)
    pub connect_timeout_ms: u64,

    /// Per-frame write timeout in milliseconds (0 disables it)
    pub write_timeout_ms: u64,
}

/// Smoothing window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Number of samples averaged
    pub window_size: usize,

    /// Factor applied to the mean before truncation
    pub scale_factor: f64,
}

/// Sample source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Frame rate of the synthetic source
    pub fps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            smoothing: SmoothingConfig::default(),
            source: SourceConfig::default(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_string(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT_MS,
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            scale_factor: DEFAULT_SCALE_FACTOR,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { fps: DEFAULT_FPS }
    }
}

impl EndpointConfig {
    /// WebSocket URL of the consumer
    #[must_use]
    pub fn url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        format!("ws://{}:{}{}", self.host, self.port, path)
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// WebSocket URL of the configured endpoint
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        self.endpoint.url()
    }

    /// Create a smoothing window from configuration
    pub fn create_window(&self) -> Result<SmoothingWindow> {
        self.validate_smoothing()?;
        Ok(SmoothingWindow::new(
            self.smoothing.window_size,
            self.smoothing.scale_factor,
        ))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Validate endpoint
        if self.endpoint.host.trim().is_empty() {
            return Err(Error::ConfigError("Host must not be empty".to_string()));
        }
        if self.endpoint.port == 0 {
            return Err(Error::ConfigError("Port must be greater than 0".to_string()));
        }

        self.validate_smoothing()?;

        // Validate source settings
        if self.source.fps == 0 {
            return Err(Error::ConfigError("Source FPS must be greater than 0".to_string()));
        }

        Ok(())
    }

    fn validate_smoothing(&self) -> Result<()> {
        if self.smoothing.window_size == 0 {
            return Err(Error::ConfigError(
                "Window size must be greater than 0".to_string(),
            ));
        }
        if !self.smoothing.scale_factor.is_finite() {
            return Err(Error::ConfigError("Scale factor must be finite".to_string()));
        }
        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Pose Streamer Configuration

# Remote consumer
endpoint:
  host: "127.0.0.1"
  port: 9002
  path: "/"
  connect_timeout_ms: 5000
  write_timeout_ms: 1000

# Smoothing window
smoothing:
  window_size: 8
  scale_factor: 50.0

# Synthetic sample source
source:
  fps: 30
"#;
