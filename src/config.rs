//! Configuration management for the segmentation demo

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub artifacts: ArtifactConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Pre-trained artifact locations
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactConfig {
    /// Directory containing the exported model files
    pub dir: String,
    /// Scaler file name within the artifact directory
    #[serde(default = "default_scaler_file")]
    pub scaler_file: String,
    /// Classifier file name within the artifact directory
    #[serde(default = "default_classifier_file")]
    pub classifier_file: String,
    /// Banner image served on the demo page; optional at runtime
    #[serde(default = "default_banner_file")]
    pub banner_file: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_scaler_file() -> String {
    "scaler.onnx".to_string()
}

fn default_classifier_file() -> String {
    "classifier.onnx".to_string()
}

fn default_banner_file() -> String {
    "healthcare_banner.jpg".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

impl ArtifactConfig {
    /// Full path to the scaler file.
    pub fn scaler_path(&self) -> std::path::PathBuf {
        Path::new(&self.dir).join(&self.scaler_file)
    }

    /// Full path to the classifier file.
    pub fn classifier_path(&self) -> std::path::PathBuf {
        Path::new(&self.dir).join(&self.classifier_file)
    }

    /// Full path to the banner image.
    pub fn banner_path(&self) -> std::path::PathBuf {
        Path::new(&self.dir).join(&self.banner_file)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            artifacts: ArtifactConfig {
                dir: "artifacts".to_string(),
                scaler_file: default_scaler_file(),
                classifier_file: default_classifier_file(),
                banner_file: default_banner_file(),
                onnx_threads: 1,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
