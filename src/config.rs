//! # Configuration Management
//!
//! Centralized configuration for the packet hook pipeline.
//!
//! This module covers the hook channels (capacity, per-handler tracing), the
//! binary codec (format, decode ceiling) and logging output.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-specific overrides via `from_env()`

use crate::core::serialization::{self, MultiFormat, SerializationFormat};
use crate::error::{HookError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::Level;

/// Max allowed encoded payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Default cap on handlers per channel (0 = unlimited)
pub const DEFAULT_MAX_HANDLERS: usize = 0;

/// Main configuration structure that contains all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PipelineConfig {
    /// Hook channel configuration
    #[serde(default)]
    pub hooks: HookConfig,

    /// Payload codec configuration
    #[serde(default)]
    pub codec: CodecConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| HookError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| HookError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| HookError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(max) = std::env::var("PACKET_HOOKS_MAX_HANDLERS") {
            config.hooks.max_handlers_per_channel = max.parse::<usize>().map_err(|e| {
                HookError::ConfigError(format!("Invalid PACKET_HOOKS_MAX_HANDLERS: {e}"))
            })?;
        }

        if let Ok(trace) = std::env::var("PACKET_HOOKS_TRACE_HANDLERS") {
            config.hooks.trace_handlers = matches!(trace.as_str(), "1" | "true" | "yes");
        }

        if let Ok(level) = std::env::var("PACKET_HOOKS_LOG_LEVEL") {
            config.logging.log_level = Level::from_str(&level).map_err(|_| {
                HookError::ConfigError(format!("Invalid PACKET_HOOKS_LOG_LEVEL: {level}"))
            })?;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| HookError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| HookError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.hooks.validate());
        errors.extend(self.codec.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(HookError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Hook channel configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HookConfig {
    /// Maximum handlers a single channel accepts (0 = unlimited)
    pub max_handlers_per_channel: usize,

    /// Emit a trace event for every handler invocation
    pub trace_handlers: bool,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            max_handlers_per_channel: DEFAULT_MAX_HANDLERS,
            trace_handlers: false,
        }
    }
}

impl HookConfig {
    /// Validate hook configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_handlers_per_channel > 10_000 {
            errors.push(format!(
                "Max handlers per channel very high: {} (maximum recommended: 10,000)",
                self.max_handlers_per_channel
            ));
        }

        errors
    }

    /// Channel capacity as an option, `None` when unlimited
    pub fn capacity(&self) -> Option<usize> {
        match self.max_handlers_per_channel {
            0 => None,
            n => Some(n),
        }
    }
}

/// Payload codec configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CodecConfig {
    /// Format used by `encode`/`decode` on this config
    pub format: SerializationFormat,

    /// Largest accepted encoded value in bytes
    pub max_decode_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            format: SerializationFormat::default(),
            max_decode_size: MAX_PAYLOAD_SIZE,
        }
    }
}

impl CodecConfig {
    /// Validate codec configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_decode_size == 0 {
            errors.push("Max decode size cannot be 0".to_string());
        } else if self.max_decode_size > MAX_PAYLOAD_SIZE {
            errors.push(format!(
                "Max decode size too large: {} bytes (maximum: {MAX_PAYLOAD_SIZE})",
                self.max_decode_size
            ));
        }

        errors
    }

    /// Encode with the configured format and size ceiling
    pub fn encode<T: Serialize + DeserializeOwned>(&self, value: &T) -> Result<Vec<u8>> {
        let bytes = match self.format {
            SerializationFormat::Bincode => {
                return serialization::encode_with_limit(value, self.max_decode_size)
            }
            other => value.serialize_format(other)?,
        };
        if bytes.len() > self.max_decode_size {
            return Err(HookError::EncodeError(format!(
                "Encoded value is {} bytes (limit {})",
                bytes.len(),
                self.max_decode_size
            )));
        }
        Ok(bytes)
    }

    /// Decode with the configured format and size ceiling
    pub fn decode<T: Serialize + DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        if bytes.len() > self.max_decode_size {
            return Err(HookError::DecodeError(format!(
                "Input is {} bytes (limit {})",
                bytes.len(),
                self.max_decode_size
            )));
        }
        match self.format {
            SerializationFormat::Bincode => {
                serialization::decode_with_limit(bytes, self.max_decode_size)
            }
            other => T::deserialize_format(bytes, other),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to log to console
    pub log_to_console: bool,

    /// Whether to log to file
    pub log_to_file: bool,

    /// Path to log file (if log_to_file is true)
    pub log_file_path: Option<String>,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("packet-hooks"),
            log_level: Level::INFO,
            log_to_console: true,
            log_to_file: false,
            log_file_path: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        if self.log_to_file {
            if let Some(ref path) = self.log_file_path {
                if let Some(parent) = Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        errors.push(format!(
                            "Log file directory does not exist: {}",
                            parent.display()
                        ));
                    }
                }
            } else {
                errors.push("log_file_path must be specified when log_to_file is true".to_string());
            }
        }

        if !self.log_to_console && !self.log_to_file {
            errors
                .push("At least one logging output (console or file) must be enabled".to_string());
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
