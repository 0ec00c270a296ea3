//! Configuration management for the Augmenta receiver.
//!
//! This module handles loading, validation, and conversion of receiver
//! configuration from TOML files and command-line arguments.

use augmenta_server::{ServerConfig, TrackerSettings};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::Path;
use tracing::info;

fn default_receiver_name() -> String {
    "augmenta".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_input_port() -> u16 {
    12000
}

fn default_tick_interval() -> u64 {
    20 // 50 ticks per second
}

fn default_reconnect_interval() -> f32 {
    5.0
}

fn default_receive_timeout() -> f32 {
    2.0
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Application configuration loaded from TOML file.
///
/// Missing sections and keys fall back to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Network and lifecycle clock settings
    #[serde(default)]
    pub receiver: ReceiverSettings,
    /// How incoming tracking data is interpreted
    #[serde(default)]
    pub tracking: TrackerSettings,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Receiver-specific configuration settings.
///
/// Controls the input socket and the timing of the lifecycle clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverSettings {
    /// Name shown in log output
    #[serde(default = "default_receiver_name")]
    pub name: String,
    /// Interface to bind the input socket to (e.g., "0.0.0.0")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// UDP port the sensor sends to
    #[serde(default = "default_input_port")]
    pub input_port: u16,
    /// Lifecycle clock interval in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Seconds between bind attempts while the port is unavailable
    #[serde(default = "default_reconnect_interval")]
    pub reconnect_interval_secs: f32,
    /// Seconds without data before the input is reported as idle
    #[serde(default = "default_receive_timeout")]
    pub receive_timeout_secs: f32,
}

impl Default for ReceiverSettings {
    fn default() -> Self {
        Self {
            name: default_receiver_name(),
            bind_address: default_bind_address(),
            input_port: default_input_port(),
            tick_interval_ms: default_tick_interval(),
            reconnect_interval_secs: default_reconnect_interval(),
            receive_timeout_secs: default_receive_timeout(),
        }
    }
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, a default configuration file is written
    /// to `path` and the defaults are returned.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    pub async fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Converts the application configuration to a receiver configuration.
    pub fn to_server_config(&self) -> Result<ServerConfig, Box<dyn std::error::Error>> {
        let bind_ip: IpAddr = self.receiver.bind_address.parse()?;

        Ok(ServerConfig {
            receiver_name: self.receiver.name.clone(),
            bind_ip,
            input_port: self.receiver.input_port,
            tick_interval_ms: self.receiver.tick_interval_ms,
            reconnect_interval_secs: self.receiver.reconnect_interval_secs,
            receive_timeout_secs: self.receiver.receive_timeout_secs,
            tracking: self.tracking.clone(),
        })
    }

    /// Validates the configuration.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the configuration is usable, or a message naming the
    /// first offending setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.receiver.bind_address.parse::<IpAddr>().is_err() {
            return Err(format!(
                "Invalid bind address: {}",
                &self.receiver.bind_address
            ));
        }

        if self.receiver.tick_interval_ms == 0 {
            return Err("receiver.tick_interval_ms must be greater than 0".to_string());
        }
        if !(self.receiver.reconnect_interval_secs > 0.0) {
            return Err("receiver.reconnect_interval_secs must be greater than 0".to_string());
        }
        if !(self.receiver.receive_timeout_secs > 0.0) {
            return Err("receiver.receive_timeout_secs must be greater than 0".to_string());
        }

        if !(self.tracking.pixel_size > 0.0) {
            return Err("tracking.pixel_size must be greater than 0".to_string());
        }
        if !(self.tracking.scaling > 0.0) {
            return Err("tracking.scaling must be greater than 0".to_string());
        }
        if !(self.tracking.object_timeout_secs > 0.0) {
            return Err("tracking.object_timeout_secs must be greater than 0".to_string());
        }
        if self.tracking.desired_count < 0 {
            return Err("tracking.desired_count cannot be negative".to_string());
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use augmenta_server::{DesiredMode, ProtocolVersion};
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.receiver.name, "augmenta");
        assert_eq!(config.receiver.bind_address, "0.0.0.0");
        assert_eq!(config.receiver.input_port, 12000);
        assert_eq!(config.receiver.tick_interval_ms, 20);
        assert_eq!(config.receiver.reconnect_interval_secs, 5.0);
        assert_eq!(config.receiver.receive_timeout_secs, 2.0);

        assert_eq!(config.tracking.protocol_version, ProtocolVersion::V2);
        assert_eq!(config.tracking.pixel_size, 0.005);
        assert_eq!(config.tracking.scaling, 1.0);
        assert_eq!(config.tracking.object_timeout_secs, 1.0);
        assert_eq!(config.tracking.desired_mode, DesiredMode::All);
        assert_eq!(config.tracking.desired_count, 1);
        assert!(!config.tracking.mute);

        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
    }

    #[tokio::test]
    async fn test_load_from_nonexistent_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.receiver.input_port, 12000);

        // Should create the file, and it should load back
        assert!(path.exists());
        let reloaded = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(reloaded.receiver.input_port, 12000);
        assert_eq!(reloaded.tracking, config.tracking);
    }

    #[tokio::test]
    async fn test_load_from_existing_file() {
        let toml_content = r#"
[receiver]
name = "stage-left"
bind_address = "127.0.0.1"
input_port = 7000
tick_interval_ms = 10

[tracking]
protocol_version = "v1"
pixel_size = 0.01
flip_y = true
desired_mode = "newest"
desired_count = 3

[logging]
level = "debug"
json_format = true
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = AppConfig::load_from_file(file.path()).await.unwrap();

        assert_eq!(config.receiver.name, "stage-left");
        assert_eq!(config.receiver.input_port, 7000);
        assert_eq!(config.receiver.tick_interval_ms, 10);
        assert_eq!(config.receiver.reconnect_interval_secs, 5.0);
        assert_eq!(config.tracking.protocol_version, ProtocolVersion::V1);
        assert_eq!(config.tracking.pixel_size, 0.01);
        assert!(config.tracking.flip_y);
        assert!(!config.tracking.flip_x);
        assert_eq!(config.tracking.desired_mode, DesiredMode::Newest);
        assert_eq!(config.tracking.desired_count, 3);
        assert_eq!(config.tracking.object_timeout_secs, 1.0);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_toml() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[receiver\ninput_port = ").unwrap();

        assert!(AppConfig::load_from_file(file.path()).await.is_err());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.receiver.input_port, 12000);
        assert_eq!(config.tracking, TrackerSettings::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_to_server_config_conversion() {
        let mut config = AppConfig::default();
        config.receiver.bind_address = "127.0.0.1".to_string();
        config.receiver.input_port = 7001;
        config.tracking.flip_x = true;

        let server_config = config.to_server_config().unwrap();
        assert_eq!(server_config.bind_ip, "127.0.0.1".parse::<IpAddr>().unwrap());
        assert_eq!(server_config.input_port, 7001);
        assert_eq!(server_config.receiver_name, "augmenta");
        assert!(server_config.tracking.flip_x);
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_bind_address() {
        let mut config = AppConfig::default();
        config.receiver.bind_address = "not-an-ip".to_string();

        let result = config.validate();
        assert!(result.unwrap_err().contains("Invalid bind address"));
        assert!(config.to_server_config().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_numbers() {
        let cases: Vec<(&str, Box<dyn Fn(&mut AppConfig)>)> = vec![
            ("tick_interval_ms", Box::new(|c: &mut AppConfig| c.receiver.tick_interval_ms = 0)),
            ("reconnect_interval_secs", Box::new(|c: &mut AppConfig| c.receiver.reconnect_interval_secs = 0.0)),
            ("receive_timeout_secs", Box::new(|c: &mut AppConfig| c.receiver.receive_timeout_secs = -1.0)),
            ("pixel_size", Box::new(|c: &mut AppConfig| c.tracking.pixel_size = 0.0)),
            ("scaling", Box::new(|c: &mut AppConfig| c.tracking.scaling = f32::NAN)),
            ("object_timeout_secs", Box::new(|c: &mut AppConfig| c.tracking.object_timeout_secs = 0.0)),
            ("desired_count", Box::new(|c: &mut AppConfig| c.tracking.desired_count = -1)),
        ];

        for (field, break_config) in cases {
            let mut config = AppConfig::default();
            break_config(&mut config);
            let err = config.validate().unwrap_err();
            assert!(err.contains(field), "expected error about {field}, got {err}");
        }
    }

    #[test]
    fn test_validation_log_levels() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let mut config = AppConfig::default();
            config.logging.level = level.to_string();
            assert!(config.validate().is_ok(), "Level '{}' should be valid", level);
        }

        let mut config = AppConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().unwrap_err().contains("Invalid log level"));
    }
}
