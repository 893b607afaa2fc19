//! Configuration loading and validation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{default_slots, TimeSlot};
use crate::schedule::Schedule;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Court layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourtsConfig {
    #[serde(default = "default_courts")]
    pub numbers: Vec<u32>,
}

fn default_courts() -> Vec<u32> {
    vec![1, 2, 3]
}

impl Default for CourtsConfig {
    fn default() -> Self {
        Self {
            numbers: default_courts(),
        }
    }
}

/// Email provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Send through the provider; when false, emails are only logged
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub service_id: String,

    #[serde(default)]
    pub template_id: String,

    /// Environment variable holding the provider key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_from_name")]
    pub from_name: String,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_endpoint() -> String {
    "https://api.emailjs.com/api/v1.0/email/send".to_string()
}

fn default_api_key_env() -> String {
    "COURT_BOOKER_EMAIL_KEY".to_string()
}

fn default_from_name() -> String {
    "Court Booker".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            service_id: String::new(),
            template_id: String::new(),
            api_key_env: default_api_key_env(),
            from_name: default_from_name(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub courts: CourtsConfig,

    #[serde(default = "default_slots")]
    pub slots: Vec<TimeSlot>,

    #[serde(default)]
    pub notification: NotificationConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            server: ServerConfig::default(),
            courts: CourtsConfig::default(),
            slots: default_slots(),
            notification: NotificationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("Server port must be greater than 0"));
        }

        if self.courts.numbers.is_empty() {
            return Err(invalid("At least one court is required"));
        }
        let mut seen = HashSet::new();
        for court in &self.courts.numbers {
            if !seen.insert(court) {
                return Err(invalid(&format!("Court {} listed twice", court)));
            }
        }

        if self.slots.is_empty() {
            return Err(invalid("At least one time slot is required"));
        }
        let mut labels = HashSet::new();
        for slot in &self.slots {
            if slot.end <= slot.start {
                return Err(invalid(&format!("Slot {} ends before it starts", slot.label)));
            }
            if !labels.insert(slot.label.as_str()) {
                return Err(invalid(&format!("Slot {} listed twice", slot.label)));
            }
        }

        let mut by_start: Vec<&TimeSlot> = self.slots.iter().collect();
        by_start.sort_by_key(|s| s.start);
        for pair in by_start.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(invalid(&format!(
                    "Slots {} and {} overlap",
                    pair[0].label, pair[1].label
                )));
            }
        }

        if self.notification.timeout_seconds == 0 {
            return Err(invalid("Notification timeout must be greater than 0"));
        }
        if let Err(e) = url::Url::parse(&self.notification.endpoint) {
            return Err(invalid(&format!(
                "Notification endpoint is not a valid URL: {}",
                e
            )));
        }

        Ok(())
    }

    pub fn schedule(&self) -> Schedule {
        Schedule::new(self.courts.numbers.clone(), self.slots.clone())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchType;
    use chrono::NaiveTime;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.courts.numbers, vec![1, 2, 3]);
        assert!(!config.notification.enabled);
    }

    #[test]
    fn test_config_validation_ok() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_duplicate_court() {
        let mut config = AppConfig::default();
        config.courts.numbers = vec![1, 2, 1];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_no_courts() {
        let mut config = AppConfig::default();
        config.courts.numbers.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_backwards_slot() {
        let mut config = AppConfig::default();
        let first = config.slots[0].clone();
        config.slots[0].start = first.end;
        config.slots[0].end = first.start;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_duplicate_slot() {
        let mut config = AppConfig::default();
        let dup = config.slots[0].clone();
        config.slots.push(dup);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_overlapping_slots() {
        let mut config = AppConfig::default();
        config.slots = vec![
            TimeSlot::new(hm(8, 0), hm(9, 0), MatchType::Singles),
            TimeSlot::new(hm(8, 0), hm(10, 0), MatchType::Doubles),
        ];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("overlap"));

        // Back-to-back slots are fine, in any order
        config.slots = vec![
            TimeSlot::new(hm(9, 0), hm(10, 0), MatchType::Singles),
            TimeSlot::new(hm(8, 0), hm(9, 0), MatchType::Singles),
        ];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_endpoint() {
        let mut config = AppConfig::default();
        config.notification.endpoint = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_toml() {
        let config = AppConfig::from_toml(
            r#"
            data_dir = "/var/lib/courts"

            [server]
            port = 9000

            [courts]
            numbers = [4, 5]

            [[slots]]
            label = "07:00-08:00"
            start = "07:00"
            end = "08:00"
            match_type = "singles"

            [[slots]]
            label = "19:00-21:00"
            start = "19:00"
            end = "21:00"
            match_type = "doubles"

            [notification]
            enabled = true
            service_id = "svc"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/var/lib/courts"));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");

        let schedule = config.schedule();
        assert_eq!(schedule.courts, vec![4, 5]);
        assert_eq!(schedule.slots.len(), 2);
        assert_eq!(
            schedule.slot("19:00-21:00").unwrap().match_type,
            MatchType::Doubles
        );
        assert!(config.notification.enabled);
        assert_eq!(config.notification.timeout_seconds, 30);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.data_dir, parsed.data_dir);
        assert_eq!(config.slots, parsed.slots);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("/nonexistent/court-booker.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }
}
