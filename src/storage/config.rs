use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::booking::{BusinessHours, FormType, SlotCatalog, TimeSlot};
use crate::booking::slots::standard_slots;

const APP_DIR: &str = "playroom-booking";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub google: GoogleConfig,
    pub booking: BookingConfig,
    pub event: EventConfig,
    pub notification: NotificationConfig,
    pub mock: MockConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_cache: PathBuf,
    pub calendar_id: String,
    pub api_base_url: String,
}

impl GoogleConfig {
    /// Missing credentials mean availability comes from the mock source.
    pub fn is_configured(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BookingConfig {
    pub timezone: String,
    pub window_days: u32,
    pub min_advance_days: u32,
    pub source_timeout_secs: u64,
    pub time_slots: Vec<TimeSlot>,
    pub business_hours: BusinessHours,
}

impl BookingConfig {
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::Invalid(format!("unknown timezone '{}'", self.timezone)))
    }

    pub fn catalog(&self) -> Result<SlotCatalog, ConfigError> {
        SlotCatalog::new(self.time_slots.clone()).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EventConfig {
    pub title: String,
    pub description: String,
    pub location: String,
    pub color_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStrategy {
    Relay,
    FormRelay,
    Manual,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotificationConfig {
    pub strategy: NotificationStrategy,
    pub recipient: String,
    pub relay_url: String,
    pub form_relay_url: String,
    pub access_key: String,
    pub business_name: String,
    pub business_address: String,
    pub subjects: SubjectPrefixes,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SubjectPrefixes {
    pub party: String,
    pub reservation: String,
    pub contact: String,
    pub waiver: String,
    pub partnership: String,
    pub general: String,
}

impl SubjectPrefixes {
    pub fn for_form(&self, form_type: FormType) -> &str {
        match form_type {
            FormType::Party => &self.party,
            FormType::Reservation => &self.reservation,
            FormType::Contact => &self.contact,
            FormType::Waiver => &self.waiver,
            FormType::Partnership => &self.partnership,
            FormType::General => &self.general,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MockConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub theme: String,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Timezone and slot catalog are parsed eagerly so a bad file fails at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.booking.tz()?;
        self.booking.catalog()?;
        if self.booking.window_days == 0 {
            return Err(ConfigError::Invalid("booking.window_days must be positive".to_string()));
        }
        Ok(())
    }

    pub fn load_or_create() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            token_cache: Config::config_dir().join("token.json"),
            calendar_id: "primary".to_string(),
            api_base_url: "https://www.googleapis.com/calendar/v3".to_string(),
        }
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            timezone: "America/Chicago".to_string(),
            window_days: 90,
            min_advance_days: 14,
            source_timeout_secs: 5,
            time_slots: standard_slots(),
            business_hours: BusinessHours::default(),
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            title: "Little Playroom Cafe - Reservation".to_string(),
            description: "Reservation for play area access".to_string(),
            location: "Little Playroom Cafe, 7956 Tree Lane, Madison WI 53717".to_string(),
            color_id: "4".to_string(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            strategy: NotificationStrategy::Manual,
            recipient: "playroommadison@gmail.com".to_string(),
            relay_url: "http://localhost:3000/api/send-email".to_string(),
            form_relay_url: "https://api.web3forms.com/submit".to_string(),
            access_key: String::new(),
            business_name: "Little Playroom Cafe".to_string(),
            business_address: "7956 Tree Lane, Madison WI 53717".to_string(),
            subjects: SubjectPrefixes::default(),
        }
    }
}

impl Default for SubjectPrefixes {
    fn default() -> Self {
        Self {
            party: "🎉 Party Registration - Little Playroom Cafe".to_string(),
            reservation: "📅 Reservation Request - Little Playroom Cafe".to_string(),
            contact: "📧 Contact Form - Little Playroom Cafe".to_string(),
            waiver: "📋 Waiver Submission - Little Playroom Cafe".to_string(),
            partnership: "🤝 Partnership Inquiry - Little Playroom Cafe".to_string(),
            general: "Form Submission".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
        }
    }
}
