use crate::error::{config_error, env_error, AssistantResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use toml;

/// Default timezone for interpreting and displaying dates
pub const DEFAULT_TIMEZONE: &str = "America/Guatemala";

/// Default duration in minutes for events created without one
pub const DEFAULT_DURATION_MIN: i64 = 60;

/// Default locale for console messages
pub const DEFAULT_LOCALE: &str = "es";

/// Path of the optional TOML file with overrides
const CONFIG_FILE: &str = "config/agendita.toml";

/// Main configuration structure for the assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Google OAuth client ID
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Calendar where events are created and listed
    pub google_calendar_id: String,
    /// File where the OAuth token JSON is persisted
    pub google_token_path: String,
    /// IANA timezone name, e.g. "America/Guatemala"
    pub timezone: String,
    /// Duration in minutes for events created without one
    pub default_duration_min: i64,
    /// Recipient of "event created" notification emails
    pub notify_email: Option<String>,
    /// From header for outgoing emails
    pub sender_email: Option<String>,
    /// Locale for console messages
    pub locale: String,
}

/// Optional overrides read from the TOML config file
#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    google_calendar_id: Option<String>,
    google_token_path: Option<String>,
    timezone: Option<String>,
    default_duration_min: Option<i64>,
    notify_email: Option<String>,
    sender_email: Option<String>,
    locale: Option<String>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> AssistantResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Required environment variables
        let google_client_id = env::var("GOOGLE_CLIENT_ID").map_err(|_| env_error("GOOGLE_CLIENT_ID"))?;
        let google_client_secret = env::var("GOOGLE_CLIENT_SECRET").map_err(|_| env_error("GOOGLE_CLIENT_SECRET"))?;

        // Optional environment variables with defaults
        let google_calendar_id = env::var("GOOGLE_CALENDAR_ID").unwrap_or_else(|_| String::from("primary"));
        let google_token_path = env::var("GOOGLE_TOKEN_PATH").unwrap_or_else(|_| String::from("token.json"));
        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| String::from(DEFAULT_TIMEZONE));
        let locale = env::var("ASSISTANT_LOCALE").unwrap_or_else(|_| String::from(DEFAULT_LOCALE));

        let default_duration_min = match env::var("DEFAULT_DURATION_MIN") {
            Ok(value) => value
                .parse::<i64>()
                .map_err(|_| env_error("Invalid DEFAULT_DURATION_MIN format"))?,
            Err(_) => DEFAULT_DURATION_MIN,
        };

        let notify_email = env::var("NOTIFY_EMAIL").ok().filter(|v| !v.trim().is_empty());
        let sender_email = env::var("SENDER_EMAIL").ok().filter(|v| !v.trim().is_empty());

        let mut config = Config {
            google_client_id,
            google_client_secret,
            google_calendar_id,
            google_token_path,
            timezone,
            default_duration_min,
            notify_email,
            sender_email,
            locale,
        };

        // Apply overrides from the config file if it exists
        if let Ok(content) = fs::read_to_string(CONFIG_FILE) {
            let overrides = toml::from_str::<ConfigOverrides>(&content)?;
            config.apply_overrides(overrides);
        }

        Ok(config)
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(calendar_id) = overrides.google_calendar_id {
            self.google_calendar_id = calendar_id;
        }
        if let Some(token_path) = overrides.google_token_path {
            self.google_token_path = token_path;
        }
        if let Some(timezone) = overrides.timezone {
            self.timezone = timezone;
        }
        if let Some(duration) = overrides.default_duration_min {
            self.default_duration_min = duration;
        }
        if let Some(notify_email) = overrides.notify_email {
            self.notify_email = Some(notify_email);
        }
        if let Some(sender_email) = overrides.sender_email {
            self.sender_email = Some(sender_email);
        }
        if let Some(locale) = overrides.locale {
            self.locale = locale;
        }
    }

    /// Parse the configured timezone name
    pub fn tz(&self) -> AssistantResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Invalid timezone: {}", self.timezone)))
    }
}
