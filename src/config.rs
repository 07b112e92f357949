//! Runtime settings read from the environment.
//!
//! | variable | default |
//! |---|---|
//! | `DISCORD_TOKEN` | required |
//! | `ALERT_CHANNEL_ID` | unset (alerts disabled) |
//! | `ALERT_LEAD_MINUTES` | 30 |
//! | `ALERT_INTERVAL_MINUTES` | 10 |
//! | `VLR_API_BASE` | `https://vlrggapi.vercel.app` |

use std::time::Duration;

use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::alerts::AlertSettings;
use crate::api::DEFAULT_BASE_URL;

pub const TOKEN_VAR: &str = "DISCORD_TOKEN";
pub const ALERT_CHANNEL_VAR: &str = "ALERT_CHANNEL_ID";
pub const ALERT_LEAD_VAR: &str = "ALERT_LEAD_MINUTES";
pub const ALERT_INTERVAL_VAR: &str = "ALERT_INTERVAL_MINUTES";
pub const API_BASE_VAR: &str = "VLR_API_BASE";

pub const DEFAULT_LEAD_MINUTES: u64 = 30;
pub const DEFAULT_INTERVAL_MINUTES: u64 = 10;

/// Upper bound for both alert durations (one day).
pub const MAX_MINUTES: u64 = 1440;

/// Invalid or missing configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error(
        "{var} is not set\n  Why: the bot cannot log in without it\n  Fix: export {var}=<bot token> or add it to .env"
    )]
    Missing {
        /// Variable name.
        var: &'static str,
    },

    /// A variable is set to something unusable.
    #[error("{var}={value:?} is invalid\n  Why: {why}\n  Fix: {fix}")]
    Invalid {
        /// Variable (or flag) name.
        var: &'static str,
        /// Offending value.
        value: String,
        /// What is wrong with it.
        why: String,
        /// How to correct it.
        fix: String,
    },
}

impl ConfigError {
    fn invalid(
        var: &'static str,
        value: impl Into<String>,
        why: impl Into<String>,
        fix: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            var,
            value: value.into(),
            why: why.into(),
            fix: fix.into(),
        }
    }
}

/// Everything the bot needs at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub token: String,
    pub api_base: Url,
    pub alerts: AlertSettings,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("token", &"<redacted>")
            .field("api_base", &self.api_base.as_str())
            .field("alerts", &self.alerts)
            .finish()
    }
}

/// Values from the command line that take precedence over the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub api_base: Option<String>,
    pub alert_lead_minutes: Option<u64>,
    pub alert_interval_minutes: Option<u64>,
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Settings::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    ///
    /// An unparsable `ALERT_CHANNEL_ID` disables alerts with a warning rather
    /// than failing startup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] without a token and
    /// [`ConfigError::Invalid`] for out-of-range minutes or a bad base URL.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let token = get(TOKEN_VAR).ok_or(ConfigError::Missing { var: TOKEN_VAR })?;
        let api_base = parse_base_url(
            API_BASE_VAR,
            get(API_BASE_VAR).as_deref().unwrap_or(DEFAULT_BASE_URL),
        )?;
        let channel_id = get(ALERT_CHANNEL_VAR).and_then(|raw| parse_channel_id(&raw));
        let lead = parse_minutes(ALERT_LEAD_VAR, get(ALERT_LEAD_VAR), DEFAULT_LEAD_MINUTES, 0)?;
        let interval = parse_minutes(
            ALERT_INTERVAL_VAR,
            get(ALERT_INTERVAL_VAR),
            DEFAULT_INTERVAL_MINUTES,
            1,
        )?;

        Ok(Self {
            token,
            api_base,
            alerts: AlertSettings {
                channel_id,
                lead: minutes(lead),
                interval: minutes(interval),
            },
        })
    }

    /// Applies command-line overrides on top of the environment values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an override outside its range.
    pub fn apply_overrides(mut self, overrides: &SettingsOverrides) -> Result<Self, ConfigError> {
        if let Some(base) = overrides.api_base.as_deref() {
            self.api_base = parse_base_url("--api-base", base)?;
        }
        if let Some(lead) = overrides.alert_lead_minutes {
            check_range("--alert-lead-minutes", lead, 0)?;
            self.alerts.lead = minutes(lead);
        }
        if let Some(interval) = overrides.alert_interval_minutes {
            check_range("--alert-interval-minutes", interval, 1)?;
            self.alerts.interval = minutes(interval);
        }
        Ok(self)
    }
}

fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

fn parse_channel_id(raw: &str) -> Option<u64> {
    match raw.parse::<u64>() {
        Ok(0) | Err(_) => {
            warn!(var = ALERT_CHANNEL_VAR, value = raw, "Not a channel id; alerts disabled");
            None
        }
        Ok(id) => Some(id),
    }
}

fn parse_minutes(
    var: &'static str,
    raw: Option<String>,
    default: u64,
    min: u64,
) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value = raw.parse::<u64>().map_err(|_| {
        ConfigError::invalid(
            var,
            raw.as_str(),
            "not a whole number of minutes",
            format!("use an integer between {min} and {MAX_MINUTES}"),
        )
    })?;
    check_range(var, value, min)?;
    Ok(value)
}

fn check_range(var: &'static str, value: u64, min: u64) -> Result<(), ConfigError> {
    if (min..=MAX_MINUTES).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            var,
            value.to_string(),
            format!("must be between {min} and {MAX_MINUTES} minutes"),
            format!("use an integer between {min} and {MAX_MINUTES}"),
        ))
    }
}

fn parse_base_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| {
        ConfigError::invalid(var, raw, e.to_string(), "use a URL like https://vlrggapi.vercel.app")
    })?;
    if matches!(url.scheme(), "http" | "https") {
        Ok(url)
    } else {
        Err(ConfigError::invalid(
            var,
            raw,
            format!("scheme '{}' is not http or https", url.scheme()),
            "use a URL like https://vlrggapi.vercel.app",
        ))
    }
}
