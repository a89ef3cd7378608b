use core::fmt::{Debug, Display};

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Stretches booking dates before they are checked for overlaps.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// A booking covers every day it touches, from midnight to midnight.
    Day,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct MatchingConfig {
    /// Fail if an attendee ends up with overlapping bookings.
    pub validity_check: bool,
    /// Run the (very slow) stability check after matching. Meant for tests.
    pub stability_check: bool,
    /// Fail instead of returning a partial result once the loop budget is used up.
    pub hard_budget: bool,
    /// Overrides the default budget of bookings times attendees.
    pub max_ticks: Option<usize>,
    /// Maximum number of accepted bookings per attendee, zero is unlimited.
    pub default_limit: Option<usize>,
    /// Transfer time appended to every booking date.
    pub minutes_between: u32,
    pub alignment: Option<Alignment>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            validity_check: true,
            stability_check: false,
            hard_budget: false,
            max_ticks: None,
            default_limit: None,
            minutes_between: 0,
            alignment: None,
        }
    }
}

/// Optional scoring criteria, stored per period.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ScoringSettings {
    pub prefer_in_age_bracket: bool,
    pub prefer_organiser: bool,
    pub prefer_admins: bool,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub matching: MatchingConfig,
    pub scoring: ScoringSettings,
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Figment(Box::new(value))
    }
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

#[must_use]
pub fn figment() -> Figment {
    Figment::new()
        .merge(Toml::file("fpm.toml"))
        .merge(Env::prefixed("FPM_").split("__"))
}

pub fn get_config() -> Result<Config, ConfigError> {
    Ok(figment().extract()?)
}
