use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the host's appearance setting.
    #[default]
    System,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("Unknown theme: {other}")),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        };
        f.write_str(s)
    }
}

/// In-memory UI preference state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiPreferences {
    pub theme: Theme,
    pub notifications: bool,
    pub sidebar_open: bool,
    pub is_loading: bool,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            notifications: true,
            sidebar_open: false,
            is_loading: false,
        }
    }
}

impl UiPreferences {
    pub fn persisted(&self) -> PersistedPreferences {
        PersistedPreferences {
            theme: self.theme,
            notifications: self.notifications,
        }
    }

    /// Transient flags start from their defaults.
    pub fn from_persisted(record: PersistedPreferences) -> Self {
        Self {
            theme: record.theme,
            notifications: record.notifications,
            ..Self::default()
        }
    }
}

/// Stored form: `{"theme":"dark","notifications":true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedPreferences {
    pub theme: Theme,
    pub notifications: bool,
}

impl Default for PersistedPreferences {
    fn default() -> Self {
        UiPreferences::default().persisted()
    }
}
