use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four persisted values that drive badge annotation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewBadgeSettings {
    /// GitHub personal access token. Empty when not configured.
    #[serde(default)]
    pub token: String,
    /// GitHub login, stored lowercase. Empty when not configured.
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub display_mode: DisplayMode,
    #[serde(default)]
    pub scope: Scope,
}

impl Default for ReviewBadgeSettings {
    fn default() -> Self {
        Self {
            token: String::new(),
            username: String::new(),
            display_mode: DisplayMode::default(),
            scope: Scope::default(),
        }
    }
}

impl ReviewBadgeSettings {
    /// Both a token and a username are required before any badge is attached.
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty() && !self.username.is_empty()
    }
}

/// How much detail a badge shows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    /// Glyph only, label as tooltip.
    Icon,
    /// Glyph and label.
    IconText,
    /// Glyph and label on a background colored by status.
    #[default]
    IconTextColor,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 3] = [
        DisplayMode::Icon,
        DisplayMode::IconText,
        DisplayMode::IconTextColor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Icon => "icon",
            DisplayMode::IconText => "icon-text",
            DisplayMode::IconTextColor => "icon-text-color",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DisplayMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s.trim())
            .ok_or_else(|| {
                format!("unknown display mode '{}' (expected icon, icon-text or icon-text-color)", s)
            })
    }
}

/// Which page types the annotator is allowed to act on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    /// Only the notification inbox filtered to `reason:review-requested`.
    #[default]
    ReviewRequested,
    /// Any notification inbox view.
    AllNotifications,
    /// Notifications, single pull requests, and pull request lists.
    Everywhere,
}

impl Scope {
    pub const ALL: [Scope; 3] = [
        Scope::ReviewRequested,
        Scope::AllNotifications,
        Scope::Everywhere,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::ReviewRequested => "review-requested",
            Scope::AllNotifications => "all-notifications",
            Scope::Everywhere => "everywhere",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == s.trim())
            .ok_or_else(|| {
                format!(
                    "unknown scope '{}' (expected review-requested, all-notifications or everywhere)",
                    s
                )
            })
    }
}
