use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A review as returned by `GET /repos/{owner}/{repo}/pulls/{number}/reviews`.
///
/// Only the fields the status reduction needs are kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewEvent {
    /// `null` for reviews left by deleted accounts.
    pub user: Option<ReviewUser>,
    pub state: ReviewState,
    /// Absent on reviews that were never submitted.
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ReviewEvent {
    pub fn author(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.login.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewUser {
    pub login: String,
}

/// Review state strings from the GitHub API.
///
/// GitHub may introduce new states, so anything unrecognized is kept verbatim
/// in `Other` instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Pending,
    Other(String),
}

impl From<String> for ReviewState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "APPROVED" => ReviewState::Approved,
            "CHANGES_REQUESTED" => ReviewState::ChangesRequested,
            "COMMENTED" => ReviewState::Commented,
            "PENDING" => ReviewState::Pending,
            _ => ReviewState::Other(value),
        }
    }
}

impl From<ReviewState> for String {
    fn from(state: ReviewState) -> Self {
        match state {
            ReviewState::Approved => "APPROVED".to_string(),
            ReviewState::ChangesRequested => "CHANGES_REQUESTED".to_string(),
            ReviewState::Commented => "COMMENTED".to_string(),
            ReviewState::Pending => "PENDING".to_string(),
            ReviewState::Other(raw) => raw,
        }
    }
}

/// The four-way status shown on a badge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum StatusCategory {
    Approved,
    ChangesRequested,
    Commented,
    Pending,
}

impl StatusCategory {
    pub const ALL: [StatusCategory; 4] = [
        StatusCategory::Approved,
        StatusCategory::ChangesRequested,
        StatusCategory::Commented,
        StatusCategory::Pending,
    ];

    /// CSS class name, also the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCategory::Approved => "approved",
            StatusCategory::ChangesRequested => "changes-requested",
            StatusCategory::Commented => "commented",
            StatusCategory::Pending => "pending",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            StatusCategory::Approved => "\u{2705}",
            StatusCategory::ChangesRequested => "\u{1F504}",
            StatusCategory::Commented => "\u{1F4AC}",
            StatusCategory::Pending => "\u{23F3}",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusCategory::Approved => "Approved",
            StatusCategory::ChangesRequested => "Changes requested",
            StatusCategory::Commented => "Commented",
            StatusCategory::Pending => "Pending",
        }
    }
}
