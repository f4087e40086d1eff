//! Status Resolver for ReviewBadge.
//!
//! Reduces a pull request's review history to the current user's latest
//! definitive opinion.

use std::sync::Arc;

use crate::services::github_client::ReviewSource;
use crate::types::errors::GitHubError;
use crate::types::pull_request::PrReference;
use crate::types::review::{ReviewEvent, ReviewState, StatusCategory};

/// Maps a review state to the badge category.
pub fn category_for_state(state: &ReviewState) -> StatusCategory {
    match state {
        ReviewState::Approved => StatusCategory::Approved,
        ReviewState::ChangesRequested => StatusCategory::ChangesRequested,
        ReviewState::Commented => StatusCategory::Commented,
        ReviewState::Pending => StatusCategory::Pending,
        // States GitHub adds later are shown as plain comments.
        ReviewState::Other(_) => StatusCategory::Commented,
    }
}

/// The most recent non-pending review by `username` decides the category.
///
/// Author comparison ignores case. Reviews are ordered by `submitted_at` with a
/// stable sort, reviews without a timestamp first. No qualifying review means
/// `Pending`.
pub fn resolve_status(events: &[ReviewEvent], username: &str) -> StatusCategory {
    let username = username.to_lowercase();
    let mut mine: Vec<&ReviewEvent> = events
        .iter()
        .filter(|e| {
            e.author()
                .map(|login| login.to_lowercase() == username)
                .unwrap_or(false)
        })
        .filter(|e| e.state != ReviewState::Pending)
        .collect();
    mine.sort_by_key(|e| e.submitted_at);

    match mine.last() {
        Some(latest) => category_for_state(&latest.state),
        None => StatusCategory::Pending,
    }
}

/// Fetches reviews and resolves them for one configured user.
#[derive(Clone)]
pub struct StatusResolver {
    source: Arc<dyn ReviewSource>,
    username: String,
}

impl StatusResolver {
    pub fn new(source: Arc<dyn ReviewSource>, username: &str) -> Self {
        Self {
            source,
            username: username.to_lowercase(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// One fetch, no retry. Failures are returned to the caller unchanged.
    pub async fn resolve(&self, pr: &PrReference) -> Result<StatusCategory, GitHubError> {
        let events = self.source.list_reviews(pr).await?;
        let status = resolve_status(&events, &self.username);
        log::debug!("{} resolved to {} from {} reviews", pr, status.as_str(), events.len());
        Ok(status)
    }
}
