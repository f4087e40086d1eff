//! Page Classifier for ReviewBadge.
//!
//! Derives page-type flags from a GitHub URL and decides whether the current
//! scope setting allows annotating the page at all.

use std::sync::OnceLock;

use regex::Regex;
use reqwest::Url;

use crate::types::errors::PageError;
use crate::types::page::PageContext;
use crate::types::settings::Scope;

const GITHUB_ORIGIN: &str = "https://github.com";
const NOTIFICATIONS_PATH: &str = "/notifications";
const REVIEW_REQUESTED_FILTER: &str = "reason:review-requested";

fn pr_page_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^/[^/]+/[^/]+/pull/\d+").expect("PR page pattern is valid"))
}

fn pr_list_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^/[^/]+/[^/]+/pulls").expect("PR list pattern is valid"))
}

/// Parses an absolute page URL, or a path that is taken relative to github.com.
pub fn parse_page_url(url: &str) -> Result<Url, PageError> {
    let url = url.trim();
    let invalid = || PageError::InvalidUrl(url.to_string());
    let parsed = if url.starts_with('/') {
        Url::parse(GITHUB_ORIGIN).and_then(|origin| origin.join(url))
    } else {
        Url::parse(url)
    }
    .map_err(|_| invalid())?;

    if parsed.cannot_be_a_base() {
        return Err(invalid());
    }
    Ok(parsed)
}

/// Classifies a page URL.
pub fn classify(url: &str) -> Result<PageContext, PageError> {
    let url = parse_page_url(url)?;
    let path = url.path();
    let query = url
        .query_pairs()
        .find(|(key, _)| key == "query")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default();

    let is_notifications = path == NOTIFICATIONS_PATH;
    let is_review_requested = is_notifications && query.contains(REVIEW_REQUESTED_FILTER);

    Ok(PageContext {
        path: path.to_string(),
        is_notifications,
        is_review_requested,
        is_pr_page: pr_page_pattern().is_match(path),
        is_pr_list: pr_list_pattern().is_match(path),
        query,
    })
}

/// The scope gate: whether any annotation work may happen on this page.
pub fn should_run(page: &PageContext, scope: Scope) -> bool {
    match scope {
        Scope::ReviewRequested => page.is_review_requested,
        Scope::AllNotifications => page.is_notifications,
        Scope::Everywhere => page.is_notifications || page.is_pr_page || page.is_pr_list,
    }
}
