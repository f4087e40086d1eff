use serde::{Deserialize, Serialize};

/// Flags derived from the URL of the page being annotated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PageContext {
    /// URL path, without query or fragment.
    pub path: String,
    /// Decoded value of the `query` search parameter, empty if absent.
    pub query: String,
    /// `/notifications`, any filter.
    pub is_notifications: bool,
    /// `/notifications` filtered to `reason:review-requested`.
    pub is_review_requested: bool,
    /// `/{owner}/{repo}/pull/{number}` and its sub-tabs.
    pub is_pr_page: bool,
    /// `/{owner}/{repo}/pulls`.
    pub is_pr_list: bool,
}
