use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A pull request identified by `owner/repo#number`, parsed from a link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PrReference {
    pub owner: String,
    pub repo: String,
    /// Kept as the digits found in the link.
    pub number: String,
}

fn pr_link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"/([^/]+)/([^/]+)/pull/(\d+)").expect("pull request link pattern is valid")
    })
}

impl PrReference {
    /// Extracts the first `/owner/repo/pull/number` occurrence from an href or path.
    ///
    /// Works on absolute URLs too, since the pattern is not anchored.
    pub fn from_href(href: &str) -> Option<Self> {
        let caps = pr_link_pattern().captures(href)?;
        Some(Self {
            owner: caps[1].to_string(),
            repo: caps[2].to_string(),
            number: caps[3].to_string(),
        })
    }

    /// API path listing this pull request's reviews, one fixed page of 100.
    pub fn reviews_path(&self) -> String {
        format!(
            "/repos/{}/{}/pulls/{}/reviews?per_page=100",
            self.owner, self.repo, self.number
        )
    }
}

impl fmt::Display for PrReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}
