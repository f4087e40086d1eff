//! Badge Renderer for ReviewBadge.
//!
//! Pure mapping from a status and display mode to what the badge element shows.

use crate::types::badge::{BadgeView, BADGE_CLASS};
use crate::types::review::StatusCategory;
use crate::types::settings::DisplayMode;

pub const LOADING_ICON: &str = "\u{23F3}";
pub const ERROR_ICON: &str = "\u{26A0}";

/// `id` of the injected `<style>` element, so it is only added once per page.
pub const STYLESHEET_ID: &str = "review-status-badge-style";

/// CSS for all badge states, injected once into the page head.
pub const STYLESHEET: &str = r#"
.review-status-badge {
  display: inline-flex;
  align-items: center;
  gap: 3px;
  font-size: 11px;
  font-weight: 500;
  padding: 0 6px;
  border-radius: 8px;
  white-space: nowrap;
  vertical-align: middle;
  line-height: 20px;
  height: 20px;
  margin-left: 6px;
  position: relative;
  top: -1px;
}
.review-status-badge.mode-icon-text-color.approved { background: #1a7f37; color: #fff; }
.review-status-badge.mode-icon-text-color.changes-requested { background: #cf222e; color: #fff; }
.review-status-badge.mode-icon-text-color.commented { background: #9a6700; color: #fff; }
.review-status-badge.mode-icon-text-color.pending { background: #656d76; color: #fff; }
.review-status-badge.mode-icon-text { background: transparent; padding: 0 2px; }
.review-status-badge.mode-icon-text.approved { color: #3fb950; }
.review-status-badge.mode-icon-text.changes-requested { color: #f85149; }
.review-status-badge.mode-icon-text.commented { color: #d29922; }
.review-status-badge.mode-icon-text.pending { color: #848d97; }
.review-status-badge.mode-icon { background: transparent; padding: 0 2px; gap: 0; }
.review-status-badge.mode-icon.approved { color: #3fb950; }
.review-status-badge.mode-icon.changes-requested { color: #f85149; }
.review-status-badge.mode-icon.commented { color: #d29922; }
.review-status-badge.mode-icon.pending { color: #848d97; }
.review-status-badge.loading { background: transparent; color: #848d97; padding: 0 2px; }
.review-status-badge.error { background: transparent; color: #f85149; font-size: 10px; padding: 0 2px; }
"#;

/// Resolved badge for `status` in `mode`.
pub fn render(status: StatusCategory, mode: DisplayMode) -> BadgeView {
    let (text, title) = match mode {
        DisplayMode::Icon => (status.icon().to_string(), status.label().to_string()),
        DisplayMode::IconText | DisplayMode::IconTextColor => {
            (format!("{} {}", status.icon(), status.label()), String::new())
        }
    };
    BadgeView {
        text,
        title,
        classes: vec![
            BADGE_CLASS.to_string(),
            format!("mode-{}", mode.as_str()),
            status.as_str().to_string(),
        ],
    }
}

/// Placeholder shown while the status is being fetched.
pub fn loading() -> BadgeView {
    BadgeView {
        text: LOADING_ICON.to_string(),
        title: String::new(),
        classes: vec![BADGE_CLASS.to_string(), "loading".to_string()],
    }
}

/// Failure rendering; the reason goes into the tooltip.
pub fn error(message: &str) -> BadgeView {
    BadgeView {
        text: ERROR_ICON.to_string(),
        title: message.to_string(),
        classes: vec![BADGE_CLASS.to_string(), "error".to_string()],
    }
}
