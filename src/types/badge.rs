use serde::{Deserialize, Serialize};

/// Marker class carried by every badge element. A container holding an element
/// with this class is considered already annotated.
pub const BADGE_CLASS: &str = "review-status-badge";

/// The visible attributes of a badge element.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BadgeView {
    pub text: String,
    /// Tooltip. Empty means no `title` attribute.
    pub title: String,
    pub classes: Vec<String>,
}

impl BadgeView {
    /// Space-joined value for the `class` attribute.
    pub fn class_attr(&self) -> String {
        self.classes.join(" ")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}
