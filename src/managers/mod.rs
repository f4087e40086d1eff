// ReviewBadge page managers
// Managers own per-page state: attached badges and their tasks, the mutation observer, the page session.

pub mod badge_scanner;
pub mod observer;
pub mod page_session;
