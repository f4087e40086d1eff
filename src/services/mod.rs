// ReviewBadge services
// Services provide the stateless and persistence-facing pieces: settings, page classification,
// the GitHub client, status resolution, and badge rendering.

pub mod badge_renderer;
pub mod github_client;
pub mod page_classifier;
pub mod settings_engine;
pub mod status_resolver;
