//! Property-based tests for settings persistence.
//!
//! Any settings value written by the engine must come back unchanged from a
//! fresh engine reading the same file.

use proptest::prelude::*;
use tempfile::TempDir;

use reviewbadge::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use reviewbadge::types::settings::{DisplayMode, ReviewBadgeSettings, Scope};

fn arb_display_mode() -> impl Strategy<Value = DisplayMode> {
    prop_oneof![
        Just(DisplayMode::Icon),
        Just(DisplayMode::IconText),
        Just(DisplayMode::IconTextColor),
    ]
}

fn arb_scope() -> impl Strategy<Value = Scope> {
    prop_oneof![
        Just(Scope::ReviewRequested),
        Just(Scope::AllNotifications),
        Just(Scope::Everywhere),
    ]
}

fn arb_settings() -> impl Strategy<Value = ReviewBadgeSettings> {
    (
        "(ghp_[A-Za-z0-9]{36})?",
        "[a-z0-9-]{0,39}",
        arb_display_mode(),
        arb_scope(),
    )
        .prop_map(|(token, username, display_mode, scope)| ReviewBadgeSettings {
            token,
            username,
            display_mode,
            scope,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Serialized settings deserialize to the same value.
    #[test]
    fn settings_serialization_roundtrip(settings in arb_settings()) {
        let json = serde_json::to_string(&settings).unwrap();
        let back: ReviewBadgeSettings = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, settings);
    }

    /// Commands applied through the engine survive a reload from disk.
    #[test]
    fn settings_persist_through_engine(settings in arb_settings()) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json").to_string_lossy().to_string();

        let mut engine = SettingsEngine::new(Some(path.clone()));
        engine.set_token(&settings.token).unwrap();
        engine.set_username(&settings.username).unwrap();
        engine.set_display_mode(settings.display_mode).unwrap();
        engine.set_scope(settings.scope).unwrap();

        let reopened = SettingsEngine::open(Some(path)).unwrap();
        prop_assert_eq!(reopened.get_settings(), &settings);
    }

    /// Enum names parse back to the value they were printed from.
    #[test]
    fn enum_names_roundtrip(mode in arb_display_mode(), scope in arb_scope()) {
        prop_assert_eq!(mode.to_string().parse::<DisplayMode>().unwrap(), mode);
        prop_assert_eq!(scope.to_string().parse::<Scope>().unwrap(), scope);
    }
}
