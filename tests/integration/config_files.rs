//! Config file handling and state directory resolution.

use session_bridge::SyncConfig;
use session_bridge::config::{JsonSettings, keys};

#[test]
fn partial_toml_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
enabled = true
url = "https://sessionize.com/api/v2/abc/view/GridSmart"
room_name = "Main"

[feed]
timeout_seconds = 3
"#,
    )
    .unwrap();

    let config = SyncConfig::from_file(&path).unwrap();

    assert!(config.enabled);
    assert_eq!(config.room_name, "Main");
    assert_eq!(config.fetch_interval_minutes, 5);
    assert_eq!(config.timezone, "UTC");
    assert_eq!(config.feed.timeout_seconds, 3);
    assert!(config.override_datetime.is_none());
    config.validate().unwrap();
}

#[test]
fn save_then_load_preserves_everything() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let config = SyncConfig {
        enabled: true,
        url: "https://example.com/grid".into(),
        current_title_target: "Now".into(),
        next_title_target: "Next".into(),
        override_datetime: Some("2024-05-10T09:30:00".into()),
        timezone: "Europe/Berlin".into(),
        room_name: "Saal 1".into(),
        fetch_interval_minutes: 15,
        ..SyncConfig::default()
    };

    config.save_to_file(&path).unwrap();
    let loaded = SyncConfig::from_file(&path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn malformed_toml_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "enabled = maybe").unwrap();

    let err = SyncConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, session_bridge::BridgeError::Config(_)));
}

#[test]
fn host_settings_override_file_values_but_not_feed() {
    let from_file = SyncConfig {
        feed: schedule_feed::FeedConfig {
            timeout_seconds: 2,
            user_agent: Some("booth-7".into()),
        },
        ..SyncConfig::default()
    };
    let settings = JsonSettings::from_value(serde_json::json!({
        (keys::ENABLED): true,
        (keys::FETCH_INTERVAL_MINUTES): 500,
    }))
    .unwrap();

    let mut rebuilt = SyncConfig::from_settings(&settings);
    rebuilt.feed = from_file.feed.clone();

    assert!(rebuilt.enabled);
    assert_eq!(rebuilt.fetch_interval_minutes, 60);
    assert_eq!(rebuilt.feed.user_agent.as_deref(), Some("booth-7"));
}
