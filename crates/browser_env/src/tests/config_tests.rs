use std::fs;

use super::*;

#[test]
fn loads_task_file_and_splits_start_urls() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("51.json");
    fs::write(
        &path,
        r#"{
            "task_id": 51,
            "sites": ["shopping", "map"],
            "start_url": "http://shop.test |AND| http://map.test/",
            "storage_state": "./.auth/shopping_state.json",
            "intent": "Find the cheapest fax machine",
            "require_login": true
        }"#,
    )
    .expect("write config");

    let config = TaskConfig::load(&path).expect("load");

    assert_eq!(
        config.start_urls(),
        vec!["http://shop.test".to_string(), "http://map.test/".to_string()]
    );
    assert_eq!(config.intent.as_deref(), Some("Find the cheapest fax machine"));
    assert_eq!(
        config.storage_state_path(),
        Some(dir.path().join("./.auth/shopping_state.json"))
    );
}

#[test]
fn missing_start_url_yields_no_pages() {
    assert!(TaskConfig::default().start_urls().is_empty());
}

#[test]
fn malformed_task_file_is_a_config_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").expect("write config");

    assert!(matches!(TaskConfig::load(&path), Err(EnvError::Config(_))));
    assert!(matches!(
        TaskConfig::load(dir.path().join("absent.json")),
        Err(EnvError::Io { .. })
    ));
}

#[test]
fn reads_exported_session_cookies() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    fs::write(
        &path,
        r#"{
            "cookies": [
                {
                    "name": "session",
                    "value": "abc",
                    "domain": "shop.test",
                    "path": "/",
                    "expires": -1,
                    "httpOnly": true,
                    "secure": false,
                    "sameSite": "Lax"
                }
            ],
            "origins": []
        }"#,
    )
    .expect("write state");

    let state = StorageState::load(&path).expect("load");

    assert_eq!(state.cookies.len(), 1);
    let cookie = &state.cookies[0];
    assert_eq!(cookie.name, "session");
    assert_eq!(cookie.http_only, Some(true));
    assert_eq!(cookie.same_site.as_deref(), Some("Lax"));
}

#[test]
fn default_options_match_desktop_session() {
    let options = EnvOptions::default();
    assert_eq!(options.viewport, ViewportSize { width: 1280, height: 720 });
    assert_eq!(options.slow_mo, Duration::from_millis(100));
    assert!(options.current_viewport_only);
    assert!(!options.headless);
}
