use super::load_config;
use super::settings::Settings;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

/// Runs `f` with a fresh temporary directory as the working directory.
fn in_temp_dir<F: FnOnce()>(f: F) {
    let tmp = TempDir::new().expect("create tempdir");
    let orig = env::current_dir().expect("current_dir");
    env::set_current_dir(tmp.path()).expect("set current dir");
    f();
    env::set_current_dir(orig).expect("restore cwd");
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 33335);
    assert_eq!(settings.client.name, "");
    assert!(settings.client.username.is_none());
    assert_eq!(settings.client.timeout_secs, 10);
    assert_eq!(settings.client.pickup_interval_ms, 1000);
    assert_eq!(settings.logging.level, "info");
}

#[test]
#[serial]
fn test_load_config_without_sources_uses_defaults() {
    in_temp_dir(|| {
        let cfg = load_config().expect("load_config failed");
        assert_eq!(cfg.server.port, 33335);
        assert_eq!(cfg.client.pickup_interval_ms, 1000);
    });
}

#[test]
#[serial]
fn test_load_config_from_file_overrides_defaults() {
    in_temp_dir(|| {
        fs::create_dir_all("config").expect("create config dir");
        let toml = r#"
            [server]
            host = "192.168.1.79"
            port = 33334

            [client]
            name = "GoDemo"
            username = "alice"
            password = "s3cret"
            pickup_interval_ms = 250
        "#;
        fs::write("config/default.toml", toml).expect("write config file");

        let cfg = load_config().expect("load_config failed");
        assert_eq!(cfg.server.host, "192.168.1.79");
        assert_eq!(cfg.server.port, 33334);
        assert_eq!(cfg.client.name, "GoDemo");
        assert_eq!(cfg.client.username.as_deref(), Some("alice"));
        assert_eq!(cfg.client.password.as_deref(), Some("s3cret"));
        assert_eq!(cfg.client.pickup_interval_ms, 250);
        assert_eq!(cfg.client.timeout_secs, 10);
        assert_eq!(cfg.logging.level, "info");
    });
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    in_temp_dir(|| {
        fs::create_dir_all("config").expect("create config dir");
        fs::write("config/default.toml", "[server]\nport = 1000\n").expect("write config file");

        temp_env::with_vars(
            [
                ("MOUSTIQUE__SERVER__PORT", Some("2000")),
                ("MOUSTIQUE__LOGGING__LEVEL", Some("debug")),
            ],
            || {
                let cfg = load_config().expect("load_config failed");
                assert_eq!(cfg.server.port, 2000);
                assert_eq!(cfg.logging.level, "debug");
            },
        );
    });
}

#[test]
#[serial]
fn test_zero_pickup_interval_is_rejected() {
    in_temp_dir(|| {
        temp_env::with_var("MOUSTIQUE__CLIENT__PICKUP_INTERVAL_MS", Some("0"), || {
            let err = load_config().expect_err("zero interval must not load");
            assert!(err.to_string().contains("pickup_interval_ms"));
        });

        fs::create_dir_all("config").expect("create config dir");
        fs::write("config/default.toml", "[client]\npickup_interval_ms = 0\n")
            .expect("write config file");
        assert!(load_config().is_err());
    });
}
