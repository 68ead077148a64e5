// tests/site_config.rs
use serial_test::serial;
use std::path::PathBuf;
use tsml_meetings::config::site::{
    ENV_CONFIG_PATH, ENV_DATA_DIR, ENV_FEED_URL, ENV_OUTPUT_DIR, ENV_PROXY_URL,
};
use tsml_meetings::config::SiteConfig;

fn clear_env() {
    for k in [
        ENV_CONFIG_PATH,
        ENV_FEED_URL,
        ENV_PROXY_URL,
        ENV_OUTPUT_DIR,
        ENV_DATA_DIR,
    ] {
        std::env::remove_var(k);
    }
}

#[test]
#[serial]
fn env_path_wins_over_fallbacks() {
    clear_env();
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("site.toml");
    std::fs::write(
        &path,
        "site_title = \"Eastside\"\ntimezone = \"America/New_York\"\nstrict = true\n",
    )
    .unwrap();
    std::env::set_var(ENV_CONFIG_PATH, &path);

    let cfg = SiteConfig::load_default().unwrap();
    assert_eq!(cfg.site_title, "Eastside");
    assert!(cfg.strict);
    assert_eq!(cfg.tz().unwrap(), chrono_tz::America::New_York);
    clear_env();
}

#[test]
#[serial]
fn missing_env_path_is_an_error() {
    clear_env();
    std::env::set_var(ENV_CONFIG_PATH, "/definitely/not/here.toml");
    assert!(SiteConfig::load_default().is_err());
    clear_env();
}

#[test]
#[serial]
fn env_overrides_apply_after_file() {
    clear_env();
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("site.json");
    std::fs::write(&path, r#"{"output_dir": "from-file", "proxy_url": "https://p.test/"}"#)
        .unwrap();

    std::env::set_var(ENV_DATA_DIR, "env-data");
    std::env::set_var(ENV_PROXY_URL, "");
    let cfg = SiteConfig::load_from(&path).unwrap().with_env_overrides();
    assert_eq!(cfg.output_dir, PathBuf::from("from-file"));
    assert_eq!(cfg.data_dir, PathBuf::from("env-data"));
    assert_eq!(cfg.proxy_url, None);
    clear_env();
}

#[test]
fn malformed_file_names_the_path() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("broken.toml");
    std::fs::write(&path, "timeout_secs = \"soon\"").unwrap();
    let msg = format!("{:#}", SiteConfig::load_from(&path).unwrap_err());
    assert!(msg.contains("broken.toml"), "{msg}");
}
