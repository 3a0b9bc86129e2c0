use armpup::cli::ReportFormat;
use armpup::config::{Config, ConfigError};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config.page_size, 100);
    assert_eq!(config.format, ReportFormat::Html);
    assert!(!config.recursive);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
page_size = 50
recursive = true
format = "json"
cache_dir = "/var/cache/armpup"
"#,
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    assert_eq!(config.page_size, 50);
    assert!(config.recursive);
    assert_eq!(config.format, ReportFormat::Json);
    assert_eq!(
        config.cache_dir.as_deref(),
        Some(std::path::Path::new("/var/cache/armpup"))
    );
    assert_eq!(config.request_timeout_secs, 30);
}

#[test]
fn test_env_overrides_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "request_timeout_secs = 10\n").unwrap();

    std::env::set_var("ARMPUP_REQUEST_TIMEOUT_SECS", "45");
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed("ARMPUP_").only(&["request_timeout_secs"]))
        .extract()
        .unwrap();
    std::env::remove_var("ARMPUP_REQUEST_TIMEOUT_SECS");

    assert_eq!(config.request_timeout_secs, 45);
}

#[test]
fn test_load_from_path_validates() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "page_size = 500\n").unwrap();

    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "page_size", .. }));
}

#[test]
fn test_explicit_missing_file_is_error() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("nope.toml");
    assert!(Config::load(Some(&missing)).is_err());
}

#[test]
fn test_malformed_toml_is_load_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "page_size = \"many\"\n").unwrap();

    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::Load(_)));
}
