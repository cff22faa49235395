/// Integration tests for the configuration system
///
/// These tests verify that the resolver configuration works correctly
/// when loading from files and environment variables.

use std::env;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use zolv_solver::config::{ConfigLoader, ConfigSource, ResolverConfig};
use zolv_solver::{Arch, Resolver};

#[test]
fn test_config_defaults() {
    let config = ResolverConfig::default();

    assert_eq!(config.timeout_seconds, 0);
    assert!(!config.force_resolve);
    assert!(!config.upgrade_mode);
    assert_eq!(config.architecture, std::env::consts::ARCH);
    assert!(config.ignored_architectures.is_empty());
}

#[test]
fn test_config_loader_env_disabled() {
    let loader = ConfigLoader::new(false);

    // Should return None when environment is disabled
    assert_eq!(loader.get_zolv_env("ZOLV_ARCH"), None);
    assert_eq!(loader.get_env_config("solver-timeout"), None);
}

#[test]
fn test_load_empty_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("solver.json");
    fs::write(&config_file, "{}").unwrap();

    let config = ResolverConfig::build(Some(&config_file), false).unwrap();

    assert_eq!(config.timeout_seconds, 0);
    assert_eq!(config.get_source("timeout-seconds"), Some(&ConfigSource::Default));
}

#[test]
fn test_load_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("solver.json");
    fs::write(
        &config_file,
        r#"{
            "timeout-seconds": 45,
            "force-resolve": true,
            "architecture": "i686",
            "ignored-architectures": ["s390x"]
        }"#,
    )
    .unwrap();

    let config = ResolverConfig::build(Some(&config_file), false).unwrap();

    assert_eq!(config.timeout_seconds, 45);
    assert!(config.force_resolve);
    assert!(!config.upgrade_mode);
    assert_eq!(config.architecture, "i686");
    assert_eq!(config.ignored_architectures, vec!["s390x"]);
    assert_eq!(config.get_source("timeout-seconds"), Some(&ConfigSource::File));
    assert_eq!(config.get_source("upgrade-mode"), Some(&ConfigSource::Default));
}

#[test]
fn test_missing_config_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("does-not-exist.json");

    let config = ResolverConfig::build(Some(&config_file), false).unwrap();

    let defaults = ResolverConfig::default();
    assert_eq!(config.timeout_seconds, defaults.timeout_seconds);
    assert_eq!(config.architecture, defaults.architecture);
    assert_eq!(config.get_source("architecture"), Some(&ConfigSource::Default));
}

#[test]
fn test_invalid_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("solver.json");
    fs::write(&config_file, "{ invalid json }").unwrap();

    let result = ResolverConfig::build(Some(&config_file), false);

    assert!(result.is_err());
}

#[test]
fn test_env_overrides_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("solver.json");
    fs::write(&config_file, r#"{"timeout-seconds": 10, "architecture": "i586"}"#).unwrap();

    // Only this test touches the ZOLV_* variables
    env::set_var("ZOLV_SOLVER_TIMEOUT", "90");
    env::set_var("ZOLV_UPGRADE_MODE", "yes");
    env::set_var("ZOLV_FORCE_RESOLVE", "off");

    let config = ResolverConfig::build(Some(&config_file), true).unwrap();

    env::remove_var("ZOLV_SOLVER_TIMEOUT");
    env::remove_var("ZOLV_UPGRADE_MODE");
    env::remove_var("ZOLV_FORCE_RESOLVE");

    assert_eq!(config.timeout_seconds, 90);
    assert!(config.upgrade_mode);
    assert!(!config.force_resolve);
    assert_eq!(config.architecture, "i586");
    assert_eq!(
        config.get_source("timeout-seconds"),
        Some(&ConfigSource::Environment("ZOLV_SOLVER_TIMEOUT".to_string()))
    );
    assert_eq!(config.get_source("architecture"), Some(&ConfigSource::File));
}

#[test]
fn test_resolver_with_config() {
    let config = ResolverConfig::from_json(
        r#"{"timeout-seconds": 5, "upgrade-mode": true, "architecture": "ppc64", "ignored-architectures": ["x86_64"]}"#,
    )
    .unwrap();

    let resolver = Resolver::with_config(&config);

    assert_eq!(resolver.timeout(), Duration::from_secs(5));
    assert!(resolver.upgrade_mode());
    assert!(!resolver.force_resolve());
    assert_eq!(resolver.architecture(), &Arch::new("ppc64"));
    assert!(resolver.ignore_rules().architectures.contains(&Arch::new("x86_64")));
}
