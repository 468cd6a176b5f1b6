use merge_to_master::config::{load_config, resolve_config_path, user_config_path};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_explicit_path_wins_over_default_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".m2m"), r#"{"before": ["default"]}"#).unwrap();
    fs::write(dir.path().join("ci.json"), r#"{"before": ["ci"]}"#).unwrap();

    let config = load_config(Some(Path::new("ci.json")), dir.path()).unwrap();
    assert_eq!(config.before, vec!["ci"]);
}

#[test]
fn test_malformed_file_names_its_path() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".m2m"), "{ before: }").unwrap();

    let err = load_config(None, dir.path()).unwrap_err();
    assert!(err.to_string().contains(".m2m"));
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_user_config_fallback() {
    let workdir = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    let user_dir = home.path().join("m2m");
    fs::create_dir_all(&user_dir).unwrap();
    fs::write(user_dir.join("config.json"), r#"{"before": ["from home"]}"#).unwrap();

    let previous = env::var_os("XDG_CONFIG_HOME");
    env::set_var("XDG_CONFIG_HOME", home.path());

    let resolved = resolve_config_path(None, workdir.path());
    let expected = user_config_path();
    let config = load_config(None, workdir.path());

    match previous {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }

    assert_eq!(resolved.unwrap(), user_dir.join("config.json"));
    assert_eq!(expected, Some(user_dir.join("config.json")));
    assert_eq!(config.unwrap().before, vec!["from home"]);
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_no_config_anywhere() {
    let workdir = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();

    let previous = env::var_os("XDG_CONFIG_HOME");
    env::set_var("XDG_CONFIG_HOME", home.path());
    let result = load_config(None, workdir.path());
    match previous {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }

    let err = result.unwrap_err();
    assert!(err.to_string().contains("no '.m2m' file found"));
}
