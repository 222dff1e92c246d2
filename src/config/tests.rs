//! Tests for config functionality.

use crate::config::{Config, ENV_MAX_TASKS, ENV_TASKS_DIR};
use serial_test::serial;
use std::path::PathBuf;
use tempfile::TempDir;

struct EnvGuard(&'static [&'static str]);

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in self.0 {
            // SAFETY: tests touching the environment are #[serial].
            unsafe { std::env::remove_var(key) };
        }
    }
}

fn set_env(key: &str, value: &str) {
    // SAFETY: tests touching the environment are #[serial].
    unsafe { std::env::set_var(key, value) };
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.tasks_dir, PathBuf::from("tasks"));
    assert_eq!(config.max_tasks, 3);
    assert_eq!(config.catalog_path, PathBuf::from("meta.yml"));
    assert_eq!(config.roles_dir, PathBuf::from("roles"));
    assert_eq!(config.download_timeout_secs, 300);
    assert_eq!(config.default_playbook, PathBuf::from("playbooks/playbook.yml"));
    assert_eq!(config.playbook_command, "ansible-playbook");
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config.max_tasks, 3);
    assert_eq!(config.tasks_dir, PathBuf::from("tasks"));
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
max_tasks: 10
catalog_path: /etc/depot/meta.yml
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.max_tasks, 10);
    assert_eq!(config.catalog_path, PathBuf::from("/etc/depot/meta.yml"));
    assert_eq!(config.roles_dir, PathBuf::from("roles"));
}

#[test]
fn test_parse_yaml_with_unknown_fields() {
    let yaml = r#"
max_tasks: 5
future_feature: enabled
nested:
  key: value
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.max_tasks, 5);
}

#[test]
fn test_validate_zero_max_tasks() {
    let err = Config::from_yaml("max_tasks: 0").unwrap_err();
    assert!(err.to_string().contains("max_tasks"));
    assert!(err.to_string().contains("greater than 0"));
}

#[test]
fn test_validate_blank_playbook_command() {
    let err = Config::from_yaml("playbook_command: '  '").unwrap_err();
    assert!(err.to_string().contains("playbook_command"));
}

#[test]
fn test_validate_empty_path() {
    let err = Config::from_yaml("roles_dir: ''").unwrap_err();
    assert!(err.to_string().contains("roles_dir"));
}

#[test]
fn test_invalid_yaml_is_user_error() {
    let err = Config::from_yaml("max_tasks: [not, a, number]").unwrap_err();
    assert_eq!(err.exit_code(), crate::exit_codes::USER_ERROR);
}

#[test]
#[serial]
fn test_env_overrides_apply_over_file() {
    let _guard = EnvGuard(&[ENV_TASKS_DIR, ENV_MAX_TASKS]);
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("depot.yaml");
    std::fs::write(&path, "tasks_dir: from-file\nmax_tasks: 7\n").unwrap();

    set_env(ENV_TASKS_DIR, "/var/lib/depot/tasks");
    set_env(ENV_MAX_TASKS, "12");

    let config = Config::load(&path).unwrap();
    assert_eq!(config.tasks_dir, PathBuf::from("/var/lib/depot/tasks"));
    assert_eq!(config.max_tasks, 12);
}

#[test]
#[serial]
fn test_env_max_tasks_must_be_numeric() {
    let _guard = EnvGuard(&[ENV_MAX_TASKS]);
    set_env(ENV_MAX_TASKS, "lots");

    let temp = TempDir::new().unwrap();
    let err = Config::load_or_default(temp.path().join("missing.yaml")).unwrap_err();
    assert!(err.to_string().contains(ENV_MAX_TASKS));
}

#[test]
#[serial]
fn test_env_max_tasks_zero_is_rejected() {
    let _guard = EnvGuard(&[ENV_MAX_TASKS]);
    set_env(ENV_MAX_TASKS, "0");

    let temp = TempDir::new().unwrap();
    assert!(Config::load_or_default(temp.path().join("missing.yaml")).is_err());
}

#[test]
#[serial]
fn test_load_or_default_without_file() {
    let _guard = EnvGuard(&[ENV_TASKS_DIR, ENV_MAX_TASKS]);
    let temp = TempDir::new().unwrap();

    let config = Config::load_or_default(temp.path().join("absent.yaml")).unwrap();
    assert_eq!(config.max_tasks, 3);
}

#[test]
fn test_load_missing_explicit_file_fails() {
    let temp = TempDir::new().unwrap();
    let err = Config::load(temp.path().join("absent.yaml")).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}
