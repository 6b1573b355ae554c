//! Environment layer of Settings loading.
//!
//! Kept in its own test binary: it sets `PYRAMID_*` variables, which the
//! file-based tests in `config_test.rs` must not see.

use std::env;
use std::fs;

use tempfile::TempDir;

use pyramid::config::Settings;

#[test]
fn given_pyramid_env_vars_when_load_then_they_override_defaults_and_files() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("pyramid.toml");
    fs::write(
        &path,
        "[api]\nbase_url = \"https://from-file.example/api\"\n\n[levels]\nmax_level = 6\n",
    )
    .unwrap();
    let state = temp.path().join("state");

    env::set_var("PYRAMID_API__BASE_URL", "https://from-env.example/api");
    env::set_var("PYRAMID_LEVELS__MAX_LEVEL", "4");
    env::set_var("PYRAMID_BASE_DIR", state.display().to_string());

    let from_defaults = Settings::load(None);
    let from_file = Settings::load(Some(&path));

    env::remove_var("PYRAMID_API__BASE_URL");
    env::remove_var("PYRAMID_LEVELS__MAX_LEVEL");
    env::remove_var("PYRAMID_BASE_DIR");

    let from_defaults = from_defaults.expect("load settings");
    assert_eq!(from_defaults.api.base_url, "https://from-env.example/api");
    assert_eq!(from_defaults.levels.max_level, 4);
    assert_eq!(from_defaults.session_path(), state.join("session.toml"));

    let from_file = from_file.expect("load settings");
    assert_eq!(from_file.api.base_url, "https://from-env.example/api");
    assert_eq!(from_file.levels.max_level, 4);
}
