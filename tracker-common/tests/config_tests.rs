//! Tests for configuration file resolution and loading
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate TRACKER_TEST_CONFIG are marked with #[serial].

use serde::Deserialize;
use serial_test::serial;
use std::env;
use std::io::Write;
use tracker_common::config::{load_config, load_toml, resolve_config_source, ConfigSource};
use tracker_common::Error;

const ENV_VAR: &str = "TRACKER_TEST_CONFIG";
const APP: &str = "tracker-config-tests-nonexistent-app";

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
struct Sample {
    name: String,
    limit: u32,
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_cli_argument_wins_over_environment() {
    let cli = write_config("name = \"cli\"");
    let envf = write_config("name = \"env\"");
    env::set_var(ENV_VAR, envf.path());

    let source = resolve_config_source(Some(cli.path()), ENV_VAR, APP).unwrap();
    assert_eq!(source, ConfigSource::CommandLine(cli.path().to_path_buf()));

    env::remove_var(ENV_VAR);
}

#[test]
#[serial]
fn test_environment_used_without_cli_argument() {
    let envf = write_config("name = \"env\"\nlimit = 3");
    env::set_var(ENV_VAR, envf.path());

    let (config, source) = load_config::<Sample>(None, ENV_VAR, APP).unwrap();
    assert_eq!(source, ConfigSource::Environment(envf.path().to_path_buf()));
    assert_eq!(
        config,
        Sample {
            name: "env".to_string(),
            limit: 3
        }
    );

    env::remove_var(ENV_VAR);
}

#[test]
#[serial]
fn test_missing_explicit_path_is_an_error() {
    env::remove_var(ENV_VAR);
    let missing = std::path::Path::new("/definitely/not/here/config.toml");

    let result = resolve_config_source(Some(missing), ENV_VAR, APP);
    assert!(matches!(result, Err(Error::Config(_))));

    env::set_var(ENV_VAR, missing);
    let result = resolve_config_source(None, ENV_VAR, APP);
    assert!(matches!(result, Err(Error::Config(_))));
    env::remove_var(ENV_VAR);
}

#[test]
#[serial]
fn test_no_file_falls_back_to_defaults() {
    env::remove_var(ENV_VAR);

    let (config, source) = load_config::<Sample>(None, ENV_VAR, APP).unwrap();
    assert_eq!(source, ConfigSource::Defaults);
    assert!(source.path().is_none());
    assert_eq!(config, Sample::default());
}

#[test]
fn test_malformed_toml_reports_path() {
    let file = write_config("name = [unterminated");
    let err = load_toml::<Sample>(file.path()).unwrap_err();
    match err {
        Error::Config(msg) => assert!(msg.contains(&file.path().display().to_string())),
        other => panic!("expected config error, got {:?}", other),
    }
}
