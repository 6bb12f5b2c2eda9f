//! Loading the engine config through the shared resolver
//!
//! Tests touching TRACKER_AGGREGATE_CONFIG are marked #[serial].

use serial_test::serial;
use std::env;
use std::io::Write;
use std::time::Duration;
use tracker_aggregate::config::{APP_NAME, CONFIG_ENV_VAR};
use tracker_aggregate::grouping::DedupScope;
use tracker_aggregate::{AggregateConfig, EntityKind};
use tracker_common::config::{load_config, ConfigSource};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_config_from_environment() {
    let file = write_config(
        r#"
        database_path = "/srv/tracker.db"
        fetch_timeout_ms = 250

        [inclusion]
        include_enrollments = true

        [dedup]
        enrollment = "identity"

        [queries.tracked_entity_instance]
        sql = "SELECT uid FROM trackedentityinstance WHERE uid IN (SELECT value FROM json_each(?))"

        [queries.enrollment]
        sql = "SELECT uid, tei_uid FROM programinstance WHERE tei_uid IN (SELECT value FROM json_each(?))"
        "#,
    );
    env::set_var(CONFIG_ENV_VAR, file.path());

    let (config, source) = load_config::<AggregateConfig>(None, CONFIG_ENV_VAR, APP_NAME).unwrap();
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(source, ConfigSource::Environment(file.path().to_path_buf()));
    assert_eq!(config.fetch_timeout(), Some(Duration::from_millis(250)));
    assert_eq!(config.dedup.scope(EntityKind::Enrollment), DedupScope::Identity);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_unknown_bind_is_rejected() {
    let file = write_config(
        r#"
        [queries.event]
        sql = "SELECT 1"
        binds = ["root_ids", "tenant"]
        "#,
    );

    let err = load_config::<AggregateConfig>(Some(file.path()), CONFIG_ENV_VAR, APP_NAME).unwrap_err();
    assert!(err.to_string().contains(&file.path().display().to_string()));
}
