//! Assembly over a real SQLite file through SqlRowFetcher

use sqlx::sqlite::SqlitePoolOptions;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tracker_aggregate::error::FetchError;
use tracker_aggregate::fetch::{Bind, QuerySet, QuerySpec, RowFetcher};
use tracker_aggregate::row::Value;
use tracker_aggregate::{
    AccessScope, AggregateService, AssemblyError, EntityKind, InclusionConfig, SqlRowFetcher,
};
use tracker_common::db::connect_readonly;

const SCHEMA: &str = r#"
CREATE TABLE trackedentityinstance (
    uid TEXT PRIMARY KEY,
    type_uid TEXT,
    feature_type TEXT,
    ou_uid TEXT,
    created TEXT,
    lastupdated TEXT,
    inactive INTEGER NOT NULL DEFAULT 0,
    deleted INTEGER NOT NULL DEFAULT 0,
    geometry BLOB
);
CREATE TABLE programinstance (
    uid TEXT PRIMARY KEY,
    tei_uid TEXT NOT NULL,
    program_uid TEXT,
    ou_uid TEXT,
    status TEXT,
    enrollmentdate TEXT,
    followup INTEGER
);
CREATE TABLE programstageinstance (
    uid TEXT PRIMARY KEY,
    enrollment_uid TEXT NOT NULL,
    tei_uid TEXT NOT NULL,
    status TEXT,
    executiondate TEXT
);
"#;

fn point_wkb(x: f64, y: f64) -> Vec<u8> {
    let mut out = vec![1u8];
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&x.to_le_bytes());
    out.extend_from_slice(&y.to_le_bytes());
    out
}

/// Create and fill a database file, then close the writer
async fn seed(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("tracker.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .unwrap();

    sqlx::raw_sql(SCHEMA).execute(&pool).await.unwrap();

    for (uid, ou) in [("teiA", "ouA"), ("teiB", "ouB")] {
        sqlx::query(
            "INSERT INTO trackedentityinstance (uid, type_uid, feature_type, ou_uid, created, geometry)
             VALUES (?, 'person', 'POINT', ?, '2021-06-01 08:00:00', ?)",
        )
        .bind(uid)
        .bind(ou)
        .bind(point_wkb(30.5, -2.25))
        .execute(&pool)
        .await
        .unwrap();
    }

    sqlx::raw_sql(
        "INSERT INTO programinstance VALUES
            ('enrA', 'teiA', 'prg1', 'ouA', 'ACTIVE', '2021-06-02 00:00:00', 1),
            ('enrB', 'teiB', 'prg1', 'ouB', 'COMPLETED', '2021-06-02 00:00:00', NULL);
         INSERT INTO programstageinstance VALUES
            ('ev2', 'enrA', 'teiA', 'COMPLETED', '2021-06-04 00:00:00'),
            ('ev1', 'enrA', 'teiA', 'ACTIVE', '2021-06-03 00:00:00'),
            ('ev3', 'enrB', 'teiB', 'SKIPPED', NULL);",
    )
    .execute(&pool)
    .await
    .unwrap();

    pool.close().await;
    path
}

fn queries() -> QuerySet {
    QuerySet::default()
        .with(
            EntityKind::TrackedEntityInstance,
            QuerySpec::new(
                "SELECT uid, type_uid, feature_type AS type_feature_type, ou_uid, created,
                        lastupdated, inactive, deleted, geometry
                 FROM trackedentityinstance
                 WHERE uid IN (SELECT value FROM json_each(?))
                 ORDER BY uid",
            ),
        )
        .with(
            EntityKind::Enrollment,
            QuerySpec::new(
                "SELECT uid, tei_uid, program_uid, ou_uid, status, enrollmentdate, followup
                 FROM programinstance
                 WHERE tei_uid IN (SELECT value FROM json_each(?))
                   AND (? OR ou_uid IN (SELECT value FROM json_each(?)))
                 ORDER BY tei_uid, uid",
            )
            .with_binds(vec![Bind::RootIds, Bind::SuperUser, Bind::OrgUnits]),
        )
        .with(
            EntityKind::Event,
            QuerySpec::new(
                "SELECT uid, enrollment_uid, tei_uid, status, executiondate
                 FROM programstageinstance
                 WHERE tei_uid IN (SELECT value FROM json_each(?))
                 ORDER BY enrollment_uid, executiondate",
            ),
        )
}

async fn service(path: &Path) -> (AggregateService, Arc<SqlRowFetcher>) {
    let pool = connect_readonly(path, 2).await.unwrap();
    let fetcher = Arc::new(SqlRowFetcher::new(pool, queries()));
    (AggregateService::new(fetcher.clone()), fetcher)
}

fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_rows_convert_by_storage_class() {
    let dir = TempDir::new().unwrap();
    let path = seed(&dir).await;
    let (_, fetcher) = service(&path).await;

    let rows = fetcher
        .fetch(EntityKind::TrackedEntityInstance, &ids(&["teiA"]), &AccessScope::super_user())
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.get("uid"), Some(&Value::from("teiA")));
    assert_eq!(row.get("deleted"), Some(&Value::Integer(0)));
    assert_eq!(row.get("lastupdated"), Some(&Value::Null));
    assert!(matches!(row.get("geometry"), Some(Value::Blob(b)) if b.len() == 21));
}

#[tokio::test]
async fn test_full_assembly_from_sqlite() {
    let dir = TempDir::new().unwrap();
    let path = seed(&dir).await;
    let (service, _) = service(&path).await;
    let inclusion = InclusionConfig::default().with_enrollments(true).with_events(true);

    let aggregates = service
        .get_aggregates(&ids(&["teiB", "teiA", "missing"]), &inclusion, &AccessScope::super_user())
        .await
        .unwrap();

    let uids: Vec<_> = aggregates.iter().map(|t| t.tracked_entity_instance.as_str()).collect();
    assert_eq!(uids, vec!["teiA", "teiB"]);

    let a = &aggregates[0];
    assert_eq!(a.created.as_deref(), Some("2021-06-01T08:00:00.000"));
    assert_eq!(a.coordinates.map(|c| (c.x, c.y)), Some((30.5, -2.25)));
    assert!(!a.deleted);

    let enrollment = a.enrollments.iter().next().unwrap();
    assert_eq!(enrollment.followup, Some(true));
    let events: Vec<_> = enrollment
        .events
        .iter()
        .map(|e| (e.event.as_str(), e.followup, e.event_date.as_deref()))
        .collect();
    assert_eq!(
        events,
        vec![
            ("ev1", Some(true), Some("2021-06-03T00:00:00.000")),
            ("ev2", Some(true), Some("2021-06-04T00:00:00.000")),
        ]
    );

    let b_enrollment = aggregates[1].enrollments.iter().next().unwrap();
    assert_eq!(b_enrollment.followup, None);
    assert_eq!(b_enrollment.events.len(), 1);
}

#[tokio::test]
async fn test_scope_binds_filter_rows() {
    let dir = TempDir::new().unwrap();
    let path = seed(&dir).await;
    let (service, _) = service(&path).await;
    let inclusion = InclusionConfig::default().with_enrollments(true);
    let scope = AccessScope::for_user("nurse").with_org_units(ids(&["ouB"]));

    let aggregates = service
        .get_aggregates(&ids(&["teiA", "teiB"]), &inclusion, &scope)
        .await
        .unwrap();

    assert!(aggregates[0].enrollments.is_fetched());
    assert!(aggregates[0].enrollments.is_empty());
    assert_eq!(aggregates[1].enrollments.len(), 1);
}

#[tokio::test]
async fn test_unconfigured_kind_is_a_fetch_error() {
    let dir = TempDir::new().unwrap();
    let path = seed(&dir).await;
    let (service, _) = service(&path).await;
    let inclusion = InclusionConfig::default().with_relationships(true);

    let err = service
        .get_aggregates(&ids(&["teiA"]), &inclusion, &AccessScope::super_user())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AssemblyError::Fetch {
            kind: EntityKind::Relationship,
            source: FetchError::MissingQuery(EntityKind::Relationship)
        }
    ));
    assert_eq!(err.status_code(), 500);
}
