use super::{AccessScope, RowFetcher};
use crate::error::FetchError;
use crate::mapper::EntityKind;
use crate::row::{Row, Value};
use async_trait::async_trait;
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row as _, SqlitePool, TypeInfo, ValueRef};
use std::sync::Arc;
use tracing::debug;

/// Parameter bound to a query placeholder, in declaration order
///
/// List values are bound as a JSON array text; queries unpack them with
/// `json_each(?)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bind {
    RootIds,
    OrgUnits,
    Programs,
    User,
    SuperUser,
}

/// Query text for one kind plus its bind list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuerySpec {
    pub sql: String,
    #[serde(default = "default_binds")]
    pub binds: Vec<Bind>,
}

fn default_binds() -> Vec<Bind> {
    vec![Bind::RootIds]
}

impl QuerySpec {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            binds: default_binds(),
        }
    }

    pub fn with_binds(mut self, binds: Vec<Bind>) -> Self {
        self.binds = binds;
        self
    }
}

/// Configured query per entity kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuerySet {
    pub tracked_entity_instance: Option<QuerySpec>,
    pub enrollment: Option<QuerySpec>,
    pub event: Option<QuerySpec>,
    pub relationship: Option<QuerySpec>,
    pub program_owner: Option<QuerySpec>,
}

impl QuerySet {
    pub fn get(&self, kind: EntityKind) -> Option<&QuerySpec> {
        match kind {
            EntityKind::TrackedEntityInstance => self.tracked_entity_instance.as_ref(),
            EntityKind::Enrollment => self.enrollment.as_ref(),
            EntityKind::Event => self.event.as_ref(),
            EntityKind::Relationship => self.relationship.as_ref(),
            EntityKind::ProgramOwner => self.program_owner.as_ref(),
        }
    }

    pub fn set(&mut self, kind: EntityKind, spec: QuerySpec) {
        let slot = match kind {
            EntityKind::TrackedEntityInstance => &mut self.tracked_entity_instance,
            EntityKind::Enrollment => &mut self.enrollment,
            EntityKind::Event => &mut self.event,
            EntityKind::Relationship => &mut self.relationship,
            EntityKind::ProgramOwner => &mut self.program_owner,
        };
        *slot = Some(spec);
    }

    pub fn with(mut self, kind: EntityKind, spec: QuerySpec) -> Self {
        self.set(kind, spec);
        self
    }
}

/// Runs configured SQL against a SQLite pool
pub struct SqlRowFetcher {
    pool: SqlitePool,
    queries: QuerySet,
}

impl SqlRowFetcher {
    pub fn new(pool: SqlitePool, queries: QuerySet) -> Self {
        Self { pool, queries }
    }
}

fn json_array(values: &[String]) -> Result<String, FetchError> {
    serde_json::to_string(values).map_err(|e| FetchError::Other(format!("encode bind list: {}", e)))
}

#[async_trait]
impl RowFetcher for SqlRowFetcher {
    async fn fetch(
        &self,
        kind: EntityKind,
        root_ids: &[String],
        scope: &AccessScope,
    ) -> Result<Vec<Row>, FetchError> {
        let spec = self.queries.get(kind).ok_or(FetchError::MissingQuery(kind))?;

        let mut query = sqlx::query(&spec.sql);
        for bind in &spec.binds {
            query = match bind {
                Bind::RootIds => query.bind(json_array(root_ids)?),
                Bind::OrgUnits => query.bind(json_array(&scope.org_units)?),
                Bind::Programs => query.bind(json_array(&scope.programs)?),
                Bind::User => query.bind(scope.user.clone()),
                Bind::SuperUser => query.bind(scope.super_user),
            };
        }

        let rows = query.fetch_all(&self.pool).await?;
        debug!(%kind, roots = root_ids.len(), rows = rows.len(), "Fetched rows");

        let Some(first) = rows.first() else {
            return Ok(Vec::new());
        };
        let header: Arc<[String]> = first
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect::<Vec<_>>()
            .into();

        rows.iter()
            .map(|row| -> Result<Row, FetchError> { Ok(Row::new(header.clone(), read_values(row)?)) })
            .collect()
    }
}

/// Convert each column by its runtime storage class
fn read_values(row: &SqliteRow) -> Result<Vec<Value>, sqlx::Error> {
    (0..row.len())
        .map(|i| -> Result<Value, sqlx::Error> {
            let raw = row.try_get_raw(i)?;
            if raw.is_null() {
                return Ok(Value::Null);
            }
            let storage = raw.type_info().name().to_string();
            Ok(match storage.as_str() {
                "INTEGER" | "BOOLEAN" => Value::Integer(row.try_get_unchecked::<i64, _>(i)?),
                "REAL" | "NUMERIC" => Value::Real(row.try_get_unchecked::<f64, _>(i)?),
                "BLOB" => Value::Blob(row.try_get_unchecked::<Vec<u8>, _>(i)?),
                _ => Value::Text(row.try_get_unchecked::<String, _>(i)?),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_set_lookup() {
        let queries = QuerySet::default().with(EntityKind::Event, QuerySpec::new("SELECT 1"));
        assert!(queries.get(EntityKind::Event).is_some());
        assert!(queries.get(EntityKind::Enrollment).is_none());
        assert_eq!(queries.get(EntityKind::Event).unwrap().binds, vec![Bind::RootIds]);
    }

    #[test]
    fn test_query_spec_from_toml() {
        let queries: QuerySet = toml::from_str(
            r#"
            [enrollment]
            sql = "SELECT * FROM enrollment WHERE tei_uid IN (SELECT value FROM json_each(?))"

            [event]
            sql = "SELECT 1"
            binds = ["root_ids", "org_units", "super_user"]
            "#,
        )
        .unwrap();
        assert_eq!(queries.enrollment.unwrap().binds, vec![Bind::RootIds]);
        assert_eq!(
            queries.event.unwrap().binds,
            vec![Bind::RootIds, Bind::OrgUnits, Bind::SuperUser]
        );
    }
}
