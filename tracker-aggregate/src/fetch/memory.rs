use super::{AccessScope, RowFetcher};
use crate::error::FetchError;
use crate::mapper::EntityKind;
use crate::row::{Row, Value};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// One recorded call to [`MemoryRowFetcher::fetch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    pub kind: EntityKind,
    pub root_ids: Vec<String>,
}

#[derive(Default)]
struct Log {
    started: Vec<FetchCall>,
    completed: Vec<EntityKind>,
}

/// Serves prepared rows per kind
///
/// Rows are filtered to the requested roots by the kind's root column and
/// returned in insertion order. Every call is recorded.
#[derive(Default)]
pub struct MemoryRowFetcher {
    rows: HashMap<EntityKind, Vec<Row>>,
    violations: HashMap<EntityKind, String>,
    delays: HashMap<EntityKind, Duration>,
    log: Mutex<Log>,
}

impl MemoryRowFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rows served for `kind`
    pub fn with_rows(mut self, kind: EntityKind, rows: impl IntoIterator<Item = Row>) -> Self {
        self.rows.entry(kind).or_default().extend(rows);
        self
    }

    /// Make every fetch of `kind` fail with a scope violation
    pub fn with_scope_violation(mut self, kind: EntityKind, message: impl Into<String>) -> Self {
        self.violations.insert(kind, message.into());
        self
    }

    /// Delay every fetch of `kind` before it answers
    pub fn with_delay(mut self, kind: EntityKind, delay: Duration) -> Self {
        self.delays.insert(kind, delay);
        self
    }

    fn log(&self) -> std::sync::MutexGuard<'_, Log> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Calls in the order they started
    pub fn calls(&self) -> Vec<FetchCall> {
        self.log().started.clone()
    }

    pub fn call_count(&self, kind: EntityKind) -> usize {
        self.log().started.iter().filter(|c| c.kind == kind).count()
    }

    /// Fetches of `kind` that ran to completion
    pub fn completed_count(&self, kind: EntityKind) -> usize {
        self.log().completed.iter().filter(|k| **k == kind).count()
    }
}

#[async_trait]
impl RowFetcher for MemoryRowFetcher {
    async fn fetch(
        &self,
        kind: EntityKind,
        root_ids: &[String],
        _scope: &AccessScope,
    ) -> Result<Vec<Row>, FetchError> {
        self.log().started.push(FetchCall {
            kind,
            root_ids: root_ids.to_vec(),
        });

        if let Some(delay) = self.delays.get(&kind) {
            tokio::time::sleep(*delay).await;
        }

        if let Some(message) = self.violations.get(&kind) {
            return Err(FetchError::ScopeViolation(message.clone()));
        }

        let wanted: HashSet<&str> = root_ids.iter().map(String::as_str).collect();
        let column = kind.root_column();
        let rows: Vec<Row> = self
            .rows
            .get(&kind)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches!(row.get(column), Some(Value::Text(id)) if wanted.contains(id.as_str())))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        self.log().completed.push(kind);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_filters_by_root_and_records_calls() {
        let fetcher = MemoryRowFetcher::new().with_rows(
            EntityKind::Enrollment,
            vec![
                Row::from_pairs([("uid", "e1"), ("tei_uid", "A")]),
                Row::from_pairs([("uid", "e2"), ("tei_uid", "B")]),
                Row::from_pairs([("uid", "e3"), ("tei_uid", "A")]),
            ],
        );

        let rows = fetcher
            .fetch(EntityKind::Enrollment, &["A".to_string()], &AccessScope::default())
            .await
            .unwrap();
        let uids: Vec<_> = rows.iter().map(|r| r.get("uid").cloned()).collect();
        assert_eq!(uids, vec![Some(Value::from("e1")), Some(Value::from("e3"))]);

        let none = fetcher
            .fetch(EntityKind::Event, &["A".to_string()], &AccessScope::default())
            .await
            .unwrap();
        assert!(none.is_empty());

        assert_eq!(fetcher.call_count(EntityKind::Enrollment), 1);
        assert_eq!(fetcher.calls().len(), 2);
        assert_eq!(fetcher.completed_count(EntityKind::Event), 1);
    }

    #[tokio::test]
    async fn test_injected_scope_violation() {
        let fetcher = MemoryRowFetcher::new()
            .with_scope_violation(EntityKind::Relationship, "not in search scope");
        let err = fetcher
            .fetch(EntityKind::Relationship, &[], &AccessScope::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::ScopeViolation(m) if m == "not in search scope"));
        assert_eq!(fetcher.completed_count(EntityKind::Relationship), 0);
    }
}
