//! Fan-out of the per-kind fetch pipelines
//!
//! Each enabled kind gets exactly one batched fetch for all roots, followed
//! by one mapping and grouping pass. Pipelines run concurrently; the first
//! failure drops the others mid-flight.

use crate::config::DedupSettings;
use crate::error::{AssemblyError, AssemblyResult, FetchError};
use crate::fetch::{AccessScope, RowFetcher};
use crate::grouping::{group, GroupMap, GroupRecord, Grouped};
use crate::mapper::{EntityKind, MapContext, RowMapper, ENROLLMENT, EVENT, PROGRAM_OWNER, RELATIONSHIP};
use crate::model::{Enrollment, Event, ProgramOwner, Relationship};
use crate::params::InclusionConfig;
use crate::row::Row;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Rows decoded per kind for one request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowCounts {
    pub roots: usize,
    pub enrollments: usize,
    pub events: usize,
    pub relationships: usize,
    pub program_owners: usize,
    /// Child rows dropped as duplicates
    pub suppressed: usize,
}

impl RowCounts {
    pub fn total(&self) -> usize {
        self.roots + self.enrollments + self.events + self.relationships + self.program_owners
    }
}

/// Group maps per kind; `None` when the kind was not fetched
#[derive(Debug, Default)]
pub struct GroupMaps {
    pub enrollments: Option<GroupMap<Enrollment>>,
    pub events: Option<GroupMap<Event>>,
    pub relationships: Option<GroupMap<Relationship>>,
    pub program_owners: Option<GroupMap<ProgramOwner>>,
    pub rows: RowCounts,
}

fn split<T>(grouped: Option<Grouped<T>>, rows: &mut usize, suppressed: &mut usize) -> Option<GroupMap<T>> {
    grouped.map(|g| {
        *rows = g.rows;
        *suppressed += g.suppressed;
        g.groups
    })
}

pub struct Orchestrator<'a> {
    fetcher: &'a dyn RowFetcher,
    ctx: MapContext<'a>,
    dedup: DedupSettings,
    fetch_timeout: Option<Duration>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(fetcher: &'a dyn RowFetcher, ctx: MapContext<'a>) -> Self {
        Self {
            fetcher,
            ctx,
            dedup: DedupSettings::default(),
            fetch_timeout: None,
        }
    }

    pub fn with_dedup(mut self, dedup: DedupSettings) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn with_fetch_timeout(mut self, limit: Option<Duration>) -> Self {
        self.fetch_timeout = limit;
        self
    }

    /// Root rows for `root_ids`, unmapped
    pub async fn fetch_roots(&self, root_ids: &[String], scope: &AccessScope) -> AssemblyResult<Vec<Row>> {
        self.fetch(EntityKind::TrackedEntityInstance, root_ids, scope).await
    }

    /// Fetch, map and group every enabled sub-resource
    pub async fn orchestrate(
        &self,
        root_ids: &[String],
        inclusion: &InclusionConfig,
        scope: &AccessScope,
    ) -> AssemblyResult<GroupMaps> {
        if inclusion.include_events && !inclusion.include_enrollments {
            debug!("Events requested without enrollments; skipping event fetch");
        }

        let (enrollments, events, relationships, program_owners) = tokio::try_join!(
            self.pipeline(&ENROLLMENT, inclusion.include_enrollments, root_ids, scope),
            self.pipeline(&EVENT, inclusion.events_enabled(), root_ids, scope),
            self.pipeline(&RELATIONSHIP, inclusion.include_relationships, root_ids, scope),
            self.pipeline(&PROGRAM_OWNER, inclusion.include_program_owners, root_ids, scope),
        )?;

        let mut rows = RowCounts::default();
        let mut suppressed = 0;
        let maps = GroupMaps {
            enrollments: split(enrollments, &mut rows.enrollments, &mut suppressed),
            events: split(events, &mut rows.events, &mut suppressed),
            relationships: split(relationships, &mut rows.relationships, &mut suppressed),
            program_owners: split(program_owners, &mut rows.program_owners, &mut suppressed),
            rows: RowCounts { suppressed, ..rows },
        };
        Ok(maps)
    }

    async fn pipeline<T: GroupRecord>(
        &self,
        mapper: &RowMapper<T>,
        enabled: bool,
        root_ids: &[String],
        scope: &AccessScope,
    ) -> AssemblyResult<Option<Grouped<T>>> {
        if !enabled {
            return Ok(None);
        }

        let rows = self.fetch(mapper.kind, root_ids, scope).await?;
        let grouped = group(&rows, mapper, &self.ctx, self.dedup.scope(mapper.kind))?;
        debug!(
            kind = %mapper.kind,
            rows = grouped.rows,
            groups = grouped.groups.len(),
            suppressed = grouped.suppressed,
            "Grouped rows"
        );
        Ok(Some(grouped))
    }

    async fn fetch(&self, kind: EntityKind, root_ids: &[String], scope: &AccessScope) -> AssemblyResult<Vec<Row>> {
        let fetch = self.fetcher.fetch(kind, root_ids, scope);
        let result = match self.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, fetch)
                .await
                .unwrap_or_else(|_| Err(FetchError::Timeout(limit))),
            None => fetch.await,
        };
        result.map_err(|source| AssemblyError::Fetch { kind, source })
    }
}
