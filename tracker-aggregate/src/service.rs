//! Public entry point: root UIDs in, assembled aggregates out

use crate::assembler::assemble;
use crate::config::{AggregateConfig, DedupSettings};
use crate::error::AssemblyResult;
use crate::fetch::{AccessScope, RowFetcher};
use crate::geometry::{GeometryDecoder, WkbDecoder};
use crate::mapper::MapContext;
use crate::model::TrackedEntityInstance;
use crate::orchestrator::{Orchestrator, RowCounts};
use crate::params::InclusionConfig;
use indexmap::IndexSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Aggregates plus what it took to build them
#[derive(Debug, Default)]
pub struct Assembly {
    pub aggregates: Vec<TrackedEntityInstance>,
    pub rows: RowCounts,
}

/// Assembles tracked entity aggregates from a [`RowFetcher`]
///
/// Holds no per-request state; one instance can serve concurrent requests.
#[derive(Clone)]
pub struct AggregateService {
    fetcher: Arc<dyn RowFetcher>,
    geometry: Arc<dyn GeometryDecoder>,
    strict_geometry: bool,
    fetch_timeout: Option<Duration>,
    dedup: DedupSettings,
}

impl AggregateService {
    pub fn new(fetcher: Arc<dyn RowFetcher>) -> Self {
        Self {
            fetcher,
            geometry: Arc::new(WkbDecoder),
            strict_geometry: false,
            fetch_timeout: None,
            dedup: DedupSettings::default(),
        }
    }

    pub fn from_config(fetcher: Arc<dyn RowFetcher>, config: &AggregateConfig) -> Self {
        Self::new(fetcher)
            .with_strict_geometry(config.strict_geometry)
            .with_fetch_timeout(config.fetch_timeout())
            .with_dedup(config.dedup)
    }

    pub fn with_geometry_decoder(mut self, decoder: Arc<dyn GeometryDecoder>) -> Self {
        self.geometry = decoder;
        self
    }

    pub fn with_strict_geometry(mut self, strict: bool) -> Self {
        self.strict_geometry = strict;
        self
    }

    pub fn with_fetch_timeout(mut self, limit: Option<Duration>) -> Self {
        self.fetch_timeout = limit;
        self
    }

    pub fn with_dedup(mut self, dedup: DedupSettings) -> Self {
        self.dedup = dedup;
        self
    }

    /// One aggregate per visible root, in the order of the fetched root rows
    ///
    /// Request order is not kept; the root query's ordering decides. Unknown
    /// or out-of-scope roots are omitted. Repeated UIDs are fetched once.
    pub async fn get_aggregates(
        &self,
        root_ids: &[String],
        inclusion: &InclusionConfig,
        scope: &AccessScope,
    ) -> AssemblyResult<Vec<TrackedEntityInstance>> {
        Ok(self.assemble_report(root_ids, inclusion, scope).await?.aggregates)
    }

    /// Like [`get_aggregates`](Self::get_aggregates), also reporting row counts
    pub async fn assemble_report(
        &self,
        root_ids: &[String],
        inclusion: &InclusionConfig,
        scope: &AccessScope,
    ) -> AssemblyResult<Assembly> {
        let root_ids: Vec<String> = root_ids
            .iter()
            .cloned()
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        if root_ids.is_empty() {
            return Ok(Assembly::default());
        }

        let started = Instant::now();
        let ctx = MapContext {
            geometry: self.geometry.as_ref(),
            strict_geometry: self.strict_geometry,
            include_all_attributes: inclusion.include_all_attributes,
        };
        let orchestrator = Orchestrator::new(self.fetcher.as_ref(), ctx)
            .with_dedup(self.dedup)
            .with_fetch_timeout(self.fetch_timeout);

        let (root_rows, groups) = tokio::try_join!(
            orchestrator.fetch_roots(&root_ids, scope),
            orchestrator.orchestrate(&root_ids, inclusion, scope),
        )?;

        let mut rows = groups.rows;
        rows.roots = root_rows.len();
        let aggregates = assemble(&root_rows, groups, inclusion, &ctx)?;

        info!(
            requested = root_ids.len(),
            assembled = aggregates.len(),
            rows = rows.total(),
            suppressed = rows.suppressed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Assembled aggregates"
        );
        Ok(Assembly { aggregates, rows })
    }
}
