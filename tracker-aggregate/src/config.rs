//! Engine configuration file
//!
//! Loaded through `tracker_common::config`; every key is optional.
//!
//! ```toml
//! database_path = "/var/lib/tracker/tracker.db"
//! strict_geometry = false
//! fetch_timeout_ms = 30000
//!
//! [inclusion]
//! include_enrollments = true
//!
//! [dedup]
//! event = "identity"
//!
//! [queries.enrollment]
//! sql = "SELECT ... WHERE tei_uid IN (SELECT value FROM json_each(?)) ORDER BY tei_uid"
//! binds = ["root_ids"]
//! ```

use crate::fetch::QuerySet;
use crate::grouping::DedupScope;
use crate::mapper::EntityKind;
use crate::params::InclusionConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracker_common::db::DEFAULT_MAX_CONNECTIONS;
use tracker_common::{Error, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "TRACKER_AGGREGATE_CONFIG";

/// Directory name under the platform config dir
pub const APP_NAME: &str = "tracker-aggregate";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    pub database_path: Option<PathBuf>,
    pub max_connections: u32,
    pub strict_geometry: bool,
    /// Per-fetch bound; 0 disables it
    pub fetch_timeout_ms: u64,
    /// Defaults applied when the caller gives no flags
    pub inclusion: InclusionConfig,
    pub dedup: DedupSettings,
    pub queries: QuerySet,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            strict_geometry: false,
            fetch_timeout_ms: 0,
            inclusion: InclusionConfig::default(),
            dedup: DedupSettings::default(),
            queries: QuerySet::default(),
        }
    }
}

impl AggregateConfig {
    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_ms > 0).then(|| Duration::from_millis(self.fetch_timeout_ms))
    }

    /// Check that the kinds the default inclusion needs have queries
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(Error::Config("max_connections must be at least 1".into()));
        }

        let flags = &self.inclusion;
        let needed = [
            (EntityKind::TrackedEntityInstance, true),
            (EntityKind::Enrollment, flags.include_enrollments),
            (EntityKind::Event, flags.events_enabled()),
            (EntityKind::Relationship, flags.include_relationships),
            (EntityKind::ProgramOwner, flags.include_program_owners),
        ];
        for (kind, wanted) in needed {
            if wanted && self.queries.get(kind).is_none() {
                return Err(Error::Config(format!("no query configured for {}", kind)));
            }
        }
        Ok(())
    }
}

/// Duplicate-suppression scope per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DedupSettings {
    pub enrollment: DedupScope,
    pub event: DedupScope,
    pub relationship: DedupScope,
    pub program_owner: DedupScope,
}

impl DedupSettings {
    pub fn scope(&self, kind: EntityKind) -> DedupScope {
        match kind {
            EntityKind::Enrollment => self.enrollment,
            EntityKind::Event => self.event,
            EntityKind::Relationship => self.relationship,
            EntityKind::ProgramOwner => self.program_owner,
            EntityKind::TrackedEntityInstance => DedupScope::FullRecord,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::QuerySpec;

    #[test]
    fn test_empty_file_is_default() {
        let config: AggregateConfig = toml::from_str("").unwrap();
        assert_eq!(config, AggregateConfig::default());
        assert_eq!(config.fetch_timeout(), None);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn test_parses_full_file() {
        let config: AggregateConfig = toml::from_str(
            r#"
            database_path = "/tmp/tracker.db"
            strict_geometry = true
            fetch_timeout_ms = 1500

            [inclusion]
            include_enrollments = true
            propagate_followup = false

            [dedup]
            event = "identity"

            [queries.tracked_entity_instance]
            sql = "SELECT 1"
            "#,
        )
        .unwrap();

        assert!(config.strict_geometry);
        assert_eq!(config.fetch_timeout(), Some(Duration::from_millis(1500)));
        assert!(config.inclusion.include_enrollments);
        assert!(!config.inclusion.propagate_followup);
        assert_eq!(config.dedup.scope(EntityKind::Event), DedupScope::Identity);
        assert_eq!(config.dedup.scope(EntityKind::Enrollment), DedupScope::FullRecord);
        assert!(config.queries.get(EntityKind::TrackedEntityInstance).is_some());
    }

    #[test]
    fn test_validate_requires_queries_for_default_inclusion() {
        let mut config = AggregateConfig::default();
        assert!(config.validate().is_err());

        config.queries.set(EntityKind::TrackedEntityInstance, QuerySpec::new("SELECT 1"));
        assert!(config.validate().is_ok());

        config.inclusion.include_enrollments = true;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("enrollment"));
    }
}
