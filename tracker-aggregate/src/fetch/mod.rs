//! Row fetch layer
//!
//! The engine never builds queries. A [`RowFetcher`] returns, for one entity
//! kind, every row belonging to a batch of root UIDs, already sorted by
//! parent key and already filtered to what the actor may see.

mod memory;
mod sql;

pub use memory::{FetchCall, MemoryRowFetcher};
pub use sql::{Bind, QuerySet, QuerySpec, SqlRowFetcher};

use crate::error::FetchError;
use crate::mapper::EntityKind;
use crate::row::Row;
use async_trait::async_trait;

/// Who is asking, as resolved upstream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessScope {
    pub user: Option<String>,
    /// Org units the actor may search in
    pub org_units: Vec<String>,
    /// Programs the actor may read
    pub programs: Vec<String>,
    pub super_user: bool,
}

impl AccessScope {
    pub fn super_user() -> Self {
        Self {
            super_user: true,
            ..Self::default()
        }
    }

    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            ..Self::default()
        }
    }

    pub fn with_org_units(mut self, org_units: Vec<String>) -> Self {
        self.org_units = org_units;
        self
    }

    pub fn with_programs(mut self, programs: Vec<String>) -> Self {
        self.programs = programs;
        self
    }
}

/// Source of flat rows for one entity kind
#[async_trait]
pub trait RowFetcher: Send + Sync {
    /// All rows of `kind` for `root_ids`, in one batch
    ///
    /// Rows must come back sorted by the kind's key column.
    async fn fetch(
        &self,
        kind: EntityKind,
        root_ids: &[String],
        scope: &AccessScope,
    ) -> Result<Vec<Row>, FetchError>;
}
