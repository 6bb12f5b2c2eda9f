//! Grouping of flat child rows under their parent key
//!
//! Rows arrive sorted by parent key. Fan-out from joins repeats the same
//! child several times; repeats are dropped while the order of first
//! appearance is kept.

use crate::error::DecodingError;
use crate::mapper::{MapContext, RowMapper};
use crate::model::{Enrollment, Event, ProgramOwner, Relationship, TrackedEntityInstance};
use crate::row::Row;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;

/// Parent key to ordered children, in order of first appearance
pub type GroupMap<T> = IndexMap<String, Vec<T>>;

/// Records that can be de-duplicated within a group
pub trait GroupRecord: Clone + PartialEq {
    /// Stable identity of the record, usually its UID
    fn identity(&self) -> Cow<'_, str>;
}

impl GroupRecord for TrackedEntityInstance {
    fn identity(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.tracked_entity_instance)
    }
}

impl GroupRecord for Enrollment {
    fn identity(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.enrollment)
    }
}

impl GroupRecord for Event {
    fn identity(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.event)
    }
}

impl GroupRecord for Relationship {
    fn identity(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.relationship)
    }
}

impl GroupRecord for ProgramOwner {
    fn identity(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.program)
    }
}

/// What counts as a duplicate within one group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupScope {
    /// Same identity and every field equal
    #[default]
    FullRecord,
    /// Same identity; the first record wins
    Identity,
}

/// Output of one grouping pass
#[derive(Debug, Clone, PartialEq)]
pub struct Grouped<T> {
    pub groups: GroupMap<T>,
    /// Rows decoded
    pub rows: usize,
    /// Rows dropped as duplicates
    pub suppressed: usize,
}

impl<T> Default for Grouped<T> {
    fn default() -> Self {
        Self {
            groups: GroupMap::new(),
            rows: 0,
            suppressed: 0,
        }
    }
}

struct Bucket<T> {
    items: Vec<T>,
    /// identity -> positions in `items`
    seen: HashMap<String, Vec<usize>>,
}

impl<T> Default for Bucket<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            seen: HashMap::new(),
        }
    }
}

/// Map and group `rows` in one linear pass
///
/// Input order is trusted; nothing is re-sorted. The first decoding failure
/// aborts the pass.
pub fn group<T: GroupRecord>(
    rows: &[Row],
    mapper: &RowMapper<T>,
    ctx: &MapContext<'_>,
    scope: DedupScope,
) -> Result<Grouped<T>, DecodingError> {
    let mut buckets: IndexMap<String, Bucket<T>> = IndexMap::new();
    let mut suppressed = 0;

    for (position, row) in rows.iter().enumerate() {
        let key = mapper.key(row, position)?;
        let record = mapper
            .map_row(row, position, ctx)
            .map_err(|e| e.with_key(&key))?;

        let bucket = buckets.entry(key).or_default();
        let positions = bucket.seen.entry(record.identity().into_owned()).or_default();

        let duplicate = match scope {
            DedupScope::Identity => !positions.is_empty(),
            DedupScope::FullRecord => positions.iter().any(|&i| bucket.items[i] == record),
        };

        if duplicate {
            suppressed += 1;
        } else {
            positions.push(bucket.items.len());
            bucket.items.push(record);
        }
    }

    Ok(Grouped {
        groups: buckets.into_iter().map(|(k, b)| (k, b.items)).collect(),
        rows: rows.len(),
        suppressed,
    })
}
