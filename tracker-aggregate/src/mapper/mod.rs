//! Row mappers: one flat row to one typed record
//!
//! Every entity kind has a [`RowMapper`] descriptor holding its grouping key
//! column and a plain decoding function. The descriptors are constants; there
//! is no mapper trait hierarchy to implement.

pub mod columns;
mod enrollment;
mod event;
mod program_owner;
mod relationship;
mod tracked_entity;

use crate::error::{DecodeFault, DecodingError};
use crate::geometry::{Coordinate, Geometry, GeometryDecoder};
use crate::model::{Enrollment, Event, ProgramOwner, Relationship, TrackedEntityInstance};
use crate::row::{ColumnReader, Row};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Kinds of record the engine decodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    TrackedEntityInstance,
    Enrollment,
    Event,
    Relationship,
    ProgramOwner,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::TrackedEntityInstance,
        EntityKind::Enrollment,
        EntityKind::Event,
        EntityKind::Relationship,
        EntityKind::ProgramOwner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::TrackedEntityInstance => "tracked_entity_instance",
            EntityKind::Enrollment => "enrollment",
            EntityKind::Event => "event",
            EntityKind::Relationship => "relationship",
            EntityKind::ProgramOwner => "program_owner",
        }
    }

    /// Column holding the parent key rows are grouped by
    pub fn key_column(&self) -> &'static str {
        match self {
            EntityKind::TrackedEntityInstance => columns::tracked_entity::UID,
            EntityKind::Enrollment => columns::enrollment::TEI_UID,
            EntityKind::Event => columns::event::ENROLLMENT_UID,
            EntityKind::Relationship => columns::relationship::TEI_UID,
            EntityKind::ProgramOwner => columns::program_owner::TEI_UID,
        }
    }

    /// Column holding the root UID a row was fetched for
    ///
    /// Same as the key column except for events, which group by enrollment.
    pub fn root_column(&self) -> &'static str {
        match self {
            EntityKind::Event => columns::event::TEI_UID,
            other => other.key_column(),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings shared by every mapper for one request
#[derive(Clone, Copy)]
pub struct MapContext<'a> {
    pub geometry: &'a dyn GeometryDecoder,
    /// Fail the request on an unparseable geometry instead of leaving it unset
    pub strict_geometry: bool,
    /// Read `attr_*` columns on root rows
    pub include_all_attributes: bool,
}

impl<'a> MapContext<'a> {
    pub fn new(geometry: &'a dyn GeometryDecoder) -> Self {
        Self {
            geometry,
            strict_geometry: false,
            include_all_attributes: false,
        }
    }
}

impl fmt::Debug for MapContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapContext")
            .field("strict_geometry", &self.strict_geometry)
            .field("include_all_attributes", &self.include_all_attributes)
            .finish_non_exhaustive()
    }
}

/// Decoding descriptor for one entity kind
pub struct RowMapper<T> {
    pub kind: EntityKind,
    pub key_column: &'static str,
    map: fn(&ColumnReader<'_>, &MapContext<'_>) -> Result<T, DecodingError>,
}

impl<T> RowMapper<T> {
    pub fn key_column(&self) -> &'static str {
        self.key_column
    }

    /// Decode the row at `position` of its result set
    pub fn map_row(&self, row: &Row, position: usize, ctx: &MapContext<'_>) -> Result<T, DecodingError> {
        let reader = ColumnReader::new(row, self.kind, position);
        (self.map)(&reader, ctx)
    }

    /// Parent key of the row; required
    pub fn key(&self, row: &Row, position: usize) -> Result<String, DecodingError> {
        ColumnReader::new(row, self.kind, position).required_str(self.key_column)
    }
}

pub const TRACKED_ENTITY_INSTANCE: RowMapper<TrackedEntityInstance> = RowMapper {
    kind: EntityKind::TrackedEntityInstance,
    key_column: columns::tracked_entity::UID,
    map: tracked_entity::map,
};

pub const ENROLLMENT: RowMapper<Enrollment> = RowMapper {
    kind: EntityKind::Enrollment,
    key_column: columns::enrollment::TEI_UID,
    map: enrollment::map,
};

pub const EVENT: RowMapper<Event> = RowMapper {
    kind: EntityKind::Event,
    key_column: columns::event::ENROLLMENT_UID,
    map: event::map,
};

pub const RELATIONSHIP: RowMapper<Relationship> = RowMapper {
    kind: EntityKind::Relationship,
    key_column: columns::relationship::TEI_UID,
    map: relationship::map,
};

pub const PROGRAM_OWNER: RowMapper<ProgramOwner> = RowMapper {
    kind: EntityKind::ProgramOwner,
    key_column: columns::program_owner::TEI_UID,
    map: program_owner::map,
};

/// Decode a geometry column, flattening the coordinate for point features
///
/// Null payloads leave both fields unset. Unparseable payloads do too unless
/// the context is strict.
fn read_geometry(
    reader: &ColumnReader<'_>,
    ctx: &MapContext<'_>,
    column: &str,
    is_point: bool,
) -> Result<(Option<Geometry>, Option<Coordinate>), DecodingError> {
    let Some(bytes) = reader.blob(column)? else {
        return Ok((None, None));
    };

    match ctx.geometry.decode(bytes) {
        Ok(geometry) => {
            let coordinate = if is_point { geometry.coordinate() } else { None };
            Ok((Some(geometry), coordinate))
        }
        Err(e) if ctx.strict_geometry => {
            Err(reader.fail(column, DecodeFault::InvalidGeometry(e.to_string())))
        }
        Err(e) => {
            warn!(column, error = %e, "Ignoring unparseable geometry");
            Ok((None, None))
        }
    }
}
