use super::columns::{audit, relationship as col};
use super::MapContext;
use crate::error::{DecodeFault, DecodingError};
use crate::model::{Relationship, RelationshipItem};
use crate::row::ColumnReader;

pub(super) fn map(r: &ColumnReader<'_>, _ctx: &MapContext<'_>) -> Result<Relationship, DecodingError> {
    // the root key is required even though the record does not carry it
    r.required_str(col::TEI_UID)?;

    Ok(Relationship {
        relationship: r.required_str(col::UID)?,
        relationship_type: r.opt_str(col::TYPE_UID)?,
        relationship_name: r.opt_str(col::TYPE_NAME)?,
        bidirectional: r.bool_or_false(col::BIDIRECTIONAL)?,
        created: r.iso_timestamp(audit::CREATED)?,
        last_updated: r.iso_timestamp(audit::LAST_UPDATED)?,
        from: read_item(
            r,
            "from_*",
            [col::FROM_TEI_UID, col::FROM_ENROLLMENT_UID, col::FROM_EVENT_UID],
        )?,
        to: read_item(
            r,
            "to_*",
            [col::TO_TEI_UID, col::TO_ENROLLMENT_UID, col::TO_EVENT_UID],
        )?,
    })
}

fn read_item(
    r: &ColumnReader<'_>,
    label: &str,
    [tei, enrollment, event]: [&str; 3],
) -> Result<RelationshipItem, DecodingError> {
    RelationshipItem::from_references(r.opt_str(tei)?, r.opt_str(enrollment)?, r.opt_str(event)?)
        .map_err(|e| r.fail(label, DecodeFault::InvalidRelationshipItem(e.to_string())))
}
