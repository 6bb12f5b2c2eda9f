use super::columns::{audit, event as col};
use super::{read_geometry, MapContext};
use crate::error::DecodingError;
use crate::model::{EnrollmentStatus, Event, EventStatus, FeatureType};
use crate::row::ColumnReader;

pub(super) fn map(r: &ColumnReader<'_>, ctx: &MapContext<'_>) -> Result<Event, DecodingError> {
    let is_point =
        r.enumeration::<FeatureType>(col::PROGRAM_STAGE_FEATURE_TYPE)? == Some(FeatureType::Point);
    let (geometry, coordinate) = read_geometry(r, ctx, col::GEOMETRY, is_point)?;

    Ok(Event {
        event: r.required_str(col::UID)?,
        enrollment: r.required_str(col::ENROLLMENT_UID)?,
        enrollment_status: r.enumeration::<EnrollmentStatus>(col::ENROLLMENT_STATUS)?,
        program: r.opt_str(col::PROGRAM_UID)?,
        program_stage: r.opt_str(col::PROGRAM_STAGE_UID)?,
        status: r.enumeration::<EventStatus>(col::STATUS)?,
        org_unit: r.opt_str(col::ORG_UNIT_UID)?,
        org_unit_name: r.opt_str(col::ORG_UNIT_NAME)?,
        tracked_entity_instance: r.opt_str(col::TEI_UID)?,
        attribute_option_combo: r.opt_str(col::ATTRIBUTE_OPTION_COMBO_UID)?,
        event_date: r.iso_timestamp(col::EXECUTION_DATE)?,
        due_date: r.iso_timestamp(col::DUE_DATE)?,
        completed_date: r.iso_timestamp(col::COMPLETED_DATE)?,
        completed_by: r.opt_str(col::COMPLETED_BY)?,
        stored_by: r.opt_str(audit::STORED_BY)?,
        created: r.iso_timestamp(audit::CREATED)?,
        last_updated: r.iso_timestamp(audit::LAST_UPDATED)?,
        created_at_client: r.iso_timestamp(audit::CREATED_AT_CLIENT)?,
        last_updated_at_client: r.iso_timestamp(audit::LAST_UPDATED_AT_CLIENT)?,
        followup: None,
        deleted: r.bool_or_false(col::DELETED)?,
        geometry,
        coordinate,
    })
}
