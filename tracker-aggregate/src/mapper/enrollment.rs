use super::columns::{audit, enrollment as col};
use super::{read_geometry, MapContext};
use crate::error::DecodingError;
use crate::model::{Enrollment, EnrollmentStatus, FeatureType, SubCollection};
use crate::row::ColumnReader;

pub(super) fn map(r: &ColumnReader<'_>, ctx: &MapContext<'_>) -> Result<Enrollment, DecodingError> {
    let is_point = r.enumeration::<FeatureType>(col::PROGRAM_FEATURE_TYPE)? == Some(FeatureType::Point);
    let (geometry, coordinate) = read_geometry(r, ctx, col::GEOMETRY, is_point)?;

    Ok(Enrollment {
        enrollment: r.required_str(col::UID)?,
        tracked_entity_instance: r.required_str(col::TEI_UID)?,
        tracked_entity_type: r.opt_str(col::TEI_TYPE_UID)?,
        program: r.opt_str(col::PROGRAM_UID)?,
        status: r.enumeration::<EnrollmentStatus>(col::STATUS)?,
        org_unit: r.opt_str(col::ORG_UNIT_UID)?,
        org_unit_name: r.opt_str(col::ORG_UNIT_NAME)?,
        enrollment_date: r.timestamp(col::ENROLLMENT_DATE)?,
        incident_date: r.timestamp(col::INCIDENT_DATE)?,
        completed_date: r.timestamp(col::COMPLETED_DATE)?,
        completed_by: r.opt_str(col::COMPLETED_BY)?,
        stored_by: r.opt_str(audit::STORED_BY)?,
        created: r.iso_timestamp(audit::CREATED)?,
        last_updated: r.iso_timestamp(audit::LAST_UPDATED)?,
        created_at_client: r.iso_timestamp(audit::CREATED_AT_CLIENT)?,
        last_updated_at_client: r.iso_timestamp(audit::LAST_UPDATED_AT_CLIENT)?,
        followup: r.opt_bool(col::FOLLOWUP)?,
        deleted: r.bool_or_false(col::DELETED)?,
        geometry,
        coordinate,
        events: SubCollection::NotFetched,
    })
}
