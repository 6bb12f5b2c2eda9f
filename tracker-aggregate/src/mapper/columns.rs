//! Column names of the flat result sets, grouped per entity kind
//!
//! Queries supplied through configuration must alias their output columns
//! to these names. Column order does not matter.

/// Columns shared by every auditable kind
pub mod audit {
    pub const CREATED: &str = "created";
    pub const LAST_UPDATED: &str = "lastupdated";
    pub const CREATED_AT_CLIENT: &str = "createdatclient";
    pub const LAST_UPDATED_AT_CLIENT: &str = "lastupdatedatclient";
    pub const STORED_BY: &str = "storedby";
}

/// Root rows, one per tracked entity instance
pub mod tracked_entity {
    /// Required; also the grouping key
    pub const UID: &str = "uid";
    pub const TYPE_UID: &str = "type_uid";
    pub const TYPE_FEATURE_TYPE: &str = "type_feature_type";
    pub const ORG_UNIT_UID: &str = "ou_uid";
    pub const INACTIVE: &str = "inactive";
    pub const DELETED: &str = "deleted";
    pub const POTENTIAL_DUPLICATE: &str = "potentialduplicate";
    /// WKB payload
    pub const GEOMETRY: &str = "geometry";
    /// Prefix of attribute value columns, e.g. `attr_w75KJ2mc4zz`
    pub const ATTRIBUTE_PREFIX: &str = "attr_";
}

pub mod enrollment {
    pub const UID: &str = "uid";
    /// Parent key
    pub const TEI_UID: &str = "tei_uid";
    pub const TEI_TYPE_UID: &str = "tei_type_uid";
    pub const PROGRAM_UID: &str = "program_uid";
    pub const PROGRAM_FEATURE_TYPE: &str = "program_feature_type";
    pub const ORG_UNIT_UID: &str = "ou_uid";
    pub const ORG_UNIT_NAME: &str = "ou_name";
    /// ACTIVE, COMPLETED or CANCELLED
    pub const STATUS: &str = "status";
    pub const ENROLLMENT_DATE: &str = "enrollmentdate";
    pub const INCIDENT_DATE: &str = "incidentdate";
    pub const COMPLETED_DATE: &str = "completeddate";
    pub const COMPLETED_BY: &str = "completedby";
    /// Nullable; null stays unset
    pub const FOLLOWUP: &str = "followup";
    pub const DELETED: &str = "deleted";
    pub const GEOMETRY: &str = "geometry";
}

pub mod event {
    pub const UID: &str = "uid";
    /// Parent key
    pub const ENROLLMENT_UID: &str = "enrollment_uid";
    pub const ENROLLMENT_STATUS: &str = "enrollment_status";
    pub const TEI_UID: &str = "tei_uid";
    pub const PROGRAM_UID: &str = "program_uid";
    pub const PROGRAM_STAGE_UID: &str = "program_stage_uid";
    pub const PROGRAM_STAGE_FEATURE_TYPE: &str = "program_stage_feature_type";
    pub const STATUS: &str = "status";
    pub const ORG_UNIT_UID: &str = "ou_uid";
    pub const ORG_UNIT_NAME: &str = "ou_name";
    pub const ATTRIBUTE_OPTION_COMBO_UID: &str = "coc_uid";
    pub const EXECUTION_DATE: &str = "executiondate";
    pub const DUE_DATE: &str = "duedate";
    pub const COMPLETED_DATE: &str = "completeddate";
    pub const COMPLETED_BY: &str = "completedby";
    pub const DELETED: &str = "deleted";
    pub const GEOMETRY: &str = "geometry";
}

/// One row per relationship and root it touches
pub mod relationship {
    pub const UID: &str = "uid";
    /// Root the row was fetched for
    pub const TEI_UID: &str = "tei_uid";
    pub const TYPE_UID: &str = "type_uid";
    pub const TYPE_NAME: &str = "type_name";
    pub const BIDIRECTIONAL: &str = "bidirectional";
    pub const FROM_TEI_UID: &str = "from_tei_uid";
    pub const FROM_ENROLLMENT_UID: &str = "from_pi_uid";
    pub const FROM_EVENT_UID: &str = "from_psi_uid";
    pub const TO_TEI_UID: &str = "to_tei_uid";
    pub const TO_ENROLLMENT_UID: &str = "to_pi_uid";
    pub const TO_EVENT_UID: &str = "to_psi_uid";
}

pub mod program_owner {
    pub const ID: &str = "id";
    pub const TEI_UID: &str = "tei_uid";
    /// Required; identity within one root
    pub const PROGRAM_UID: &str = "program_uid";
    pub const OWNER_ORG_UNIT_UID: &str = "ownerou_uid";
}
