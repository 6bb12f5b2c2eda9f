use super::{Event, SubCollection};
use crate::geometry::{Coordinate, Geometry};
use crate::row::ColumnEnum;
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Cancelled,
}

impl ColumnEnum for EnrollmentStatus {
    const VARIANTS: &'static [(&'static str, Self)] = &[
        ("ACTIVE", EnrollmentStatus::Active),
        ("COMPLETED", EnrollmentStatus::Completed),
        ("CANCELLED", EnrollmentStatus::Cancelled),
    ];
}

/// Program enrollment of a tracked entity instance
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub enrollment: String,
    pub tracked_entity_instance: String,
    pub tracked_entity_type: Option<String>,
    pub program: Option<String>,
    pub status: Option<EnrollmentStatus>,
    pub org_unit: Option<String>,
    pub org_unit_name: Option<String>,
    pub enrollment_date: Option<NaiveDateTime>,
    pub incident_date: Option<NaiveDateTime>,
    pub completed_date: Option<NaiveDateTime>,
    pub completed_by: Option<String>,
    pub stored_by: Option<String>,
    pub created: Option<String>,
    pub last_updated: Option<String>,
    pub created_at_client: Option<String>,
    pub last_updated_at_client: Option<String>,
    /// Tri-state: unset is distinct from `false`
    pub followup: Option<bool>,
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
    #[serde(skip_serializing_if = "SubCollection::is_not_fetched")]
    pub events: SubCollection<Event>,
}
