use super::EnrollmentStatus;
use crate::geometry::{Coordinate, Geometry};
use crate::row::ColumnEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Active,
    Completed,
    Visited,
    Schedule,
    Overdue,
    Skipped,
}

impl ColumnEnum for EventStatus {
    const VARIANTS: &'static [(&'static str, Self)] = &[
        ("ACTIVE", EventStatus::Active),
        ("COMPLETED", EventStatus::Completed),
        ("VISITED", EventStatus::Visited),
        ("SCHEDULE", EventStatus::Schedule),
        ("OVERDUE", EventStatus::Overdue),
        ("SKIPPED", EventStatus::Skipped),
    ];
}

/// Program stage event nested under an enrollment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event: String,
    pub enrollment: String,
    pub enrollment_status: Option<EnrollmentStatus>,
    pub program: Option<String>,
    pub program_stage: Option<String>,
    pub status: Option<EventStatus>,
    pub org_unit: Option<String>,
    pub org_unit_name: Option<String>,
    pub tracked_entity_instance: Option<String>,
    pub attribute_option_combo: Option<String>,
    pub event_date: Option<String>,
    pub due_date: Option<String>,
    pub completed_date: Option<String>,
    pub completed_by: Option<String>,
    pub stored_by: Option<String>,
    pub created: Option<String>,
    pub last_updated: Option<String>,
    pub created_at_client: Option<String>,
    pub last_updated_at_client: Option<String>,
    /// Inherited from the enrollment at assembly; never read from a column
    pub followup: Option<bool>,
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
}
