use super::{EnrollmentStatus, EventStatus};
use serde::Serialize;
use thiserror::Error;

/// Link between two tracker objects
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub relationship: String,
    pub relationship_type: Option<String>,
    pub relationship_name: Option<String>,
    pub bidirectional: bool,
    pub created: Option<String>,
    pub last_updated: Option<String>,
    pub from: RelationshipItem,
    pub to: RelationshipItem,
}

/// One end of a relationship
///
/// Exactly one target is populated; build through
/// [`RelationshipItem::from_references`] when reading raw columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipItem {
    TrackedEntityInstance(TrackedEntityRef),
    Enrollment(EnrollmentRef),
    Event(EventRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RelationshipItemError {
    #[error("no reference is populated")]
    Empty,

    #[error("more than one reference is populated")]
    Ambiguous,
}

impl RelationshipItem {
    /// Build an end from the three nullable reference columns
    pub fn from_references(
        tracked_entity_instance: Option<String>,
        enrollment: Option<String>,
        event: Option<String>,
    ) -> Result<Self, RelationshipItemError> {
        match (tracked_entity_instance, enrollment, event) {
            (Some(uid), None, None) => Ok(Self::tracked_entity_instance(uid)),
            (None, Some(uid), None) => Ok(Self::enrollment(uid)),
            (None, None, Some(uid)) => Ok(Self::event(uid)),
            (None, None, None) => Err(RelationshipItemError::Empty),
            _ => Err(RelationshipItemError::Ambiguous),
        }
    }

    pub fn tracked_entity_instance(uid: impl Into<String>) -> Self {
        RelationshipItem::TrackedEntityInstance(TrackedEntityRef {
            tracked_entity_instance: uid.into(),
            detail: None,
        })
    }

    pub fn enrollment(uid: impl Into<String>) -> Self {
        RelationshipItem::Enrollment(EnrollmentRef {
            enrollment: uid.into(),
            detail: None,
        })
    }

    pub fn event(uid: impl Into<String>) -> Self {
        RelationshipItem::Event(EventRef {
            event: uid.into(),
            detail: None,
        })
    }

    /// UID of the referenced object
    pub fn uid(&self) -> &str {
        match self {
            RelationshipItem::TrackedEntityInstance(r) => &r.tracked_entity_instance,
            RelationshipItem::Enrollment(r) => &r.enrollment,
            RelationshipItem::Event(r) => &r.event,
        }
    }

    /// Whether the target was found in the same response
    pub fn is_resolved(&self) -> bool {
        match self {
            RelationshipItem::TrackedEntityInstance(r) => r.detail.is_some(),
            RelationshipItem::Enrollment(r) => r.detail.is_some(),
            RelationshipItem::Event(r) => r.detail.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEntityRef {
    pub tracked_entity_instance: String,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub detail: Option<TrackedEntitySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEntitySummary {
    pub tracked_entity_type: Option<String>,
    pub org_unit: Option<String>,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRef {
    pub enrollment: String,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub detail: Option<EnrollmentSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentSummary {
    pub tracked_entity_instance: String,
    pub program: Option<String>,
    pub status: Option<EnrollmentStatus>,
    pub org_unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRef {
    pub event: String,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub detail: Option<EventSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub enrollment: String,
    pub program_stage: Option<String>,
    pub status: Option<EventStatus>,
    pub org_unit: Option<String>,
}
