use super::{Enrollment, FeatureType, ProgramOwner, Relationship, SubCollection};
use crate::geometry::{Coordinate, Geometry};
use serde::Serialize;

/// Root aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEntityInstance {
    pub tracked_entity_instance: String,
    pub tracked_entity_type: Option<String>,
    pub org_unit: Option<String>,
    pub created: Option<String>,
    pub last_updated: Option<String>,
    pub created_at_client: Option<String>,
    pub last_updated_at_client: Option<String>,
    pub inactive: bool,
    pub deleted: bool,
    pub potential_duplicate: bool,
    pub feature_type: FeatureType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinate>,
    pub stored_by: Option<String>,
    /// Attribute values; only read when all attributes are requested
    pub attributes: Vec<Attribute>,
    #[serde(skip_serializing_if = "SubCollection::is_not_fetched")]
    pub enrollments: SubCollection<Enrollment>,
    #[serde(skip_serializing_if = "SubCollection::is_not_fetched")]
    pub relationships: SubCollection<Relationship>,
    #[serde(skip_serializing_if = "SubCollection::is_not_fetched")]
    pub program_owners: SubCollection<ProgramOwner>,
}

/// One tracked entity attribute value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub attribute: String,
    pub value: Option<String>,
}
