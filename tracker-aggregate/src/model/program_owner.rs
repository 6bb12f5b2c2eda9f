use serde::Serialize;

/// Org unit currently owning a tracked entity instance within a program
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramOwner {
    #[serde(skip)]
    pub id: Option<i64>,
    pub tracked_entity_instance: String,
    pub program: String,
    pub owner_org_unit: Option<String>,
}
