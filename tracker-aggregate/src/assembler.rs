//! Attaching grouped children to their roots
//!
//! Pure function of its inputs: roots in input order, children in grouping
//! order, nothing re-sorted.

use crate::error::DecodingError;
use crate::grouping::GroupMap;
use crate::mapper::{MapContext, TRACKED_ENTITY_INSTANCE};
use crate::model::{
    EnrollmentSummary, EventSummary, RelationshipItem, SubCollection, TrackedEntityInstance,
    TrackedEntitySummary,
};
use crate::orchestrator::GroupMaps;
use crate::params::InclusionConfig;
use crate::row::Row;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Build one aggregate per distinct root row
///
/// A root UID appearing twice is assembled once, at its first position.
/// Roots with no rows are simply absent.
pub fn assemble(
    root_rows: &[Row],
    mut groups: GroupMaps,
    inclusion: &InclusionConfig,
    ctx: &MapContext<'_>,
) -> Result<Vec<TrackedEntityInstance>, DecodingError> {
    let mut seen = HashSet::new();
    let mut roots = Vec::with_capacity(root_rows.len());

    for (position, row) in root_rows.iter().enumerate() {
        let uid = TRACKED_ENTITY_INSTANCE.key(row, position)?;
        if !seen.insert(uid.clone()) {
            debug!(%uid, position, "Skipping repeated root row");
            continue;
        }
        let mut tei = TRACKED_ENTITY_INSTANCE
            .map_row(row, position, ctx)
            .map_err(|e| e.with_key(&uid))?;

        if inclusion.include_enrollments {
            let mut enrollments = take(&mut groups.enrollments, &uid);
            if inclusion.events_enabled() {
                for enrollment in &mut enrollments {
                    let mut events = groups
                        .events
                        .as_ref()
                        .and_then(|m| m.get(&enrollment.enrollment))
                        .cloned()
                        .unwrap_or_default();
                    for event in &mut events {
                        if inclusion.propagate_followup {
                            event.followup = enrollment.followup;
                        }
                        if event.enrollment_status.is_none() {
                            event.enrollment_status = enrollment.status;
                        }
                    }
                    enrollment.events = SubCollection::Fetched(events);
                }
            }
            tei.enrollments = SubCollection::Fetched(enrollments);
        }
        if inclusion.include_relationships {
            tei.relationships = SubCollection::Fetched(take(&mut groups.relationships, &uid));
        }
        if inclusion.include_program_owners {
            tei.program_owners = SubCollection::Fetched(take(&mut groups.program_owners, &uid));
        }

        roots.push(tei);
    }

    if inclusion.include_relationships {
        resolve_relationships(&mut roots);
    }
    Ok(roots)
}

/// Claim the group for `key`; a fetched kind with no group is empty
fn take<T>(map: &mut Option<GroupMap<T>>, key: &str) -> Vec<T> {
    map.as_mut()
        .and_then(|m| m.swap_remove(key))
        .unwrap_or_default()
}

/// Objects present in one response, addressable by UID
#[derive(Default)]
struct KnownItems {
    tracked_entities: HashMap<String, TrackedEntitySummary>,
    enrollments: HashMap<String, EnrollmentSummary>,
    events: HashMap<String, EventSummary>,
}

impl KnownItems {
    fn index(roots: &[TrackedEntityInstance]) -> Self {
        let mut known = KnownItems::default();
        for tei in roots {
            known.tracked_entities.insert(
                tei.tracked_entity_instance.clone(),
                TrackedEntitySummary {
                    tracked_entity_type: tei.tracked_entity_type.clone(),
                    org_unit: tei.org_unit.clone(),
                    deleted: tei.deleted,
                },
            );
            for enrollment in tei.enrollments.iter() {
                known.enrollments.insert(
                    enrollment.enrollment.clone(),
                    EnrollmentSummary {
                        tracked_entity_instance: enrollment.tracked_entity_instance.clone(),
                        program: enrollment.program.clone(),
                        status: enrollment.status,
                        org_unit: enrollment.org_unit.clone(),
                    },
                );
                for event in enrollment.events.iter() {
                    known.events.insert(
                        event.event.clone(),
                        EventSummary {
                            enrollment: event.enrollment.clone(),
                            program_stage: event.program_stage.clone(),
                            status: event.status,
                            org_unit: event.org_unit.clone(),
                        },
                    );
                }
            }
        }
        known
    }

    fn resolve(&self, item: &mut RelationshipItem) {
        match item {
            RelationshipItem::TrackedEntityInstance(r) => {
                r.detail = self.tracked_entities.get(&r.tracked_entity_instance).cloned();
            }
            RelationshipItem::Enrollment(r) => {
                r.detail = self.enrollments.get(&r.enrollment).cloned();
            }
            RelationshipItem::Event(r) => {
                r.detail = self.events.get(&r.event).cloned();
            }
        }
    }
}

fn resolve_relationships(roots: &mut [TrackedEntityInstance]) {
    let known = KnownItems::index(roots);
    for tei in roots.iter_mut() {
        for relationship in tei.relationships.iter_mut() {
            known.resolve(&mut relationship.from);
            known.resolve(&mut relationship.to);
        }
    }
}
