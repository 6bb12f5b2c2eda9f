//! Read-side aggregate types
//!
//! These are request-scoped projections: built from rows for one call and
//! serialized to the caller. Nothing here is persisted.

mod enrollment;
mod event;
mod program_owner;
mod relationship;
mod tracked_entity;

pub use enrollment::{Enrollment, EnrollmentStatus};
pub use event::{Event, EventStatus};
pub use program_owner::ProgramOwner;
pub use relationship::{
    EnrollmentRef, EnrollmentSummary, EventRef, EventSummary, Relationship, RelationshipItem,
    RelationshipItemError, TrackedEntityRef, TrackedEntitySummary,
};
pub use tracked_entity::{Attribute, TrackedEntityInstance};

use crate::row::ColumnEnum;
use serde::{Serialize, Serializer};

/// A nested collection that may not have been requested
///
/// `NotFetched` means the caller did not ask for it; `Fetched(vec![])`
/// means it was fetched and there were none.
#[derive(Debug, Clone, PartialEq)]
pub enum SubCollection<T> {
    NotFetched,
    Fetched(Vec<T>),
}

impl<T> Default for SubCollection<T> {
    fn default() -> Self {
        SubCollection::NotFetched
    }
}

impl<T> SubCollection<T> {
    pub fn is_fetched(&self) -> bool {
        matches!(self, SubCollection::Fetched(_))
    }

    pub fn is_not_fetched(&self) -> bool {
        !self.is_fetched()
    }

    /// Items if fetched
    pub fn as_slice(&self) -> Option<&[T]> {
        match self {
            SubCollection::Fetched(items) => Some(items),
            SubCollection::NotFetched => None,
        }
    }

    /// Number of items; zero when not fetched
    pub fn len(&self) -> usize {
        self.as_slice().map_or(0, <[T]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().unwrap_or(&[]).iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        match self {
            SubCollection::Fetched(items) => items.iter_mut(),
            SubCollection::NotFetched => Default::default(),
        }
    }
}

impl<T> From<Vec<T>> for SubCollection<T> {
    fn from(items: Vec<T>) -> Self {
        SubCollection::Fetched(items)
    }
}

/// Serializes as a list; fields holding one are skipped when not fetched
impl<T: Serialize> Serialize for SubCollection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SubCollection::Fetched(items) => items.serialize(serializer),
            SubCollection::NotFetched => serializer.serialize_none(),
        }
    }
}

/// Declared shape of an entity's geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureType {
    #[default]
    None,
    Point,
    Polygon,
    MultiPolygon,
    Symbol,
}

impl ColumnEnum for FeatureType {
    const VARIANTS: &'static [(&'static str, Self)] = &[
        ("NONE", FeatureType::None),
        ("POINT", FeatureType::Point),
        ("POLYGON", FeatureType::Polygon),
        ("MULTI_POLYGON", FeatureType::MultiPolygon),
        ("SYMBOL", FeatureType::Symbol),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_fetched_differs_from_empty() {
        let not_fetched: SubCollection<u8> = SubCollection::NotFetched;
        let empty: SubCollection<u8> = SubCollection::Fetched(Vec::new());

        assert_ne!(not_fetched, empty);
        assert!(not_fetched.is_not_fetched());
        assert!(empty.is_fetched());
        assert_eq!(not_fetched.len(), 0);
        assert_eq!(empty.len(), 0);
        assert_eq!(not_fetched.as_slice(), None);
        assert_eq!(empty.as_slice(), Some(&[][..]));
    }

    #[test]
    fn test_iter_mut_over_not_fetched_is_empty() {
        let mut items: SubCollection<u8> = SubCollection::NotFetched;
        assert_eq!(items.iter_mut().count(), 0);

        let mut items = SubCollection::from(vec![1u8, 2]);
        for i in items.iter_mut() {
            *i *= 10;
        }
        assert_eq!(items.as_slice(), Some(&[10u8, 20][..]));
    }

    #[test]
    fn test_feature_type_lookup() {
        assert_eq!(FeatureType::from_column("point"), Some(FeatureType::Point));
        assert_eq!(
            FeatureType::from_column("Multi_Polygon"),
            Some(FeatureType::MultiPolygon)
        );
        assert_eq!(FeatureType::from_column("circle"), None);
    }
}
