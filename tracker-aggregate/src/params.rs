//! Caller-selected inclusion flags

use serde::Deserialize;

/// Which sub-resources to fetch and attach
///
/// Everything is off by default except followup propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InclusionConfig {
    pub include_enrollments: bool,
    /// Ignored unless enrollments are included
    pub include_events: bool,
    pub include_relationships: bool,
    pub include_program_owners: bool,
    /// Read attribute value columns on root rows
    pub include_all_attributes: bool,
    /// Copy each enrollment's followup flag onto its events
    pub propagate_followup: bool,
}

impl Default for InclusionConfig {
    fn default() -> Self {
        Self {
            include_enrollments: false,
            include_events: false,
            include_relationships: false,
            include_program_owners: false,
            include_all_attributes: false,
            propagate_followup: true,
        }
    }
}

impl InclusionConfig {
    /// Every sub-resource and all attributes
    pub fn all() -> Self {
        Self {
            include_enrollments: true,
            include_events: true,
            include_relationships: true,
            include_program_owners: true,
            include_all_attributes: true,
            propagate_followup: true,
        }
    }

    pub fn with_enrollments(mut self, on: bool) -> Self {
        self.include_enrollments = on;
        self
    }

    pub fn with_events(mut self, on: bool) -> Self {
        self.include_events = on;
        self
    }

    pub fn with_relationships(mut self, on: bool) -> Self {
        self.include_relationships = on;
        self
    }

    pub fn with_program_owners(mut self, on: bool) -> Self {
        self.include_program_owners = on;
        self
    }

    pub fn with_all_attributes(mut self, on: bool) -> Self {
        self.include_all_attributes = on;
        self
    }

    pub fn with_followup_propagation(mut self, on: bool) -> Self {
        self.propagate_followup = on;
        self
    }

    /// Events are only fetched beneath enrollments
    pub fn events_enabled(&self) -> bool {
        self.include_enrollments && self.include_events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let flags = InclusionConfig::default();
        assert!(!flags.include_enrollments);
        assert!(!flags.include_all_attributes);
        assert!(flags.propagate_followup);
    }

    #[test]
    fn test_events_need_enrollments() {
        let flags = InclusionConfig::default().with_events(true);
        assert!(!flags.events_enabled());
        assert!(flags.with_enrollments(true).events_enabled());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let flags: InclusionConfig = toml::from_str("include_events = true").unwrap();
        assert!(flags.include_events);
        assert!(flags.propagate_followup);
    }
}
