//! Core domain types for the enrichment pipeline.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TargetField
// ---------------------------------------------------------------------------

/// The two enrichable fields of an address record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetField {
    /// Administrative county name.
    County,
    /// Recorded title owner.
    Owner,
}

impl TargetField {
    /// Stable lowercase name for logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::County => "county",
            Self::Owner => "owner",
        }
    }
}

impl std::fmt::Display for TargetField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EnrichmentOutcome
// ---------------------------------------------------------------------------

/// Outcome of one lookup attempt for one record.
///
/// Enrichers never propagate collaborator faults; every failure mode
/// collapses to [`EnrichmentOutcome::Unresolved`], with the reason logged
/// at the failure site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    /// A non-empty value was found and applied to the record.
    Resolved(String),
    /// No value could be determined; the record keeps its original cell.
    Unresolved,
}

impl EnrichmentOutcome {
    /// Whether this outcome carries a value.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// The resolved value, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Resolved(v) => Some(v),
            Self::Unresolved => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_field_names() {
        assert_eq!(TargetField::County.as_str(), "county");
        assert_eq!(TargetField::Owner.to_string(), "owner");
    }

    #[test]
    fn outcome_accessors() {
        let resolved = EnrichmentOutcome::Resolved("DeKalb County".into());
        assert!(resolved.is_resolved());
        assert_eq!(resolved.value(), Some("DeKalb County"));

        let unresolved = EnrichmentOutcome::Unresolved;
        assert!(!unresolved.is_resolved());
        assert_eq!(unresolved.value(), None);
    }
}
