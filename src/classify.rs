// 🎓 Education Classifier - Raw extract code → one of three ordered groups
// An unknown code is rejected, never defaulted: a silent "Dropout" would
// shift every downstream share.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

const STAGE: &str = "classify";

// ============================================================================
// EDUCATION GROUP
// ============================================================================

/// Ordered education groups used throughout the published tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EducationGroup {
    Dropout,
    HighSchool,
    College,
}

impl EducationGroup {
    /// All groups in table order.
    pub const ALL: [EducationGroup; 3] = [
        EducationGroup::Dropout,
        EducationGroup::HighSchool,
        EducationGroup::College,
    ];

    /// Short identifier for machine-readable output.
    pub fn name(&self) -> &'static str {
        match self {
            EducationGroup::Dropout => "Dropout",
            EducationGroup::HighSchool => "HighSchool",
            EducationGroup::College => "College",
        }
    }

    /// Row label used in the published tables.
    pub fn label(&self) -> &'static str {
        match self {
            EducationGroup::Dropout => "No high school",
            EducationGroup::HighSchool => "High school/some college",
            EducationGroup::College => "College",
        }
    }
}

impl std::fmt::Display for EducationGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Map a raw extract code to its group.
///
/// 1 → Dropout, 2 and 3 → HighSchool, 4 → College.
pub fn classify(unit_id: u64, education_code: i64) -> EngineResult<EducationGroup> {
    match education_code {
        1 => Ok(EducationGroup::Dropout),
        2 | 3 => Ok(EducationGroup::HighSchool),
        4 => Ok(EducationGroup::College),
        other => Err(EngineError::validation(
            STAGE,
            format!("unit {} has unrecognized education code {}", unit_id, other),
        )),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_mapping() {
        assert_eq!(classify(1, 1).unwrap(), EducationGroup::Dropout);
        assert_eq!(classify(1, 2).unwrap(), EducationGroup::HighSchool);
        assert_eq!(classify(1, 3).unwrap(), EducationGroup::HighSchool);
        assert_eq!(classify(1, 4).unwrap(), EducationGroup::College);
    }

    #[test]
    fn test_unknown_code_is_validation_error() {
        for code in [0, 5, -1, 99] {
            let err = classify(42, code).unwrap_err();
            assert!(matches!(err, EngineError::Validation { .. }));
            assert!(err.to_string().contains("unit 42"));
        }
    }

    #[test]
    fn test_groups_are_ordered() {
        assert!(EducationGroup::Dropout < EducationGroup::HighSchool);
        assert!(EducationGroup::HighSchool < EducationGroup::College);
        assert_eq!(EducationGroup::ALL.len(), 3);
    }

    #[test]
    fn test_labels_match_published_tables() {
        assert_eq!(EducationGroup::Dropout.label(), "No high school");
        assert_eq!(EducationGroup::HighSchool.label(), "High school/some college");
        assert_eq!(EducationGroup::College.label(), "College");
    }
}
