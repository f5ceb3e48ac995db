// ⚠️ Error Taxonomy - Every failure carries stage + record context
// No silent repair, no partial output: the first error aborts the run.

use std::fmt;

// ============================================================================
// ENGINE ERROR
// ============================================================================

/// All fatal conditions the tabulation engine can surface.
///
/// Every variant names the pipeline stage that detected it so the offending
/// record can be located in the source extract.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Structural damage in the input: duplicate merge keys, missing
    /// implicates, non-positive weights. Never repaired silently.
    Integrity { stage: &'static str, detail: String },

    /// A field value outside its documented domain (e.g. an education code
    /// that maps to no group).
    Validation { stage: &'static str, detail: String },

    /// A statistic was requested over a population with no eligible units.
    /// Distinct from zero: a zero here would poison calibration output.
    EmptyPopulation { stage: &'static str, detail: String },

    /// Bad run configuration, rejected before any record is touched.
    Configuration { detail: String },
}

impl EngineError {
    pub fn integrity(stage: &'static str, detail: impl Into<String>) -> Self {
        EngineError::Integrity {
            stage,
            detail: detail.into(),
        }
    }

    pub fn validation(stage: &'static str, detail: impl Into<String>) -> Self {
        EngineError::Validation {
            stage,
            detail: detail.into(),
        }
    }

    pub fn empty_population(stage: &'static str, detail: impl Into<String>) -> Self {
        EngineError::EmptyPopulation {
            stage,
            detail: detail.into(),
        }
    }

    pub fn configuration(detail: impl Into<String>) -> Self {
        EngineError::Configuration {
            detail: detail.into(),
        }
    }

    /// Stage that raised the error ("config" for configuration errors).
    pub fn stage(&self) -> &str {
        match self {
            EngineError::Integrity { stage, .. } => stage,
            EngineError::Validation { stage, .. } => stage,
            EngineError::EmptyPopulation { stage, .. } => stage,
            EngineError::Configuration { .. } => "config",
        }
    }

    pub fn is_empty_population(&self) -> bool {
        matches!(self, EngineError::EmptyPopulation { .. })
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Integrity { stage, detail } => {
                write!(f, "integrity error [{}]: {}", stage, detail)
            }
            EngineError::Validation { stage, detail } => {
                write!(f, "validation error [{}]: {}", stage, detail)
            }
            EngineError::EmptyPopulation { stage, detail } => {
                write!(f, "empty population [{}]: {}", stage, detail)
            }
            EngineError::Configuration { detail } => {
                write!(f, "configuration error: {}", detail)
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Result alias used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;

// ============================================================================
// TESTS
// ============================================================================
