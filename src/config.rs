// ⚙️ Engine Configuration - Named constants, not scattered literals
// The robustness rerun swaps the wealth variant and nothing else.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// WEALTH VARIANT
// ============================================================================

/// Which liquid-wealth definition drives the run.
///
/// `Kaplan` is the definition behind the published tables; `WithInstallment`
/// additionally nets out non-vehicle installment debt and backs the
/// documented robustness check. Both are first-class: the same engine must
/// reproduce either from the same input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WealthVariant {
    Kaplan,
    WithInstallment,
}

impl WealthVariant {
    pub fn name(&self) -> &'static str {
        match self {
            WealthVariant::Kaplan => "kaplan",
            WealthVariant::WithInstallment => "with-installment",
        }
    }
}

impl FromStr for WealthVariant {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "kaplan" => Ok(WealthVariant::Kaplan),
            "with-installment" | "installment" => Ok(WealthVariant::WithInstallment),
            other => Err(EngineError::configuration(format!(
                "unknown wealth variant '{}' (expected 'kaplan' or 'with-installment')",
                other
            ))),
        }
    }
}

impl Default for WealthVariant {
    fn default() -> Self {
        WealthVariant::Kaplan
    }
}

// ============================================================================
// ENGINE CONFIG
// ============================================================================

/// Full run configuration.
///
/// Defaults reproduce the published tables; every value is overridable so
/// the robustness rerun goes through the same code path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Active liquid-wealth definition.
    pub wealth_variant: WealthVariant,

    /// Working-age band, inclusive on both ends.
    pub min_age: f64,
    pub max_age: f64,

    /// Units below this annual income are out of sample.
    pub income_floor: f64,

    /// Bottom share of the income-weighted population trimmed away.
    pub tail_trim_threshold: f64,

    /// Cash-equivalent adjustment applied to checking/savings balances.
    pub cash_multiplier: f64,

    /// Cohort age used for the initial-income moments.
    pub newborn_age: f64,

    /// Population-percent break points for the Lorenz read-offs.
    pub percentile_breaks: Vec<f64>,

    /// Optional dollar re-basing factor. Dollar-denominated fields are
    /// divided by this before any other stage, so extracts of a different
    /// dollar vintage reproduce the paper-vintage numbers.
    pub deflator: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            wealth_variant: WealthVariant::Kaplan,
            min_age: 25.0,
            max_age: 62.0,
            income_floor: 0.0,
            tail_trim_threshold: 0.05,
            cash_multiplier: 1.05,
            newborn_age: 25.0,
            percentile_breaks: vec![20.0, 40.0, 60.0, 80.0],
            deflator: None,
        }
    }
}

impl EngineConfig {
    /// Reject configurations that would make the run meaningless.
    pub fn validate(&self) -> EngineResult<()> {
        if self.min_age > self.max_age {
            return Err(EngineError::configuration(format!(
                "min_age {} exceeds max_age {}",
                self.min_age, self.max_age
            )));
        }
        if !(0.0..1.0).contains(&self.tail_trim_threshold) {
            return Err(EngineError::configuration(format!(
                "tail_trim_threshold {} outside [0, 1)",
                self.tail_trim_threshold
            )));
        }
        if self.cash_multiplier <= 0.0 {
            return Err(EngineError::configuration(format!(
                "cash_multiplier {} must be positive",
                self.cash_multiplier
            )));
        }
        if self.percentile_breaks.is_empty() {
            return Err(EngineError::configuration(
                "percentile_breaks must not be empty",
            ));
        }
        let mut prev = 0.0;
        for &b in &self.percentile_breaks {
            if !(0.0 < b && b < 100.0) {
                return Err(EngineError::configuration(format!(
                    "percentile break {} outside (0, 100)",
                    b
                )));
            }
            if b <= prev {
                return Err(EngineError::configuration(
                    "percentile_breaks must be strictly ascending",
                ));
            }
            prev = b;
        }
        if let Some(d) = self.deflator {
            if d <= 0.0 {
                return Err(EngineError::configuration(format!(
                    "deflator {} must be positive",
                    d
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
