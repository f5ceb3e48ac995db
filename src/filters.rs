// 🚧 Sample Filters - Domain constraints + income-weighted tail trim
// The trim removes the bottom share of the WEIGHTED population, not the
// bottom share of the row count; the two differ whenever weights do.

use crate::aggregate::HouseholdRecord;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

const STAGE: &str = "filter";

/// Keep households inside the age band with non-negative income.
pub fn domain_filter(households: Vec<HouseholdRecord>, config: &EngineConfig) -> Vec<HouseholdRecord> {
    households
        .into_iter()
        .filter(|h| {
            h.age >= config.min_age && h.age <= config.max_age && h.income >= config.income_floor
        })
        .collect()
}

/// Drop the bottom income tail up to `threshold` of cumulative normalized
/// weight.
///
/// Survivors are sorted ascending by `(income, unit_id)` and a household is
/// dropped when its inclusive cumulative normalized weight is still strictly
/// below the threshold; a household sitting exactly on the threshold stays.
/// Weights are normalized over the set passed in, never a cached total.
///
/// Output order is the income sort order, which later stages re-sort as they
/// need.
pub fn trim_income_tail(
    mut households: Vec<HouseholdRecord>,
    threshold: f64,
) -> EngineResult<Vec<HouseholdRecord>> {
    if households.is_empty() {
        return Err(EngineError::empty_population(
            STAGE,
            "no households left before tail trim",
        ));
    }

    let total_weight: f64 = households.iter().map(|h| h.weight).sum();
    if !(total_weight > 0.0) {
        return Err(EngineError::integrity(
            STAGE,
            format!("total weight {} is not positive", total_weight),
        ));
    }

    households.sort_by(|a, b| a.income.total_cmp(&b.income).then(a.unit_id.cmp(&b.unit_id)));

    let mut cumulative = 0.0;
    let mut kept = Vec::with_capacity(households.len());
    for household in households {
        cumulative += household.weight / total_weight;
        if cumulative < threshold {
            continue;
        }
        kept.push(household);
    }

    if kept.is_empty() {
        return Err(EngineError::empty_population(
            STAGE,
            format!("tail trim at {} removed every household", threshold),
        ));
    }
    Ok(kept)
}

// ============================================================================
// TESTS
// ============================================================================
