// 🧮 Respondent Aggregator - Collapse five implicates into one household
// Weight is inflated ×5, never averaged down: each household stands in for
// its full slice of the population once the implicate axis is gone.

use crate::error::{EngineError, EngineResult};
use crate::records::SurveyRecord;
use std::collections::BTreeMap;

const STAGE: &str = "aggregate";

/// Implicates recorded per sampling unit in the extract.
pub const IMPLICATES_PER_UNIT: usize = 5;

// ============================================================================
// HOUSEHOLD RECORD
// ============================================================================

/// One row per household, implicate axis eliminated.
///
/// Imputed dollar fields are implicate means; `weight` is the mean implicate
/// weight times [`IMPLICATES_PER_UNIT`]; `age` is the implicate mean rounded
/// to the nearest year.
#[derive(Debug, Clone)]
pub struct HouseholdRecord {
    pub unit_id: u64,
    pub weight: f64,
    pub age: f64,
    pub education_code: i64,
    pub income: f64,
    pub liquid_cash: f64,
    pub certificates_of_deposit: f64,
    pub mutual_funds: f64,
    pub stocks: f64,
    pub bonds: f64,
    pub credit_card_balance: f64,
    pub installment_debt: f64,
    pub vehicle_installment_debt: f64,
}

// ============================================================================
// COLLAPSE
// ============================================================================

/// Group records by household and collapse each group of five implicates.
///
/// Output order is ascending `unit_id`, independent of input order. A
/// household with an implicate set other than exactly {1..5} is damaged
/// input and aborts the run.
pub fn collapse_implicates(records: &[SurveyRecord]) -> EngineResult<Vec<HouseholdRecord>> {
    let mut groups: BTreeMap<u64, Vec<&SurveyRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.unit_id).or_default().push(record);
    }

    let mut households = Vec::with_capacity(groups.len());
    for (unit_id, implicates) in groups {
        households.push(collapse_group(unit_id, &implicates)?);
    }
    Ok(households)
}

fn collapse_group(unit_id: u64, implicates: &[&SurveyRecord]) -> EngineResult<HouseholdRecord> {
    if implicates.len() != IMPLICATES_PER_UNIT {
        return Err(EngineError::integrity(
            STAGE,
            format!(
                "unit {} has {} implicates, expected {}",
                unit_id,
                implicates.len(),
                IMPLICATES_PER_UNIT
            ),
        ));
    }

    let mut ids: Vec<u32> = implicates.iter().map(|r| r.implicate_id).collect();
    ids.sort_unstable();
    if ids != [1, 2, 3, 4, 5] {
        return Err(EngineError::integrity(
            STAGE,
            format!("unit {} has implicate ids {:?}, expected 1..=5", unit_id, ids),
        ));
    }

    let n = implicates.len() as f64;
    let mean = |f: fn(&SurveyRecord) -> f64| implicates.iter().map(|r| f(r)).sum::<f64>() / n;

    // The implicate with the lowest id carries the categorical fields.
    let first = implicates
        .iter()
        .min_by_key(|r| r.implicate_id)
        .ok_or_else(|| EngineError::integrity(STAGE, format!("unit {} has no implicates", unit_id)))?;

    Ok(HouseholdRecord {
        unit_id,
        weight: mean(|r| r.weight) * IMPLICATES_PER_UNIT as f64,
        age: mean(|r| r.age).round(),
        education_code: first.education_code,
        income: mean(|r| r.income),
        liquid_cash: mean(|r| r.liquid_cash),
        certificates_of_deposit: mean(|r| r.certificates_of_deposit),
        mutual_funds: mean(|r| r.mutual_funds),
        stocks: mean(|r| r.stocks),
        bonds: mean(|r| r.bonds),
        credit_card_balance: mean(|r| r.credit_card_balance),
        installment_debt: mean(|r| r.installment_debt),
        vehicle_installment_debt: mean(|r| r.vehicle_installment_debt),
    })
}

// ============================================================================
// TESTS
// ============================================================================
