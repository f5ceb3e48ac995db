// 💰 Wealth Constructor - Liquid wealth from asset/debt fields
// Two definitions off one input; negative-wealth households leave the
// sample entirely (dropped, never clamped to zero).

use crate::aggregate::HouseholdRecord;
use crate::config::{EngineConfig, WealthVariant};

// ============================================================================
// WEALTH MEASURES
// ============================================================================

/// Both liquid-wealth definitions for one household.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WealthMeasures {
    /// Cash-like assets and directly held securities, net of revolving debt
    /// and non-vehicle installment debt.
    pub with_installment: f64,

    /// Same, but installment debt left in place (the published definition).
    pub kaplan: f64,
}

impl WealthMeasures {
    pub fn select(&self, variant: WealthVariant) -> f64 {
        match variant {
            WealthVariant::Kaplan => self.kaplan,
            WealthVariant::WithInstallment => self.with_installment,
        }
    }
}

/// Compute both definitions from the aggregated fields.
///
/// `cash_multiplier` marks checking/savings balances up to their
/// cash-equivalent value before netting debts.
pub fn wealth_measures(household: &HouseholdRecord, cash_multiplier: f64) -> WealthMeasures {
    let gross = household.liquid_cash * cash_multiplier
        + household.certificates_of_deposit
        + household.mutual_funds
        + household.stocks
        + household.bonds;
    let kaplan = gross - household.credit_card_balance;
    let with_installment =
        kaplan - (household.installment_debt - household.vehicle_installment_debt);

    WealthMeasures {
        with_installment,
        kaplan,
    }
}

// ============================================================================
// VALUED HOUSEHOLD
// ============================================================================

/// Household with its active-variant wealth attached; asset/debt detail is
/// no longer needed past this stage.
#[derive(Debug, Clone)]
pub struct ValuedHousehold {
    pub unit_id: u64,
    pub weight: f64,
    pub age: f64,
    pub education_code: i64,
    pub income: f64,
    pub wealth: f64,
}

/// Attach the selected wealth measure and drop negative-wealth households.
///
/// Must run after the income tail trim: the two filters are defined over
/// different intermediate populations and reordering them changes results.
pub fn select_wealth(
    households: &[HouseholdRecord],
    config: &EngineConfig,
) -> Vec<ValuedHousehold> {
    households
        .iter()
        .filter_map(|h| {
            let wealth = wealth_measures(h, config.cash_multiplier).select(config.wealth_variant);
            if wealth < 0.0 {
                return None;
            }
            Some(ValuedHousehold {
                unit_id: h.unit_id,
                weight: h.weight,
                age: h.age,
                education_code: h.education_code,
                income: h.income,
                wealth,
            })
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
