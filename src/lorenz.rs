// 📈 Lorenz / Quantile Engine - Cumulative distribution of liquid wealth
// Every scan sorts by (wealth, unit_id): repeated runs on the same input
// must produce byte-identical sequences, because the read-offs are
// hand-transcribed downstream.

use crate::classify::EducationGroup;
use crate::error::{EngineError, EngineResult};
use crate::population::WeightedPopulation;
use crate::stats::round_to;
use serde::{Deserialize, Serialize};

const STAGE: &str = "lorenz";

/// Weighted quantile bins in the wealth-quartile breakdown.
pub const QUARTILE_BINS: usize = 4;

// ============================================================================
// LORENZ POINT
// ============================================================================

/// One step of the empirical Lorenz curve, both axes ×100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LorenzPoint {
    pub unit_id: u64,
    pub group: EducationGroup,
    /// Inclusive cumulative normalized weight, in percent.
    pub cum_population_pct: f64,
    /// Inclusive cumulative share of total wealth contribution, in percent.
    pub cum_wealth_pct: f64,
}

// ============================================================================
// CURVE
// ============================================================================

/// Empirical Lorenz curve of a population, ascending by `(wealth, unit_id)`.
///
/// Each household contributes `normalized_weight × wealth / Σ(·)` to the
/// wealth axis. For a group curve, pass the group's renormalized
/// subpopulation: its denominator is the group's own total wealth, not a
/// slice of the pooled curve.
pub fn lorenz_curve(population: &WeightedPopulation) -> EngineResult<Vec<LorenzPoint>> {
    let mut order: Vec<(&crate::population::Household, f64)> = population.iter().collect();
    order.sort_by(|a, b| a.0.wealth.total_cmp(&b.0.wealth).then(a.0.unit_id.cmp(&b.0.unit_id)));

    let total_contribution: f64 = order.iter().map(|(h, nw)| nw * h.wealth).sum();
    if !(total_contribution > 0.0) {
        return Err(EngineError::integrity(
            STAGE,
            format!(
                "total wealth contribution {} is not positive",
                total_contribution
            ),
        ));
    }

    let mut cum_population = 0.0;
    let mut cum_wealth = 0.0;
    let mut points = Vec::with_capacity(order.len());
    for (household, nw) in order {
        cum_population += nw;
        cum_wealth += nw * household.wealth / total_contribution;
        points.push(LorenzPoint {
            unit_id: household.unit_id,
            group: household.group,
            cum_population_pct: cum_population * 100.0,
            cum_wealth_pct: cum_wealth * 100.0,
        });
    }
    Ok(points)
}

// ============================================================================
// PERCENTILE READ-OFF
// ============================================================================

/// Cumulative wealth percent at one population-percent break point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileReadoff {
    pub population_pct: f64,
    /// Share of wealth held below the break, rounded to 0.01 for display.
    pub wealth_pct: f64,
}

/// Wealth share at the last observation strictly below `break_pct`.
///
/// Deliberately NOT an interpolated crossing: the published convention takes
/// the final sample before the threshold, which slightly understates the
/// curve at round percentiles. With no observation below the break the
/// bottom of the curve holds nothing, so the share is 0.
pub fn wealth_share_below(points: &[LorenzPoint], break_pct: f64) -> f64 {
    points
        .iter()
        .filter(|p| p.cum_population_pct < break_pct)
        .map(|p| p.cum_wealth_pct)
        .fold(0.0, f64::max)
}

/// Read the curve off at each configured break point.
pub fn percentile_readoffs(points: &[LorenzPoint], breaks: &[f64]) -> Vec<PercentileReadoff> {
    breaks
        .iter()
        .map(|&b| PercentileReadoff {
            population_pct: b,
            wealth_pct: round_to(wealth_share_below(points, b), 2),
        })
        .collect()
}

// ============================================================================
// WEALTH QUARTILES
// ============================================================================

/// Share of total pooled wealth held by each weighted wealth quartile,
/// in percent, poorest bin first.
///
/// Binning is weight-aware: a household lands in the bin its inclusive
/// cumulative normalized weight falls into, so each bin covers one quarter
/// of the population by weight, not by row count.
pub fn wealth_quartile_shares(population: &WeightedPopulation) -> EngineResult<[f64; QUARTILE_BINS]> {
    let mut order: Vec<(&crate::population::Household, f64)> = population.iter().collect();
    order.sort_by(|a, b| a.0.wealth.total_cmp(&b.0.wealth).then(a.0.unit_id.cmp(&b.0.unit_id)));

    let total_contribution: f64 = order.iter().map(|(h, nw)| nw * h.wealth).sum();
    if !(total_contribution > 0.0) {
        return Err(EngineError::integrity(
            STAGE,
            format!(
                "total wealth contribution {} is not positive",
                total_contribution
            ),
        ));
    }

    let mut shares = [0.0; QUARTILE_BINS];
    let mut cumulative = 0.0;
    for (household, nw) in order {
        cumulative += nw;
        let bin = ((cumulative * QUARTILE_BINS as f64).ceil() as usize)
            .clamp(1, QUARTILE_BINS)
            - 1;
        shares[bin] += nw * household.wealth / total_contribution * 100.0;
    }
    Ok(shares)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::Household;

    fn make_household(unit_id: u64, weight: f64, wealth: f64) -> Household {
        Household {
            unit_id,
            weight,
            age: 40.0,
            group: EducationGroup::HighSchool,
            income: 50000.0,
            wealth,
        }
    }

    fn make_population(households: Vec<Household>) -> WeightedPopulation {
        WeightedPopulation::new(households, "test").unwrap()
    }

    #[test]
    fn test_three_unit_curve() {
        // Weights {1,1,1}, wealth {10,20,30} →
        // (33.3, 16.7), (66.7, 50), (100, 100).
        let pop = make_population(vec![
            make_household(1, 1.0, 10.0),
            make_household(2, 1.0, 20.0),
            make_household(3, 1.0, 30.0),
        ]);

        let points = lorenz_curve(&pop).unwrap();
        assert_eq!(points.len(), 3);
        assert!((points[0].cum_population_pct - 100.0 / 3.0).abs() < 1e-9);
        assert!((points[0].cum_wealth_pct - 100.0 / 6.0).abs() < 1e-9);
        assert!((points[1].cum_population_pct - 200.0 / 3.0).abs() < 1e-9);
        assert!((points[1].cum_wealth_pct - 50.0).abs() < 1e-9);
        assert!((points[2].cum_population_pct - 100.0).abs() < 1e-9);
        assert!((points[2].cum_wealth_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_curve_is_sorted_by_wealth_then_unit_id() {
        let pop = make_population(vec![
            make_household(3, 1.0, 20.0),
            make_household(2, 1.0, 20.0),
            make_household(1, 1.0, 50.0),
        ]);

        let points = lorenz_curve(&pop).unwrap();
        let ids: Vec<u64> = points.iter().map(|p| p.unit_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_curve_axes_are_monotone_and_reach_hundred() {
        let pop = make_population(vec![
            make_household(1, 5.0, 0.0),
            make_household(2, 1.0, 100.0),
            make_household(3, 2.0, 40.0),
            make_household(4, 2.0, 300.0),
        ]);

        let points = lorenz_curve(&pop).unwrap();
        for pair in points.windows(2) {
            assert!(pair[1].cum_population_pct >= pair[0].cum_population_pct);
            assert!(pair[1].cum_wealth_pct >= pair[0].cum_wealth_pct);
        }
        let last = &points[points.len() - 1];
        assert!((last.cum_population_pct - 100.0).abs() < 1e-9);
        assert!((last.cum_wealth_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_readoff_takes_last_observation_strictly_below_break() {
        // Cumulative population hits exactly 20 at the first point; "strictly
        // below 20" excludes it, so the read-off is 0.
        let pop = make_population(vec![
            make_household(1, 20.0, 10.0),
            make_household(2, 30.0, 20.0),
            make_household(3, 50.0, 100.0),
        ]);

        let points = lorenz_curve(&pop).unwrap();
        assert_eq!(wealth_share_below(&points, 20.0), 0.0);

        // Below 60: points at 20 and 50 qualify; the max is the 50% point.
        let expected = points[1].cum_wealth_pct;
        assert!((wealth_share_below(&points, 60.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_readoff_with_no_observation_below_break_is_zero() {
        let pop = make_population(vec![make_household(1, 1.0, 10.0)]);
        let points = lorenz_curve(&pop).unwrap();
        assert_eq!(wealth_share_below(&points, 20.0), 0.0);
    }

    #[test]
    fn test_percentile_readoffs_shape() {
        let pop = make_population(vec![
            make_household(1, 1.0, 10.0),
            make_household(2, 1.0, 20.0),
            make_household(3, 1.0, 30.0),
            make_household(4, 1.0, 40.0),
        ]);
        let points = lorenz_curve(&pop).unwrap();
        let readoffs = percentile_readoffs(&points, &[20.0, 40.0, 60.0, 80.0]);

        assert_eq!(readoffs.len(), 4);
        assert_eq!(readoffs[0].population_pct, 20.0);
        // Below 40%: only the first point (25, 10). Share 10/100 = 10%.
        assert_eq!(readoffs[1].wealth_pct, 10.0);
        // Read-offs never decrease along the breaks.
        for pair in readoffs.windows(2) {
            assert!(pair[1].wealth_pct >= pair[0].wealth_pct);
        }
    }

    #[test]
    fn test_quartile_shares_sum_to_hundred() {
        let pop = make_population(vec![
            make_household(1, 3.0, 5.0),
            make_household(2, 1.0, 10.0),
            make_household(3, 4.0, 50.0),
            make_household(4, 2.0, 400.0),
            make_household(5, 2.0, 1000.0),
        ]);

        let shares = wealth_quartile_shares(&pop).unwrap();
        let total: f64 = shares.iter().sum();
        assert!((total - 100.0).abs() < 1e-9);
        // Top quartile holds the most.
        assert!(shares[3] > shares[0]);
    }

    #[test]
    fn test_quartile_binning_is_weight_aware() {
        // Four equal-weight households: one per bin, so each bin's share is
        // that household's share of total wealth.
        let pop = make_population(vec![
            make_household(1, 1.0, 10.0),
            make_household(2, 1.0, 20.0),
            make_household(3, 1.0, 30.0),
            make_household(4, 1.0, 40.0),
        ]);

        let shares = wealth_quartile_shares(&pop).unwrap();
        assert!((shares[0] - 10.0).abs() < 1e-9);
        assert!((shares[1] - 20.0).abs() < 1e-9);
        assert!((shares[2] - 30.0).abs() < 1e-9);
        assert!((shares[3] - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_quartile_binning_follows_weight_not_row_count() {
        // One household carries half the population weight: it fills bins 1-2
        // by itself and the remaining three rows share the top half.
        let pop = make_population(vec![
            make_household(1, 5.0, 0.0),
            make_household(2, 2.0, 60.0),
            make_household(3, 2.0, 100.0),
            make_household(4, 1.0, 200.0),
        ]);

        let shares = wealth_quartile_shares(&pop).unwrap();
        // Household 1 (wealth 0) spans the bottom two bins alone.
        assert_eq!(shares[0], 0.0);
        assert_eq!(shares[1], 0.0);
        assert!((shares.iter().sum::<f64>() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_total_wealth_is_integrity_error() {
        let pop = make_population(vec![make_household(1, 1.0, 0.0)]);
        assert!(matches!(
            lorenz_curve(&pop).unwrap_err(),
            EngineError::Integrity { .. }
        ));
        assert!(matches!(
            wealth_quartile_shares(&pop).unwrap_err(),
            EngineError::Integrity { .. }
        ));
    }
}
