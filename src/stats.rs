// 📊 Weighted Statistics Engine - Shares, log-income moments, step medians
// Each statistic exposes the raw value AND the display rounding used in the
// published tables; calibration consumers read the raw one.

use crate::classify::EducationGroup;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::population::WeightedPopulation;
use serde::{Deserialize, Serialize};

const STAGE: &str = "stats";

/// Round to `places` decimal places, matching the table formatting.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

// ============================================================================
// WEIGHTED PRIMITIVES
// ============================================================================

/// Weighted mean `Σw·x / Σw`.
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> EngineResult<f64> {
    check_samples(values, weights)?;
    let total: f64 = weights.iter().sum();
    let sum: f64 = values.iter().zip(weights).map(|(x, w)| x * w).sum();
    Ok(sum / total)
}

/// Weighted standard deviation `sqrt(Σw·(x−μ_w)² / Σw)`.
pub fn weighted_sd(values: &[f64], weights: &[f64]) -> EngineResult<f64> {
    let mean = weighted_mean(values, weights)?;
    let total: f64 = weights.iter().sum();
    let sum_sq: f64 = values
        .iter()
        .zip(weights)
        .map(|(x, w)| w * (x - mean) * (x - mean))
        .sum();
    Ok((sum_sq / total).sqrt())
}

fn check_samples(values: &[f64], weights: &[f64]) -> EngineResult<()> {
    if values.is_empty() {
        return Err(EngineError::empty_population(STAGE, "no observations"));
    }
    if values.len() != weights.len() {
        return Err(EngineError::integrity(
            STAGE,
            format!(
                "{} values but {} weights",
                values.len(),
                weights.len()
            ),
        ));
    }
    let total: f64 = weights.iter().sum();
    if !(total > 0.0) {
        return Err(EngineError::integrity(
            STAGE,
            format!("total weight {} is not positive", total),
        ));
    }
    Ok(())
}

/// One observation for the weighted median.
#[derive(Debug, Clone, Copy)]
pub struct WeightedSample {
    pub unit_id: u64,
    pub value: f64,
    pub weight: f64,
}

/// Step-function weighted median: the first observed value whose inclusive
/// cumulative weight reaches half of the total, ascending by
/// `(value, unit_id)`. No interpolation between bracketing observations:
/// the published convention reports the observed value at the crossing.
pub fn weighted_median(mut samples: Vec<WeightedSample>) -> EngineResult<f64> {
    if samples.is_empty() {
        return Err(EngineError::empty_population(STAGE, "no observations for median"));
    }
    let total: f64 = samples.iter().map(|s| s.weight).sum();
    if !(total > 0.0) {
        return Err(EngineError::integrity(
            STAGE,
            format!("total weight {} is not positive", total),
        ));
    }

    samples.sort_by(|a, b| a.value.total_cmp(&b.value).then(a.unit_id.cmp(&b.unit_id)));

    let half = total / 2.0;
    let mut cumulative = 0.0;
    for sample in &samples {
        cumulative += sample.weight;
        if cumulative >= half {
            return Ok(sample.value);
        }
    }
    // Reachable only through accumulated rounding on the last step.
    Ok(samples[samples.len() - 1].value)
}

// ============================================================================
// GROUP SHARES
// ============================================================================

/// A share of the pooled population or pooled wealth: raw fraction plus the
/// 0.1-percentage-point display rounding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Share {
    pub fraction: f64,
    pub display_pct: f64,
}

impl Share {
    fn from_fraction(fraction: f64) -> Self {
        Share {
            fraction,
            display_pct: round_to(fraction * 100.0, 1),
        }
    }
}

/// Group's share of total normalized weight.
pub fn population_share(population: &WeightedPopulation, group: EducationGroup) -> Share {
    Share::from_fraction(population.group_weight(group))
}

/// Group's share of total pooled wealth contribution
/// `Σ normalized_weight·wealth`.
pub fn wealth_share(
    population: &WeightedPopulation,
    group: EducationGroup,
) -> EngineResult<Share> {
    let total: f64 = population.iter().map(|(h, nw)| nw * h.wealth).sum();
    if !(total > 0.0) {
        return Err(EngineError::integrity(
            STAGE,
            format!("total pooled wealth contribution {} is not positive", total),
        ));
    }
    let group_sum: f64 = population
        .iter()
        .filter(|(h, _)| h.group == group)
        .map(|(h, nw)| nw * h.wealth)
        .sum();
    Ok(Share::from_fraction(group_sum / total))
}

// ============================================================================
// INITIAL INCOME MOMENTS
// ============================================================================

/// Weighted moments of log quarterly income for the newborn cohort of one
/// group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InitialIncomeMoments {
    /// Weighted mean of log quarterly income.
    pub mean_log: f64,
    /// Weighted standard deviation of log quarterly income.
    pub sd_log: f64,
    /// `exp(mean_log)`: mean initial quarterly income level.
    pub mean_level: f64,
    /// Mean level in $1000s, rounded to 0.1 (table format).
    pub display_mean_thousands: f64,
    /// SD rounded to 0.01 (table format).
    pub display_sd: f64,
}

/// Moments of `log(income / 4)` over the group's units at the newborn age.
///
/// The cohort is the youngest age surviving the domain filter; its moments
/// seed the income process of newly born model agents.
pub fn newborn_income_moments(
    population: &WeightedPopulation,
    group: EducationGroup,
    config: &EngineConfig,
) -> EngineResult<InitialIncomeMoments> {
    let mut values = Vec::new();
    let mut weights = Vec::new();
    for (h, _) in population.iter() {
        if h.group == group && h.age == config.newborn_age {
            values.push((h.income / 4.0).ln());
            weights.push(h.weight);
        }
    }
    if values.is_empty() {
        return Err(EngineError::empty_population(
            STAGE,
            format!(
                "group {} has no households at age {}",
                group.name(),
                config.newborn_age
            ),
        ));
    }

    let mean_log = weighted_mean(&values, &weights)?;
    let sd_log = weighted_sd(&values, &weights)?;
    if !mean_log.is_finite() || !sd_log.is_finite() {
        return Err(EngineError::integrity(
            STAGE,
            format!(
                "non-finite initial-income moments for group {} (zero income at age {}?)",
                group.name(),
                config.newborn_age
            ),
        ));
    }

    let mean_level = mean_log.exp();
    Ok(InitialIncomeMoments {
        mean_log,
        sd_log,
        mean_level,
        display_mean_thousands: round_to(mean_level / 1000.0, 1),
        display_sd: round_to(sd_log, 2),
    })
}

// ============================================================================
// MEDIAN WEALTH / INCOME RATIO
// ============================================================================

/// Weighted median of wealth over annual income within a group, with the
/// table's percent display forms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MedianRatio {
    /// Median of wealth / annual income.
    pub ratio: f64,
    /// Ratio ×100, rounded to 0.01 (percent of annual income).
    pub display_annual_pct: f64,
    /// Annual display ×4 (percent of quarterly income).
    pub display_quarterly_pct: f64,
}

pub fn median_wealth_income_ratio(
    population: &WeightedPopulation,
    group: EducationGroup,
) -> EngineResult<MedianRatio> {
    let subpopulation = population.subpopulation(group)?;
    let samples: Vec<WeightedSample> = subpopulation
        .iter()
        .map(|(h, nw)| WeightedSample {
            unit_id: h.unit_id,
            value: h.wealth / h.income,
            weight: nw,
        })
        .collect();

    let ratio = weighted_median(samples)?;
    if !ratio.is_finite() {
        return Err(EngineError::integrity(
            STAGE,
            format!(
                "non-finite median wealth/income ratio for group {} (zero income?)",
                group.name()
            ),
        ));
    }

    let display_annual_pct = round_to(ratio * 100.0, 2);
    Ok(MedianRatio {
        ratio,
        display_annual_pct,
        display_quarterly_pct: display_annual_pct * 4.0,
    })
}

// ============================================================================
// TESTS
// ============================================================================
