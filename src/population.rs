// 👪 Weighted Population - Immutable snapshot with normalized weights
// Normalized weights always describe the snapshot they were computed from;
// every filter produces a new snapshot, never a patched denominator.

use crate::classify::EducationGroup;
use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

// ============================================================================
// HOUSEHOLD
// ============================================================================

/// Fully derived household: classified, valued, and inside the sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Household {
    pub unit_id: u64,
    pub weight: f64,
    pub age: f64,
    pub group: EducationGroup,
    /// Annual permanent income.
    pub income: f64,
    /// Liquid wealth under the active variant; non-negative by construction.
    pub wealth: f64,
}

// ============================================================================
// WEIGHTED POPULATION
// ============================================================================

/// A surviving set of households plus per-unit normalized weights that sum
/// to one over exactly this set.
#[derive(Debug, Clone)]
pub struct WeightedPopulation {
    households: Vec<Household>,
    normalized: Vec<f64>,
    total_weight: f64,
}

impl WeightedPopulation {
    /// Build a snapshot from a surviving set, normalizing weights over it.
    ///
    /// `stage` names the caller for error context. An empty set (or one with
    /// no positive weight) has no distribution to describe.
    pub fn new(households: Vec<Household>, stage: &'static str) -> EngineResult<Self> {
        if households.is_empty() {
            return Err(EngineError::empty_population(
                stage,
                "no surviving households",
            ));
        }
        for h in &households {
            if !(h.weight > 0.0) {
                return Err(EngineError::integrity(
                    stage,
                    format!("unit {} has non-positive weight {}", h.unit_id, h.weight),
                ));
            }
        }

        let total_weight: f64 = households.iter().map(|h| h.weight).sum();
        let normalized = households.iter().map(|h| h.weight / total_weight).collect();

        Ok(WeightedPopulation {
            households,
            normalized,
            total_weight,
        })
    }

    pub fn len(&self) -> usize {
        self.households.len()
    }

    pub fn is_empty(&self) -> bool {
        self.households.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    pub fn households(&self) -> &[Household] {
        &self.households
    }

    /// Iterate `(household, normalized_weight)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Household, f64)> {
        self.households.iter().zip(self.normalized.iter().copied())
    }

    /// Sum of normalized weights; 1.0 up to float tolerance, by construction.
    pub fn normalized_sum(&self) -> f64 {
        self.normalized.iter().sum()
    }

    /// Total normalized weight carried by one group.
    pub fn group_weight(&self, group: EducationGroup) -> f64 {
        self.iter()
            .filter(|(h, _)| h.group == group)
            .map(|(_, nw)| nw)
            .sum()
    }

    /// A group's own snapshot, with weights renormalized so they sum to one
    /// within the group. An empty group is an explicit error, never a zero.
    pub fn subpopulation(&self, group: EducationGroup) -> EngineResult<WeightedPopulation> {
        let members: Vec<Household> = self
            .households
            .iter()
            .filter(|h| h.group == group)
            .cloned()
            .collect();
        if members.is_empty() {
            return Err(EngineError::empty_population(
                "subpopulation",
                format!("group {} has no surviving households", group.name()),
            ));
        }
        WeightedPopulation::new(members, "subpopulation")
    }
}

// ============================================================================
// TESTS
// ============================================================================
