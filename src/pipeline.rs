// 🏭 Tabulation Pipeline - Fixed stage order, immutable snapshots
// merge → collapse → domain filter → tail trim → wealth → classify → stats.
// The order is part of the results: the tail trim sees the pre-wealth
// population, the negative-wealth drop sees the post-trim one.

use crate::aggregate::collapse_implicates;
use crate::classify::{classify, EducationGroup};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::filters::{domain_filter, trim_income_tail};
use crate::lorenz::{lorenz_curve, percentile_readoffs, wealth_quartile_shares, LorenzPoint};
use crate::merge::merge_balance_answers;
use crate::population::{Household, WeightedPopulation};
use crate::records::{BalanceAnswer, SurveyRecord};
use crate::report::{DistributionReport, GroupReport, StageCounts};
use crate::stats::{
    median_wealth_income_ratio, newborn_income_moments, population_share, wealth_share,
};
use crate::wealth::select_wealth;
use chrono::Utc;

// ============================================================================
// PIPELINE OUTPUT
// ============================================================================

/// Scalar report plus the two ordered Lorenz tables.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub report: DistributionReport,
    /// Pooled curve, ascending by (wealth, unit_id).
    pub pooled_lorenz: Vec<LorenzPoint>,
    /// Group curves concatenated in group order, each group-normalized.
    pub group_lorenz: Vec<LorenzPoint>,
}

// ============================================================================
// PIPELINE
// ============================================================================

#[derive(Debug)]
pub struct Pipeline {
    config: EngineConfig,
}

impl Pipeline {
    /// Validate the configuration up front; nothing runs on a bad config.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Pipeline { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full tabulation. Either every statistic is computed or the
    /// run fails with context; there is no partially filled report.
    pub fn run(
        &self,
        mut records: Vec<SurveyRecord>,
        answers: &[BalanceAnswer],
    ) -> EngineResult<PipelineOutput> {
        let survey_rows = records.len();

        if let Some(deflator) = self.config.deflator {
            for record in &mut records {
                record.rebase_dollars(deflator);
            }
        }

        let merged = merge_balance_answers(records, answers)?;
        let households = collapse_implicates(&merged)?;
        let household_count = households.len();

        let in_domain = domain_filter(households, &self.config);
        let after_domain_filter = in_domain.len();

        let trimmed = trim_income_tail(in_domain, self.config.tail_trim_threshold)?;
        let after_tail_trim = trimmed.len();

        let valued = select_wealth(&trimmed, &self.config);
        let mut classified = Vec::with_capacity(valued.len());
        for v in &valued {
            classified.push(Household {
                unit_id: v.unit_id,
                weight: v.weight,
                age: v.age,
                group: classify(v.unit_id, v.education_code)?,
                income: v.income,
                wealth: v.wealth,
            });
        }

        let population = WeightedPopulation::new(classified, "pipeline")?;

        let pooled_lorenz = lorenz_curve(&population)?;
        let pooled_readoffs =
            percentile_readoffs(&pooled_lorenz, &self.config.percentile_breaks);
        let quartile_shares_pct = wealth_quartile_shares(&population)?;

        let mut groups = Vec::with_capacity(EducationGroup::ALL.len());
        let mut group_lorenz = Vec::new();
        for &group in EducationGroup::ALL.iter() {
            let subpopulation = population.subpopulation(group)?;
            let curve = lorenz_curve(&subpopulation)?;
            let lorenz_readoffs = percentile_readoffs(&curve, &self.config.percentile_breaks);

            groups.push(GroupReport {
                group,
                label: group.label().to_string(),
                population: population_share(&population, group),
                wealth: wealth_share(&population, group)?,
                initial_income: newborn_income_moments(&population, group, &self.config)?,
                median_wealth_income: median_wealth_income_ratio(&population, group)?,
                lorenz_readoffs,
            });
            group_lorenz.extend(curve);
        }

        let report = DistributionReport {
            run_id: uuid::Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            config: self.config.clone(),
            input: None,
            counts: StageCounts {
                survey_rows,
                households: household_count,
                after_domain_filter,
                after_tail_trim,
                surviving: population.len(),
            },
            groups,
            pooled_readoffs,
            quartile_shares_pct,
        };

        Ok(PipelineOutput {
            report,
            pooled_lorenz,
            group_lorenz,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
