// Liquid Wealth Tabulator - Core Library
// Survey extract → merged, collapsed, filtered population → published
// distribution statistics (shares, income moments, medians, Lorenz tables).

pub mod records;
pub mod merge;
pub mod aggregate;
pub mod filters;
pub mod wealth;
pub mod classify;
pub mod population;
pub mod stats;
pub mod lorenz;
pub mod config;
pub mod error;
pub mod report;
pub mod pipeline;

// Re-export commonly used types
pub use records::{
    load_balance_csv, load_survey_csv, file_sha256,
    BalanceAnswer, SurveyRecord,
};
pub use merge::{merge_balance_answers, FULL_PAYMENT_CODE};
pub use aggregate::{collapse_implicates, HouseholdRecord, IMPLICATES_PER_UNIT};
pub use filters::{domain_filter, trim_income_tail};
pub use wealth::{select_wealth, wealth_measures, ValuedHousehold, WealthMeasures};
pub use classify::{classify, EducationGroup};
pub use population::{Household, WeightedPopulation};
pub use stats::{
    median_wealth_income_ratio, newborn_income_moments, population_share, wealth_share,
    weighted_mean, weighted_median, weighted_sd,
    InitialIncomeMoments, MedianRatio, Share, WeightedSample,
};
pub use lorenz::{
    lorenz_curve, percentile_readoffs, wealth_quartile_shares, wealth_share_below,
    LorenzPoint, PercentileReadoff, QUARTILE_BINS,
};
pub use config::{EngineConfig, WealthVariant};
pub use error::{EngineError, EngineResult};
pub use report::{
    write_lorenz_csv, DistributionReport, GroupReport, InputProvenance, StageCounts,
};
pub use pipeline::{Pipeline, PipelineOutput};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
