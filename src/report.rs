// 📋 Distribution Report - Everything one run produces, in one place
// Raw values for calibration consumers, display roundings for the tables,
// provenance so a transcribed number can be traced to its exact extract.

use crate::classify::EducationGroup;
use crate::config::EngineConfig;
use crate::lorenz::{LorenzPoint, PercentileReadoff, QUARTILE_BINS};
use crate::stats::{round_to, InitialIncomeMoments, MedianRatio, Share};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// STAGE COUNTS
// ============================================================================

/// Unit counts after each pipeline stage; the drop pattern is the first
/// thing to check when a statistic moves between extract vintages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StageCounts {
    pub survey_rows: usize,
    pub households: usize,
    pub after_domain_filter: usize,
    pub after_tail_trim: usize,
    pub surviving: usize,
}

// ============================================================================
// INPUT PROVENANCE
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputProvenance {
    pub survey_file: String,
    pub survey_sha256: String,
    pub balance_file: String,
    pub balance_sha256: String,
}

// ============================================================================
// GROUP REPORT
// ============================================================================

/// All published statistics for one education group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupReport {
    pub group: EducationGroup,
    pub label: String,
    pub population: Share,
    pub wealth: Share,
    pub initial_income: InitialIncomeMoments,
    pub median_wealth_income: MedianRatio,
    /// Read-offs of the group's own (group-normalized) Lorenz curve.
    pub lorenz_readoffs: Vec<PercentileReadoff>,
}

// ============================================================================
// DISTRIBUTION REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub config: EngineConfig,
    pub input: Option<InputProvenance>,
    pub counts: StageCounts,
    pub groups: Vec<GroupReport>,
    /// Read-offs of the pooled Lorenz curve.
    pub pooled_readoffs: Vec<PercentileReadoff>,
    /// Share of total wealth held by each weighted wealth quartile.
    pub quartile_shares_pct: [f64; QUARTILE_BINS],
}

impl DistributionReport {
    /// Console rendering in the shape of the published tables.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(60);

        out.push_str(&format!("{}\n", rule));
        out.push_str("POPULATION AND WEALTH DISTRIBUTION BY EDUCATION\n");
        out.push_str(&format!("{}\n", rule));
        for g in &self.groups {
            out.push_str(&format!(
                "  {:<26} {:>5.1}% of population  {:>5.1}% of wealth\n",
                g.label, g.population.display_pct, g.wealth.display_pct
            ));
        }

        out.push_str(&format!("\n{}\n", rule));
        out.push_str(&format!(
            "INITIAL INCOME STATISTICS (AGE {})\n",
            self.config.newborn_age
        ));
        out.push_str(&format!("{}\n", rule));
        for g in &self.groups {
            out.push_str(&format!(
                "  {:<26} mean quarterly ${:>6.1}k  sd(log) {:>5.2}\n",
                g.label,
                g.initial_income.display_mean_thousands,
                g.initial_income.display_sd
            ));
        }

        out.push_str(&format!("\n{}\n", rule));
        out.push_str("MEDIAN LIQUID WEALTH / PERMANENT INCOME\n");
        out.push_str(&format!("{}\n", rule));
        for g in &self.groups {
            out.push_str(&format!(
                "  {:<26} annual {:>7.2}%  quarterly {:>7.2}%\n",
                g.label,
                g.median_wealth_income.display_annual_pct,
                g.median_wealth_income.display_quarterly_pct
            ));
        }

        out.push_str(&format!("\n{}\n", rule));
        out.push_str("LORENZ CURVE - ALL HOUSEHOLDS\n");
        out.push_str(&format!("{}\n", rule));
        for r in &self.pooled_readoffs {
            out.push_str(&format!(
                "  Bottom {:>3.0}% holds {:>6.2}% of wealth\n",
                r.population_pct, r.wealth_pct
            ));
        }

        out.push_str(&format!("\n{}\n", rule));
        out.push_str("LORENZ CURVES BY EDUCATION\n");
        out.push_str(&format!("{}\n", rule));
        for g in &self.groups {
            out.push_str(&format!("  {}:\n", g.label));
            for r in &g.lorenz_readoffs {
                out.push_str(&format!(
                    "    Bottom {:>3.0}% holds {:>6.2}% of wealth\n",
                    r.population_pct, r.wealth_pct
                ));
            }
        }

        out.push_str(&format!("\n{}\n", rule));
        out.push_str("WEALTH DISTRIBUTION BY WEALTH QUARTILE\n");
        out.push_str(&format!("{}\n", rule));
        for (i, share) in self.quartile_shares_pct.iter().enumerate() {
            out.push_str(&format!(
                "  Quartile {}: {:>6.2}%\n",
                i + 1,
                round_to(*share, 2)
            ));
        }

        out
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, self)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        Ok(())
    }
}

// ============================================================================
// LORENZ CSV OUTPUT
// ============================================================================

/// Write an ordered Lorenz sequence for downstream plotting.
pub fn write_lorenz_csv(points: &[LorenzPoint], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for point in points {
        wtr.serialize(point)
            .with_context(|| format!("Failed to write Lorenz point for unit {}", point.unit_id))?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn make_report() -> DistributionReport {
        let share = Share {
            fraction: 0.112,
            display_pct: 11.2,
        };
        let moments = InitialIncomeMoments {
            mean_log: 8.5,
            sd_log: 0.42,
            mean_level: 4914.8,
            display_mean_thousands: 4.9,
            display_sd: 0.42,
        };
        let ratio = MedianRatio {
            ratio: 0.0467,
            display_annual_pct: 4.67,
            display_quarterly_pct: 18.68,
        };
        let readoffs = vec![
            PercentileReadoff { population_pct: 20.0, wealth_pct: 0.21 },
            PercentileReadoff { population_pct: 40.0, wealth_pct: 1.54 },
        ];

        DistributionReport {
            run_id: "test-run".to_string(),
            generated_at: Utc::now(),
            config: EngineConfig::default(),
            input: None,
            counts: StageCounts {
                survey_rows: 100,
                households: 20,
                after_domain_filter: 15,
                after_tail_trim: 14,
                surviving: 12,
            },
            groups: vec![GroupReport {
                group: EducationGroup::Dropout,
                label: EducationGroup::Dropout.label().to_string(),
                population: share,
                wealth: share,
                initial_income: moments,
                median_wealth_income: ratio,
                lorenz_readoffs: readoffs.clone(),
            }],
            pooled_readoffs: readoffs,
            quartile_shares_pct: [0.1, 2.3, 13.2, 84.4],
        }
    }

    #[test]
    fn test_summary_contains_published_table_sections() {
        let summary = make_report().summary();
        assert!(summary.contains("POPULATION AND WEALTH DISTRIBUTION BY EDUCATION"));
        assert!(summary.contains("INITIAL INCOME STATISTICS (AGE 25)"));
        assert!(summary.contains("MEDIAN LIQUID WEALTH / PERMANENT INCOME"));
        assert!(summary.contains("LORENZ CURVE - ALL HOUSEHOLDS"));
        assert!(summary.contains("WEALTH DISTRIBUTION BY WEALTH QUARTILE"));
        assert!(summary.contains("No high school"));
        assert!(summary.contains("Bottom  20% holds"));
    }

    #[test]
    fn test_report_roundtrips_through_json() {
        let report = make_report();
        let json = serde_json::to_string(&report).unwrap();
        let back: DistributionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.run_id, report.run_id);
        assert_eq!(back.groups.len(), 1);
        assert_eq!(back.quartile_shares_pct, report.quartile_shares_pct);
    }

    #[test]
    fn test_lorenz_csv_has_one_row_per_point() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lorenz.csv");
        let points = vec![
            LorenzPoint {
                unit_id: 1,
                group: EducationGroup::Dropout,
                cum_population_pct: 33.3,
                cum_wealth_pct: 16.7,
            },
            LorenzPoint {
                unit_id: 2,
                group: EducationGroup::College,
                cum_population_pct: 100.0,
                cum_wealth_pct: 100.0,
            },
        ];

        write_lorenz_csv(&points, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.trim().lines().collect();
        assert_eq!(lines.len(), 3); // header + 2 rows
        assert!(lines[0].contains("unit_id"));
        assert!(lines[1].starts_with('1'));
        assert!(lines[2].contains("College"));
    }
}
