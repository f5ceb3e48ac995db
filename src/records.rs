// 📥 Input Model - Survey extract rows + auxiliary balance answers
// Column names follow the summary-extract headers (yy1, wgt, norminc, ...);
// field names say what the columns mean.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

// ============================================================================
// SURVEY RECORD
// ============================================================================

/// One extract row: a single implicate of a single sampled household.
///
/// Five implicates share a `unit_id`; the implicate axis is collapsed by the
/// aggregator before any statistic is computed.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SurveyRecord {
    /// Household identifier, shared by all five implicates.
    #[serde(rename = "yy1")]
    pub unit_id: u64,

    /// Implicate number, 1..=5.
    #[serde(rename = "imp")]
    pub implicate_id: u32,

    /// Sampling weight of the implicate row.
    #[serde(rename = "wgt")]
    pub weight: f64,

    #[serde(rename = "age")]
    pub age: f64,

    /// Raw education classification code (1..=4 in the extract).
    #[serde(rename = "edcl")]
    pub education_code: i64,

    /// Normal (permanent) annual income.
    #[serde(rename = "norminc")]
    pub income: f64,

    // ------------------------------------------------------------------
    // Asset fields
    // ------------------------------------------------------------------
    /// Checking/savings/money-market balances.
    #[serde(rename = "liq")]
    pub liquid_cash: f64,

    #[serde(rename = "cds")]
    pub certificates_of_deposit: f64,

    #[serde(rename = "nmmf")]
    pub mutual_funds: f64,

    #[serde(rename = "stocks")]
    pub stocks: f64,

    #[serde(rename = "bond")]
    pub bonds: f64,

    // ------------------------------------------------------------------
    // Debt fields
    // ------------------------------------------------------------------
    #[serde(rename = "ccbal")]
    pub credit_card_balance: f64,

    #[serde(rename = "install")]
    pub installment_debt: f64,

    #[serde(rename = "veh_inst")]
    pub vehicle_installment_debt: f64,

    /// Set by the merger from the interview answers, not read from the
    /// extract. True ⇒ the carried balance is a statement artifact and has
    /// already been zeroed.
    #[serde(skip)]
    pub pays_balance_in_full: bool,
}

impl SurveyRecord {
    /// Divide every dollar-denominated field by `deflator`.
    ///
    /// Weights, ages, and codes are untouched: re-basing changes the unit of
    /// account, not the sample design.
    pub fn rebase_dollars(&mut self, deflator: f64) {
        self.income /= deflator;
        self.liquid_cash /= deflator;
        self.certificates_of_deposit /= deflator;
        self.mutual_funds /= deflator;
        self.stocks /= deflator;
        self.bonds /= deflator;
        self.credit_card_balance /= deflator;
        self.installment_debt /= deflator;
        self.vehicle_installment_debt /= deflator;
    }
}

// ============================================================================
// BALANCE ANSWER
// ============================================================================

/// Auxiliary interview answer: does the respondent always pay the credit
/// card balance in full? Code 1 means yes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BalanceAnswer {
    #[serde(rename = "yy1")]
    pub unit_id: u64,

    #[serde(rename = "imp")]
    pub implicate_id: u32,

    #[serde(rename = "x432")]
    pub full_payment_code: i64,
}

// ============================================================================
// LOADERS
// ============================================================================

pub fn load_survey_csv(path: &Path) -> Result<Vec<SurveyRecord>> {
    let rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open survey extract {}", path.display()))?;
    parse_survey_csv(rdr)
}

pub fn parse_survey_csv<R: Read>(mut rdr: csv::Reader<R>) -> Result<Vec<SurveyRecord>> {
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: SurveyRecord = result.context("Failed to deserialize survey record")?;
        records.push(record);
    }
    Ok(records)
}

pub fn load_balance_csv(path: &Path) -> Result<Vec<BalanceAnswer>> {
    let rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open balance answers {}", path.display()))?;
    parse_balance_csv(rdr)
}

pub fn parse_balance_csv<R: Read>(mut rdr: csv::Reader<R>) -> Result<Vec<BalanceAnswer>> {
    let mut answers = Vec::new();
    for result in rdr.deserialize() {
        let answer: BalanceAnswer = result.context("Failed to deserialize balance answer")?;
        answers.push(answer);
    }
    Ok(answers)
}

/// SHA-256 of an input file, recorded in the run report so a transcribed
/// table can always be traced back to the exact extract that produced it.
pub fn file_sha256(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {} for checksum", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SURVEY_CSV: &str = "\
yy1,imp,wgt,age,edcl,norminc,liq,cds,nmmf,stocks,bond,ccbal,install,veh_inst
11,1,1200.5,40,2,52000,3000,0,500,1000,0,250,8000,6000
11,2,1200.5,40,2,51000,3100,0,500,1000,0,250,8000,6000
";

    const BALANCE_CSV: &str = "\
yy1,imp,x432
11,1,1
11,2,5
";

    #[test]
    fn test_parse_survey_csv() {
        let rdr = csv::Reader::from_reader(SURVEY_CSV.as_bytes());
        let records = parse_survey_csv(rdr).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].unit_id, 11);
        assert_eq!(records[0].implicate_id, 1);
        assert_eq!(records[0].education_code, 2);
        assert_eq!(records[0].income, 52000.0);
        assert_eq!(records[0].vehicle_installment_debt, 6000.0);
        assert!(!records[0].pays_balance_in_full);
    }

    #[test]
    fn test_parse_balance_csv() {
        let rdr = csv::Reader::from_reader(BALANCE_CSV.as_bytes());
        let answers = parse_balance_csv(rdr).unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].full_payment_code, 1);
        assert_eq!(answers[1].full_payment_code, 5);
    }

    #[test]
    fn test_parse_rejects_malformed_row() {
        let bad = "yy1,imp,wgt,age,edcl,norminc,liq,cds,nmmf,stocks,bond,ccbal,install,veh_inst\n11,1,not-a-number,40,2,0,0,0,0,0,0,0,0,0\n";
        let rdr = csv::Reader::from_reader(bad.as_bytes());
        assert!(parse_survey_csv(rdr).is_err());
    }

    #[test]
    fn test_rebase_dollars_touches_only_dollar_fields() {
        let rdr = csv::Reader::from_reader(SURVEY_CSV.as_bytes());
        let mut records = parse_survey_csv(rdr).unwrap();
        records[0].rebase_dollars(2.0);
        assert_eq!(records[0].income, 26000.0);
        assert_eq!(records[0].liquid_cash, 1500.0);
        assert_eq!(records[0].installment_debt, 4000.0);
        // untouched
        assert_eq!(records[0].weight, 1200.5);
        assert_eq!(records[0].age, 40.0);
        assert_eq!(records[0].education_code, 2);
    }

    #[test]
    fn test_load_from_path_and_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extract.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(SURVEY_CSV.as_bytes()).unwrap();

        let records = load_survey_csv(&path).unwrap();
        assert_eq!(records.len(), 2);

        let h1 = file_sha256(&path).unwrap();
        let h2 = file_sha256(&path).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = load_survey_csv(Path::new("/nonexistent/extract.csv")).unwrap_err();
        assert!(format!("{:#}", err).contains("extract.csv"));
    }
}
