// 🔗 Record Merger - Left join of interview answers onto the extract
// A duplicate (unit, implicate) key on either side is data damage, not a
// tie to break.

use crate::error::{EngineError, EngineResult};
use crate::records::{BalanceAnswer, SurveyRecord};
use std::collections::{HashMap, HashSet};

const STAGE: &str = "merge";

/// Answer code meaning "always pays the balance in full".
pub const FULL_PAYMENT_CODE: i64 = 1;

/// Merge balance answers onto survey records by `(unit_id, implicate_id)`.
///
/// Left outer join: records without an answer keep a code of 0 (never null).
/// Records whose answer is [`FULL_PAYMENT_CODE`] get `pays_balance_in_full`
/// set and their carried credit-card balance forced to zero: a respondent
/// who always pays in full has no revolving debt, whatever the statement
/// snapshot said.
pub fn merge_balance_answers(
    mut records: Vec<SurveyRecord>,
    answers: &[BalanceAnswer],
) -> EngineResult<Vec<SurveyRecord>> {
    let mut by_key: HashMap<(u64, u32), i64> = HashMap::with_capacity(answers.len());
    for answer in answers {
        let key = (answer.unit_id, answer.implicate_id);
        if by_key.insert(key, answer.full_payment_code).is_some() {
            return Err(EngineError::integrity(
                STAGE,
                format!(
                    "duplicate balance answer for unit {} implicate {}",
                    answer.unit_id, answer.implicate_id
                ),
            ));
        }
    }

    let mut seen: HashSet<(u64, u32)> = HashSet::with_capacity(records.len());
    for record in &mut records {
        let key = (record.unit_id, record.implicate_id);
        if !seen.insert(key) {
            return Err(EngineError::integrity(
                STAGE,
                format!(
                    "duplicate survey record for unit {} implicate {}",
                    record.unit_id, record.implicate_id
                ),
            ));
        }

        let code = by_key.get(&key).copied().unwrap_or(0);
        if code == FULL_PAYMENT_CODE {
            record.pays_balance_in_full = true;
            record.credit_card_balance = 0.0;
        }
    }

    Ok(records)
}

// ============================================================================
// TESTS
// ============================================================================
