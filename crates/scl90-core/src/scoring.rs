//! Score reduction from a complete answer set.
//!
//! [`score`] is a pure function of the answers and the catalog. Sums are
//! accumulated in catalog order and every division happens once at the end,
//! so the same inputs give bit-identical reports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::domain::answers::AnswerSet;
use crate::domain::error::{AssessmentError, Result};
use crate::obs;

/// Scores at or above this value count as positive items.
pub const POSITIVE_ITEM_THRESHOLD: u8 = 2;

/// Aggregate and per-dimension statistics of one completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    /// Mean item score per dimension id.
    pub per_dimension: BTreeMap<String, f64>,
    /// Sum of all item scores.
    pub total_sum: u32,
    /// `total_sum / total_answered`.
    pub total_average: f64,
    /// Items scored at or above [`POSITIVE_ITEM_THRESHOLD`].
    pub positive_item_count: u32,
    /// Number of items in the catalog.
    pub total_answered: u32,
}

impl ScoreReport {
    pub fn dimension_score(&self, dimension_id: &str) -> Option<f64> {
        self.per_dimension.get(dimension_id).copied()
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    sum: u32,
    count: u32,
}

/// Reduce a complete answer set to a [`ScoreReport`].
///
/// Answers for ids outside the catalog are ignored. If any catalog item is
/// unanswered the call fails with `IncompleteSubmission`, naming the first
/// missing position in catalog order.
pub fn score(answers: &AnswerSet, catalog: &Catalog) -> Result<ScoreReport> {
    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();
    let mut missing = Vec::new();
    let mut tracked_total: u32 = 0;
    let mut positive_item_count: u32 = 0;

    for (index, item) in catalog.items().iter().enumerate() {
        let Some(score) = answers.get(item.id) else {
            missing.push(index);
            continue;
        };
        let value = u32::from(score.value());
        let tally = tallies.entry(item.dimension_id.as_str()).or_default();
        tally.sum += value;
        tally.count += 1;
        tracked_total += value;
        if score.value() >= POSITIVE_ITEM_THRESHOLD {
            positive_item_count += 1;
        }
    }

    if let Some(&first_unanswered) = missing.first() {
        return Err(AssessmentError::IncompleteSubmission {
            missing: missing.len(),
            first_unanswered,
        });
    }

    let recomputed: u32 = tallies.values().map(|t| t.sum).sum();
    let total_sum = reconcile_total(tracked_total, recomputed);

    let per_dimension = tallies
        .into_iter()
        .map(|(id, t)| (id.to_string(), f64::from(t.sum) / f64::from(t.count)))
        .collect();

    let total_answered = catalog.len() as u32;
    let total_average = f64::from(total_sum) / f64::from(total_answered);

    Ok(ScoreReport {
        per_dimension,
        total_sum,
        total_average,
        positive_item_count,
        total_answered,
    })
}

/// Pick the recomputed total; log when the running total disagrees.
///
/// Report delivery never blocks on this check.
pub fn reconcile_total(tracked: u32, recomputed: u32) -> u32 {
    if tracked != recomputed {
        obs::emit_total_mismatch(tracked, recomputed);
    }
    recomputed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AssessmentItem;
    use crate::domain::answers::Score;

    fn catalog() -> Catalog {
        Catalog::from_items(vec![
            AssessmentItem::new(1, "A", "one"),
            AssessmentItem::new(2, "A", "two"),
            AssessmentItem::new(3, "B", "three"),
        ])
        .unwrap()
    }

    fn answers(pairs: &[(u32, i64)]) -> AnswerSet {
        pairs
            .iter()
            .map(|(id, v)| (*id, Score::new(*v).unwrap()))
            .collect()
    }

    #[test]
    fn reference_example() {
        let report = score(&answers(&[(1, 5), (2, 3), (3, 1)]), &catalog()).unwrap();
        assert_eq!(report.dimension_score("A"), Some(4.0));
        assert_eq!(report.dimension_score("B"), Some(1.0));
        assert_eq!(report.total_sum, 9);
        assert_eq!(report.total_average, 3.0);
        assert_eq!(report.positive_item_count, 2);
        assert_eq!(report.total_answered, 3);
    }

    #[test]
    fn incomplete_names_first_missing_position() {
        let err = score(&answers(&[(1, 5), (2, 3)]), &catalog()).unwrap_err();
        match err {
            AssessmentError::IncompleteSubmission {
                missing,
                first_unanswered,
            } => {
                assert_eq!(missing, 1);
                assert_eq!(first_unanswered, 2);
            }
            other => panic!("expected IncompleteSubmission, got {other:?}"),
        }
    }

    #[test]
    fn extra_ids_are_ignored() {
        let report = score(&answers(&[(1, 1), (2, 1), (3, 1), (42, 5)]), &catalog()).unwrap();
        assert_eq!(report.total_sum, 3);
        assert_eq!(report.positive_item_count, 0);
    }

    #[test]
    fn reconcile_prefers_recomputed() {
        assert_eq!(reconcile_total(10, 12), 12);
        assert_eq!(reconcile_total(7, 7), 7);
    }

    #[test]
    fn report_serializes_camel_case() {
        let report = score(&answers(&[(1, 2), (2, 2), (3, 2)]), &catalog()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["totalSum"], 6);
        assert_eq!(json["positiveItemCount"], 3);
        assert_eq!(json["totalAnswered"], 3);
        assert_eq!(json["perDimension"]["A"], 2.0);
    }
}
