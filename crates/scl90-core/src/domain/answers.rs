//! Per-item answers for one session.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::domain::error::AssessmentError;

/// Lowest point on the answer scale.
pub const MIN_SCORE: u8 = 1;
/// Highest point on the answer scale.
pub const MAX_SCORE: u8 = 5;

/// A validated answer on the 1–5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    pub fn new(value: i64) -> Result<Self, AssessmentError> {
        if (i64::from(MIN_SCORE)..=i64::from(MAX_SCORE)).contains(&value) {
            Ok(Score(value as u8))
        } else {
            Err(AssessmentError::InvalidAnswerValue { value })
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Wording shown next to each point of the scale.
    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "not at all",
            2 => "a little bit",
            3 => "moderately",
            4 => "quite a bit",
            _ => "extremely",
        }
    }

    /// Every point of the scale, lowest first.
    pub fn scale() -> impl Iterator<Item = Score> {
        (MIN_SCORE..=MAX_SCORE).map(Score)
    }
}

impl TryFrom<i64> for Score {
    type Error = AssessmentError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Score::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mapping from item id to score.
///
/// Unanswered items are absent; there is no sentinel value. Serializes as a
/// JSON object keyed by the item id rendered as a string (`{"1":5}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<u32, Score>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the answer for `item_id`.
    pub fn record(&mut self, item_id: u32, score: Score) {
        self.0.insert(item_id, score);
    }

    pub fn get(&self, item_id: u32) -> Option<Score> {
        self.0.get(&item_id).copied()
    }

    pub fn is_answered(&self, item_id: u32) -> bool {
        self.0.contains_key(&item_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, Score)> + '_ {
        self.0.iter().map(|(id, score)| (*id, *score))
    }

    /// Catalog positions of unanswered items, in catalog order.
    pub fn unanswered(&self, catalog: &Catalog) -> Vec<usize> {
        catalog
            .items()
            .iter()
            .enumerate()
            .filter(|(_, item)| !self.is_answered(item.id))
            .map(|(index, _)| index)
            .collect()
    }

    /// True when every catalog item has an answer.
    pub fn is_complete(&self, catalog: &Catalog) -> bool {
        catalog.items().iter().all(|item| self.is_answered(item.id))
    }

    /// Drop answers for ids the catalog does not contain. Returns how many were dropped.
    pub fn retain_catalog(&mut self, catalog: &Catalog) -> usize {
        let before = self.0.len();
        self.0.retain(|id, _| catalog.contains(*id));
        before - self.0.len()
    }
}

impl FromIterator<(u32, Score)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (u32, Score)>>(iter: I) -> Self {
        AnswerSet(iter.into_iter().collect())
    }
}
