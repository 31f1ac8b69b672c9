//! Assessment session engine.
//!
//! An [`AssessmentSession`] walks the catalog one item at a time, persists
//! every answer and the cursor as soon as they change, and produces a
//! [`ScoreReport`] once every item is answered. A session can only be
//! started from an [`AuthContext`] that has redeemed a code.

use scl90_store::KvStore;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::catalog::{AssessmentItem, Catalog};
use crate::domain::answers::{AnswerSet, Score};
use crate::domain::error::{AssessmentError, Result};
use crate::obs::{self, SessionSpan};
use crate::scoring::{self, ScoreReport};
use scl90_store::keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    InProgress,
    Completed,
}

/// Snapshot of the session position, suitable for rendering one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub cursor: usize,
    pub item_id: u32,
    /// Recorded score for the current item, if any.
    pub answered: Option<u8>,
    pub answered_count: usize,
    pub total: usize,
    pub is_first: bool,
    pub is_last: bool,
}

/// One respondent working through a catalog.
pub struct AssessmentSession<'c, S> {
    id: String,
    catalog: &'c Catalog,
    store: S,
    answers: AnswerSet,
    cursor: usize,
    state: SessionState,
}

impl<'c, S> AssessmentSession<'c, S>
where
    S: KvStore,
{
    /// Open a session, resuming any progress left in `store`.
    pub fn start(catalog: &'c Catalog, store: S, ctx: &AuthContext) -> Result<Self> {
        ctx.require_redeemed()?;

        let id = Uuid::new_v4().to_string();
        let _span = SessionSpan::enter(&id);

        let answers = load_answers(catalog, &store)?;
        let cursor = load_cursor(catalog, &store)?;
        if !answers.is_empty() || cursor > 0 {
            obs::emit_session_resumed(answers.len(), catalog.len(), cursor);
        }

        Ok(Self {
            id,
            catalog,
            store,
            answers,
            cursor,
            state: SessionState::InProgress,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// The item under the cursor.
    pub fn current_item(&self) -> &'c AssessmentItem {
        // The cursor is kept in `0..len` and the catalog is never empty.
        &self.catalog.items()[self.cursor]
    }

    pub fn view(&self) -> SessionView {
        let item = self.current_item();
        SessionView {
            cursor: self.cursor,
            item_id: item.id,
            answered: self.answers.get(item.id).map(Score::value),
            answered_count: self.answers.len(),
            total: self.catalog.len(),
            is_first: self.cursor == 0,
            is_last: self.cursor + 1 == self.catalog.len(),
        }
    }

    /// Record `score` for `item_id` and persist the answer set.
    pub fn answer(&mut self, item_id: u32, score: i64) -> Result<SessionView> {
        self.ensure_in_progress()?;
        let _span = SessionSpan::enter(&self.id);

        let score = Score::new(score)?;
        if !self.catalog.contains(item_id) {
            return Err(AssessmentError::UnknownItem(item_id));
        }
        let mut updated = self.answers.clone();
        updated.record(item_id, score);
        persist_answers(&self.store, &updated)?;
        self.answers = updated;
        obs::emit_answer_recorded(
            item_id,
            score.value(),
            self.answers.len(),
            self.catalog.len(),
        );
        Ok(self.view())
    }

    /// Record `score` for the item under the cursor.
    pub fn answer_current(&mut self, score: i64) -> Result<SessionView> {
        let item_id = self.current_item().id;
        self.answer(item_id, score)
    }

    /// Move to the next item. The current item must be answered first.
    pub fn advance(&mut self) -> Result<SessionView> {
        self.ensure_in_progress()?;
        let item_id = self.current_item().id;
        if !self.answers.is_answered(item_id) {
            return Err(AssessmentError::CurrentItemUnanswered { item_id });
        }
        if self.cursor + 1 < self.catalog.len() {
            self.set_cursor(self.cursor + 1)?;
        }
        Ok(self.view())
    }

    /// Move to the previous item; stays put at the first one.
    pub fn retreat(&mut self) -> Result<SessionView> {
        self.ensure_in_progress()?;
        if self.cursor > 0 {
            self.set_cursor(self.cursor - 1)?;
        }
        Ok(self.view())
    }

    /// Score the session and clear persisted progress.
    ///
    /// When items are missing the cursor jumps to the first of them and the
    /// call fails with `IncompleteSubmission`; the session stays open.
    pub fn submit(&mut self) -> Result<ScoreReport> {
        self.ensure_in_progress()?;
        let _span = SessionSpan::enter(&self.id);

        let missing = self.answers.unanswered(self.catalog);
        if let Some(&first_unanswered) = missing.first() {
            self.set_cursor(first_unanswered)?;
            obs::emit_submit_rejected(missing.len(), first_unanswered);
            return Err(AssessmentError::IncompleteSubmission {
                missing: missing.len(),
                first_unanswered,
            });
        }

        let report = scoring::score(&self.answers, self.catalog)?;
        self.store.remove(keys::ANSWERS)?;
        self.store.remove(keys::CURSOR)?;
        self.state = SessionState::Completed;
        obs::emit_session_submitted(
            report.total_answered,
            report.total_sum,
            report.positive_item_count,
        );
        Ok(report)
    }

    fn ensure_in_progress(&self) -> Result<()> {
        match self.state {
            SessionState::InProgress => Ok(()),
            SessionState::Completed => Err(AssessmentError::SessionCompleted),
        }
    }

    // The stored cursor is written before the in-memory one moves.
    fn set_cursor(&mut self, cursor: usize) -> Result<()> {
        self.store.set(keys::CURSOR, &cursor.to_string())?;
        self.cursor = cursor;
        Ok(())
    }
}

fn persist_answers<S: KvStore>(store: &S, answers: &AnswerSet) -> Result<()> {
    let json = serde_json::to_string(answers)?;
    store.set(keys::ANSWERS, &json)?;
    Ok(())
}

fn load_answers<S: KvStore>(catalog: &Catalog, store: &S) -> Result<AnswerSet> {
    let Some(raw) = store.get(keys::ANSWERS)? else {
        return Ok(AnswerSet::new());
    };
    let mut answers: AnswerSet = match serde_json::from_str(&raw) {
        Ok(answers) => answers,
        Err(err) => {
            obs::emit_corrupt_answers_discarded(&err);
            store.remove(keys::ANSWERS)?;
            return Ok(AnswerSet::new());
        }
    };

    let dropped = answers.retain_catalog(catalog);
    if dropped > 0 {
        obs::emit_stale_answers_dropped(dropped);
        store.set(keys::ANSWERS, &serde_json::to_string(&answers)?)?;
    }
    Ok(answers)
}

fn load_cursor<S: KvStore>(catalog: &Catalog, store: &S) -> Result<usize> {
    let cursor = store
        .get(keys::CURSOR)?
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|cursor| *cursor < catalog.len())
        .unwrap_or(0);
    Ok(cursor)
}
