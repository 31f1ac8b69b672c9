//! Structured observability hooks for redemption and session lifecycle events.
//!
//! This module provides:
//! - Session-scoped tracing spans via `SessionSpan` RAII guard
//! - Emission functions for key lifecycle events: code issue/redeem, admin
//!   login, answer capture, submission, and resume cleanup
//!
//! Events are emitted at `info!` level unless noted (configurable via `RUST_LOG`).
//! Redemption codes are never logged in full; only a masked form is emitted.

use tracing::{debug, info, warn};

/// RAII guard that enters a session-scoped tracing span for the duration of a session.
///
/// # Example
///
/// ```ignore
/// let _span = SessionSpan::enter("4b0c...");
/// // all tracing calls are now associated with session_id = "4b0c..."
/// ```
pub struct SessionSpan {
    _span: tracing::span::EnteredSpan,
}

impl SessionSpan {
    /// Create and enter a span tagged with the session id.
    pub fn enter(session_id: &str) -> Self {
        let span = tracing::info_span!("scl90.session", session_id = %session_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Mask all but the last two characters of a code (`******78`).
pub fn mask_code(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    let keep = chars.len().min(2);
    let masked = chars.len() - keep;
    std::iter::repeat('*')
        .take(masked)
        .chain(chars[masked..].iter().copied())
        .collect()
}

/// Emit event: a new code was appended to the registry.
pub fn emit_code_issued(code: &str, total_codes: usize) {
    info!(event = "code.issued", code = %mask_code(code), total_codes = total_codes);
}

/// Emit event: a code was redeemed and the session gate opened.
pub fn emit_code_redeemed(code: &str) {
    info!(event = "code.redeemed", code = %mask_code(code));
}

/// Emit event: a redemption attempt was refused (warn level).
pub fn emit_redeem_rejected(reason: &str) {
    warn!(event = "code.redeem_rejected", reason = %reason);
}

/// Emit event: a registry update lost a compare-and-swap race and will re-read.
pub fn emit_registry_conflict(attempt: usize, version: &str) {
    debug!(event = "registry.cas_conflict", attempt = attempt, version = %version);
}

/// Emit event: registry bootstrap seeded defaults.
pub fn emit_bootstrap(seeded_codes: usize, seeded_password: bool) {
    info!(
        event = "registry.bootstrap",
        seeded_codes = seeded_codes,
        seeded_password = seeded_password,
    );
}

/// Emit event: admin authentication attempt result.
pub fn emit_admin_login(success: bool) {
    if success {
        info!(event = "admin.login", success = true);
    } else {
        warn!(event = "admin.login", success = false);
    }
}

/// Emit event: an answer was captured (debug level, one per item).
pub fn emit_answer_recorded(item_id: u32, score: u8, answered: usize, total: usize) {
    debug!(
        event = "session.answer_recorded",
        item_id = item_id,
        score = score,
        answered = answered,
        total = total,
    );
}

/// Emit event: a session resumed with previously persisted progress.
pub fn emit_session_resumed(answered: usize, total: usize, cursor: usize) {
    info!(
        event = "session.resumed",
        answered = answered,
        total = total,
        cursor = cursor,
    );
}

/// Emit event: persisted answers referenced items missing from the catalog (warn level).
pub fn emit_stale_answers_dropped(dropped: usize) {
    warn!(event = "session.stale_answers_dropped", dropped = dropped);
}

/// Emit event: persisted answers could not be parsed and were discarded (warn level).
pub fn emit_corrupt_answers_discarded(error: &dyn std::fmt::Display) {
    warn!(event = "session.corrupt_answers_discarded", error = %error);
}

/// Emit event: submit refused because items remain unanswered.
pub fn emit_submit_rejected(missing: usize, first_unanswered: usize) {
    info!(
        event = "session.submit_rejected",
        missing = missing,
        first_unanswered = first_unanswered,
    );
}

/// Emit event: session submitted and scored.
pub fn emit_session_submitted(total_answered: u32, total_sum: u32, positive_items: u32) {
    info!(
        event = "session.submitted",
        total_answered = total_answered,
        total_sum = total_sum,
        positive_items = positive_items,
    );
}

/// Emit event: running total disagreed with the recomputed total (warn level).
pub fn emit_total_mismatch(tracked: u32, recomputed: u32) {
    warn!(
        event = "scoring.total_mismatch",
        tracked = tracked,
        recomputed = recomputed,
    );
}
