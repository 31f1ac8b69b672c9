//! Explicit access state and the gated entry points that change it.
//!
//! The caller owns an [`AuthContext`] for the lifetime of its process and
//! passes it into each operation. Nothing here is persisted.

use scl90_store::KvStore;
use serde::Serialize;

use crate::code_registry::CodeRegistry;
use crate::domain::code::RedemptionCode;
use crate::domain::error::{AssessmentError, Result};

/// What this process instance has unlocked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    /// A valid code was consumed; the assessment may start.
    pub code_redeemed: bool,
    /// The admin credential was presented; issuance and listing are open.
    pub is_admin: bool,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every unlocked capability.
    pub fn logout(&mut self) {
        *self = Self::default();
    }

    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AssessmentError::AdminRequired)
        }
    }

    pub fn require_redeemed(&self) -> Result<()> {
        if self.code_redeemed {
            Ok(())
        } else {
            Err(AssessmentError::NotRedeemed)
        }
    }
}

/// Redeem `code` and open the assessment gate on success.
///
/// Failure leaves `ctx` untouched and reports only `MalformedCode` or the
/// undifferentiated `UnknownOrUsedCode`.
pub fn redeem_code<S: KvStore>(
    ctx: &mut AuthContext,
    registry: &CodeRegistry<S>,
    code: &str,
) -> Result<()> {
    registry.redeem(code.trim())?;
    ctx.code_redeemed = true;
    Ok(())
}

/// Check the admin credential and unlock admin operations on success.
pub fn admin_login<S: KvStore>(
    ctx: &mut AuthContext,
    registry: &CodeRegistry<S>,
    password: &str,
) -> Result<()> {
    if !registry.authenticate_admin(password)? {
        return Err(AssessmentError::AdminAuthFailure);
    }
    ctx.is_admin = true;
    Ok(())
}

/// Generate, persist and return a fresh code. Admin only.
pub fn issue_code<S: KvStore>(
    ctx: &AuthContext,
    registry: &CodeRegistry<S>,
) -> Result<RedemptionCode> {
    ctx.require_admin()?;
    registry.issue_unique()
}

/// All codes in insertion order. Admin only.
pub fn list_codes<S: KvStore>(
    ctx: &AuthContext,
    registry: &CodeRegistry<S>,
) -> Result<Vec<RedemptionCode>> {
    ctx.require_admin()?;
    registry.list()
}
