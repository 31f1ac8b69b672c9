//! Redemption code records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of digits in a redemption code.
pub const CODE_LENGTH: usize = 8;

/// True iff `code` is exactly [`CODE_LENGTH`] ASCII digits.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

/// A single-use access code and its redemption state.
///
/// # Invariants
///
/// `used_at.is_some() == used`. The only mutation is [`RedemptionCode::mark_used`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionCode {
    /// Fixed-width digit string; leading zeros are significant.
    pub code: String,

    /// Whether the code has been redeemed.
    pub used: bool,

    /// When the code was issued.
    pub created_at: DateTime<Utc>,

    /// When the code was redeemed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_at: Option<DateTime<Utc>>,
}

impl RedemptionCode {
    /// Create a fresh, unused record stamped with the current time.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            used: false,
            created_at: Utc::now(),
            used_at: None,
        }
    }

    /// Flip the record to used. Returns `false` if it was already used.
    pub fn mark_used(&mut self, at: DateTime<Utc>) -> bool {
        if self.used {
            return false;
        }
        self.used = true;
        self.used_at = Some(at);
        true
    }
}

/// Counts shown alongside the admin code listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CodeSummary {
    pub total: usize,
    pub unused: usize,
}

impl CodeSummary {
    pub fn from_codes(codes: &[RedemptionCode]) -> Self {
        Self {
            total: codes.len(),
            unused: codes.iter().filter(|c| !c.used).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_requires_eight_digits() {
        assert!(is_well_formed("12345678"));
        assert!(is_well_formed("00000000"));
        assert!(!is_well_formed("1234567"));
        assert!(!is_well_formed("123456789"));
        assert!(!is_well_formed("1234567a"));
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("１２３４５６７８"));
    }

    #[test]
    fn mark_used_sets_timestamp_once() {
        let mut code = RedemptionCode::new("12345678");
        let at = Utc::now();
        assert!(code.mark_used(at));
        assert!(code.used);
        assert_eq!(code.used_at, Some(at));
        assert!(!code.mark_used(Utc::now()));
        assert_eq!(code.used_at, Some(at));
    }

    #[test]
    fn serializes_camel_case_without_used_at() {
        let code = RedemptionCode::new("87654321");
        let json = serde_json::to_value(&code).expect("serialize");
        assert_eq!(json["code"], "87654321");
        assert_eq!(json["used"], false);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("usedAt").is_none());
    }

    #[test]
    fn reads_records_written_by_browser_build() {
        let raw = r#"[{"code":"11223344","used":true,"createdAt":"2024-03-01T08:00:00.000Z","usedAt":"2024-03-02T09:30:00.000Z"},
                      {"code":"01234567","used":false,"createdAt":"2024-03-01T08:00:00.000Z"}]"#;
        let codes: Vec<RedemptionCode> = serde_json::from_str(raw).expect("deserialize");
        assert_eq!(codes.len(), 2);
        assert!(codes[0].used && codes[0].used_at.is_some());
        assert_eq!(codes[1].code, "01234567");
        assert!(codes[1].used_at.is_none());
    }

    #[test]
    fn summary_counts_unused() {
        let mut used = RedemptionCode::new("11111111");
        used.mark_used(Utc::now());
        let codes = vec![used, RedemptionCode::new("22222222")];
        assert_eq!(
            CodeSummary::from_codes(&codes),
            CodeSummary {
                total: 2,
                unused: 1
            }
        );
    }
}
