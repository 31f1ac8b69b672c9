//! Redemption code registry.
//!
//! Single source of truth for which codes exist and whether each has been
//! redeemed, plus the administrator credential check. All mutations of the
//! `cdks` collection go through one compare-and-swap loop so that two
//! processes sharing a store cannot both redeem the same code or lose an
//! issued code.

use chrono::Utc;
use rand::Rng;
use scl90_store::{keys, ContentVersion, KvStore, StorageError};

use crate::config::BootstrapConfig;
use crate::domain::code::{is_well_formed, CodeSummary, RedemptionCode, CODE_LENGTH};
use crate::domain::error::{AssessmentError, Result};
use crate::obs;

/// Upper bound on re-reads when a registry write loses a race.
const MAX_CAS_ATTEMPTS: usize = 16;

/// Upper bound on fresh codes drawn by [`CodeRegistry::issue_unique`].
const MAX_GENERATE_ATTEMPTS: usize = 32;

/// Draw an 8-digit code uniformly from `0-9` using the thread RNG.
///
/// No uniqueness check is performed.
pub fn generate_code() -> String {
    generate_code_with(&mut rand::thread_rng())
}

/// Draw an 8-digit code from the given RNG.
pub fn generate_code_with<R: Rng>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Outcome of one pass over the code collection.
enum Mutation<T> {
    /// Persist the modified collection, then return the value.
    Write(T),
    /// Leave the stored collection untouched and return the value.
    Skip(T),
}

/// Code registry over a key-value store.
pub struct CodeRegistry<S> {
    store: S,
    bootstrap: BootstrapConfig,
}

impl<S> CodeRegistry<S>
where
    S: KvStore,
{
    pub fn new(store: S) -> Self {
        Self::with_bootstrap(store, BootstrapConfig::default())
    }

    pub fn with_bootstrap(store: S, bootstrap: BootstrapConfig) -> Self {
        Self { store, bootstrap }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Draw a random code. No side effects, no uniqueness check.
    pub fn generate(&self) -> String {
        generate_code()
    }

    /// Append a new unused record for `code`.
    ///
    /// Rejects codes that are not 8 ASCII digits. Does not check uniqueness;
    /// see [`Self::issue_unique`] for the admin issuance path.
    pub fn issue(&self, code: &str) -> Result<RedemptionCode> {
        if !is_well_formed(code) {
            return Err(AssessmentError::MalformedCode);
        }
        let record = RedemptionCode::new(code);
        let total = self.update_codes(|codes| {
            codes.push(record.clone());
            Mutation::Write(codes.len())
        })?;
        obs::emit_code_issued(code, total);
        Ok(record)
    }

    /// Generate a code not yet present in the registry and issue it.
    pub fn issue_unique(&self) -> Result<RedemptionCode> {
        for _ in 0..MAX_GENERATE_ATTEMPTS {
            let candidate = self.generate();
            let issued = self.update_codes(|codes| {
                if codes.iter().any(|c| c.code == candidate) {
                    return Mutation::Skip(None);
                }
                let record = RedemptionCode::new(candidate.clone());
                codes.push(record.clone());
                Mutation::Write(Some((record, codes.len())))
            })?;
            if let Some((record, total)) = issued {
                obs::emit_code_issued(&record.code, total);
                return Ok(record);
            }
        }
        Err(AssessmentError::CodeSpaceExhausted {
            attempts: MAX_GENERATE_ATTEMPTS,
        })
    }

    /// All codes in insertion order.
    pub fn list(&self) -> Result<Vec<RedemptionCode>> {
        let (_, codes) = self.load_codes()?;
        Ok(codes)
    }

    /// Total and unused counts.
    pub fn summary(&self) -> Result<CodeSummary> {
        Ok(CodeSummary::from_codes(&self.list()?))
    }

    /// True iff `code` is well formed, known, and unused.
    ///
    /// Malformed, unknown and used codes are indistinguishable here.
    pub fn validate(&self, code: &str) -> Result<bool> {
        if !is_well_formed(code) {
            return Ok(false);
        }
        Ok(self.list()?.iter().any(|c| c.code == code && !c.used))
    }

    /// Mark the matching unused record as used.
    ///
    /// Returns `false` if no unused record matches. Callers pair this with
    /// [`Self::validate`]; use [`Self::redeem`] to do both in one transaction.
    pub fn consume(&self, code: &str) -> Result<bool> {
        self.update_codes(|codes| mark_first_unused(codes, code))
    }

    /// Validate and consume `code` as one compare-and-swap transaction.
    pub fn redeem(&self, code: &str) -> Result<()> {
        if !is_well_formed(code) {
            obs::emit_redeem_rejected("malformed");
            return Err(AssessmentError::MalformedCode);
        }
        if self.update_codes(|codes| mark_first_unused(codes, code))? {
            obs::emit_code_redeemed(code);
            Ok(())
        } else {
            obs::emit_redeem_rejected("unknown_or_used");
            Err(AssessmentError::UnknownOrUsedCode)
        }
    }

    /// Compare `password` with the stored administrator credential.
    pub fn authenticate_admin(&self, password: &str) -> Result<bool> {
        let stored = self.store.get(keys::ADMIN_PASSWORD)?;
        let ok = stored.as_deref() == Some(password);
        obs::emit_admin_login(ok);
        Ok(ok)
    }

    /// Seed demo codes into an empty registry and a default credential when
    /// none is stored. Safe to call on every start.
    ///
    /// Fails with [`AssessmentError::InvalidSeedCode`] before writing anything
    /// if a configured seed is not 8 ASCII digits.
    pub fn ensure_bootstrap(&self) -> Result<()> {
        let seeds = &self.bootstrap.seed_codes;
        if let Some(bad) = seeds.iter().find(|c| !is_well_formed(c)) {
            return Err(AssessmentError::InvalidSeedCode(bad.clone()));
        }
        let seeded_codes = self.update_codes(|codes| {
            if !codes.is_empty() || seeds.is_empty() {
                return Mutation::Skip(0);
            }
            codes.extend(seeds.iter().map(|c| RedemptionCode::new(c.as_str())));
            Mutation::Write(seeds.len())
        })?;

        let seeded_password = self.store.get(keys::ADMIN_PASSWORD)?.is_none()
            && self.store.compare_and_swap(
                keys::ADMIN_PASSWORD,
                None,
                &self.bootstrap.admin_password,
            )?;

        if seeded_codes > 0 || seeded_password {
            obs::emit_bootstrap(seeded_codes, seeded_password);
        }
        Ok(())
    }

    fn load_codes(&self) -> Result<(Option<String>, Vec<RedemptionCode>)> {
        let raw = self.store.get(keys::CODES)?;
        let codes = match raw.as_deref().map(str::trim) {
            None | Some("") => Vec::new(),
            Some(json) => serde_json::from_str(json)?,
        };
        Ok((raw, codes))
    }

    // Read-modify-write of the whole collection, retried while another writer
    // changes it between our read and our swap.
    fn update_codes<T>(
        &self,
        mut apply: impl FnMut(&mut Vec<RedemptionCode>) -> Mutation<T>,
    ) -> Result<T> {
        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let (raw, mut codes) = self.load_codes()?;
            match apply(&mut codes) {
                Mutation::Skip(out) => return Ok(out),
                Mutation::Write(out) => {
                    let updated = serde_json::to_string(&codes)?;
                    if self
                        .store
                        .compare_and_swap(keys::CODES, raw.as_deref(), &updated)?
                    {
                        return Ok(out);
                    }
                    obs::emit_registry_conflict(
                        attempt,
                        ContentVersion::of(raw.as_deref()).short(),
                    );
                }
            }
        }
        Err(AssessmentError::Storage(StorageError::LockContended {
            key: keys::CODES.to_string(),
        }))
    }
}

fn mark_first_unused(codes: &mut [RedemptionCode], code: &str) -> Mutation<bool> {
    match codes.iter_mut().find(|c| c.code == code && !c.used) {
        Some(record) => Mutation::Write(record.mark_used(Utc::now())),
        None => Mutation::Skip(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use scl90_store::MemoryKvStore;

    fn registry() -> CodeRegistry<MemoryKvStore> {
        CodeRegistry::new(MemoryKvStore::new())
    }

    #[test]
    fn generated_codes_are_eight_digits() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let code = generate_code_with(&mut rng);
            assert!(is_well_formed(&code), "bad code {code}");
        }
    }

    #[test]
    fn generation_uses_every_digit() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = [false; 10];
        for _ in 0..100 {
            for b in generate_code_with(&mut rng).bytes() {
                seen[usize::from(b - b'0')] = true;
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn issue_appends_in_order() {
        let registry = registry();
        registry.issue("00000001").unwrap();
        registry.issue("00000002").unwrap();
        let codes: Vec<String> = registry.list().unwrap().into_iter().map(|c| c.code).collect();
        assert_eq!(codes, vec!["00000001", "00000002"]);
    }

    #[test]
    fn issue_does_not_touch_admin_password() {
        let registry = registry();
        registry.store().set(keys::ADMIN_PASSWORD, "changed").unwrap();
        registry.issue("00000001").unwrap();
        assert!(registry.authenticate_admin("changed").unwrap());
    }

    #[test]
    fn issue_unique_avoids_existing_codes() {
        let registry = registry();
        let first = registry.issue_unique().unwrap();
        let second = registry.issue_unique().unwrap();
        assert_ne!(first.code, second.code);
        assert_eq!(registry.summary().unwrap().total, 2);
    }

    #[test]
    fn empty_stored_value_reads_as_empty_registry() {
        let registry = registry();
        registry.store().set(keys::CODES, "").unwrap();
        assert!(registry.list().unwrap().is_empty());
    }

    #[test]
    fn corrupt_registry_is_an_error_not_a_reset() {
        let registry = registry();
        registry.store().set(keys::CODES, "{not json").unwrap();
        assert!(matches!(
            registry.list().unwrap_err(),
            AssessmentError::Serialization(_)
        ));
        assert!(registry.issue("12345678").is_err());
        assert_eq!(
            registry.store().get(keys::CODES).unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn consume_unknown_returns_false_without_write() {
        let registry = registry();
        assert!(!registry.consume("12345678").unwrap());
        assert_eq!(registry.store().get(keys::CODES).unwrap(), None);
    }

    #[test]
    fn redeem_distinguishes_malformed_only() {
        let registry = registry();
        registry.issue("12345678").unwrap();
        assert!(matches!(
            registry.redeem("1234").unwrap_err(),
            AssessmentError::MalformedCode
        ));
        assert!(matches!(
            registry.redeem("99999999").unwrap_err(),
            AssessmentError::UnknownOrUsedCode
        ));
        registry.redeem("12345678").unwrap();
        assert!(matches!(
            registry.redeem("12345678").unwrap_err(),
            AssessmentError::UnknownOrUsedCode
        ));
    }

    #[test]
    fn issue_rejects_malformed_codes() {
        let registry = registry();
        for code in ["abc", "1234567", "123456789", "1234-678"] {
            assert!(matches!(
                registry.issue(code).unwrap_err(),
                AssessmentError::MalformedCode
            ));
        }
        assert!(registry.list().unwrap().is_empty());
        assert_eq!(registry.store().get(keys::CODES).unwrap(), None);
    }

    #[test]
    fn bootstrap_rejects_malformed_seed_without_writing() {
        let config =
            BootstrapConfig::default().with_seed_codes(["12345678", "12-34", "1234567890"]);
        let registry = CodeRegistry::with_bootstrap(MemoryKvStore::new(), config);
        match registry.ensure_bootstrap().unwrap_err() {
            AssessmentError::InvalidSeedCode(code) => assert_eq!(code, "12-34"),
            other => panic!("expected InvalidSeedCode, got {other:?}"),
        }
        assert!(registry.list().unwrap().is_empty());
        assert!(!registry.authenticate_admin("admin123").unwrap());
    }

    #[test]
    fn missing_password_never_authenticates() {
        let registry = registry();
        assert!(!registry.authenticate_admin("").unwrap());
        assert!(!registry.authenticate_admin("admin123").unwrap());
    }

    #[test]
    fn bootstrap_keeps_existing_password() {
        let registry = registry();
        registry.store().set(keys::ADMIN_PASSWORD, "rotated").unwrap();
        registry.ensure_bootstrap().unwrap();
        assert!(registry.authenticate_admin("rotated").unwrap());
        assert!(!registry.authenticate_admin("admin123").unwrap());
        assert_eq!(registry.summary().unwrap().total, 3);
    }

    #[test]
    fn bootstrap_does_not_reseed_after_all_codes_used() {
        let registry = registry();
        registry.ensure_bootstrap().unwrap();
        for code in ["12345678", "87654321", "11223344"] {
            registry.redeem(code).unwrap();
        }
        registry.ensure_bootstrap().unwrap();
        let summary = registry.summary().unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.unused, 0);
    }

    #[test]
    fn custom_bootstrap_config() {
        let config = BootstrapConfig::default()
            .with_seed_codes(["00000000"])
            .with_admin_password("pw");
        let registry = CodeRegistry::with_bootstrap(MemoryKvStore::new(), config);
        registry.ensure_bootstrap().unwrap();
        assert!(registry.validate("00000000").unwrap());
        assert!(!registry.validate("12345678").unwrap());
        assert!(registry.authenticate_admin("pw").unwrap());
    }
}
