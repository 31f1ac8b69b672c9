//! Registry bootstrap configuration.

/// Codes seeded into an empty registry.
pub const DEFAULT_SEED_CODES: [&str; 3] = ["12345678", "87654321", "11223344"];

/// Administrator credential seeded when none is stored.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Values written by [`CodeRegistry::ensure_bootstrap`](crate::CodeRegistry::ensure_bootstrap).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    /// Codes seeded when the registry holds no codes
    pub seed_codes: Vec<String>,
    /// Credential seeded when no admin password is stored
    pub admin_password: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            seed_codes: DEFAULT_SEED_CODES.iter().map(|c| c.to_string()).collect(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

impl BootstrapConfig {
    /// Replace the seeded codes
    pub fn with_seed_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seed_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the seeded admin credential
    pub fn with_admin_password(mut self, password: impl Into<String>) -> Self {
        self.admin_password = password.into();
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - SCL90_ADMIN_PASSWORD (optional, default: "admin123")
    /// - SCL90_SEED_CODES (optional, comma separated, default: the three demo codes)
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(password) = std::env::var("SCL90_ADMIN_PASSWORD") {
            if !password.is_empty() {
                config.admin_password = password;
            }
        }
        if let Ok(codes) = std::env::var("SCL90_SEED_CODES") {
            config.seed_codes = codes
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(ToString::to_string)
                .collect();
        }
        config
    }
}
