// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// SHA-256 digest of the admin password, injected through configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    password_sha256: String,
}

impl AdminCredentials {
    /// Accepts a hex digest; surrounding whitespace and case are ignored.
    pub fn from_sha256_hex(digest: &str) -> Option<Self> {
        let digest = digest.trim().to_ascii_lowercase();
        let valid = digest.len() == 64 && hex::decode(&digest).is_ok();
        valid.then_some(Self {
            password_sha256: digest,
        })
    }

    pub fn hash_password(password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn matches(&self, attempt: &str) -> bool {
        let attempt = Self::hash_password(attempt);
        attempt
            .as_bytes()
            .ct_eq(self.password_sha256.as_bytes())
            .into()
    }
}

/// In-memory admin flag. Never persisted, so a reload always logs out.
#[derive(Debug, Default)]
pub struct AdminSession {
    active: bool,
}

impl AdminSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Activate the session on a password match. A mismatch leaves it unchanged.
    pub fn login(&mut self, credentials: &AdminCredentials, attempt: &str) -> bool {
        let matched = credentials.matches(attempt);
        if matched {
            self.active = true;
        }
        matched
    }

    pub fn logout(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> AdminCredentials {
        AdminCredentials::from_sha256_hex(&AdminCredentials::hash_password("letmein")).unwrap()
    }

    #[test]
    fn test_from_sha256_hex_rejects_garbage() {
        assert!(AdminCredentials::from_sha256_hex("not-a-digest").is_none());
        assert!(AdminCredentials::from_sha256_hex("abcd").is_none());
    }

    #[test]
    fn test_from_sha256_hex_ignores_case() {
        let upper = AdminCredentials::hash_password("letmein").to_uppercase();
        let creds = AdminCredentials::from_sha256_hex(&upper).unwrap();
        assert!(creds.matches("letmein"));
    }

    #[test]
    fn test_matches_only_exact_password() {
        let creds = credentials();
        assert!(creds.matches("letmein"));
        assert!(!creds.matches("letmein "));
        assert!(!creds.matches(""));
    }

    #[test]
    fn test_login_with_correct_password() {
        let mut session = AdminSession::new();
        assert!(session.login(&credentials(), "letmein"));
        assert!(session.is_active());
    }

    #[test]
    fn test_login_with_wrong_password() {
        let mut session = AdminSession::new();
        assert!(!session.login(&credentials(), "guess"));
        assert!(!session.is_active());
    }

    #[test]
    fn test_logout_clears_flag() {
        let mut session = AdminSession::new();
        session.login(&credentials(), "letmein");
        session.logout();
        assert!(!session.is_active());
    }
}
