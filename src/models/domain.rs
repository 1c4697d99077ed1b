// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domains accepted before an admin has edited the list.
pub const DEFAULT_ALLOWED_DOMAINS: &[&str] = &["privetserver.com", "wahl.sa"];

/// A related domain the allow-list does not cover.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainRejection {
    #[error(
        "The domain \"{domain}\" is not managed by us. Please enter one of our domains, e.g. {example} or {sub_example}."
    )]
    NotAllowed {
        domain: String,
        example: String,
        sub_example: String,
    },
    #[error("The domain \"{domain}\" is not managed by us. No domains are currently accepted.")]
    EmptyAllowList { domain: String },
}

/// Ordered set of lower-cased domains a related domain must match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct AllowedDomainSet {
    domains: Vec<String>,
}

impl From<Vec<String>> for AllowedDomainSet {
    fn from(entries: Vec<String>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<AllowedDomainSet> for Vec<String> {
    fn from(set: AllowedDomainSet) -> Self {
        set.domains
    }
}

impl Default for AllowedDomainSet {
    fn default() -> Self {
        Self {
            domains: DEFAULT_ALLOWED_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

impl AllowedDomainSet {
    pub fn empty() -> Self {
        Self {
            domains: Vec::new(),
        }
    }

    /// Build a set from arbitrary entries, normalizing and dropping duplicates.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::empty();
        for entry in entries {
            set.insert(entry.as_ref());
        }
        set
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn contains(&self, domain: &str) -> bool {
        let normalized = normalize_domain(domain);
        self.domains.iter().any(|d| *d == normalized)
    }

    /// Add a domain. Returns `false` for duplicates and blank input.
    pub fn insert(&mut self, domain: &str) -> bool {
        let normalized = normalize_domain(domain);
        if normalized.is_empty() || self.domains.contains(&normalized) {
            return false;
        }
        self.domains.push(normalized);
        true
    }

    /// Remove a domain. Returns `false` if it was not present.
    pub fn remove(&mut self, domain: &str) -> bool {
        let normalized = normalize_domain(domain);
        let before = self.domains.len();
        self.domains.retain(|d| *d != normalized);
        self.domains.len() != before
    }

    /// Exact or subdomain match against any entry.
    pub fn allows(&self, domain: &str) -> bool {
        let candidate = normalize_domain(domain);
        if candidate.is_empty() {
            return false;
        }
        self.domains.iter().any(|entry| {
            candidate == *entry
                || candidate
                    .strip_suffix(entry.as_str())
                    .is_some_and(|head| head.ends_with('.'))
        })
    }

    /// Like [`allows`](Self::allows), with a user-facing rejection.
    pub fn check(&self, domain: &str) -> Result<(), DomainRejection> {
        if self.allows(domain) {
            return Ok(());
        }
        let domain = domain.trim().to_string();
        match self.domains.first() {
            Some(first) => Err(DomainRejection::NotAllowed {
                domain,
                example: first.clone(),
                sub_example: format!("portal.{first}"),
            }),
            None => Err(DomainRejection::EmptyAllowList { domain }),
        }
    }
}

pub fn normalize_domain(domain: &str) -> String {
    domain.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wahl() -> AllowedDomainSet {
        AllowedDomainSet::from_entries(["wahl.sa"])
    }

    #[test]
    fn test_exact_match_allowed() {
        assert!(wahl().allows("wahl.sa"));
    }

    #[test]
    fn test_subdomain_allowed() {
        assert!(wahl().allows("portal.wahl.sa"));
        assert!(wahl().allows("a.b.wahl.sa"));
    }

    #[test]
    fn test_suffix_trick_rejected() {
        assert!(!wahl().allows("wahl.sa.evil.com"));
        assert!(!wahl().allows("evilwahl.sa"));
    }

    #[test]
    fn test_normalization() {
        assert!(wahl().allows("  Portal.WAHL.sa "));
    }

    #[test]
    fn test_empty_allow_list_rejects_everything() {
        let set = AllowedDomainSet::empty();
        assert!(!set.allows("wahl.sa"));
        assert_eq!(
            set.check("wahl.sa"),
            Err(DomainRejection::EmptyAllowList {
                domain: "wahl.sa".to_string()
            })
        );
    }

    #[test]
    fn test_blank_candidate_rejected() {
        assert!(!wahl().allows("   "));
    }

    #[test]
    fn test_rejection_names_domain_and_examples() {
        let message = wahl().check("example.org").unwrap_err().to_string();
        assert!(message.contains("\"example.org\""));
        assert!(message.contains("wahl.sa"));
        assert!(message.contains("portal.wahl.sa"));
    }

    #[test]
    fn test_insert_rejects_duplicates_case_insensitively() {
        let mut set = wahl();
        assert!(!set.insert("WAHL.SA"));
        assert!(set.insert("example.net"));
        assert_eq!(set.domains(), &["wahl.sa", "example.net"]);
    }

    #[test]
    fn test_insert_rejects_blank() {
        let mut set = AllowedDomainSet::empty();
        assert!(!set.insert("  "));
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut set = AllowedDomainSet::default();
        assert!(set.remove("Wahl.sa"));
        assert!(!set.remove("wahl.sa"));
        assert!(!set.contains("wahl.sa"));
        assert!(set.contains("privetserver.com"));
    }

    #[test]
    fn test_default_is_seeded() {
        let set = AllowedDomainSet::default();
        assert!(set.allows("privetserver.com"));
        assert!(set.allows("portal.wahl.sa"));
    }

    #[test]
    fn test_deserialize_normalizes_stored_entries() {
        let set: AllowedDomainSet =
            serde_json::from_str(r#"["WAHL.SA", "wahl.sa", " x.com ", ""]"#).unwrap();
        assert_eq!(set.domains(), ["wahl.sa", "x.com"]);
        assert!(set.allows("portal.x.com"));
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let json = serde_json::to_string(&wahl()).unwrap();
        assert_eq!(json, r#"["wahl.sa"]"#);
    }
}
