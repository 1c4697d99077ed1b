// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Prefix shared by every request identifier shown to submitters.
pub const REQUEST_ID_PREFIX: &str = "PSH-";

const REQUEST_ID_LEN: usize = 8;
const REQUEST_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// ============================================================================
// Request identifier
// ============================================================================

/// Human-readable ticket reference, e.g. `PSH-7K2QX9ZD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh identifier from 8 random base-36 characters.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..REQUEST_ID_LEN)
            .map(|_| REQUEST_ID_ALPHABET[rng.gen_range(0..REQUEST_ID_ALPHABET.len())] as char)
            .collect();
        Self(format!("{REQUEST_ID_PREFIX}{suffix}"))
    }

    /// Wrap an identifier received over the wire without reformatting it.
    pub fn from_wire(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Service type and section enums
// ============================================================================

/// Product line the request is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum ServiceType {
    #[default]
    Hosting,
    Domain,
    Email,
    Security,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Hosting => "Hosting",
            ServiceType::Domain => "Domain",
            ServiceType::Email => "Email",
            ServiceType::Security => "Security",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hosting" => Some(ServiceType::Hosting),
            "domain" => Some(ServiceType::Domain),
            "email" => Some(ServiceType::Email),
            "security" => Some(ServiceType::Security),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Team that should pick the request up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum Section {
    #[default]
    Support,
    Billing,
    Sales,
    Security,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Support => "Support",
            Section::Billing => "Billing",
            Section::Sales => "Sales",
            Section::Security => "Security",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "support" => Some(Section::Support),
            "billing" => Some(Section::Billing),
            "sales" => Some(Section::Sales),
            "security" => Some(Section::Security),
            _ => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Support request
// ============================================================================

/// A submitted support request. Immutable once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SupportRequest {
    pub request_id: RequestId,
    pub first_name: String,
    pub last_name: String,
    pub sender_email: String,
    pub company_name: String,
    pub service_type: ServiceType,
    pub section: Section,
    pub related_domain: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl SupportRequest {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Wire body for `POST /send-email`.
    pub fn to_wire(&self, captcha_token: Option<&str>) -> SendEmailRequest {
        SendEmailRequest {
            request_id: self.request_id.to_string(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            sender_email: self.sender_email.clone(),
            company_name: self.company_name.clone(),
            service_type: self.service_type.to_string(),
            section: self.section.to_string(),
            related_domain: self.related_domain.clone(),
            message: self.message.clone(),
            captcha_token: captcha_token.map(str::to_string),
        }
    }
}

// ============================================================================
// HTTP contract
// ============================================================================

/// JSON body of `POST /send-email`.
///
/// Every field defaults to empty so that validation can report missing fields
/// instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct SendEmailRequest {
    pub request_id: String,
    pub first_name: String,
    pub last_name: String,
    pub sender_email: String,
    pub company_name: String,
    pub service_type: String,
    pub section: String,
    pub related_domain: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha_token: Option<String>,
}

/// Success body of `POST /send-email`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendEmailResponse {
    pub message: String,
}

/// Error body of `POST /send-email`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Public settings the maintenance page needs to render.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SiteConfigResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha_site_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_request_id_format() {
        let id = RequestId::generate();
        let suffix = id.as_str().strip_prefix(REQUEST_ID_PREFIX).unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_request_ids_are_unique() {
        let ids: HashSet<RequestId> = (0..10_000).map(|_| RequestId::generate()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_service_type_parse_is_case_insensitive() {
        assert_eq!(ServiceType::parse("hosting"), Some(ServiceType::Hosting));
        assert_eq!(ServiceType::parse(" EMAIL "), Some(ServiceType::Email));
        assert_eq!(ServiceType::parse("Storage"), None);
    }

    #[test]
    fn test_section_parse() {
        assert_eq!(Section::parse("Billing"), Some(Section::Billing));
        assert_eq!(Section::parse("sales"), Some(Section::Sales));
        assert_eq!(Section::parse(""), None);
    }

    #[test]
    fn test_send_email_request_tolerates_missing_keys() {
        let body: SendEmailRequest =
            serde_json::from_str(r#"{"first_name":"Ada","message":"hi"}"#).unwrap();
        assert_eq!(body.first_name, "Ada");
        assert!(body.last_name.is_empty());
        assert!(body.captcha_token.is_none());
    }

    #[test]
    fn test_to_wire_uses_display_names() {
        let request = SupportRequest {
            request_id: RequestId::from_wire("PSH-ABCDEFGH"),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            sender_email: "ada@example.com".to_string(),
            company_name: String::new(),
            service_type: ServiceType::Domain,
            section: Section::Billing,
            related_domain: String::new(),
            message: "Invoice question".to_string(),
            created_at: Utc::now(),
        };
        let wire = request.to_wire(Some("tok"));
        assert_eq!(wire.request_id, "PSH-ABCDEFGH");
        assert_eq!(wire.service_type, "Domain");
        assert_eq!(wire.section, "Billing");
        assert_eq!(wire.captcha_token.as_deref(), Some("tok"));
    }
}
