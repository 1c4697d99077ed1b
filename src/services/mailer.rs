// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Notification dispatcher: renders the staff notification and the submitter
//! receipt, and posts them to the transactional email API.

use crate::config::RelayConfig;
use crate::models::request::SupportRequest;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use std::sync::Arc;
use url::Url;

/// Scheme the email provider expects in front of the API key.
pub const AUTH_SCHEME: &str = "Zoho-enczapikey";

/// Build the `Authorization` header value, adding the scheme only if missing.
pub fn authorization_header(token: &str) -> String {
    let token = token.trim();
    if token.starts_with(AUTH_SCHEME) {
        token.to_string()
    } else {
        format!("{AUTH_SCHEME} {token}")
    }
}

/// Escape text for interpolation into HTML.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Email template with `{{name}}` substitution.
struct EmailTemplate {
    content: &'static str,
}

impl EmailTemplate {
    const fn new(content: &'static str) -> Self {
        Self { content }
    }

    /// Single pass, so substituted values are never re-expanded. Unknown
    /// placeholders are left as-is.
    fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut result = String::with_capacity(self.content.len());
        let mut rest = self.content;
        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                result.push_str(&rest[start..]);
                return result;
            };
            let key = &after[..end];
            match vars.iter().find(|(k, _)| *k == key) {
                Some((_, value)) => result.push_str(value),
                None => result.push_str(&rest[start..start + 2 + end + 2]),
            }
            rest = &after[end + 2..];
        }
        result.push_str(rest);
        result
    }
}

// Email templates loaded at compile time
const STAFF_TEMPLATE: EmailTemplate =
    EmailTemplate::new(include_str!("../../templates/emails/staff_notification.html"));
const RECEIPT_TEMPLATE: EmailTemplate =
    EmailTemplate::new(include_str!("../../templates/emails/receipt.html"));

/// Cell style shared with the template's own detail rows.
const ROW_CELL_STYLE: &str = "padding: 12px 0; border-bottom: 1px solid #f1f5f9;";

fn detail_row(label: &str, value: &str) -> String {
    format!(
        "        <tr>\n          <td style=\"{ROW_CELL_STYLE} color: #64748b;\">{label}:</td>\n          <td style=\"{ROW_CELL_STYLE} color: #1e293b; font-weight: 600;\">{}</td>\n        </tr>",
        escape_html(value)
    )
}

fn optional_row(label: &str, value: &str) -> String {
    if value.trim().is_empty() {
        String::new()
    } else {
        detail_row(label, value.trim())
    }
}

// ============================================================================
// Provider wire format
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailAddress {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipient {
    pub email_address: EmailAddress,
}

/// One single-recipient transactional email.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEmail {
    pub from: EmailAddress,
    pub to: Vec<Recipient>,
    pub subject: String,
    pub htmlbody: String,
}

impl OutboundEmail {
    pub fn recipient(&self) -> Option<&str> {
        self.to.first().map(|r| r.email_address.address.as_str())
    }
}

/// Provider status and raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReply {
    pub status: u16,
    pub body: String,
}

impl ProviderReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport to the transactional email provider.
#[async_trait]
pub trait MailApi: Send + Sync {
    /// `Err` only when the provider could not be reached; any HTTP status is a reply.
    async fn send(&self, authorization: &str, email: &OutboundEmail) -> Result<ProviderReply>;
}

/// ZeptoMail HTTP API client.
pub struct ZeptoMailApi {
    client: reqwest::Client,
    endpoint: Url,
}

impl ZeptoMailApi {
    pub fn new(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl MailApi for ZeptoMailApi {
    async fn send(&self, authorization: &str, email: &OutboundEmail) -> Result<ProviderReply> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, authorization)
            .json(email)
            .send()
            .await
            .context("Failed to reach the email provider")?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .context("Failed to read the email provider response")?;

        Ok(ProviderReply { status, body })
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Sender identity and branding for outgoing notifications.
#[derive(Debug, Clone)]
pub struct MailIdentity {
    pub from_address: String,
    pub support_address: String,
    pub support_name: String,
    pub brand_name: String,
}

impl From<&RelayConfig> for MailIdentity {
    fn from(config: &RelayConfig) -> Self {
        Self {
            from_address: config.from_address.clone(),
            support_address: config.support_address.clone(),
            support_name: config.support_name.clone(),
            brand_name: config.brand_name.clone(),
        }
    }
}

/// Renders and sends the two notifications of a support request.
#[derive(Clone)]
pub struct NotificationDispatcher {
    api: Arc<dyn MailApi>,
    identity: MailIdentity,
}

impl NotificationDispatcher {
    pub fn new(api: Arc<dyn MailApi>, identity: MailIdentity) -> Self {
        Self { api, identity }
    }

    fn sender(&self) -> EmailAddress {
        EmailAddress {
            address: self.identity.from_address.clone(),
            name: None,
        }
    }

    /// Staff-facing email with the full request detail.
    pub fn staff_notification(&self, request: &SupportRequest) -> OutboundEmail {
        let request_id = escape_html(request.request_id.as_str());
        let full_name = escape_html(&request.full_name());
        let sender_email = escape_html(&request.sender_email);
        let company_row = optional_row("Company", &request.company_name);
        let domain_row = optional_row("Related Domain", &request.related_domain);
        let message = escape_html(&request.message);
        let brand_name = escape_html(&self.identity.brand_name);

        let htmlbody = STAFF_TEMPLATE.render(&[
            ("request_id", &request_id),
            ("full_name", &full_name),
            ("sender_email", &sender_email),
            ("company_row", &company_row),
            ("service_type", request.service_type.as_str()),
            ("section", request.section.as_str()),
            ("domain_row", &domain_row),
            ("message", &message),
            ("brand_name", &brand_name),
        ]);

        OutboundEmail {
            from: self.sender(),
            to: vec![Recipient {
                email_address: EmailAddress {
                    address: self.identity.support_address.clone(),
                    name: Some(self.identity.support_name.clone()),
                },
            }],
            subject: format!(
                "[{}] New Support Request - {} / {}",
                request.request_id, request.service_type, request.section
            ),
            htmlbody,
        }
    }

    /// Submitter-facing receipt.
    pub fn receipt(&self, request: &SupportRequest, submitted_at: DateTime<Utc>) -> OutboundEmail {
        let request_id = escape_html(request.request_id.as_str());
        let first_name = escape_html(&request.first_name);
        let submitted = submitted_at.to_rfc2822();
        let brand_name = escape_html(&self.identity.brand_name);

        let htmlbody = RECEIPT_TEMPLATE.render(&[
            ("request_id", &request_id),
            ("first_name", &first_name),
            ("service_type", request.service_type.as_str()),
            ("section", request.section.as_str()),
            ("submitted_at", &submitted),
            ("brand_name", &brand_name),
        ]);

        OutboundEmail {
            from: self.sender(),
            to: vec![Recipient {
                email_address: EmailAddress {
                    address: request.sender_email.clone(),
                    name: Some(request.full_name()),
                },
            }],
            subject: format!("Support Request Received - Ticket #{}", request.request_id),
            htmlbody,
        }
    }

    pub async fn send_staff_notification(
        &self,
        authorization: &str,
        request: &SupportRequest,
    ) -> Result<ProviderReply> {
        self.api
            .send(authorization, &self.staff_notification(request))
            .await
    }

    pub async fn send_receipt(
        &self,
        authorization: &str,
        request: &SupportRequest,
    ) -> Result<ProviderReply> {
        self.api
            .send(authorization, &self.receipt(request, Utc::now()))
            .await
    }
}
