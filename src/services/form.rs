// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Support form controller: field state, local checks, persistence and the
//! relay call, folded into an `idle → submitting → success | error` machine.

use crate::models::domain::{AllowedDomainSet, DomainRejection};
use crate::models::request::{RequestId, Section, ServiceType, SupportRequest};
use crate::services::logging::anonymize_email;
use crate::services::relay_client::RelayClient;
use crate::services::store::SubmissionStore;
use chrono::Utc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

/// How long a success or error banner stays up in transient mode.
pub const DEFAULT_FEEDBACK_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company_name: String,
    pub service_type: ServiceType,
    pub section: Section,
    pub related_domain: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStatus {
    Idle,
    Submitting,
    Success { request_id: RequestId },
    Error { message: String },
}

/// How a settled submission is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackMode {
    /// Banner that returns to idle after the timeout.
    Transient(Duration),
    /// Modal that stays until dismissed.
    Modal,
}

impl Default for FeedbackMode {
    fn default() -> Self {
        FeedbackMode::Transient(DEFAULT_FEEDBACK_TIMEOUT)
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{0}")]
    Validation(&'static str),

    #[error(transparent)]
    Domain(#[from] DomainRejection),

    #[error("Please complete the security check before submitting.")]
    CaptchaMissing,

    #[error("We could not save your request. Please try again. ({0})")]
    Persistence(String),

    #[error("{0}")]
    Relay(String),
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Owns one support form. `submit` takes `&mut self`, so only one submission
/// can be in flight per form.
pub struct FormController<S, R> {
    store: S,
    relay: R,
    allowed_domains: AllowedDomainSet,
    mode: FeedbackMode,
    pub fields: FormFields,
    captcha_token: Option<String>,
    status: SubmitStatus,
    settled_at: Option<Instant>,
}

impl<S, R> FormController<S, R>
where
    S: SubmissionStore,
    R: RelayClient,
{
    pub fn new(store: S, relay: R, allowed_domains: AllowedDomainSet, mode: FeedbackMode) -> Self {
        Self {
            store,
            relay,
            allowed_domains,
            mode,
            fields: FormFields::default(),
            captcha_token: None,
            status: SubmitStatus::Idle,
            settled_at: None,
        }
    }

    pub fn status(&self) -> &SubmitStatus {
        &self.status
    }

    /// The submit control is disabled while a submission runs.
    pub fn can_submit(&self) -> bool {
        self.status != SubmitStatus::Submitting
    }

    /// Token handed over by the challenge widget.
    pub fn set_captcha_token(&mut self, token: impl Into<String>) {
        self.captcha_token = Some(token.into());
    }

    pub fn captcha_token(&self) -> Option<&str> {
        self.captcha_token.as_deref()
    }

    /// Request id shown in the success modal, if one is open.
    pub fn modal_request_id(&self) -> Option<&RequestId> {
        match (&self.mode, &self.status) {
            (FeedbackMode::Modal, SubmitStatus::Success { request_id }) => Some(request_id),
            _ => None,
        }
    }

    /// Expire transient feedback once its timeout has passed.
    pub fn tick(&mut self, now: Instant) {
        let FeedbackMode::Transient(timeout) = self.mode else {
            return;
        };
        if let Some(settled_at) = self.settled_at {
            if now.saturating_duration_since(settled_at) >= timeout {
                self.reset_status();
            }
        }
    }

    /// Close the modal.
    pub fn dismiss(&mut self) {
        if matches!(
            self.status,
            SubmitStatus::Success { .. } | SubmitStatus::Error { .. }
        ) {
            self.reset_status();
        }
    }

    fn reset_status(&mut self) {
        self.status = SubmitStatus::Idle;
        self.settled_at = None;
    }

    pub async fn submit(&mut self) -> Result<RequestId, SubmitError> {
        self.status = SubmitStatus::Submitting;
        self.settled_at = None;

        let result = self.attempt().await;

        self.status = match &result {
            Ok(request_id) => {
                self.fields = FormFields::default();
                self.captcha_token = None;
                SubmitStatus::Success {
                    request_id: request_id.clone(),
                }
            }
            Err(e) => SubmitStatus::Error {
                message: e.to_string(),
            },
        };
        self.settled_at = Some(Instant::now());
        result
    }

    fn validate_locally(&self) -> Result<(), SubmitError> {
        let f = &self.fields;
        let required = [&f.first_name, &f.last_name, &f.email, &f.message];
        if required.iter().any(|v| v.trim().is_empty()) {
            return Err(SubmitError::Validation("Please fill in all required fields."));
        }
        if !is_valid_email(f.email.trim()) {
            return Err(SubmitError::Validation("Please enter a valid email address."));
        }
        if !f.related_domain.trim().is_empty() {
            self.allowed_domains.check(&f.related_domain)?;
        }
        Ok(())
    }

    async fn attempt(&mut self) -> Result<RequestId, SubmitError> {
        self.validate_locally()?;

        let token = self
            .captcha_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or(SubmitError::CaptchaMissing)?;

        let f = &self.fields;
        let request = SupportRequest {
            request_id: RequestId::generate(),
            first_name: f.first_name.trim().to_string(),
            last_name: f.last_name.trim().to_string(),
            sender_email: f.email.trim().to_string(),
            company_name: f.company_name.trim().to_string(),
            service_type: f.service_type,
            section: f.section,
            related_domain: f.related_domain.trim().to_lowercase(),
            message: f.message.clone(),
            created_at: Utc::now(),
        };

        self.store.insert(&request).await.map_err(|e| {
            warn!(request_id = %request.request_id, error = %e, "Failed to persist support request");
            SubmitError::Persistence(e.to_string())
        })?;

        // Tokens are single-use once they reach the relay
        self.captcha_token = None;
        let reply = self.relay.send(&request.to_wire(Some(&token))).await;

        match reply {
            Ok(message) => {
                info!(
                    request_id = %request.request_id,
                    sender = %anonymize_email(&request.sender_email),
                    %message,
                    "Support request submitted"
                );
                Ok(request.request_id)
            }
            Err(e) => {
                warn!(request_id = %request.request_id, error = %e, "Relay rejected support request");
                Err(SubmitError::Relay(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("ada@example.org"));
        assert!(!is_valid_email("ada.example.org"));
        assert!(!is_valid_email("@example.org"));
        assert!(!is_valid_email("ada@localhost"));
        assert!(!is_valid_email("ada@example."));
    }

    #[test]
    fn test_default_feedback_is_three_second_banner() {
        assert_eq!(
            FeedbackMode::default(),
            FeedbackMode::Transient(Duration::from_secs(3))
        );
    }

    #[test]
    fn test_default_fields_select_first_options() {
        let fields = FormFields::default();
        assert_eq!(fields.service_type, ServiceType::Hosting);
        assert_eq!(fields.section, Section::Support);
    }
}
