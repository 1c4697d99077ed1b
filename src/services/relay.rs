// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! The `/send-email` pipeline: bot check, field validation, staff
//! notification, then the submitter receipt.

use crate::error::RelayError;
use crate::models::request::{RequestId, Section, SendEmailRequest, ServiceType, SupportRequest};
use crate::services::captcha::CaptchaGate;
use crate::services::logging::anonymize_email;
use crate::services::mailer::{authorization_header, NotificationDispatcher};
use chrono::Utc;
use tracing::{error, info, warn};

pub const SUCCESS_MESSAGE: &str = "Support request processed and emails sent successfully!";

/// Result of a relayed submission that reached the staff inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    pub request_id: RequestId,
    pub receipt_sent: bool,
}

/// Validates a submission and fans it out to the email provider.
#[derive(Clone)]
pub struct SubmissionRelay {
    gate: CaptchaGate,
    dispatcher: NotificationDispatcher,
    mail_token: Option<String>,
}

impl SubmissionRelay {
    pub fn new(
        gate: CaptchaGate,
        dispatcher: NotificationDispatcher,
        mail_token: Option<String>,
    ) -> Self {
        Self {
            gate,
            dispatcher,
            mail_token,
        }
    }

    pub async fn process(&self, body: SendEmailRequest) -> Result<RelayOutcome, RelayError> {
        info!(
            request_id = %body.request_id,
            sender = %anonymize_email(&body.sender_email),
            message_length = body.message.len(),
            has_captcha = body.captcha_token.is_some(),
            "Support request received"
        );

        self.gate.check(body.captcha_token.as_deref()).await?;

        let request = validate(&body)?;

        let Some(token) = self.mail_token.as_deref() else {
            error!("MAIL_API_TOKEN not found in environment");
            return Err(RelayError::MailTokenMissing);
        };
        let authorization = authorization_header(token);

        let staff = self
            .dispatcher
            .send_staff_notification(&authorization, &request)
            .await?;
        info!(request_id = %request.request_id, status = staff.status, "Support email response");
        if !staff.is_success() {
            warn!(
                request_id = %request.request_id,
                status = staff.status,
                body = %staff.body,
                "Support email rejected by provider"
            );
            return Err(RelayError::StaffEmailRejected {
                details: staff.body,
            });
        }

        let receipt_sent = match self
            .dispatcher
            .send_receipt(&authorization, &request)
            .await
        {
            Ok(reply) if reply.is_success() => {
                info!(request_id = %request.request_id, "Client receipt email sent");
                true
            }
            Ok(reply) => {
                warn!(
                    request_id = %request.request_id,
                    status = reply.status,
                    body = %reply.body,
                    "Failed to send client receipt email, but support email was sent"
                );
                false
            }
            Err(e) => {
                warn!(
                    request_id = %request.request_id,
                    error = %e,
                    "Failed to send client receipt email, but support email was sent"
                );
                false
            }
        };

        Ok(RelayOutcome {
            request_id: request.request_id,
            receipt_sent,
        })
    }
}

/// Turn the wire body into a [`SupportRequest`], enforcing required fields.
pub fn validate(body: &SendEmailRequest) -> Result<SupportRequest, RelayError> {
    let required = [
        &body.first_name,
        &body.last_name,
        &body.sender_email,
        &body.message,
        &body.service_type,
        &body.section,
    ];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(RelayError::MissingFields);
    }

    let service_type = ServiceType::parse(&body.service_type)
        .ok_or_else(|| RelayError::InvalidServiceType(body.service_type.trim().to_string()))?;
    let section = Section::parse(&body.section)
        .ok_or_else(|| RelayError::InvalidSection(body.section.trim().to_string()))?;

    Ok(SupportRequest {
        request_id: RequestId::from_wire(&body.request_id),
        first_name: body.first_name.trim().to_string(),
        last_name: body.last_name.trim().to_string(),
        sender_email: body.sender_email.trim().to_string(),
        company_name: body.company_name.trim().to_string(),
        service_type,
        section,
        related_domain: body.related_domain.trim().to_string(),
        message: body.message.clone(),
        created_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> SendEmailRequest {
        SendEmailRequest {
            request_id: "PSH-AB12CD34".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            sender_email: "ada@example.org".to_string(),
            company_name: String::new(),
            service_type: "Hosting".to_string(),
            section: "Support".to_string(),
            related_domain: String::new(),
            message: "Help".to_string(),
            captcha_token: None,
        }
    }

    #[test]
    fn test_validate_accepts_complete_body() {
        let request = validate(&body()).unwrap();
        assert_eq!(request.request_id.as_str(), "PSH-AB12CD34");
        assert_eq!(request.service_type, ServiceType::Hosting);
        assert_eq!(request.section, Section::Support);
    }

    #[test]
    fn test_validate_rejects_blank_required_field() {
        for field in ["first_name", "last_name", "sender_email", "message", "service_type", "section"] {
            let mut b = body();
            match field {
                "first_name" => b.first_name = "  ".to_string(),
                "last_name" => b.last_name.clear(),
                "sender_email" => b.sender_email.clear(),
                "message" => b.message = "\n".to_string(),
                "service_type" => b.service_type.clear(),
                _ => b.section.clear(),
            }
            let err = validate(&b).unwrap_err();
            assert!(matches!(err, RelayError::MissingFields), "field {field}");
        }
    }

    #[test]
    fn test_validate_optional_fields_may_be_blank() {
        let mut b = body();
        b.company_name.clear();
        b.related_domain.clear();
        assert!(validate(&b).is_ok());
    }

    #[test]
    fn test_validate_passes_missing_request_id_through() {
        let mut b = body();
        b.request_id.clear();
        let request = validate(&b).unwrap();
        assert_eq!(request.request_id.as_str(), "");
    }

    #[test]
    fn test_validate_rejects_unknown_enum_values() {
        let mut b = body();
        b.service_type = "Storage".to_string();
        assert_eq!(
            validate(&b).unwrap_err().to_string(),
            "Invalid service type: Storage"
        );

        let mut b = body();
        b.section = "Legal".to_string();
        assert_eq!(validate(&b).unwrap_err().to_string(), "Invalid section: Legal");
    }
}
