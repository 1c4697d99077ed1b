// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use support_relay::models::domain::{AllowedDomainSet, DomainRejection};
use support_relay::models::request::{SendEmailRequest, SupportRequest};
use support_relay::services::form::{
    FeedbackMode, FormController, FormFields, SubmitError, SubmitStatus,
};
use support_relay::services::relay_client::{RelayCallError, RelayClient};
use support_relay::services::store::SubmissionStore;

#[derive(Clone, Default)]
struct FakeStore {
    rows: Arc<Mutex<Vec<SupportRequest>>>,
    fail: bool,
}

#[async_trait]
impl SubmissionStore for FakeStore {
    async fn insert(&self, request: &SupportRequest) -> Result<()> {
        if self.fail {
            return Err(anyhow!("permission denied for table support_requests"));
        }
        self.rows.lock().unwrap().push(request.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
struct FakeRelay {
    calls: Arc<Mutex<Vec<SendEmailRequest>>>,
    reject_with: Option<String>,
}

#[async_trait]
impl RelayClient for FakeRelay {
    async fn send(&self, body: &SendEmailRequest) -> Result<String, RelayCallError> {
        self.calls.lock().unwrap().push(body.clone());
        match &self.reject_with {
            Some(message) => Err(RelayCallError::Rejected {
                status: 400,
                message: message.clone(),
            }),
            None => Ok("Support request processed and emails sent successfully!".to_string()),
        }
    }
}

fn filled() -> FormFields {
    FormFields {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.org".to_string(),
        company_name: "Analytical Engines".to_string(),
        related_domain: "portal.wahl.sa".to_string(),
        message: "The site is down".to_string(),
        ..Default::default()
    }
}

fn controller(
    store: FakeStore,
    relay: FakeRelay,
    mode: FeedbackMode,
) -> FormController<FakeStore, FakeRelay> {
    let mut form = FormController::new(store, relay, AllowedDomainSet::default(), mode);
    form.fields = filled();
    form.set_captcha_token("token-123");
    form
}

#[tokio::test]
async fn test_successful_submission_persists_then_relays() {
    let store = FakeStore::default();
    let relay = FakeRelay::default();
    let mut form = controller(store.clone(), relay.clone(), FeedbackMode::Modal);

    let request_id = form.submit().await.unwrap();

    let rows = store.rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].request_id, request_id);

    let calls = relay.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].request_id, request_id.as_str());
    assert_eq!(calls[0].captcha_token.as_deref(), Some("token-123"));
    assert_eq!(calls[0].service_type, "Hosting");
    assert_eq!(calls[0].section, "Support");

    assert!(request_id.as_str().starts_with("PSH-"));
    assert_eq!(form.fields, FormFields::default());
    assert_eq!(form.captcha_token(), None);
    assert_eq!(form.modal_request_id(), Some(&request_id));
    assert!(form.can_submit());
}

#[tokio::test]
async fn test_empty_message_never_reaches_relay() {
    let store = FakeStore::default();
    let relay = FakeRelay::default();
    let mut form = controller(store.clone(), relay.clone(), FeedbackMode::default());
    form.fields.message = "   ".to_string();

    let err = form.submit().await.unwrap_err();

    assert!(matches!(err, SubmitError::Validation(_)));
    assert!(store.rows.lock().unwrap().is_empty());
    assert!(relay.calls.lock().unwrap().is_empty());
    assert_eq!(form.fields.message, "   ");
}

#[tokio::test]
async fn test_malformed_email_is_rejected_locally() {
    let relay = FakeRelay::default();
    let mut form = controller(FakeStore::default(), relay.clone(), FeedbackMode::default());
    form.fields.email = "ada.example.org".to_string();

    let err = form.submit().await.unwrap_err();

    assert!(matches!(err, SubmitError::Validation(_)));
    assert!(relay.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_disallowed_domain_shows_example_subdomain() {
    let store = FakeStore::default();
    let relay = FakeRelay::default();
    let mut form = controller(store.clone(), relay.clone(), FeedbackMode::default());
    form.fields.related_domain = "evil.com".to_string();

    let err = form.submit().await.unwrap_err();

    match &err {
        SubmitError::Domain(DomainRejection::NotAllowed { domain, .. }) => {
            assert_eq!(domain, "evil.com");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("portal.privetserver.com"));
    assert!(store.rows.lock().unwrap().is_empty());
    assert!(relay.calls.lock().unwrap().is_empty());
    assert!(matches!(form.status(), SubmitStatus::Error { .. }));
}

#[tokio::test]
async fn test_lookalike_domain_is_rejected() {
    let relay = FakeRelay::default();
    let mut form = controller(FakeStore::default(), relay.clone(), FeedbackMode::default());
    form.fields.related_domain = "notwahl.sa".to_string();

    assert!(matches!(
        form.submit().await,
        Err(SubmitError::Domain(_))
    ));
    assert!(relay.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_domain_skips_allow_list() {
    let relay = FakeRelay::default();
    let mut form = controller(FakeStore::default(), relay.clone(), FeedbackMode::default());
    form.fields.related_domain = String::new();

    form.submit().await.unwrap();

    assert_eq!(relay.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_captcha_makes_no_calls() {
    let store = FakeStore::default();
    let relay = FakeRelay::default();
    let mut form = FormController::new(
        store.clone(),
        relay.clone(),
        AllowedDomainSet::default(),
        FeedbackMode::default(),
    );
    form.fields = filled();

    let err = form.submit().await.unwrap_err();

    assert!(matches!(err, SubmitError::CaptchaMissing));
    assert!(store.rows.lock().unwrap().is_empty());
    assert!(relay.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_relay_rejection_keeps_fields_and_clears_token() {
    let relay = FakeRelay {
        reject_with: Some("Failed to send support email: invalid sender".to_string()),
        ..Default::default()
    };
    let mut form = controller(FakeStore::default(), relay.clone(), FeedbackMode::default());

    let err = form.submit().await.unwrap_err();

    assert!(matches!(err, SubmitError::Relay(_)));
    assert_eq!(
        form.status(),
        &SubmitStatus::Error {
            message: "Failed to send support email: invalid sender".to_string()
        }
    );
    assert_eq!(form.fields, filled());
    assert_eq!(form.captcha_token(), None);
}

#[tokio::test]
async fn test_persistence_failure_stops_before_relay() {
    let store = FakeStore {
        fail: true,
        ..Default::default()
    };
    let relay = FakeRelay::default();
    let mut form = controller(store, relay.clone(), FeedbackMode::default());

    let err = form.submit().await.unwrap_err();

    assert!(matches!(err, SubmitError::Persistence(_)));
    assert!(relay.calls.lock().unwrap().is_empty());
    assert_eq!(form.fields, filled());
    assert_eq!(form.captcha_token(), Some("token-123"));
}

#[tokio::test]
async fn test_transient_feedback_returns_to_idle() {
    let mut form = controller(
        FakeStore::default(),
        FakeRelay::default(),
        FeedbackMode::Transient(Duration::from_secs(3)),
    );

    form.submit().await.unwrap();
    assert!(matches!(form.status(), SubmitStatus::Success { .. }));
    assert_eq!(form.modal_request_id(), None);

    form.tick(Instant::now());
    assert!(matches!(form.status(), SubmitStatus::Success { .. }));

    form.tick(Instant::now() + Duration::from_secs(4));
    assert_eq!(form.status(), &SubmitStatus::Idle);
}

#[tokio::test]
async fn test_modal_stays_until_dismissed() {
    let mut form = controller(FakeStore::default(), FakeRelay::default(), FeedbackMode::Modal);

    form.submit().await.unwrap();
    form.tick(Instant::now() + Duration::from_secs(60));
    assert!(form.modal_request_id().is_some());

    form.dismiss();
    assert_eq!(form.status(), &SubmitStatus::Idle);
    assert_eq!(form.modal_request_id(), None);
}

#[tokio::test]
async fn test_each_submission_gets_a_fresh_request_id() {
    let relay = FakeRelay::default();
    let mut form = controller(FakeStore::default(), relay.clone(), FeedbackMode::Modal);

    let first = form.submit().await.unwrap();
    form.fields = filled();
    form.set_captcha_token("token-456");
    let second = form.submit().await.unwrap();

    assert_ne!(first, second);
    assert_eq!(relay.calls.lock().unwrap().len(), 2);
}
