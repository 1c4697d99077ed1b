// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! `/send-email` route handlers.

use crate::error::RelayError;
use crate::models::request::{ErrorResponse, SendEmailRequest, SendEmailResponse};
use crate::services::relay::{SubmissionRelay, SUCCESS_MESSAGE};
use anyhow::anyhow;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;

/// State for relay routes.
#[derive(Clone)]
pub struct RelayState {
    pub relay: Arc<SubmissionRelay>,
}

impl RelayState {
    pub fn new(relay: SubmissionRelay) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}

/// OpenAPI document for the relay API.
#[derive(OpenApi)]
#[openapi(
    paths(send_email_handler, preflight_handler),
    components(schemas(SendEmailRequest, SendEmailResponse, ErrorResponse)),
    tags((name = "relay", description = "Support request relay"))
)]
pub struct RelayApiDoc;

/// Create the relay router.
pub fn relay_router() -> Router<RelayState> {
    Router::new().route(
        "/send-email",
        post(send_email_handler).options(preflight_handler),
    )
}

/// POST /send-email - Verify, validate and relay a support request.
#[utoipa::path(
    post,
    path = "/send-email",
    tag = "relay",
    request_body = SendEmailRequest,
    responses(
        (status = 200, description = "Staff notified", body = SendEmailResponse),
        (status = 400, description = "Validation, security check or provider failure", body = ErrorResponse),
        (status = 500, description = "Configuration or internal fault", body = ErrorResponse)
    )
)]
pub async fn send_email_handler(
    State(state): State<RelayState>,
    body: Bytes,
) -> Result<Json<SendEmailResponse>, RelayError> {
    let payload: SendEmailRequest = serde_json::from_slice(&body).map_err(|e| {
        error!(error = %e, "Unreadable request body");
        RelayError::Internal(anyhow!("Invalid JSON body: {e}"))
    })?;

    let outcome = state.relay.process(payload).await.inspect_err(|e| {
        if e.status().is_server_error() {
            error!(error = %e, "Support request failed");
        }
    })?;

    info!(
        request_id = %outcome.request_id,
        receipt_sent = outcome.receipt_sent,
        "Support request relayed"
    );

    Ok(Json(SendEmailResponse {
        message: SUCCESS_MESSAGE.to_string(),
    }))
}

/// OPTIONS /send-email - CORS preflight, always 200.
#[utoipa::path(
    options,
    path = "/send-email",
    tag = "relay",
    responses((status = 200, description = "Preflight accepted"))
)]
pub async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}
