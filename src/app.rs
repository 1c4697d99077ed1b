// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Application state, route handlers, and router construction.
//!
//! This module is `pub` so that integration tests can build a test router directly
//! without starting the full binary.

use crate::config::RelayConfig;
use crate::models::request::SiteConfigResponse;
use crate::models::version::VersionResponse;
use crate::routes::{relay_router, RelayApiDoc, RelayState};
use crate::services::captcha::{CaptchaGate, CaptchaVerifier, TurnstileVerifier};
use crate::services::logging::describe_secret;
use crate::services::mailer::{MailApi, MailIdentity, NotificationDispatcher, ZeptoMailApi};
use crate::services::relay::SubmissionRelay;
use axum::{
    extract::State,
    http::{
        header::{ACCESS_CONTROL_ALLOW_HEADERS, AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application version extracted from `Cargo.toml` at compile time.
/// The patch segment can be overridden via `RELAY_PATCH_VERSION` (see `build.rs`).
pub const VERSION: &str = env!("RELAY_VERSION");

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Shared application state injected into every route handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub relay_state: RelayState,
    /// Public Turnstile key the maintenance page renders the widget with.
    pub captcha_site_key: Option<String>,
}

impl AppState {
    /// Wire the relay to explicit collaborators.
    pub fn new(
        config: &RelayConfig,
        verifier: Option<Arc<dyn CaptchaVerifier>>,
        mail_api: Arc<dyn MailApi>,
    ) -> Self {
        let gate = CaptchaGate::new(verifier, config.captcha_required);
        let dispatcher = NotificationDispatcher::new(mail_api, MailIdentity::from(config));
        let relay = SubmissionRelay::new(gate, dispatcher, config.mail_api_token.clone());
        Self {
            relay_state: RelayState::new(relay),
            captcha_site_key: config.turnstile_site_key.clone(),
        }
    }

    /// Wire the relay to Turnstile and ZeptoMail over a shared HTTP client.
    pub fn from_config(config: &RelayConfig) -> Self {
        let client = reqwest::Client::new();

        info!(
            mail_token = %describe_secret(config.mail_api_token.as_deref()),
            turnstile_secret = %describe_secret(config.turnstile_secret.as_deref()),
            captcha_required = config.captcha_required,
            "Relay configuration loaded"
        );

        let verifier = config.turnstile_secret.clone().map(|secret| {
            Arc::new(TurnstileVerifier::new(
                client.clone(),
                config.turnstile_verify_url.clone(),
                secret,
            )) as Arc<dyn CaptchaVerifier>
        });
        let mail_api = Arc::new(ZeptoMailApi::new(client, config.mail_api_url.clone()));

        Self::new(config, verifier, mail_api)
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

pub async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: "support-relay".to_string(),
        version: VERSION.to_string(),
    })
}

pub async fn site_config_handler(State(state): State<AppState>) -> Json<SiteConfigResponse> {
    Json(SiteConfigResponse {
        captcha_site_key: state.captcha_site_key,
    })
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Request headers the maintenance page's client library sends.
const ALLOWED_REQUEST_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            CONTENT_TYPE,
        ])
}

/// Build the Axum application router.
pub fn create_router(state: AppState) -> Router {
    let relay_routes = relay_router().with_state(state.relay_state.clone());

    Router::new()
        .route("/version", get(version_handler))
        .route("/site-config", get(site_config_handler))
        .with_state(state)
        .merge(relay_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", RelayApiDoc::openapi()))
        // CorsLayer only lists allowed headers on preflight; every response carries them here
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_REQUEST_HEADERS),
        ))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}
