// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Bot-check gate backed by Cloudflare Turnstile.

use crate::error::RelayError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;

/// Verifies a one-time challenge token with the provider.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// `Ok(false)` for a negative or malformed verdict; `Err` only when the
    /// provider could not be reached.
    async fn verify(&self, token: &str) -> Result<bool>;
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(rename = "error-codes", default)]
    error_codes: Vec<String>,
}

/// Turnstile `siteverify` client.
pub struct TurnstileVerifier {
    client: reqwest::Client,
    verify_url: Url,
    secret: String,
}

impl TurnstileVerifier {
    pub fn new(client: reqwest::Client, verify_url: Url, secret: String) -> Self {
        Self {
            client,
            verify_url,
            secret,
        }
    }
}

#[async_trait]
impl CaptchaVerifier for TurnstileVerifier {
    async fn verify(&self, token: &str) -> Result<bool> {
        let response = self
            .client
            .post(self.verify_url.clone())
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await
            .context("Failed to reach the security check provider")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read the security check response")?;

        match serde_json::from_str::<SiteVerifyResponse>(&body) {
            Ok(verdict) => {
                info!(success = verdict.success, %status, "Turnstile verification result");
                if !verdict.success {
                    warn!(error_codes = ?verdict.error_codes, "Turnstile rejected token");
                }
                Ok(verdict.success)
            }
            Err(e) => {
                warn!(%status, error = %e, "Malformed Turnstile response");
                Ok(false)
            }
        }
    }
}

/// Server half of the bot-check gate.
#[derive(Clone)]
pub struct CaptchaGate {
    /// Present only when a secret is configured.
    verifier: Option<Arc<dyn CaptchaVerifier>>,
    required: bool,
}

impl CaptchaGate {
    pub fn new(verifier: Option<Arc<dyn CaptchaVerifier>>, required: bool) -> Self {
        if verifier.is_none() && !required {
            warn!("TURNSTILE_SECRET_KEY not set, security check is disabled");
        }
        Self { verifier, required }
    }

    pub fn is_enabled(&self) -> bool {
        self.verifier.is_some()
    }

    pub async fn check(&self, token: Option<&str>) -> Result<(), RelayError> {
        let Some(verifier) = &self.verifier else {
            if self.required {
                error!("Security check required but TURNSTILE_SECRET_KEY is not set");
                return Err(RelayError::CaptchaNotConfigured);
            }
            return Ok(());
        };

        let token = token.map(str::trim).filter(|t| !t.is_empty());
        let Some(token) = token else {
            warn!("Captcha token missing but protection is enabled");
            return Err(RelayError::CaptchaMissing);
        };

        if verifier.verify(token).await? {
            Ok(())
        } else {
            Err(RelayError::CaptchaRejected)
        }
    }
}
