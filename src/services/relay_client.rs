// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Client side of the `/send-email` contract.

use crate::config::append_segments;
use crate::models::request::{ErrorResponse, SendEmailRequest, SendEmailResponse};
use anyhow::{Context, Result};
use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Why the relay did not accept a submission.
#[derive(Debug, Error)]
pub enum RelayCallError {
    /// The relay answered with an error body.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

#[async_trait]
pub trait RelayClient: Send + Sync {
    /// Returns the relay's success message.
    async fn send(&self, body: &SendEmailRequest) -> Result<String, RelayCallError>;
}

pub struct HttpRelayClient {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpRelayClient {
    /// `base_url` is where the relay is mounted; `/send-email` is appended.
    pub fn new(client: reqwest::Client, base_url: &Url, api_key: Option<String>) -> Result<Self> {
        let endpoint = append_segments(base_url, &["send-email"]).context("Invalid relay URL")?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn send(&self, body: &SendEmailRequest) -> Result<String, RelayCallError> {
        let mut request = self.client.post(self.endpoint.clone()).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.context("Failed to reach the relay")?;
        let status = response.status();
        let text = response
            .text()
            .await
            .context("Failed to read the relay response")?;

        if status.is_success() {
            let parsed: SendEmailResponse =
                serde_json::from_str(&text).context("Malformed relay response")?;
            return Ok(parsed.message);
        }

        let message = match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(err) => match err.details {
                Some(details) => format!("{}: {}", err.error, details),
                None => err.error,
            },
            Err(_) => format!("Relay returned status {}", status.as_u16()),
        };
        Err(RelayCallError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_appends_path() {
        let base: Url = "https://fn.example.com/functions/v1/".parse().unwrap();
        let client = HttpRelayClient::new(reqwest::Client::new(), &base, None).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://fn.example.com/functions/v1/send-email"
        );
    }

    #[test]
    fn test_endpoint_appends_to_slashless_base() {
        let base: Url = "https://proj.supabase.co/functions/v1".parse().unwrap();
        let client = HttpRelayClient::new(reqwest::Client::new(), &base, None).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://proj.supabase.co/functions/v1/send-email"
        );
    }

    #[test]
    fn test_rejected_display_is_message() {
        let err = RelayCallError::Rejected {
            status: 400,
            message: "Missing required fields".to_string(),
        };
        assert_eq!(err.to_string(), "Missing required fields");
    }
}
