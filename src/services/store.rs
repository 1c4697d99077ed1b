// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Insert-only persistence of submitted support requests into a hosted table.

use crate::config::append_segments;
use crate::models::request::SupportRequest;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use url::Url;

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn insert(&self, request: &SupportRequest) -> Result<()>;
}

/// Hosted Postgres table exposed through a PostgREST endpoint.
pub struct RestTableStore {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl RestTableStore {
    pub fn new(client: reqwest::Client, base_url: &Url, api_key: String, table: &str) -> Result<Self> {
        let endpoint = append_segments(base_url, &["rest", "v1", table])
            .with_context(|| format!("Invalid table endpoint for '{table}'"))?;
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
impl SubmissionStore for RestTableStore {
    async fn insert(&self, request: &SupportRequest) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=minimal")
            .json(&[request])
            .send()
            .await
            .context("Failed to reach the datastore")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Datastore rejected the request ({status}): {body}");
        }
        Ok(())
    }
}
