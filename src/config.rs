// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Environment-driven configuration for the relay server and the form client.

use crate::models::admin::AdminCredentials;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_MAIL_API_URL: &str = "https://api.zeptomail.com/v1.1/email";
pub const DEFAULT_TURNSTILE_VERIFY_URL: &str =
    "https://challenges.cloudflare.com/turnstile/v0/siteverify";

/// Configuration of the `/send-email` relay.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub mail_api_url: Url,
    /// Provider secret. Checked per request so a missing value is a 500, not a boot failure.
    pub mail_api_token: Option<String>,
    pub from_address: String,
    pub support_address: String,
    pub support_name: String,
    pub brand_name: String,
    pub turnstile_secret: Option<String>,
    pub turnstile_site_key: Option<String>,
    pub turnstile_verify_url: Url,
    /// Fail closed when `turnstile_secret` is absent.
    pub captcha_required: bool,
}

impl RelayConfig {
    /// Load relay configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            mail_api_url: get("MAIL_API_URL")
                .unwrap_or_else(|| DEFAULT_MAIL_API_URL.to_string())
                .parse()
                .context("MAIL_API_URL must be a valid URL")?,
            mail_api_token: get("MAIL_API_TOKEN"),
            from_address: get("MAIL_FROM_ADDRESS")
                .unwrap_or_else(|| "noreply@privetserver.com".to_string()),
            support_address: get("SUPPORT_EMAIL")
                .unwrap_or_else(|| "support@privetserver.com".to_string()),
            support_name: get("SUPPORT_NAME").unwrap_or_else(|| "Support Team".to_string()),
            brand_name: get("BRAND_NAME").unwrap_or_else(|| "PrivetServer".to_string()),
            turnstile_secret: get("TURNSTILE_SECRET_KEY"),
            turnstile_site_key: get("TURNSTILE_SITE_KEY"),
            turnstile_verify_url: get("TURNSTILE_VERIFY_URL")
                .unwrap_or_else(|| DEFAULT_TURNSTILE_VERIFY_URL.to_string())
                .parse()
                .context("TURNSTILE_VERIFY_URL must be a valid URL")?,
            captcha_required: parse_bool(get("CAPTCHA_REQUIRED").as_deref(), "CAPTCHA_REQUIRED")?,
        })
    }
}

/// Configuration of the form client (`submit` and `admin` subcommands).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub datastore_url: Url,
    pub datastore_key: String,
    pub submissions_table: String,
    pub relay_url: Url,
    pub local_storage_path: PathBuf,
    pub admin_credentials: Option<AdminCredentials>,
}

impl ClientConfig {
    /// Load client configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let admin_credentials = match get("ADMIN_PASSWORD_SHA256") {
            Some(digest) => Some(
                AdminCredentials::from_sha256_hex(&digest)
                    .context("ADMIN_PASSWORD_SHA256 must be a 64-character hex SHA-256 digest")?,
            ),
            None => None,
        };

        Ok(Self {
            datastore_url: get("SUPABASE_URL")
                .context("SUPABASE_URL must be set")?
                .parse()
                .context("SUPABASE_URL must be a valid URL")?,
            datastore_key: get("SUPABASE_ANON_KEY").context("SUPABASE_ANON_KEY must be set")?,
            submissions_table: get("SUBMISSIONS_TABLE")
                .unwrap_or_else(|| "support_requests".to_string()),
            relay_url: get("RELAY_URL")
                .context("RELAY_URL must be set")?
                .parse()
                .context("RELAY_URL must be a valid URL")?,
            local_storage_path: get("LOCAL_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("maintenance-storage.json")),
            admin_credentials,
        })
    }
}

/// Append path segments to `base`, keeping every segment it already has.
pub fn append_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| anyhow!("{base} cannot be used as a base URL"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn parse_bool(value: Option<&str>, key: &str) -> Result<bool> {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if v == "true" || v == "1" => Ok(true),
        Some(v) if v == "false" || v == "0" => Ok(false),
        Some(v) => bail!("{key} must be 'true' or 'false', got: {v}"),
    }
}
