// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Error taxonomy of the `/send-email` relay.

use crate::models::request::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    // Caller faults, surfaced verbatim
    #[error("Please complete the security check.")]
    CaptchaMissing,

    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid service type: {0}")]
    InvalidServiceType(String),

    #[error("Invalid section: {0}")]
    InvalidSection(String),

    // Downstream provider faults
    #[error("Security check failed. Please try again.")]
    CaptchaRejected,

    #[error("Failed to send support email")]
    StaffEmailRejected { details: String },

    // Operator faults
    #[error("Token not configured")]
    MailTokenMissing,

    #[error("Security check is required but not configured")]
    CaptchaNotConfigured,

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::CaptchaMissing
            | RelayError::MissingFields
            | RelayError::InvalidServiceType(_)
            | RelayError::InvalidSection(_)
            | RelayError::CaptchaRejected
            | RelayError::StaffEmailRejected { .. } => StatusCode::BAD_REQUEST,
            RelayError::MailTokenMissing
            | RelayError::CaptchaNotConfigured
            | RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            RelayError::StaffEmailRejected { details } => Some(details.clone()),
            _ => None,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
            details: self.details(),
        };
        (self.status(), Json(body)).into_response()
    }
}
