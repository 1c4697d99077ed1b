// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Support-request relay for the maintenance page.
//!
//! The server half (`app`, `routes`, `services::relay`) verifies the
//! Turnstile token and relays each request to the email provider as a staff
//! notification plus a submitter receipt. The client half
//! (`services::form`, `services::admin`) holds the form state machine and the
//! locally stored settings the page works from.

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
