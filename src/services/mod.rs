// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod admin;
pub mod captcha;
pub mod form;
pub mod local_storage;
pub mod logging;
pub mod mailer;
pub mod relay;
pub mod relay_client;
pub mod store;
