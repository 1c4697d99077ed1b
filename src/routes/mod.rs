// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Route handlers for the HTTP API.

pub mod relay;

pub use relay::{relay_router, RelayApiDoc, RelayState};
