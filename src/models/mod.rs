// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod admin;
pub mod domain;
pub mod duration;
pub mod request;
pub mod version;
