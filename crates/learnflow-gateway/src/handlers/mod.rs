// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers, grouped by route family.

pub mod auth;
pub mod chat;
pub mod exercises;
pub mod health;
