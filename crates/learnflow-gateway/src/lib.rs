// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the LearnFlow backend.
//!
//! Exposes the auth, chat, exercise, submission, and progress operations as
//! a REST API. Protected routes authenticate via an opaque session token
//! validated by `learnflow-auth`; health and metrics stay public for
//! systemd and Prometheus.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use server::{build_router, start_server};
pub use state::{AppState, HealthState};
