// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assistant integration for the LearnFlow backend.
//!
//! [`CompletionClient`] talks to an OpenAI-compatible completion service;
//! [`CannedResponder`] replaces it in keyless development setups. The
//! [`AssistantResponder`] ties either provider to the chat lifecycle:
//! recent context in, a persisted assistant message out, with a chat event
//! published on the side.

pub mod canned;
pub mod client;
pub mod responder;
pub mod types;

pub use canned::CannedResponder;
pub use client::CompletionClient;
pub use responder::{AssistantResponder, provider_from_config};
