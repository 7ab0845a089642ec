// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat session lifecycle for the LearnFlow backend.
//!
//! A [`ChatService`] owns the OPEN -> CLOSED state machine of conversation
//! threads and the ordered transcript inside each one. The assistant
//! personas a session can talk to are the closed [`AgentKind`] set.

pub mod lifecycle;
pub mod persona;

pub use lifecycle::ChatService;
pub use persona::AgentKind;
