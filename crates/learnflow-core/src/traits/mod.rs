// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams for the external collaborators the core treats as black
//! boxes: the completion service and the message bus client. Both use
//! `#[async_trait]` for dynamic dispatch so tests can swap in mocks.

pub mod bus;
pub mod provider;

pub use bus::EventSink;
pub use provider::CompletionProvider;
