// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message-bus client trait for domain event hand-off.

use async_trait::async_trait;

use crate::error::LearnFlowError;

/// A client capable of delivering one event to a named topic.
///
/// Implementations report failure through the `Result`, but the event
/// publisher treats any failure as non-fatal: publish errors are logged
/// and swallowed, never surfaced to the operation that triggered them.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Short identifier for logs ("http-bridge", "null", "recording").
    fn name(&self) -> &str;

    /// Delivers a single keyed JSON payload to `topic`.
    async fn send(
        &self,
        topic: &str,
        key: &str,
        payload: &serde_json::Value,
    ) -> Result<(), LearnFlowError>;
}
