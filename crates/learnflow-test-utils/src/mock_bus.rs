// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording event sink with failure injection.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use learnflow_core::{EventSink, LearnFlowError};

/// One event captured by the recording sink.
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub topic: String,
    pub key: String,
    pub payload: serde_json::Value,
}

/// Sink that records every delivered event, and can be switched into a
/// failing mode to simulate a broker outage.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RecordedEvent>>,
    failing: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate (or end) a broker outage.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of everything delivered so far.
    pub fn recorded(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Events delivered to one topic.
    pub fn recorded_for(&self, topic: &str) -> Vec<RecordedEvent> {
        self.recorded()
            .into_iter()
            .filter(|e| e.topic == topic)
            .collect()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(
        &self,
        topic: &str,
        key: &str,
        payload: &serde_json::Value,
    ) -> Result<(), LearnFlowError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(LearnFlowError::Publish {
                message: "recording sink in failure mode".to_string(),
                source: None,
            });
        }
        self.events.lock().unwrap().push(RecordedEvent {
            topic: topic.to_string(),
            key: key.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }
}
