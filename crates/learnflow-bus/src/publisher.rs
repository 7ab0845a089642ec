// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget event publisher.
//!
//! Events are a side channel, not part of the transactional contract:
//! publication is one attempt, detached from the caller, and any failure is
//! logged and swallowed. There is no in-process retry queue and no
//! durability if the process dies between the triggering action and the
//! publish completing.

use std::sync::Arc;

use learnflow_core::EventSink;
use tracing::{debug, warn};

use crate::events::DomainEvent;

/// Hands domain events to the configured sink without ever failing the
/// operation that produced them.
///
/// Constructed once at startup and injected where needed; cheap to clone.
#[derive(Clone)]
pub struct EventPublisher {
    sink: Arc<dyn EventSink>,
}

impl EventPublisher {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Publisher backed by the null sink, for contexts without a bus.
    pub fn disabled() -> Self {
        Self::new(Arc::new(crate::producer::NullSink))
    }

    /// Detached publish: hands the event to a spawned task and returns
    /// immediately. The caller's response never waits on the bus.
    pub fn publish(&self, event: DomainEvent) {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            deliver(sink.as_ref(), &event).await;
        });
    }

    /// Synchronous-completion variant used where the caller is already in a
    /// background context (and by tests). Still swallows failures.
    pub async fn publish_now(&self, event: DomainEvent) {
        deliver(self.sink.as_ref(), &event).await;
    }
}

async fn deliver(sink: &dyn EventSink, event: &DomainEvent) {
    match sink.send(&event.topic, &event.key, &event.payload).await {
        Ok(()) => {
            metrics::counter!("learnflow_events_published_total").increment(1);
            debug!(topic = %event.topic, key = %event.key, sink = sink.name(), "event published");
        }
        Err(e) => {
            // At-most-one attempt: the event is dropped here.
            metrics::counter!("learnflow_events_dropped_total").increment(1);
            warn!(
                topic = %event.topic,
                key = %event.key,
                sink = sink.name(),
                error = %e,
                "event publish failed, dropping event"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use learnflow_core::LearnFlowError;
    use std::sync::Mutex;

    /// Sink that records sends and can be switched into failure mode.
    struct FlakySink {
        fail: std::sync::atomic::AtomicBool,
        delivered: Mutex<Vec<(String, String)>>,
    }

    impl FlakySink {
        fn new(fail: bool) -> Self {
            Self {
                fail: std::sync::atomic::AtomicBool::new(fail),
                delivered: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl EventSink for FlakySink {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn send(
            &self,
            topic: &str,
            key: &str,
            _payload: &serde_json::Value,
        ) -> Result<(), LearnFlowError> {
            if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(LearnFlowError::Publish {
                    message: "simulated broker outage".to_string(),
                    source: None,
                });
            }
            self.delivered
                .lock()
                .unwrap()
                .push((topic.to_string(), key.to_string()));
            Ok(())
        }
    }

    fn event() -> DomainEvent {
        DomainEvent::system("test", "ping", serde_json::json!({}))
    }

    #[tokio::test]
    async fn sink_failure_never_escapes_the_publisher() {
        let publisher = EventPublisher::new(Arc::new(FlakySink::new(true)));
        // Must neither panic nor return an error type at all.
        publisher.publish_now(event()).await;
    }

    #[tokio::test]
    async fn successful_events_reach_the_sink() {
        let sink = Arc::new(FlakySink::new(false));
        let publisher = EventPublisher::new(Arc::clone(&sink) as Arc<dyn EventSink>);

        publisher.publish_now(event()).await;

        let delivered = sink.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].0, "system-events");
    }

    #[tokio::test]
    async fn detached_publish_completes_in_background() {
        let sink = Arc::new(FlakySink::new(false));
        let publisher = EventPublisher::new(Arc::clone(&sink) as Arc<dyn EventSink>);

        publisher.publish(event());

        // The spawned task has no completion handle; poll briefly.
        for _ in 0..50 {
            if !sink.delivered.lock().unwrap().is_empty() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("detached publish never reached the sink");
    }
}
