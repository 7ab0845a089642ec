// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event sink implementations.
//!
//! [`HttpBusProducer`] posts records to a bus bridge endpoint
//! (`POST {endpoint}/topics/{topic}` with a Confluent-style records body).
//! [`NullSink`] stands in when no endpoint is configured so the rest of the
//! system never has to special-case a disabled bus.

use std::time::Duration;

use async_trait::async_trait;
use learnflow_config::model::BusConfig;
use learnflow_core::{EventSink, LearnFlowError};
use tracing::debug;

/// Posts events to an HTTP bus bridge with a short per-attempt timeout.
///
/// One attempt per event, no retry: delivery is best-effort by contract and
/// the publisher swallows whatever this returns.
#[derive(Debug, Clone)]
pub struct HttpBusProducer {
    client: reqwest::Client,
    endpoint: String,
    client_id: String,
}

impl HttpBusProducer {
    /// Build a producer for the given bridge endpoint.
    pub fn new(
        endpoint: String,
        client_id: String,
        timeout: Duration,
    ) -> Result<Self, LearnFlowError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LearnFlowError::Publish {
                message: format!("failed to build bus HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client_id,
        })
    }
}

#[async_trait]
impl EventSink for HttpBusProducer {
    fn name(&self) -> &str {
        "http-bridge"
    }

    async fn send(
        &self,
        topic: &str,
        key: &str,
        payload: &serde_json::Value,
    ) -> Result<(), LearnFlowError> {
        let url = format!("{}/topics/{topic}", self.endpoint);
        let body = serde_json::json!({
            "records": [{ "key": key, "value": payload }],
            "client_id": self.client_id,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LearnFlowError::Publish {
                message: format!("bus request to {url} failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LearnFlowError::Publish {
                message: format!("bus returned {status} for topic {topic}: {body}"),
                source: None,
            });
        }

        debug!(topic, key, "event delivered to bus");
        Ok(())
    }
}

/// Discards every event. Used when the bus is not configured.
#[derive(Debug, Clone, Default)]
pub struct NullSink;

#[async_trait]
impl EventSink for NullSink {
    fn name(&self) -> &str {
        "null"
    }

    async fn send(
        &self,
        topic: &str,
        _key: &str,
        _payload: &serde_json::Value,
    ) -> Result<(), LearnFlowError> {
        debug!(topic, "bus disabled, event discarded");
        Ok(())
    }
}

/// Build the sink selected by configuration: an HTTP producer when an
/// endpoint is set, the null sink otherwise.
pub fn sink_from_config(
    config: &BusConfig,
) -> Result<std::sync::Arc<dyn EventSink>, LearnFlowError> {
    match &config.endpoint {
        Some(endpoint) => {
            let producer = HttpBusProducer::new(
                endpoint.clone(),
                config.client_id.clone(),
                Duration::from_millis(config.publish_timeout_ms),
            )?;
            Ok(std::sync::Arc::new(producer))
        }
        None => Ok(std::sync::Arc::new(NullSink)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn producer(endpoint: &str) -> HttpBusProducer {
        HttpBusProducer::new(
            endpoint.to_string(),
            "learnflow-backend".to_string(),
            Duration::from_millis(500),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn posts_records_to_topic_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/topics/chat-messages"))
            .and(body_partial_json(serde_json::json!({
                "records": [{ "key": "cs-1" }],
                "client_id": "learnflow-backend",
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let result = producer(&server.uri())
            .send(
                "chat-messages",
                "cs-1",
                &serde_json::json!({"event_type": "chat_message"}),
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn non_success_status_is_a_publish_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("broker down"))
            .mount(&server)
            .await;

        let err = producer(&server.uri())
            .send("student-events", "1", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, LearnFlowError::Publish { .. }));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_publish_error() {
        // Nothing listens on this port.
        let err = producer("http://127.0.0.1:9")
            .send("student-events", "1", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, LearnFlowError::Publish { .. }));
    }

    #[tokio::test]
    async fn null_sink_accepts_everything() {
        NullSink
            .send("anything", "k", &serde_json::json!({"x": 1}))
            .await
            .unwrap();
    }

    #[test]
    fn config_selects_the_sink() {
        let disabled = BusConfig::default();
        assert_eq!(sink_from_config(&disabled).unwrap().name(), "null");

        let enabled = BusConfig {
            endpoint: Some("http://localhost:8082".to_string()),
            ..BusConfig::default()
        };
        assert_eq!(sink_from_config(&enabled).unwrap().name(), "http-bridge");
    }
}
