// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain event publication for the LearnFlow backend.
//!
//! Events are emitted to named bus topics with an explicit at-most-one-
//! attempt, fire-and-forget policy: a failed publish is logged and dropped,
//! never surfaced to the API call that triggered it.

pub mod events;
pub mod producer;
pub mod publisher;

pub use events::{DomainEvent, topics};
pub use producer::{HttpBusProducer, NullSink, sink_from_config};
pub use publisher::EventPublisher;
