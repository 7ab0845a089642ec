// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the LearnFlow backend: mock completion provider,
//! recording event sink, and a full-stack [`TestHarness`].

pub mod harness;
pub mod mock_bus;
pub mod mock_provider;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_bus::{RecordedEvent, RecordingSink};
pub use mock_provider::MockProvider;
