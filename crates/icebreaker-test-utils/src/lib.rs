// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Icebreaker integration tests.
//!
//! Provides mock host adapters for fast, deterministic, CI-runnable tests
//! without a live chat platform or language-model API.
//!
//! # Components
//!
//! - [`MockTransport`] - Mock chat transport with outbound capture and a failure switch
//! - [`MockCompletionHost`] - Mock language-model host with pre-configured responses

pub mod mock_host;
pub mod mock_transport;

pub use mock_host::MockCompletionHost;
pub use mock_transport::MockTransport;
