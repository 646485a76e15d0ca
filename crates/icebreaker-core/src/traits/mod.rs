// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host-facing trait definitions.
//!
//! The host bot runtime owns transport, permissions, and persistence; the
//! scheduler talks to it through these seams. All async traits use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod kv;
pub mod provider;
pub mod transport;

pub use adapter::HostAdapter;
pub use kv::KvBackend;
pub use provider::CompletionHost;
pub use transport::ChatTransport;
