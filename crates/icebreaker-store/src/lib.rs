// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence layer for the Icebreaker scheduler.
//!
//! Three logical entities (topics, streams, recent messages) are mapped onto
//! an external key-value store, one JSON document each. [`TopicStore`] is the
//! only writer; backends implement [`icebreaker_core::KvBackend`].

pub mod documents;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use memory::MemoryKv;
pub use sqlite::SqliteKv;
pub use store::TopicStore;
