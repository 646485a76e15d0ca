// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound message transport trait.

use async_trait::async_trait;

use crate::error::IcebreakerError;
use crate::traits::adapter::HostAdapter;

/// Sends plain-text messages to a conversation by its unified origin id.
///
/// The host owns the actual platform connections; the scheduler only ever
/// asks it to deliver text.
#[async_trait]
pub trait ChatTransport: HostAdapter {
    /// Deliver `text` to the conversation identified by `origin`.
    async fn send_text(&self, origin: &str, text: &str) -> Result<(), IcebreakerError>;
}
