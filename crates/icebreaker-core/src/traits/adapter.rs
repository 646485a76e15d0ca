// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base identity trait implemented by every host adapter.

/// Identity slice shared by all host adapters (transport, provider, KV).
///
/// Used for startup logging and diagnostics.
pub trait HostAdapter: Send + Sync + 'static {
    /// Human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Semantic version of this adapter.
    fn version(&self) -> semver::Version;
}
