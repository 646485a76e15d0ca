// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loading for the standalone runner using Figment.
//!
//! Inside a host bot runtime the raw mapping arrives from the host; the
//! standalone binary instead loads TOML following the XDG hierarchy with
//! `ICEBREAKER_` environment variable overrides, then feeds the extracted
//! mapping to the same total resolver.

use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use icebreaker_core::IcebreakerError;
use serde_json::Value;

use crate::model::PluginSettings;

/// Load the raw configuration mapping from the standard hierarchy.
///
/// Merge order (later overrides earlier):
/// 1. `/etc/icebreaker/icebreaker.toml` (system-wide)
/// 2. `~/.config/icebreaker/icebreaker.toml` (user XDG config)
/// 3. `./icebreaker.toml` (local directory)
/// 4. `ICEBREAKER_*` environment variables
pub fn load_raw() -> Result<Value, IcebreakerError> {
    Figment::new()
        .merge(Toml::file("/etc/icebreaker/icebreaker.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("icebreaker/icebreaker.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("icebreaker.toml"))
        .merge(env_provider())
        .extract()
        .map_err(|err| IcebreakerError::Config(err.to_string()))
}

/// Load the raw configuration mapping from a specific file, with env
/// overrides applied on top.
pub fn load_raw_from_path(path: &Path) -> Result<Value, IcebreakerError> {
    Figment::new()
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
        .map_err(|err| IcebreakerError::Config(err.to_string()))
}

/// Parse a TOML string into the raw mapping. Used in tests.
pub fn load_raw_from_str(toml_content: &str) -> Result<Value, IcebreakerError> {
    Figment::new()
        .merge(Toml::string(toml_content))
        .extract()
        .map_err(|err| IcebreakerError::Config(err.to_string()))
}

/// Load and resolve settings in one step.
pub fn load_settings(path: Option<&Path>) -> Result<PluginSettings, IcebreakerError> {
    let raw = match path {
        Some(path) => load_raw_from_path(path)?,
        None => load_raw()?,
    };
    Ok(PluginSettings::resolve(&raw))
}

/// Environment variable provider using explicit `map()` for the nested
/// quiet-hours section. `ICEBREAKER_QUIET_HOURS_START` must map to
/// `quiet_hours.start`, not `quiet.hours.start`; every other key is
/// top-level.
fn env_provider() -> Env {
    Env::prefixed("ICEBREAKER_").map(|key| {
        key.as_str()
            .replacen("quiet_hours_", "quiet_hours.", 1)
            .into()
    })
}
