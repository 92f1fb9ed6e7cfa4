// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered TOML configuration for the check-in engine.
//!
//! Defaults are overlaid by `/etc/checkin/checkin.toml`, the user's
//! `checkin/checkin.toml`, `./checkin.toml`, and `CHECKIN_<SECTION>_<KEY>`
//! variables. Unknown keys are rejected. Failures come back as
//! [`ConfigError`] diagnostics ready for [`render_errors`].
//!
//! ```no_run
//! let config = checkin_config::load_and_validate().expect("config errors");
//! println!("sending in {}", config.campaign.timezone);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

use diagnostic::{figment_to_config_errors, ConfigSources};

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::CheckinConfig;

/// Load from the standard search path and validate.
pub fn load_and_validate() -> Result<CheckinConfig, Vec<ConfigError>> {
    checked(loader::load_config(), || {
        ConfigSources::read(loader::search_paths())
    })
}

/// Load from `path` plus environment overrides and validate.
pub fn load_and_validate_path(path: &Path) -> Result<CheckinConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        ConfigSources::read([path.to_path_buf()])
    })
}

/// Load from an in-memory TOML document and validate.
pub fn load_and_validate_str(toml: &str) -> Result<CheckinConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml), || ConfigSources::inline(toml))
}

/// Sources are only read back when extraction failed and a diagnostic needs them.
fn checked(
    loaded: Result<CheckinConfig, figment::Error>,
    sources: impl FnOnce() -> ConfigSources,
) -> Result<CheckinConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}
