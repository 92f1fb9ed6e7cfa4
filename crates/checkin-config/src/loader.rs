// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment providers for `checkin.toml` and `CHECKIN_*` variables.
//!
//! Files are merged in [`search_paths`] order, so `./checkin.toml` wins over
//! the user and system files. `CHECKIN_` variables override every file.

#![allow(clippy::result_large_err)] // figment::Error is not ours to box

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CheckinConfig;

/// Top-level sections recognised in `CHECKIN_<SECTION>_<KEY>` variables.
const SECTIONS: &[&str] = &[
    "service", "campaign", "token", "storage", "dispatch", "email", "sms", "gateway",
];

/// Defaults, then every file in [`search_paths`], then the environment.
pub fn load_config() -> Result<CheckinConfig, figment::Error> {
    build_figment().extract()
}

/// Defaults overlaid by one TOML document. The environment is ignored.
pub fn load_config_from_str(toml_content: &str) -> Result<CheckinConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CheckinConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Defaults, then `path`, then the environment. A missing file is not an error.
pub fn load_config_from_path(path: &Path) -> Result<CheckinConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CheckinConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Config files in merge order, lowest precedence first.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/checkin/checkin.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("checkin/checkin.toml"));
    }
    paths.push(PathBuf::from("checkin.toml"));
    paths
}

fn build_figment() -> Figment {
    let defaults = Figment::new().merge(Serialized::defaults(CheckinConfig::default()));
    search_paths()
        .into_iter()
        .fold(defaults, |figment, path| figment.merge(Toml::file(path)))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `CHECKIN_DISPATCH_BATCH_LIMIT`
/// must map to `dispatch.batch_limit`, not `dispatch.batch.limit`.
fn env_provider() -> Env {
    Env::prefixed("CHECKIN_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config path.
///
/// Only the leading section is split off; unknown sections pass through unchanged
/// so `deny_unknown_fields` reports them.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
