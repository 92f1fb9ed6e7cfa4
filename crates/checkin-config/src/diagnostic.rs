// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment extraction failures into miette diagnostics.
//!
//! A misspelt key gets a "did you mean" hint and, when the TOML that produced
//! it is at hand, a label pointing at the key itself.

#![allow(unused_assignments)] // miette's Diagnostic derive trips this lint

use std::path::{Path, PathBuf};

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a known key needs before it is offered as a correction.
const CLOSE_ENOUGH: f64 = 0.8;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(checkin::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Comma-separated keys accepted where `key` appeared.
        valid_keys: String,
        #[label("not a check-in setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(checkin::config::invalid_type), help("`{key}` takes {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(code(checkin::config::missing_key))]
    MissingKey { key: String },

    /// A value that deserialized but breaks a semantic rule.
    #[error("validation error: {message}")]
    #[diagnostic(code(checkin::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(checkin::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? This table accepts: {valid_keys}"),
        None => format!("this table accepts: {valid_keys}"),
    }
}

struct SourceFile {
    path: PathBuf,
    text: String,
}

/// TOML text that fed a load, kept so diagnostics can point into it.
#[derive(Default)]
pub struct ConfigSources {
    files: Vec<SourceFile>,
}

impl ConfigSources {
    /// A single in-memory document.
    pub fn inline(text: &str) -> Self {
        Self {
            files: vec![SourceFile {
                path: PathBuf::from("<inline>"),
                text: text.to_string(),
            }],
        }
    }

    /// Read whichever of `paths` exist. Missing files are skipped.
    pub fn read(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let files = paths
            .into_iter()
            .filter_map(|path| {
                let text = std::fs::read_to_string(&path).ok()?;
                let path = std::fs::canonicalize(&path).unwrap_or(path);
                Some(SourceFile { path, text })
            })
            .collect();
        Self { files }
    }

    /// Find `key` under `table`, preferring the file figment blamed.
    fn locate(
        &self,
        origin: Option<&Path>,
        table: &[String],
        key: &str,
    ) -> Option<(NamedSource<String>, SourceSpan)> {
        let blamed = origin.and_then(|o| self.files.iter().find(|f| f.path == o));
        blamed.into_iter().chain(&self.files).find_map(|file| {
            let span = key_span(&file.text, table, key)?;
            let name = file.path.display().to_string();
            Some((NamedSource::new(name, file.text.clone()), span))
        })
    }
}

/// Convert every error carried by `err` into a [`ConfigError`].
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &ConfigSources,
) -> Vec<ConfigError> {
    err.into_iter().map(|error| convert(&error, sources)).collect()
}

fn convert(error: &figment::Error, sources: &ConfigSources) -> ConfigError {
    match &error.kind {
        Kind::UnknownField(key, accepted) => {
            let origin = error
                .metadata
                .as_ref()
                .and_then(|m| m.source.as_ref())
                .and_then(|source| match source {
                    figment::Source::File(path) => Some(path.as_path()),
                    _ => None,
                });
            let (src, span) = sources.locate(origin, &error.path, key).unzip();
            ConfigError::UnknownKey {
                key: key.clone(),
                suggestion: suggest_key(key, accepted),
                valid_keys: accepted.join(", "),
                span,
                src,
            }
        }
        Kind::MissingField(key) => ConfigError::MissingKey {
            key: key.to_string(),
        },
        Kind::InvalidType(found, expected) => ConfigError::InvalidType {
            key: error.path.join("."),
            found: found.to_string(),
            expected: expected.clone(),
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

/// The accepted key most similar to `unknown`, if any is close enough.
pub fn suggest_key(unknown: &str, accepted: &[&str]) -> Option<String> {
    accepted
        .iter()
        .map(|&key| (strsim::jaro_winkler(unknown, key), key))
        .filter(|(score, _)| *score >= CLOSE_ENOUGH)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Span of `key` in `text`.
///
/// With an empty `table` the key is looked for before the first header, or as
/// a table header of its own (an unknown section such as `[campaing]`).
fn key_span(text: &str, table: &[String], key: &str) -> Option<SourceSpan> {
    let wanted = (!table.is_empty()).then(|| format!("[{}]", table.join(".")));
    let as_header = format!("[{key}]");
    let mut inside = wanted.is_none();
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let start = offset + line.len() - trimmed.len();
        offset += line.len();

        if trimmed.starts_with('[') {
            let header = trimmed.split('#').next().unwrap_or_default().trim_end();
            if wanted.is_none() && header == as_header {
                return Some(SourceSpan::new((start + 1).into(), key.len()));
            }
            inside = wanted.as_deref() == Some(header);
        } else if inside
            && trimmed
                .strip_prefix(key)
                .is_some_and(|rest| rest.trim_start().starts_with('='))
        {
            return Some(SourceSpan::new(start.into(), key.len()));
        }
    }
    None
}

/// Print each error to stderr with miette's graphical report.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut report = String::new();
        match handler.render_report(&mut report, error) {
            Ok(()) => eprint!("{report}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str) -> Vec<String> {
        vec![name.to_string()]
    }

    fn spanned<'a>(text: &'a str, span: SourceSpan) -> &'a str {
        &text[span.offset()..span.offset() + span.len()]
    }

    #[test]
    fn suggestion_picks_closest_key() {
        let campaign = &["enabled", "timezone", "send_window", "start_date"];
        assert_eq!(suggest_key("timezon", campaign).as_deref(), Some("timezone"));
        let dispatch = &["batch_limit", "batch_deadline_secs", "lease_secs"];
        assert_eq!(suggest_key("batch_limt", dispatch).as_deref(), Some("batch_limit"));
        assert_eq!(suggest_key("zzzzzz", &["name", "log_level"]), None);
    }

    #[test]
    fn key_is_found_only_inside_its_table() {
        let text = "[service]\ntimezon = 1\n\n[campaign]\n  timezon = \"UTC\"\n";
        let span = key_span(text, &table("campaign"), "timezon").unwrap();
        assert_eq!(span.offset(), text.rfind("timezon").unwrap());
        assert_eq!(spanned(text, span), "timezon");
        assert!(key_span(text, &table("dispatch"), "timezon").is_none());
    }

    #[test]
    fn longer_key_with_same_prefix_is_skipped() {
        let text = "[dispatch]\nlease_secs_max = 1\nlease_secs = 2\n";
        let span = key_span(text, &table("dispatch"), "lease_secs").unwrap();
        assert_eq!(span.offset(), text.find("lease_secs =").unwrap());
    }

    #[test]
    fn unknown_section_header_is_located() {
        let text = "[campaing]  # typo\nenabled = true\n";
        let span = key_span(text, &[], "campaing").unwrap();
        assert_eq!(spanned(text, span), "campaing");
    }

    #[test]
    fn inline_source_labels_unknown_key() {
        let sources = ConfigSources::inline("[dispatch]\nbatch_limt = 5\n");
        let (src, span) = sources
            .locate(None, &table("dispatch"), "batch_limt")
            .unwrap();
        assert!(format!("{src:?}").contains("<inline>"));
        assert_eq!(span.offset(), 11);
    }

    #[test]
    fn help_lists_accepted_keys() {
        let help = unknown_key_help(None, "enabled, timezone");
        assert_eq!(help, "this table accepts: enabled, timezone");
    }
}
