// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Column conversions between SQLite TEXT/INTEGER values and domain types.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings with millisecond
//! precision, so lexicographic order equals chronological order.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

use checkin_core::Day;

const TS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Format an instant for storage.
pub fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.format(TS_FORMAT).to_string()
}

/// Parse a stored timestamp.
pub fn parse_ts(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw, TS_FORMAT).map(|naive| naive.and_utc())
}

fn conversion_error<E>(idx: usize, ty: Type, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(err))
}

#[derive(Debug)]
struct BadValue(String);

impl std::fmt::Display for BadValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for BadValue {}

/// Read a required timestamp column.
pub fn ts_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_ts(&raw).map_err(|e| conversion_error(idx, Type::Text, e))
}

/// Read a nullable timestamp column.
pub fn opt_ts_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|r| parse_ts(&r).map_err(|e| conversion_error(idx, Type::Text, e)))
        .transpose()
}

/// Read a snake_case enum column (status, branch, channel, ...).
pub fn enum_col<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
{
    let raw: String = row.get(idx)?;
    T::from_str(&raw).map_err(|_| {
        conversion_error(idx, Type::Text, BadValue(format!("unexpected value `{raw}`")))
    })
}

/// Read a touchpoint day column.
pub fn day_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Day> {
    let raw: u32 = row.get(idx)?;
    Day::try_from(raw).map_err(|e| conversion_error(idx, Type::Integer, BadValue(e)))
}
