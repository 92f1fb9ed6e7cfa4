// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-tap check-in responses.

use rusqlite::{params, OptionalExtension};

use checkin_core::{CheckinError, Day, ResponseRecord};

use crate::convert::{day_col, enum_col, fmt_ts, ts_col};
use crate::database::Database;

/// Store a response; a later tap for the same `(subject_id, day)` replaces the earlier one.
pub async fn record(db: &Database, response: &ResponseRecord) -> Result<(), CheckinError> {
    let r = response.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO checkin_responses (subject_id, day, value, note, responded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(subject_id, day) DO UPDATE SET
                    value = excluded.value,
                    note = excluded.note,
                    responded_at = excluded.responded_at",
                params![
                    r.subject_id,
                    r.day.as_u32(),
                    r.value.to_string(),
                    r.note,
                    fmt_ts(r.responded_at)
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get(
    db: &Database,
    subject_id: &str,
    day: Day,
) -> Result<Option<ResponseRecord>, CheckinError> {
    let subject_id = subject_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT subject_id, day, value, note, responded_at FROM checkin_responses
                 WHERE subject_id = ?1 AND day = ?2",
                params![subject_id, day.as_u32()],
                |row| {
                    Ok(ResponseRecord {
                        subject_id: row.get(0)?,
                        day: day_col(row, 1)?,
                        value: enum_col(row, 2)?,
                        note: row.get(3)?,
                        responded_at: ts_col(row, 4)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
