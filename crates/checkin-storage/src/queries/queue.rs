// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Check-in queue operations: idempotent upsert, due reads, lease claims,
//! and status compare-and-swap.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use checkin_core::{Branch, CheckinError, NewQueueItem, QueueItem, QueueStatus, StatusTransition};

use crate::convert::{day_col, enum_col, fmt_ts, opt_ts_col, ts_col};
use crate::database::Database;

const QUEUE_COLUMNS: &str =
    "id, subject_id, day, due_at, sent_at, template_key, branch, channel, status, last_error";

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<QueueItem> {
    Ok(QueueItem {
        id: row.get(0)?,
        subject_id: row.get(1)?,
        day: day_col(row, 2)?,
        due_at: ts_col(row, 3)?,
        sent_at: opt_ts_col(row, 4)?,
        template_key: row.get(5)?,
        branch: enum_col(row, 6)?,
        channel: enum_col(row, 7)?,
        status: enum_col(row, 8)?,
        last_error: row.get(9)?,
    })
}

/// Insert a queue row, or move `due_at` of the existing `(subject_id, day)` row.
///
/// Status, branch, template key and channel of an existing row are left alone.
pub async fn upsert(db: &Database, item: &NewQueueItem) -> Result<(), CheckinError> {
    let item = item.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO checkin_queue (subject_id, day, due_at, template_key, branch, channel)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(subject_id, day) DO UPDATE SET
                    due_at = excluded.due_at,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![
                    item.subject_id,
                    item.day.as_u32(),
                    fmt_ts(item.due_at),
                    item.template_key,
                    item.branch.to_string(),
                    item.channel.to_string(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get(db: &Database, id: i64) -> Result<Option<QueueItem>, CheckinError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {QUEUE_COLUMNS} FROM checkin_queue WHERE id = ?1"),
                params![id],
                row_to_item,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All queue rows for a subject, in day order.
pub async fn for_subject(db: &Database, subject_id: &str) -> Result<Vec<QueueItem>, CheckinError> {
    let subject_id = subject_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {QUEUE_COLUMNS} FROM checkin_queue WHERE subject_id = ?1 ORDER BY day ASC"
            ))?;
            let rows = stmt.query_map(params![subject_id], row_to_item)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Queued rows due at or before `now` without a live lease, oldest first.
pub async fn due(
    db: &Database,
    now: DateTime<Utc>,
    limit: u32,
) -> Result<Vec<QueueItem>, CheckinError> {
    let now = fmt_ts(now);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {QUEUE_COLUMNS} FROM checkin_queue
                 WHERE status = 'queued'
                   AND due_at <= ?1
                   AND (locked_until IS NULL OR locked_until <= ?1)
                 ORDER BY due_at ASC, id ASC
                 LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![now, limit], row_to_item)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Take the processing lease on a queued row. Returns whether the claim succeeded.
pub async fn claim(
    db: &Database,
    id: i64,
    now: DateTime<Utc>,
    lease_until: DateTime<Utc>,
) -> Result<bool, CheckinError> {
    let now = fmt_ts(now);
    let lease_until = fmt_ts(lease_until);
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE checkin_queue SET locked_until = ?3,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1
                   AND status = 'queued'
                   AND (locked_until IS NULL OR locked_until <= ?2)",
                params![id, now, lease_until],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Drop the lease on a row without touching its status.
pub async fn release(db: &Database, id: i64) -> Result<(), CheckinError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE checkin_queue SET locked_until = NULL WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Apply `next` only if the row is still in `expected`. Clears the lease.
pub async fn transition(
    db: &Database,
    id: i64,
    expected: QueueStatus,
    next: &StatusTransition,
) -> Result<bool, CheckinError> {
    let expected = expected.to_string();
    let status = next.status.to_string();
    let sent_at = next.sent_at.map(fmt_ts);
    let last_error = next.last_error.clone();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE checkin_queue SET status = ?2, sent_at = ?3, last_error = ?4,
                    locked_until = NULL,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND status = ?5",
                params![id, status, sent_at, last_error, expected],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Re-point a still-queued row at another branch and template key.
pub async fn update_branch(
    db: &Database,
    id: i64,
    branch: Branch,
    template_key: &str,
) -> Result<bool, CheckinError> {
    let branch = branch.to_string();
    let template_key = template_key.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE checkin_queue SET branch = ?2, template_key = ?3,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND status = 'queued'",
                params![id, branch, template_key],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Row counts per status.
pub async fn count_by_status(db: &Database) -> Result<Vec<(QueueStatus, u64)>, CheckinError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT status, COUNT(*) FROM checkin_queue GROUP BY status ORDER BY status",
            )?;
            let rows = stmt.query_map([], |row| {
                let count: i64 = row.get(1)?;
                Ok((enum_col::<QueueStatus>(row, 0)?, count.max(0) as u64))
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
