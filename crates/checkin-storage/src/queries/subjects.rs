// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subject and payment lookups used by the scheduler.

use checkin_core::{CheckinError, Subject};
use rusqlite::{params, OptionalExtension};

use crate::convert::{fmt_ts, ts_col};
use crate::database::Database;

/// Payment status that counts as a purchase.
const SUCCEEDED: &str = "succeeded";

pub async fn get_subject(db: &Database, id: &str) -> Result<Option<Subject>, CheckinError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, email, phone, diagnosis_label, outcome, created_at
                 FROM subjects WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Subject {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        phone: row.get(2)?,
                        diagnosis_label: row.get(3)?,
                        outcome: row.get(4)?,
                        created_at: ts_col(row, 5)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn upsert_subject(db: &Database, subject: &Subject) -> Result<(), CheckinError> {
    let s = subject.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO subjects (id, email, phone, diagnosis_label, outcome, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    email = excluded.email,
                    phone = excluded.phone,
                    diagnosis_label = excluded.diagnosis_label,
                    outcome = excluded.outcome,
                    created_at = excluded.created_at",
                params![
                    s.id,
                    s.email,
                    s.phone,
                    s.diagnosis_label,
                    s.outcome,
                    fmt_ts(s.created_at)
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count payments with status `succeeded` for a subject.
pub async fn count_successful_payments(
    db: &Database,
    subject_id: &str,
) -> Result<u32, CheckinError> {
    let subject_id = subject_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM payments WHERE subject_id = ?1 AND status = ?2",
                params![subject_id, SUCCEEDED],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn record_payment(
    db: &Database,
    subject_id: &str,
    status: &str,
) -> Result<(), CheckinError> {
    let subject_id = subject_id.to_string();
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO payments (subject_id, status) VALUES (?1, ?2)",
                params![subject_id, status],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
