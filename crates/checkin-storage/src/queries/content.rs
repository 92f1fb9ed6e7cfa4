// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Templates, diagnosis inserts, and the encouragement pool.

use rusqlite::{params, OptionalExtension};

use checkin_core::{Branch, CheckinError, Day, DiagnosisCode, DiagnosisInsert, Template};

use crate::convert::{day_col, enum_col};
use crate::database::Database;

pub async fn get_template(db: &Database, key: &str) -> Result<Option<Template>, CheckinError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT key, subject, body, disclaimer, channel FROM templates WHERE key = ?1",
                params![key],
                |row| {
                    Ok(Template {
                        key: row.get(0)?,
                        subject: row.get(1)?,
                        body: row.get(2)?,
                        disclaimer: row.get(3)?,
                        channel: enum_col(row, 4)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn upsert_template(db: &Database, template: &Template) -> Result<(), CheckinError> {
    let t = template.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO templates (key, subject, body, disclaimer, channel)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(key) DO UPDATE SET
                    subject = excluded.subject,
                    body = excluded.body,
                    disclaimer = excluded.disclaimer,
                    channel = excluded.channel,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![t.key, t.subject, t.body, t.disclaimer, t.channel.to_string()],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Exact `(code, day, branch)` match.
pub async fn get_insert(
    db: &Database,
    code: DiagnosisCode,
    day: Day,
    branch: Branch,
) -> Result<Option<DiagnosisInsert>, CheckinError> {
    let code = code.to_string();
    let branch = branch.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT code, day, branch, body FROM diagnosis_inserts
                 WHERE code = ?1 AND day = ?2 AND branch = ?3",
                params![code, day.as_u32(), branch],
                |row| {
                    Ok(DiagnosisInsert {
                        code: enum_col(row, 0)?,
                        day: day_col(row, 1)?,
                        branch: enum_col(row, 2)?,
                        body: row.get(3)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn upsert_insert(db: &Database, insert: &DiagnosisInsert) -> Result<(), CheckinError> {
    let code = insert.code.to_string();
    let day = insert.day.as_u32();
    let branch = insert.branch.to_string();
    let body = insert.body.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO diagnosis_inserts (code, day, branch, body) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(code, day, branch) DO UPDATE SET body = excluded.body",
                params![code, day, branch, body],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn list_encouragements(db: &Database) -> Result<Vec<String>, CheckinError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare("SELECT text FROM encouragements ORDER BY id ASC")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<Result<Vec<String>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Add a line to the pool. Duplicates are ignored.
pub async fn add_encouragement(db: &Database, text: &str) -> Result<(), CheckinError> {
    let text = text.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO encouragements (text) VALUES (?1)",
                params![text],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkin_core::Channel;

    #[tokio::test]
    async fn template_upsert_replaces_by_key() {
        let db = Database::open_in_memory().await.unwrap();
        let mut t = Template {
            key: "day3.same".to_string(),
            subject: "Checking in".to_string(),
            body: "{{diagnosis_insert}}\n{{encouragement}}".to_string(),
            disclaimer: "Not medical advice.".to_string(),
            channel: Channel::Email,
        };
        upsert_template(&db, &t).await.unwrap();
        t.subject = "Day 3 check-in".to_string();
        upsert_template(&db, &t).await.unwrap();

        let loaded = get_template(&db, "day3.same").await.unwrap().unwrap();
        assert_eq!(loaded, t);
        assert!(get_template(&db, "day3.better").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_lookup_is_exact() {
        let db = Database::open_in_memory().await.unwrap();
        let insert = DiagnosisInsert {
            code: DiagnosisCode::Sciatica,
            day: Day::Day3,
            branch: Branch::Same,
            body: "Gentle nerve glides help.".to_string(),
        };
        upsert_insert(&db, &insert).await.unwrap();

        let hit = get_insert(&db, DiagnosisCode::Sciatica, Day::Day3, Branch::Same)
            .await
            .unwrap();
        assert_eq!(hit, Some(insert));

        for (code, day, branch) in [
            (DiagnosisCode::LumbarStrain, Day::Day3, Branch::Same),
            (DiagnosisCode::Sciatica, Day::Day7, Branch::Same),
            (DiagnosisCode::Sciatica, Day::Day3, Branch::Initial),
        ] {
            assert!(get_insert(&db, code, day, branch).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn encouragement_pool_ignores_duplicates() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(list_encouragements(&db).await.unwrap().is_empty());
        add_encouragement(&db, "Small steps count.").await.unwrap();
        add_encouragement(&db, "Small steps count.").await.unwrap();
        add_encouragement(&db, "Keep moving gently.").await.unwrap();
        assert_eq!(
            list_encouragements(&db).await.unwrap(),
            vec!["Small steps count.", "Keep moving gently."]
        );
    }
}
