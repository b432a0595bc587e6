//! CRUD helpers for vanish records and their attachments.
//!
//! All mutations that touch both tables run inside a single transaction so
//! attachment rows can never exist without a parent.  `created_at` stamping
//! and internal id assignment happen explicitly here, inside insert.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{Attachment, ContentKind, NewVanish, Vanish};

impl Database {
    /// Insert a new vanish record together with its attachments.
    ///
    /// Stamps `created_at` with the supplied `now` and returns the persisted
    /// record.  A collision on `public_id` maps to
    /// [`StoreError::DuplicatePublicId`] so the caller can regenerate and
    /// retry; nothing is persisted in that case.
    pub fn insert_vanish(&mut self, new: &NewVanish, now: DateTime<Utc>) -> Result<Vanish> {
        let tx = self.conn_mut().transaction()?;

        tx.execute(
            "INSERT INTO vanishes (public_id, title, content, content_kind, file_url, is_one_time, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                new.public_id,
                new.title,
                new.content,
                new.content_kind.as_str(),
                new.file_url,
                new.is_one_time as i32,
                now.to_rfc3339(),
                new.expires_at.map(|t| t.to_rfc3339()),
            ],
        )
        .map_err(|e| map_insert_error(e, &new.public_id))?;

        let vanish_id = tx.last_insert_rowid();

        let mut attachments = Vec::with_capacity(new.attachments.len());
        for att in &new.attachments {
            tx.execute(
                "INSERT INTO attachments (vanish_id, original_file_name, file_url, file_size, file_type)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    vanish_id,
                    att.original_file_name,
                    att.file_url,
                    att.file_size,
                    att.file_type,
                ],
            )?;
            attachments.push(Attachment {
                id: tx.last_insert_rowid(),
                original_file_name: att.original_file_name.clone(),
                file_url: att.file_url.clone(),
                file_size: att.file_size,
                file_type: att.file_type.clone(),
            });
        }

        tx.commit()?;

        Ok(Vanish {
            id: vanish_id,
            public_id: new.public_id.clone(),
            title: new.title.clone(),
            content: new.content.clone(),
            content_kind: new.content_kind,
            file_url: new.file_url.clone(),
            is_one_time: new.is_one_time,
            created_at: now,
            expires_at: new.expires_at,
            attachments,
        })
    }

    /// Look up a vanish record by its public id, attachments eagerly loaded
    /// in upload order.  Returns `None` when no such record exists.
    pub fn get_vanish_by_public_id(&self, public_id: &str) -> Result<Option<Vanish>> {
        let vanish = self
            .conn()
            .query_row(
                "SELECT id, public_id, title, content, content_kind, file_url, is_one_time, created_at, expires_at
                 FROM vanishes WHERE public_id = ?1",
                params![public_id],
                row_to_vanish,
            )
            .optional()?;

        let Some(mut vanish) = vanish else {
            return Ok(None);
        };

        let mut stmt = self.conn().prepare(
            "SELECT id, original_file_name, file_url, file_size, file_type
             FROM attachments
             WHERE vanish_id = ?1
             ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![vanish.id], row_to_attachment)?;
        for row in rows {
            vanish.attachments.push(row?);
        }

        Ok(Some(vanish))
    }

    /// Delete a vanish record by its internal id.  Attachment rows cascade.
    ///
    /// Idempotent: deleting a record that is already gone returns `false`
    /// rather than an error.
    pub fn delete_vanish(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM vanishes WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// Bulk-delete every record whose expiry lies strictly before `now`.
    ///
    /// Records without an expiry are never touched.  Returns the number of
    /// records deleted.
    pub fn delete_expired_before(&self, now: DateTime<Utc>) -> Result<usize> {
        let affected = self.conn().execute(
            "DELETE FROM vanishes WHERE expires_at IS NOT NULL AND expires_at < ?1",
            params![now.to_rfc3339()],
        )?;
        Ok(affected)
    }
}

fn map_insert_error(e: rusqlite::Error, public_id: &str) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(err, Some(msg))
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                && msg.contains("vanishes.public_id") =>
        {
            StoreError::DuplicatePublicId(public_id.to_string())
        }
        _ => StoreError::Sqlite(e),
    }
}

fn row_to_vanish(row: &rusqlite::Row<'_>) -> rusqlite::Result<Vanish> {
    let kind_str: String = row.get(4)?;
    let content_kind = ContentKind::parse(&kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown content kind: {kind_str}").into(),
        )
    })?;

    let is_one_time_int: i32 = row.get(6)?;

    let created_str: String = row.get(7)?;
    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
        })?;

    let expires_str: Option<String> = row.get(8)?;
    let expires_at = match expires_str {
        Some(s) => Some(
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        8,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
        ),
        None => None,
    };

    Ok(Vanish {
        id: row.get(0)?,
        public_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        content_kind,
        file_url: row.get(5)?,
        is_one_time: is_one_time_int != 0,
        created_at,
        expires_at,
        attachments: Vec::new(),
    })
}

fn row_to_attachment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Attachment> {
    Ok(Attachment {
        id: row.get(0)?,
        original_file_name: row.get(1)?,
        file_url: row.get(2)?,
        file_size: row.get(3)?,
        file_type: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewAttachment;
    use chrono::Duration;

    fn test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (db, dir)
    }

    fn text_vanish(public_id: &str) -> NewVanish {
        NewVanish {
            public_id: public_id.to_string(),
            title: Some("greeting".to_string()),
            content: "hello".to_string(),
            content_kind: ContentKind::Text,
            file_url: None,
            is_one_time: false,
            expires_at: None,
            attachments: Vec::new(),
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let (mut db, _dir) = test_db();
        let now = Utc::now();

        let inserted = db.insert_vanish(&text_vanish("abc12345"), now).unwrap();
        assert!(inserted.id > 0);
        assert_eq!(inserted.created_at, now);

        let fetched = db.get_vanish_by_public_id("abc12345").unwrap().unwrap();
        assert_eq!(fetched.public_id, "abc12345");
        assert_eq!(fetched.content, "hello");
        assert_eq!(fetched.content_kind, ContentKind::Text);
        assert!(fetched.attachments.is_empty());
    }

    #[test]
    fn get_missing_returns_none() {
        let (db, _dir) = test_db();
        assert!(db.get_vanish_by_public_id("nope").unwrap().is_none());
    }

    #[test]
    fn duplicate_public_id_is_reported() {
        let (mut db, _dir) = test_db();
        let now = Utc::now();

        db.insert_vanish(&text_vanish("samesame"), now).unwrap();
        let err = db.insert_vanish(&text_vanish("samesame"), now).unwrap_err();

        assert!(matches!(err, StoreError::DuplicatePublicId(id) if id == "samesame"));
    }

    #[test]
    fn attachments_round_trip_in_order() {
        let (mut db, _dir) = test_db();
        let now = Utc::now();

        let mut new = text_vanish("withfiles");
        new.content = "a.txt".to_string();
        new.content_kind = ContentKind::File;
        new.file_url = Some("http://localhost:8080/files/1".to_string());
        new.attachments = vec![
            NewAttachment {
                original_file_name: "a.txt".to_string(),
                file_url: "http://localhost:8080/files/1".to_string(),
                file_size: 3,
                file_type: Some("text/plain".to_string()),
            },
            NewAttachment {
                original_file_name: "b.png".to_string(),
                file_url: "http://localhost:8080/files/2".to_string(),
                file_size: 9,
                file_type: Some("image/png".to_string()),
            },
        ];

        db.insert_vanish(&new, now).unwrap();

        let fetched = db.get_vanish_by_public_id("withfiles").unwrap().unwrap();
        assert_eq!(fetched.attachments.len(), 2);
        assert_eq!(fetched.attachments[0].original_file_name, "a.txt");
        assert_eq!(fetched.attachments[1].original_file_name, "b.png");
    }

    #[test]
    fn delete_is_idempotent() {
        let (mut db, _dir) = test_db();
        let now = Utc::now();

        let inserted = db.insert_vanish(&text_vanish("gone"), now).unwrap();

        assert!(db.delete_vanish(inserted.id).unwrap());
        assert!(!db.delete_vanish(inserted.id).unwrap());
        assert!(db.get_vanish_by_public_id("gone").unwrap().is_none());
    }

    #[test]
    fn delete_cascades_to_attachments() {
        let (mut db, _dir) = test_db();
        let now = Utc::now();

        let mut new = text_vanish("cascade");
        new.content_kind = ContentKind::File;
        new.attachments = vec![NewAttachment {
            original_file_name: "a.txt".to_string(),
            file_url: "http://localhost:8080/files/1".to_string(),
            file_size: 3,
            file_type: None,
        }];
        let inserted = db.insert_vanish(&new, now).unwrap();

        db.delete_vanish(inserted.id).unwrap();

        let orphans: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM attachments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn delete_expired_before_only_touches_expired() {
        let (mut db, _dir) = test_db();
        let now = Utc::now();

        let mut expired = text_vanish("expired1");
        expired.expires_at = Some(now - Duration::seconds(1));
        db.insert_vanish(&expired, now).unwrap();

        let mut future = text_vanish("future1");
        future.expires_at = Some(now + Duration::hours(1));
        db.insert_vanish(&future, now).unwrap();

        // No expiry at all; must never be reaped.
        db.insert_vanish(&text_vanish("forever1"), now).unwrap();

        assert_eq!(db.delete_expired_before(now).unwrap(), 1);
        assert_eq!(db.delete_expired_before(now).unwrap(), 0);

        assert!(db.get_vanish_by_public_id("expired1").unwrap().is_none());
        assert!(db.get_vanish_by_public_id("future1").unwrap().is_some());
        assert!(db.get_vanish_by_public_id("forever1").unwrap().is_some());
    }
}
