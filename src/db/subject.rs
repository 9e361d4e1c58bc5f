use color_eyre::{eyre::OptionExt, Result};
use libsql::params;

use super::helpers::{query_all, query_optional};
use super::models::{Subject, UserSubjectLink};
use super::Db;

impl Db {
    pub async fn find_subject_by_name(
        &self,
        name: &str,
        classnumber: i64,
    ) -> Result<Option<Subject>> {
        let conn = self.db.connect()?;
        query_optional(
            &conn,
            "SELECT id, classnumber, name, price FROM subjects WHERE name = ? AND classnumber = ?",
            params![name, classnumber],
        )
        .await
    }

    /// Create a subject and seed one locked link per active child of the
    /// class, atomically. Returns the subject and the number of seeded links.
    pub async fn create_subject(
        &self,
        classnumber: i64,
        name: &str,
        price: f64,
    ) -> Result<(Subject, u64)> {
        let conn = self.db.connect()?;
        let tx = conn.transaction().await?;

        let subject_id = tx
            .query(
                "INSERT INTO subjects (classnumber, name, price) VALUES (?, ?, ?) RETURNING id",
                params![classnumber, name, price],
            )
            .await?
            .next()
            .await?
            .ok_or_eyre("could not get subject id")?
            .get::<i64>(0)?;

        let seeded = tx
            .execute(
                r#"
                INSERT INTO user_subjects (user_id, subject_id, locked)
                SELECT id, ?, 1 FROM children WHERE classno = ? AND is_active = 1
                "#,
                params![subject_id, classnumber],
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "new subject created: id={subject_id}, class={classnumber}, seeded {seeded} child links"
        );

        let subject = Subject {
            id: subject_id,
            classnumber,
            name: name.to_string(),
            price,
        };
        Ok((subject, seeded))
    }

    pub async fn all_subjects(&self) -> Result<Vec<Subject>> {
        let conn = self.db.connect()?;
        query_all(
            &conn,
            "SELECT id, classnumber, name, price FROM subjects ORDER BY classnumber, name",
            (),
        )
        .await
    }

    pub async fn get_subject(&self, subject_id: i64) -> Result<Option<Subject>> {
        let conn = self.db.connect()?;
        query_optional(
            &conn,
            "SELECT id, classnumber, name, price FROM subjects WHERE id = ?",
            params![subject_id],
        )
        .await
    }

    pub async fn subjects_for_class(&self, classnumber: i64) -> Result<Vec<Subject>> {
        let conn = self.db.connect()?;
        query_all(
            &conn,
            "SELECT id, classnumber, name, price FROM subjects WHERE classnumber = ? ORDER BY name",
            params![classnumber],
        )
        .await
    }

    pub async fn subject_links_for_child(&self, child_id: i64) -> Result<Vec<UserSubjectLink>> {
        let conn = self.db.connect()?;
        query_all(
            &conn,
            r#"
            SELECT id, user_id, subject_id, locked, purchase_date, transaction_id, amount
            FROM user_subjects WHERE user_id = ?
            "#,
            params![child_id],
        )
        .await
    }

    pub async fn get_subject_link(
        &self,
        child_id: i64,
        subject_id: i64,
    ) -> Result<Option<UserSubjectLink>> {
        let conn = self.db.connect()?;
        query_optional(
            &conn,
            r#"
            SELECT id, user_id, subject_id, locked, purchase_date, transaction_id, amount
            FROM user_subjects WHERE user_id = ? AND subject_id = ?
            "#,
            params![child_id, subject_id],
        )
        .await
    }

    /// Backfill a missing link as locked. A no-op when the link exists.
    pub async fn ensure_subject_link(&self, child_id: i64, subject_id: i64) -> Result<()> {
        let conn = self.db.connect()?;
        conn.execute(
            r#"
            INSERT OR IGNORE INTO user_subjects (user_id, subject_id, locked)
            VALUES (?, ?, 1)
            "#,
            params![child_id, subject_id],
        )
        .await?;
        Ok(())
    }
}
