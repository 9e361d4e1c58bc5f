use color_eyre::{eyre::OptionExt, Result};
use libsql::params;

use super::helpers::{query_all, query_optional};
use super::models::{Chapter, ProgressRecord};
use super::Db;
use crate::names;

impl Db {
    pub async fn find_chapter_by_name(
        &self,
        name: &str,
        subject_id: i64,
    ) -> Result<Option<Chapter>> {
        let conn = self.db.connect()?;
        query_optional(
            &conn,
            r#"
            SELECT id, subject_id, name, description, video_url, chapter_number
            FROM chapters WHERE name = ? AND subject_id = ?
            "#,
            params![name, subject_id],
        )
        .await
    }

    pub async fn create_chapter(
        &self,
        subject_id: i64,
        name: &str,
        description: Option<&str>,
        video_url: Option<&str>,
        chapter_number: i64,
    ) -> Result<Chapter> {
        let conn = self.db.connect()?;

        let chapter_id = conn
            .query(
                r#"
                INSERT INTO chapters (subject_id, name, description, video_url, chapter_number)
                VALUES (?, ?, ?, ?, ?) RETURNING id
                "#,
                params![subject_id, name, description, video_url, chapter_number],
            )
            .await?
            .next()
            .await?
            .ok_or_eyre("could not get chapter id")?
            .get::<i64>(0)?;

        tracing::info!("new chapter created: id={chapter_id}, subject_id={subject_id}");

        Ok(Chapter {
            id: chapter_id,
            subject_id,
            name: name.to_string(),
            description: description.map(str::to_string),
            video_url: video_url.map(str::to_string),
            chapter_number,
        })
    }

    pub async fn all_chapters(&self) -> Result<Vec<Chapter>> {
        let conn = self.db.connect()?;
        query_all(
            &conn,
            r#"
            SELECT id, subject_id, name, description, video_url, chapter_number
            FROM chapters ORDER BY subject_id, chapter_number
            "#,
            (),
        )
        .await
    }

    pub async fn get_chapter(&self, chapter_id: i64) -> Result<Option<Chapter>> {
        let conn = self.db.connect()?;
        query_optional(
            &conn,
            r#"
            SELECT id, subject_id, name, description, video_url, chapter_number
            FROM chapters WHERE id = ?
            "#,
            params![chapter_id],
        )
        .await
    }

    /// Chapters of a subject in the order the unlock evaluator expects:
    /// ascending by chapter number, ties in insertion order.
    pub async fn chapters_for_subject(&self, subject_id: i64) -> Result<Vec<Chapter>> {
        let conn = self.db.connect()?;
        query_all(
            &conn,
            r#"
            SELECT id, subject_id, name, description, video_url, chapter_number
            FROM chapters WHERE subject_id = ? ORDER BY chapter_number, id
            "#,
            params![subject_id],
        )
        .await
    }

    /// The child's progress rows across one subject.
    pub async fn progress_for_subject(
        &self,
        child_id: i64,
        subject_id: i64,
    ) -> Result<Vec<ProgressRecord>> {
        let conn = self.db.connect()?;
        query_all(
            &conn,
            r#"
            SELECT id, child_id, subject_id, chapter_id, completed, progress_percentage
            FROM progress WHERE child_id = ? AND subject_id = ?
            "#,
            params![child_id, subject_id],
        )
        .await
    }

    pub async fn has_successful_payment(&self, child_id: i64, subject_id: i64) -> Result<bool> {
        let conn = self.db.connect()?;
        let row = conn
            .query(
                "SELECT 1 FROM payments WHERE child_id = ? AND subject_id = ? AND status = ?",
                params![child_id, subject_id, names::PAYMENT_STATUS_SUCCESS],
            )
            .await?
            .next()
            .await?;
        Ok(row.is_some())
    }
}
