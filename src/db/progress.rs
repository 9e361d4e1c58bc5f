use color_eyre::Result;
use libsql::params;

use super::helpers::query_one;
use super::models::ProgressRecord;
use super::Db;

impl Db {
    /// Upsert a progress record by its (child, chapter) natural key. A lower
    /// percentage than the stored one is accepted; last write wins.
    pub async fn upsert_progress(
        &self,
        child_id: i64,
        subject_id: i64,
        chapter_id: i64,
        progress_percentage: i64,
        completed: bool,
    ) -> Result<ProgressRecord> {
        let conn = self.db.connect()?;
        let record = query_one(
            &conn,
            r#"
            INSERT INTO progress (child_id, subject_id, chapter_id, progress_percentage, completed)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(child_id, chapter_id) DO UPDATE SET
                progress_percentage = excluded.progress_percentage,
                completed = excluded.completed,
                subject_id = excluded.subject_id
            RETURNING id, child_id, subject_id, chapter_id, completed, progress_percentage
            "#,
            params![child_id, subject_id, chapter_id, progress_percentage, completed],
        )
        .await?;

        tracing::info!(
            "progress updated: child_id={child_id}, chapter_id={chapter_id}, pct={progress_percentage}"
        );
        Ok(record)
    }

    /// Force a chapter to completed/100 regardless of prior state.
    pub async fn complete_chapter(
        &self,
        child_id: i64,
        subject_id: i64,
        chapter_id: i64,
    ) -> Result<ProgressRecord> {
        self.upsert_progress(child_id, subject_id, chapter_id, 100, true)
            .await
    }
}
