use color_eyre::{eyre::OptionExt, Result};
use libsql::params;
use serde::Deserialize;

use super::helpers::{query_all, query_one, query_optional};
use super::models::{QuizQuestion, QuizScore};
use super::Db;

/// Raw question row; `options` is stored as a JSON array string.
#[derive(Deserialize)]
struct QuizQuestionRow {
    id: i64,
    chapter_id: i64,
    question: String,
    options: String,
    correct_answer: String,
    marks: i64,
}

impl QuizQuestionRow {
    fn into_question(self) -> Result<QuizQuestion> {
        let options: Vec<String> = serde_json::from_str(&self.options)?;
        Ok(QuizQuestion {
            id: self.id,
            chapter_id: self.chapter_id,
            question: self.question,
            options,
            correct_answer: self.correct_answer,
            marks: self.marks,
        })
    }
}

impl Db {
    pub async fn create_quiz_question(
        &self,
        chapter_id: i64,
        question: &str,
        options: &[String],
        correct_answer: &str,
        marks: i64,
    ) -> Result<QuizQuestion> {
        let conn = self.db.connect()?;
        let options_json = serde_json::to_string(options)?;

        let question_id = conn
            .query(
                r#"
                INSERT INTO quiz_questions (chapter_id, question, options, correct_answer, marks)
                VALUES (?, ?, ?, ?, ?) RETURNING id
                "#,
                params![chapter_id, question, options_json, correct_answer, marks],
            )
            .await?
            .next()
            .await?
            .ok_or_eyre("could not get question id")?
            .get::<i64>(0)?;

        tracing::info!("new quiz question created: id={question_id}, chapter_id={chapter_id}");

        Ok(QuizQuestion {
            id: question_id,
            chapter_id,
            question: question.to_string(),
            options: options.to_vec(),
            correct_answer: correct_answer.to_string(),
            marks,
        })
    }

    pub async fn get_quiz_question(&self, question_id: i64) -> Result<Option<QuizQuestion>> {
        let conn = self.db.connect()?;
        let row: Option<QuizQuestionRow> = query_optional(
            &conn,
            r#"
            SELECT id, chapter_id, question, options, correct_answer, marks
            FROM quiz_questions WHERE id = ?
            "#,
            params![question_id],
        )
        .await?;
        row.map(QuizQuestionRow::into_question).transpose()
    }

    pub async fn questions_for_chapter(&self, chapter_id: i64) -> Result<Vec<QuizQuestion>> {
        let conn = self.db.connect()?;
        let rows: Vec<QuizQuestionRow> = query_all(
            &conn,
            r#"
            SELECT id, chapter_id, question, options, correct_answer, marks
            FROM quiz_questions WHERE chapter_id = ? ORDER BY id
            "#,
            params![chapter_id],
        )
        .await?;
        rows.into_iter().map(QuizQuestionRow::into_question).collect()
    }

    /// Returns false when no question with that id exists.
    pub async fn update_quiz_question(
        &self,
        question_id: i64,
        question: &str,
        options: &[String],
        correct_answer: &str,
        marks: i64,
    ) -> Result<bool> {
        let conn = self.db.connect()?;
        let options_json = serde_json::to_string(options)?;
        let updated = conn
            .execute(
                r#"
                UPDATE quiz_questions
                SET question = ?, options = ?, correct_answer = ?, marks = ?
                WHERE id = ?
                "#,
                params![question, options_json, correct_answer, marks, question_id],
            )
            .await?;
        Ok(updated > 0)
    }

    pub async fn delete_quiz_question(&self, question_id: i64) -> Result<bool> {
        let conn = self.db.connect()?;
        let deleted = conn
            .execute("DELETE FROM quiz_questions WHERE id = ?", params![question_id])
            .await?;
        Ok(deleted > 0)
    }

    pub async fn record_quiz_score(
        &self,
        child_id: i64,
        chapter_id: i64,
        score: i64,
        total_marks: i64,
    ) -> Result<QuizScore> {
        let conn = self.db.connect()?;
        let recorded = query_one(
            &conn,
            r#"
            INSERT INTO quiz_scores (child_id, chapter_id, score, total_marks)
            VALUES (?, ?, ?, ?)
            RETURNING id, child_id, chapter_id, score, total_marks, completed_at
            "#,
            params![child_id, chapter_id, score, total_marks],
        )
        .await?;

        tracing::info!("quiz score recorded: child_id={child_id}, chapter_id={chapter_id}, score={score}/{total_marks}");
        Ok(recorded)
    }

    /// A child's attempt history, newest first.
    pub async fn scores_for_child(&self, child_id: i64) -> Result<Vec<QuizScore>> {
        let conn = self.db.connect()?;
        query_all(
            &conn,
            r#"
            SELECT id, child_id, chapter_id, score, total_marks, completed_at
            FROM quiz_scores WHERE child_id = ?
            ORDER BY completed_at DESC, id DESC
            "#,
            params![child_id],
        )
        .await
    }

    pub async fn scores_for_chapter(&self, child_id: i64, chapter_id: i64) -> Result<Vec<QuizScore>> {
        let conn = self.db.connect()?;
        query_all(
            &conn,
            r#"
            SELECT id, child_id, chapter_id, score, total_marks, completed_at
            FROM quiz_scores WHERE child_id = ? AND chapter_id = ?
            ORDER BY completed_at DESC, id DESC
            "#,
            params![child_id, chapter_id],
        )
        .await
    }

    pub async fn get_quiz_score(&self, score_id: i64) -> Result<Option<QuizScore>> {
        let conn = self.db.connect()?;
        query_optional(
            &conn,
            r#"
            SELECT id, child_id, chapter_id, score, total_marks, completed_at
            FROM quiz_scores WHERE id = ?
            "#,
            params![score_id],
        )
        .await
    }

    pub async fn delete_quiz_score(&self, score_id: i64) -> Result<bool> {
        let conn = self.db.connect()?;
        let deleted = conn
            .execute("DELETE FROM quiz_scores WHERE id = ?", params![score_id])
            .await?;
        Ok(deleted > 0)
    }
}
