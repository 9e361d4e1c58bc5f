use color_eyre::{eyre::OptionExt, Result};
use libsql::params;

use super::helpers::{query_all, query_optional};
use super::models::{Child, ChildOverview};
use super::Db;

impl Db {
    pub async fn find_child_by_name(&self, name: &str, parent_id: i64) -> Result<Option<Child>> {
        let conn = self.db.connect()?;
        query_optional(
            &conn,
            r#"
            SELECT id, name, parent_id, classno, avatar, is_active
            FROM children WHERE name = ? AND parent_id = ?
            "#,
            params![name, parent_id],
        )
        .await
    }

    /// Create a child and seed one locked subject link per subject of its
    /// class, atomically. Returns the child and the number of seeded links.
    pub async fn create_child(
        &self,
        name: &str,
        parent_id: i64,
        classno: i64,
        avatar: Option<&str>,
    ) -> Result<(Child, u64)> {
        let conn = self.db.connect()?;
        let tx = conn.transaction().await?;

        let child_id = tx
            .query(
                r#"
                INSERT INTO children (name, parent_id, classno, avatar)
                VALUES (?, ?, ?, ?) RETURNING id
                "#,
                params![name, parent_id, classno, avatar],
            )
            .await?
            .next()
            .await?
            .ok_or_eyre("could not get child id")?
            .get::<i64>(0)?;

        let seeded = tx
            .execute(
                r#"
                INSERT INTO user_subjects (user_id, subject_id, locked)
                SELECT ?, id, 1 FROM subjects WHERE classnumber = ?
                "#,
                params![child_id, classno],
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "new child created: id={child_id}, parent_id={parent_id}, seeded {seeded} subject links"
        );

        let child = Child {
            id: child_id,
            name: name.to_string(),
            parent_id,
            classno,
            avatar: avatar.map(str::to_string),
            is_active: true,
        };
        Ok((child, seeded))
    }

    /// Look up a child only if it belongs to the given parent.
    pub async fn find_child_owned(&self, child_id: i64, parent_id: i64) -> Result<Option<Child>> {
        let conn = self.db.connect()?;
        query_optional(
            &conn,
            r#"
            SELECT id, name, parent_id, classno, avatar, is_active
            FROM children WHERE id = ? AND parent_id = ?
            "#,
            params![child_id, parent_id],
        )
        .await
    }

    /// Active children of a parent, each with its subject-link counts.
    pub async fn children_overview(&self, parent_id: i64) -> Result<Vec<ChildOverview>> {
        let conn = self.db.connect()?;
        query_all(
            &conn,
            r#"
            SELECT
                c.id,
                c.name,
                c.classno,
                c.avatar,
                (SELECT COUNT(*) FROM user_subjects us
                 WHERE us.user_id = c.id) AS total_subjects,
                (SELECT COUNT(*) FROM user_subjects us
                 WHERE us.user_id = c.id AND us.locked = 0) AS unlocked_subjects,
                (SELECT COUNT(*) FROM user_subjects us
                 WHERE us.user_id = c.id AND us.locked = 1) AS locked_subjects
            FROM children c
            WHERE c.parent_id = ? AND c.is_active = 1
            ORDER BY c.id
            "#,
            params![parent_id],
        )
        .await
    }
}
