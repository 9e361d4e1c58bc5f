use color_eyre::{eyre::OptionExt, Result};
use libsql::params;

use super::helpers::query_optional;
use super::models::Parent;
use super::Db;
use crate::names;
use crate::services::auth::AuthRepository;

impl Db {
    pub async fn find_parent_by_email(&self, email: &str) -> Result<Option<Parent>> {
        let conn = self.db.connect()?;
        query_optional(
            &conn,
            "SELECT id, email, otp, role FROM parents WHERE email = ?",
            params![email],
        )
        .await
    }

    pub async fn create_parent(&self, email: &str, otp: &str) -> Result<i64> {
        let conn = self.db.connect()?;

        let parent_id = conn
            .query(
                "INSERT INTO parents (email, otp, role) VALUES (?, ?, ?) RETURNING id",
                params![email, otp, names::PARENT_ROLE],
            )
            .await?
            .next()
            .await?
            .ok_or_eyre("could not get parent id")?
            .get::<i64>(0)?;

        tracing::info!("new parent created: id={parent_id}, email={email}");
        Ok(parent_id)
    }

    /// Overwrite the stored OTP. Any previously issued code stops matching.
    pub async fn set_parent_otp(&self, email: &str, otp: &str) -> Result<()> {
        let conn = self.db.connect()?;
        conn.execute(
            "UPDATE parents SET otp = ? WHERE email = ?",
            params![otp, email],
        )
        .await?;
        Ok(())
    }
}

impl AuthRepository for Db {
    async fn find_parent_by_email(&self, email: &str) -> Result<Option<Parent>> {
        Db::find_parent_by_email(self, email).await
    }

    async fn create_parent(&self, email: &str, otp: &str) -> Result<i64> {
        Db::create_parent(self, email, otp).await
    }

    async fn set_parent_otp(&self, email: &str, otp: &str) -> Result<()> {
        Db::set_parent_otp(self, email, otp).await
    }
}
