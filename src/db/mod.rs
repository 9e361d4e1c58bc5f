// Data access layer: one file per resource, all methods hang off `Db`.

use std::sync::Arc;

use color_eyre::{eyre::OptionExt, Result};

pub mod models;
pub use models::*;

mod chapter;
mod child;
mod helpers;
mod payment;
mod progress;
mod quiz;
mod schema;
mod subject;
mod user;

pub use payment::{UnlockOutcome, UnlockReceipt};

/// Cloneable database handle shared across request handlers.
#[derive(Clone)]
pub struct Db {
    db: Arc<libsql::Database>,
}

impl Db {
    /// `file:` URLs open a local SQLite database; anything else is treated
    /// as a remote Turso address.
    pub async fn new(url: String, auth_token: String) -> Result<Self> {
        let db = if url.starts_with("file:") {
            let path = url.strip_prefix("file:").unwrap_or(&url);
            libsql::Builder::new_local(path).build().await?
        } else {
            libsql::Builder::new_remote(url.to_owned(), auth_token)
                .build()
                .await?
        };

        let conn = db.connect()?;

        // Round trip once before touching the schema
        let one = conn
            .query("SELECT 1", ())
            .await?
            .next()
            .await?
            .ok_or_eyre("connection check failed")?
            .get::<i32>(0)?;
        assert_eq!(one, 1);

        schema::create_schema(&conn).await?;

        tracing::info!("database connection has been verified");

        Ok(Self { db: Arc::new(db) })
    }
}
