use color_eyre::{eyre::OptionExt, Result};
use libsql::params::IntoParams;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Run a query and deserialize every row into `T` via `libsql::de::from_row`.
pub async fn query_all<T: DeserializeOwned>(
    conn: &libsql::Connection,
    sql: &str,
    params: impl IntoParams,
) -> Result<Vec<T>> {
    let mut rows = conn.query(sql, params).await?;
    let mut results = Vec::new();
    while let Some(row) = rows.next().await? {
        results.push(libsql::de::from_row::<T>(&row)?);
    }
    Ok(results)
}

/// Run a query that must yield a row, such as `INSERT ... RETURNING`.
pub async fn query_one<T: DeserializeOwned>(
    conn: &libsql::Connection,
    sql: &str,
    params: impl IntoParams,
) -> Result<T> {
    let row = conn
        .query(sql, params)
        .await?
        .next()
        .await?
        .ok_or_eyre("expected a row but got none")?;
    Ok(libsql::de::from_row::<T>(&row)?)
}

/// Run a query that yields at most one row.
pub async fn query_optional<T: DeserializeOwned>(
    conn: &libsql::Connection,
    sql: &str,
    params: impl IntoParams,
) -> Result<Option<T>> {
    match conn.query(sql, params).await?.next().await? {
        Some(row) => Ok(Some(libsql::de::from_row::<T>(&row)?)),
        None => Ok(None),
    }
}

/// SQLite has no boolean column type; any non-zero integer reads as true.
pub fn bool_from_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    i64::deserialize(deserializer).map(|v| v != 0)
}
