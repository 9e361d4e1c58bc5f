use std::time::{SystemTime, UNIX_EPOCH};

use color_eyre::{eyre::OptionExt, Result};
use libsql::params;

use super::Db;
use crate::names;

pub enum UnlockOutcome {
    Unlocked(UnlockReceipt),
    /// The link exists but is already open; no second payment row is written.
    AlreadyUnlocked { purchase_date: Option<String> },
    /// No link between the child and the subject.
    NotAssigned,
}

pub struct UnlockReceipt {
    pub purchase_date: String,
    pub transaction_id: String,
    pub amount: f64,
    pub payment_id: i64,
}

impl Db {
    /// Flip the child's subject link open and record the payment, in one
    /// transaction. A crash can never leave an unlocked subject without its
    /// payment audit row.
    pub async fn unlock_subject(
        &self,
        parent_id: i64,
        child_id: i64,
        subject_id: i64,
        transaction_id: Option<String>,
        amount: Option<f64>,
        list_price: f64,
    ) -> Result<UnlockOutcome> {
        let conn = self.db.connect()?;
        let tx = conn.transaction().await?;

        let link = tx
            .query(
                r#"
                SELECT id, locked, purchase_date FROM user_subjects
                WHERE user_id = ? AND subject_id = ?
                "#,
                params![child_id, subject_id],
            )
            .await?
            .next()
            .await?;

        let Some(link) = link else {
            return Ok(UnlockOutcome::NotAssigned);
        };

        let link_id = link.get::<i64>(0)?;
        let locked = link.get::<bool>(1)?;
        if !locked {
            return Ok(UnlockOutcome::AlreadyUnlocked {
                purchase_date: link.get::<Option<String>>(2)?,
            });
        }

        let transaction_id = transaction_id.unwrap_or_else(placeholder_transaction_id);
        let amount = amount.unwrap_or(list_price);

        let purchase_date = tx
            .query(
                r#"
                UPDATE user_subjects
                SET locked = 0, purchase_date = datetime('now'), transaction_id = ?, amount = ?
                WHERE id = ?
                RETURNING purchase_date
                "#,
                params![transaction_id.clone(), amount, link_id],
            )
            .await?
            .next()
            .await?
            .ok_or_eyre("could not update subject link")?
            .get::<String>(0)?;

        let payment_id = tx
            .query(
                r#"
                INSERT INTO payments
                    (parent_id, child_id, subject_id, amount, transaction_id, payment_date, status)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                RETURNING id
                "#,
                params![
                    parent_id,
                    child_id,
                    subject_id,
                    amount,
                    transaction_id.clone(),
                    purchase_date.clone(),
                    names::PAYMENT_STATUS_SUCCESS
                ],
            )
            .await?
            .next()
            .await?
            .ok_or_eyre("could not get payment id")?
            .get::<i64>(0)?;

        tx.commit().await?;

        tracing::info!(
            "subject unlocked: child_id={child_id}, subject_id={subject_id}, payment_id={payment_id}"
        );

        Ok(UnlockOutcome::Unlocked(UnlockReceipt {
            purchase_date,
            transaction_id,
            amount,
            payment_id,
        }))
    }
}

/// Timestamp-derived fallback when the gateway id is missing. Not guaranteed
/// unique; the unique index on payments.transaction_id surfaces a collision.
fn placeholder_transaction_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{}{millis}", names::PLACEHOLDER_TRANSACTION_PREFIX)
}
