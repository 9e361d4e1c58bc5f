use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    db::UnlockOutcome,
    extractors::AuthGuard,
    rejections::{AppError, ResultExt},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/payment/unlock-subject", post(unlock_subject))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnlockSubjectPost {
    child_id: Option<i64>,
    subject_id: Option<i64>,
    transaction_id: Option<String>,
    amount: Option<f64>,
}

async fn unlock_subject(
    AuthGuard(claims): AuthGuard,
    State(state): State<AppState>,
    Json(body): Json<UnlockSubjectPost>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let (Some(child_id), Some(subject_id)) = (body.child_id, body.subject_id) else {
        return Err(AppError::Input(
            "Child ID and Subject ID are required".to_string(),
        ));
    };

    let child = state
        .db
        .find_child_owned(child_id, claims.id)
        .await
        .reject("could not look up child")?
        .ok_or_else(|| {
            AppError::NotFound(
                "Child not found or you don't have permission to unlock subjects for this child"
                    .to_string(),
            )
        })?;

    let subject = state
        .db
        .get_subject(subject_id)
        .await
        .reject("could not look up subject")?
        .ok_or_else(|| AppError::NotFound("Subject not found".to_string()))?;

    let outcome = state
        .db
        .unlock_subject(
            claims.id,
            child_id,
            subject_id,
            body.transaction_id,
            body.amount,
            subject.price,
        )
        .await
        .reject("could not unlock subject")?;

    match outcome {
        UnlockOutcome::NotAssigned => Err(AppError::NotFound(
            "Subject is not assigned to this child".to_string(),
        )),
        UnlockOutcome::AlreadyUnlocked { purchase_date } => Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "message": "This subject is already unlocked for this child",
                "subject": {
                    "name": subject.name,
                    "unlockedDate": purchase_date,
                },
            })),
        )),
        UnlockOutcome::Unlocked(receipt) => Ok((
            StatusCode::OK,
            Json(json!({
                "message": "Subject unlocked successfully!",
                "data": {
                    "child": {
                        "id": child.id,
                        "name": child.name,
                        "classno": child.classno,
                    },
                    "subject": {
                        "id": subject.id,
                        "name": subject.name,
                        "price": subject.price,
                    },
                    "purchaseDetails": {
                        "purchaseDate": receipt.purchase_date,
                        "transactionId": receipt.transaction_id,
                        "amount": receipt.amount,
                        "locked": false,
                    },
                    "paymentRecordId": receipt.payment_id,
                },
            })),
        )),
    }
}
