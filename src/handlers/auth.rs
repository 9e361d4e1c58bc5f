use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    rejections::{AppError, ResultExt},
    services::auth::VerifyOtpOutcome,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/parent/login", post(parent_login))
        .route("/verify/parent", post(verify_parent))
}

#[derive(Deserialize)]
struct ParentLoginPost {
    email: Option<String>,
}

async fn parent_login(
    State(state): State<AppState>,
    Json(body): Json<ParentLoginPost>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let email = body
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::Input("Email is required".to_string()))?;

    let outcome = state
        .auth
        .issue_otp(&email)
        .await
        .reject("could not issue OTP")?;

    let message = if outcome.is_new_user {
        "Account created! OTP Sent Successfully"
    } else {
        "OTP Sent Successfully"
    };

    Ok((
        StatusCode::OK,
        Json(json!({ "message": message, "isNewUser": outcome.is_new_user })),
    ))
}

#[derive(Deserialize)]
struct VerifyParentPost {
    email: Option<String>,
    otp: Option<String>,
}

async fn verify_parent(
    State(state): State<AppState>,
    Json(body): Json<VerifyParentPost>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let email = body.email.unwrap_or_default();
    let otp = body.otp.unwrap_or_default();

    let outcome = state
        .auth
        .verify_otp(&email, &otp)
        .await
        .reject("could not verify OTP")?;

    match outcome {
        VerifyOtpOutcome::Success { token, user } => Ok((
            StatusCode::OK,
            Json(json!({
                "message": "Parent Login Success",
                "token": token,
                "user": user,
            })),
        )),
        VerifyOtpOutcome::UserNotFound => {
            Err(AppError::Input("User not found".to_string()))
        }
        VerifyOtpOutcome::InvalidOtp => Err(AppError::Input("Invalid OTP".to_string())),
    }
}
