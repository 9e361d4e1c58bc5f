use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    extractors::AuthGuard,
    rejections::{AppError, ResultExt},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/child/add", post(add_child))
        .route("/child/my-children", get(my_children))
}

#[derive(Deserialize)]
struct AddChildPost {
    name: Option<String>,
    classno: Option<i64>,
    avatar: Option<String>,
}

async fn add_child(
    AuthGuard(claims): AuthGuard,
    State(state): State<AppState>,
    Json(body): Json<AddChildPost>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let name = body.name.filter(|n| !n.is_empty());
    let (Some(name), Some(classno)) = (name, body.classno) else {
        return Err(AppError::Input(
            "Name and class number are required".to_string(),
        ));
    };

    let existing = state
        .db
        .find_child_by_name(&name, claims.id)
        .await
        .reject("could not look up child")?;
    if existing.is_some() {
        return Err(AppError::Input(
            "A child with this name already exists for your account".to_string(),
        ));
    }

    let (child, seeded) = state
        .db
        .create_child(&name, claims.id, classno, body.avatar.as_deref())
        .await
        .reject("could not create child")?;

    let message = if seeded > 0 {
        "Child added successfully"
    } else {
        "Child added successfully (no subjects available for this class yet)"
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": message,
            "child": {
                "id": child.id,
                "name": child.name,
                "classno": child.classno,
                "parentId": child.parent_id,
            },
            "subjectsInitialized": seeded,
        })),
    ))
}

async fn my_children(
    AuthGuard(claims): AuthGuard,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let children = state
        .db
        .children_overview(claims.id)
        .await
        .reject("could not list children")?;

    if children.is_empty() {
        return Ok((
            StatusCode::OK,
            Json(json!({ "message": "No children found", "children": [] })),
        ));
    }

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Children retrieved successfully",
            "children": children,
        })),
    ))
}
