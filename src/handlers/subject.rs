use axum::{
    extract::{Path, State},
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
        .route("/subject/add", post(add_subject))
        .route("/subject/all/get", get(all_subjects))
        .route("/subject/child/{child_id}", get(subjects_for_child))
}

#[derive(Deserialize)]
struct AddSubjectPost {
    classnumber: Option<i64>,
    name: Option<String>,
    price: Option<f64>,
}

async fn add_subject(
    State(state): State<AppState>,
    Json(body): Json<AddSubjectPost>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let name = body.name.filter(|n| !n.is_empty());
    let (Some(name), Some(classnumber)) = (name, body.classnumber) else {
        return Err(AppError::Input(
            "Class number and name are required".to_string(),
        ));
    };

    let existing = state
        .db
        .find_subject_by_name(&name, classnumber)
        .await
        .reject("could not look up subject")?;
    if existing.is_some() {
        return Err(AppError::Input(
            "Subject already exists for this class".to_string(),
        ));
    }

    let (subject, seeded) = state
        .db
        .create_subject(classnumber, &name, body.price.unwrap_or(0.0))
        .await
        .reject("could not create subject")?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Subject added successfully",
            "response": subject,
            "childrenInitialized": seeded,
        })),
    ))
}

async fn all_subjects(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let subjects = state
        .db
        .all_subjects()
        .await
        .reject("could not list subjects")?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Subjects: ", "subjects": subjects })),
    ))
}

async fn subjects_for_child(
    AuthGuard(claims): AuthGuard,
    State(state): State<AppState>,
    Path(child_id): Path<i64>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let child = state
        .db
        .find_child_owned(child_id, claims.id)
        .await
        .reject("could not look up child")?
        .ok_or_else(|| {
            AppError::NotFound(
                "Child not found or you don't have permission to view this child's subjects"
                    .to_string(),
            )
        })?;

    let subjects = state
        .db
        .subjects_for_class(child.classno)
        .await
        .reject("could not list subjects")?;

    if subjects.is_empty() {
        return Err(AppError::NotFound(
            "No subjects found for this child's class".to_string(),
        ));
    }

    let links = state
        .db
        .subject_links_for_child(child_id)
        .await
        .reject("could not list subject links")?;

    let mut annotated = Vec::with_capacity(subjects.len());
    for subject in &subjects {
        let link = links.iter().find(|l| l.subject_id == subject.id);

        // Backfill a missing link before responding, so the next read and
        // any unlock attempt see it.
        if link.is_none() {
            state
                .db
                .ensure_subject_link(child_id, subject.id)
                .await
                .reject("could not backfill subject link")?;
        }

        let locked = link.map_or(true, |l| l.locked);
        let (purchase_date, transaction_id) = match link {
            Some(l) if !l.locked => (l.purchase_date.clone(), l.transaction_id.clone()),
            _ => (None, None),
        };

        annotated.push(json!({
            "id": subject.id,
            "name": subject.name,
            "classnumber": subject.classnumber,
            "price": subject.price,
            "locked": locked,
            "purchaseDate": purchase_date,
            "transactionId": transaction_id,
        }));
    }

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Subjects retrieved successfully",
            "child": {
                "id": child.id,
                "name": child.name,
                "classno": child.classno,
            },
            "subjects": annotated,
            "totalSubjects": annotated.len(),
        })),
    ))
}
