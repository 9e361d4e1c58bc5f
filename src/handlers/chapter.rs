use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    db::models::Chapter,
    rejections::{AppError, ResultExt},
    services::progression::{self, ChapterAnnotation},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/chapters/add", post(add_chapter))
        .route("/chapters/all/get", get(all_chapters))
        .route(
            "/chapters/subject/{subject_id}/{child_id}",
            get(chapters_for_child),
        )
        .route("/chapters/progress/update", post(update_progress))
        .route("/chapters/complete", post(complete_chapter))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddChapterPost {
    subject_id: Option<i64>,
    name: Option<String>,
    description: Option<String>,
    video_url: Option<String>,
    chapter_number: Option<i64>,
}

async fn add_chapter(
    State(state): State<AppState>,
    Json(body): Json<AddChapterPost>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let name = body.name.filter(|n| !n.is_empty());
    let (Some(subject_id), Some(name), Some(chapter_number)) =
        (body.subject_id, name, body.chapter_number)
    else {
        return Err(AppError::Input(
            "Subject ID, name and chapter number are required".to_string(),
        ));
    };

    state
        .db
        .get_subject(subject_id)
        .await
        .reject("could not look up subject")?
        .ok_or_else(|| AppError::NotFound("Subject not found".to_string()))?;

    let existing = state
        .db
        .find_chapter_by_name(&name, subject_id)
        .await
        .reject("could not look up chapter")?;
    if existing.is_some() {
        return Err(AppError::Input("Chapter already exists".to_string()));
    }

    let chapter = state
        .db
        .create_chapter(
            subject_id,
            &name,
            body.description.as_deref(),
            body.video_url.as_deref(),
            chapter_number,
        )
        .await
        .reject("could not create chapter")?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Chapter added successfully", "response": chapter })),
    ))
}

async fn all_chapters(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let chapters = state
        .db
        .all_chapters()
        .await
        .reject("could not list chapters")?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Chapters: ", "chapters": chapters })),
    ))
}

async fn chapters_for_child(
    State(state): State<AppState>,
    Path((subject_id, child_id)): Path<(i64, i64)>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let chapters = state
        .db
        .chapters_for_subject(subject_id)
        .await
        .reject("could not list chapters")?;

    if chapters.is_empty() {
        return Err(AppError::NotFound(
            "No chapters found for this subject.".to_string(),
        ));
    }

    let progress = state
        .db
        .progress_for_subject(child_id, subject_id)
        .await
        .reject("could not load progress")?;

    let has_payment = state
        .db
        .has_successful_payment(child_id, subject_id)
        .await
        .reject("could not check payment")?;

    let annotations = progression::annotate_chapters(&chapters, &progress, has_payment);
    let enhanced: Vec<Value> = chapters
        .iter()
        .zip(&annotations)
        .map(|(chapter, annotation)| enhanced_chapter(chapter, annotation))
        .collect();

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Chapters fetched successfully",
            "chapters": enhanced,
            "paymentStatus": has_payment,
        })),
    ))
}

fn enhanced_chapter(chapter: &Chapter, annotation: &ChapterAnnotation) -> Value {
    json!({
        "id": chapter.id,
        "subjectId": chapter.subject_id,
        "name": chapter.name,
        "description": chapter.description,
        "videoUrl": chapter.video_url,
        "chapterNumber": chapter.chapter_number,
        "locked": annotation.locked,
        "status": annotation.status,
        "progress": annotation.progress,
        "hasProgress": annotation.has_progress,
        "lockReason": annotation.lock_reason,
        "isPaid": annotation.is_paid,
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProgressPost {
    chapter_id: Option<i64>,
    subject_id: Option<i64>,
    child_id: Option<i64>,
    progress_percentage: Option<i64>,
    completed: Option<bool>,
}

async fn update_progress(
    State(state): State<AppState>,
    Json(body): Json<UpdateProgressPost>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let child_id = body
        .child_id
        .ok_or_else(|| AppError::Input("childId is required".to_string()))?;
    let (Some(chapter_id), Some(subject_id)) = (body.chapter_id, body.subject_id) else {
        return Err(AppError::Input(
            "chapterId and subjectId are required".to_string(),
        ));
    };

    let percentage = body.progress_percentage.unwrap_or(0);
    if !(0..=100).contains(&percentage) {
        return Err(AppError::Input(
            "progressPercentage must be between 0 and 100".to_string(),
        ));
    }

    let completed = body.completed.unwrap_or(false) || percentage >= 100;

    let progress = state
        .db
        .upsert_progress(child_id, subject_id, chapter_id, percentage, completed)
        .await
        .reject("could not update progress")?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Progress updated successfully", "progress": progress })),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteChapterPost {
    chapter_id: Option<i64>,
    subject_id: Option<i64>,
    child_id: Option<i64>,
}

async fn complete_chapter(
    State(state): State<AppState>,
    Json(body): Json<CompleteChapterPost>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let child_id = body
        .child_id
        .ok_or_else(|| AppError::Input("childId is required".to_string()))?;
    let (Some(chapter_id), Some(subject_id)) = (body.chapter_id, body.subject_id) else {
        return Err(AppError::Input(
            "chapterId and subjectId are required".to_string(),
        ));
    };

    let progress = state
        .db
        .complete_chapter(child_id, subject_id, chapter_id)
        .await
        .reject("could not complete chapter")?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Chapter marked as complete", "progress": progress })),
    ))
}
