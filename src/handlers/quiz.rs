use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    db::models::QuizQuestion,
    extractors::AuthGuard,
    names,
    rejections::{AppError, ResultExt},
    services::grading,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/quiz/question/add", post(add_question))
        .route("/quiz/questions/chapter/{chapter_id}", get(chapter_questions))
        .route("/quiz/question/{question_id}", get(get_question))
        .route("/quiz/question/{question_id}", put(update_question))
        .route("/quiz/question/{question_id}", delete(delete_question))
        .route("/quiz/submit", post(submit_quiz))
        .route("/quiz/scores/child/{child_id}", get(child_scores))
        .route(
            "/quiz/scores/child/{child_id}/chapter/{chapter_id}",
            get(chapter_scores),
        )
        .route("/quiz/score/{score_id}", get(get_score))
        .route("/quiz/score/{score_id}", delete(delete_score))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionPost {
    chapter_id: Option<i64>,
    question: Option<String>,
    options: Option<Vec<String>>,
    correct_answer: Option<String>,
    marks: Option<i64>,
}

async fn add_question(
    State(state): State<AppState>,
    Json(body): Json<QuestionPost>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let question = body.question.filter(|q| !q.is_empty());
    let correct_answer = body.correct_answer.filter(|a| !a.is_empty());
    let (Some(chapter_id), Some(question), Some(options), Some(correct_answer)) =
        (body.chapter_id, question, body.options, correct_answer)
    else {
        return Err(AppError::Input(
            "Chapter ID, question, options, and correct answer are required".to_string(),
        ));
    };

    if options.len() < names::MIN_QUESTION_OPTIONS {
        return Err(AppError::Input(
            "At least 2 options are required".to_string(),
        ));
    }

    state
        .db
        .get_chapter(chapter_id)
        .await
        .reject("could not look up chapter")?
        .ok_or_else(|| AppError::NotFound("Chapter not found".to_string()))?;

    let created = state
        .db
        .create_quiz_question(
            chapter_id,
            &question,
            &options,
            &correct_answer,
            body.marks.unwrap_or(names::DEFAULT_QUESTION_MARKS),
        )
        .await
        .reject("could not create quiz question")?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Quiz question added successfully", "question": created })),
    ))
}

/// Listing shape for children taking the quiz: the correct answer never
/// leaves the server.
fn question_without_answer(question: &QuizQuestion) -> Value {
    json!({
        "id": question.id,
        "chapterId": question.chapter_id,
        "question": question.question,
        "options": question.options,
        "marks": question.marks,
    })
}

async fn chapter_questions(
    State(state): State<AppState>,
    Path(chapter_id): Path<i64>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let questions = state
        .db
        .questions_for_chapter(chapter_id)
        .await
        .reject("could not list questions")?;

    let total_marks: i64 = questions.iter().map(|q| q.marks).sum();
    let stripped: Vec<Value> = questions.iter().map(question_without_answer).collect();

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Questions retrieved successfully",
            "questions": stripped,
            "totalQuestions": stripped.len(),
            "totalMarks": total_marks,
        })),
    ))
}

async fn get_question(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let question = state
        .db
        .get_quiz_question(question_id)
        .await
        .reject("could not look up question")?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Question retrieved successfully", "question": question })),
    ))
}

async fn update_question(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
    Json(body): Json<QuestionPost>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let question = body.question.filter(|q| !q.is_empty());
    let correct_answer = body.correct_answer.filter(|a| !a.is_empty());
    let (Some(question), Some(options), Some(correct_answer)) =
        (question, body.options, correct_answer)
    else {
        return Err(AppError::Input(
            "Question, options, and correct answer are required".to_string(),
        ));
    };

    if options.len() < names::MIN_QUESTION_OPTIONS {
        return Err(AppError::Input(
            "At least 2 options are required".to_string(),
        ));
    }

    let updated = state
        .db
        .update_quiz_question(
            question_id,
            &question,
            &options,
            &correct_answer,
            body.marks.unwrap_or(names::DEFAULT_QUESTION_MARKS),
        )
        .await
        .reject("could not update quiz question")?;

    if !updated {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    let question = state
        .db
        .get_quiz_question(question_id)
        .await
        .reject("could not look up question")?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Quiz question updated successfully", "question": question })),
    ))
}

async fn delete_question(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let deleted = state
        .db
        .delete_quiz_question(question_id)
        .await
        .reject("could not delete quiz question")?;

    if !deleted {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Quiz question deleted successfully" })),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitQuizPost {
    child_id: Option<i64>,
    chapter_id: Option<i64>,
    answers: Option<HashMap<String, String>>,
}

async fn submit_quiz(
    AuthGuard(claims): AuthGuard,
    State(state): State<AppState>,
    Json(body): Json<SubmitQuizPost>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let (Some(child_id), Some(chapter_id), Some(answers)) =
        (body.child_id, body.chapter_id, body.answers)
    else {
        return Err(AppError::Input(
            "Child ID, Chapter ID, and answers are required".to_string(),
        ));
    };

    let child = state
        .db
        .find_child_owned(child_id, claims.id)
        .await
        .reject("could not look up child")?
        .ok_or_else(|| {
            AppError::NotFound("Child not found or you don't have permission".to_string())
        })?;

    state
        .db
        .get_chapter(chapter_id)
        .await
        .reject("could not look up chapter")?
        .ok_or_else(|| AppError::NotFound("Chapter not found".to_string()))?;

    let questions = state
        .db
        .questions_for_chapter(chapter_id)
        .await
        .reject("could not list questions")?;

    let Some(summary) = grading::grade(&questions, &answers) else {
        return Err(AppError::NotFound(
            "No questions found for this chapter".to_string(),
        ));
    };

    let quiz_score = state
        .db
        .record_quiz_score(child_id, chapter_id, summary.score, summary.total_marks)
        .await
        .reject("could not record quiz score")?;

    tracing::info!(
        "quiz completed: {} scored {}/{}",
        child.name,
        summary.score,
        summary.total_marks
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Quiz submitted successfully!",
            "result": {
                "score": summary.score,
                "totalMarks": summary.total_marks,
                "percentage": summary.percentage,
                "quizScoreId": quiz_score.id,
            },
        })),
    ))
}

async fn child_scores(
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
            AppError::NotFound("Child not found or you don't have permission".to_string())
        })?;

    let scores = state
        .db
        .scores_for_child(child_id)
        .await
        .reject("could not list quiz scores")?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Quiz scores retrieved successfully",
            "child": {
                "id": child.id,
                "name": child.name,
                "classno": child.classno,
            },
            "scores": scores,
            "totalQuizzes": scores.len(),
        })),
    ))
}

async fn chapter_scores(
    AuthGuard(claims): AuthGuard,
    State(state): State<AppState>,
    Path((child_id, chapter_id)): Path<(i64, i64)>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let child = state
        .db
        .find_child_owned(child_id, claims.id)
        .await
        .reject("could not look up child")?
        .ok_or_else(|| {
            AppError::NotFound("Child not found or you don't have permission".to_string())
        })?;

    let scores = state
        .db
        .scores_for_chapter(child_id, chapter_id)
        .await
        .reject("could not list quiz scores")?;

    if scores.is_empty() {
        return Err(AppError::NotFound(
            "No quiz attempts found for this chapter".to_string(),
        ));
    }

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Quiz scores retrieved successfully",
            "child": {
                "id": child.id,
                "name": child.name,
            },
            "scores": scores,
            "totalAttempts": scores.len(),
        })),
    ))
}

async fn get_score(
    AuthGuard(claims): AuthGuard,
    State(state): State<AppState>,
    Path(score_id): Path<i64>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let quiz_score = state
        .db
        .get_quiz_score(score_id)
        .await
        .reject("could not look up quiz score")?
        .ok_or_else(|| AppError::NotFound("Quiz score not found".to_string()))?;

    let owned = state
        .db
        .find_child_owned(quiz_score.child_id, claims.id)
        .await
        .reject("could not look up child")?;
    if owned.is_none() {
        return Err(AppError::Forbidden(
            "You don't have permission to view this score",
        ));
    }

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Quiz score retrieved successfully",
            "quizScore": quiz_score,
        })),
    ))
}

async fn delete_score(
    AuthGuard(claims): AuthGuard,
    State(state): State<AppState>,
    Path(score_id): Path<i64>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let quiz_score = state
        .db
        .get_quiz_score(score_id)
        .await
        .reject("could not look up quiz score")?
        .ok_or_else(|| AppError::NotFound("Quiz score not found".to_string()))?;

    let owned = state
        .db
        .find_child_owned(quiz_score.child_id, claims.id)
        .await
        .reject("could not look up child")?;
    if owned.is_none() {
        return Err(AppError::Forbidden(
            "You don't have permission to delete this score",
        ));
    }

    state
        .db
        .delete_quiz_score(score_id)
        .await
        .reject("could not delete quiz score")?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Quiz score deleted successfully" })),
    ))
}
