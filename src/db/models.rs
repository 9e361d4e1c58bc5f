// Database model structs.
//
// Deserialize targets `libsql::de::from_row`, so field names match column
// names; Serialize renders the camelCase shapes the API exposes.

use serde::{Deserialize, Serialize};

use super::helpers::bool_from_int;

#[derive(Debug, Clone, Deserialize)]
pub struct Parent {
    pub id: i64,
    pub email: String,
    pub otp: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Child {
    pub id: i64,
    pub name: String,
    pub parent_id: i64,
    pub classno: i64,
    pub avatar: Option<String>,
    #[serde(deserialize_with = "bool_from_int")]
    pub is_active: bool,
}

/// A child row joined with its subject-link counts, for the parent overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ChildOverview {
    pub id: i64,
    pub name: String,
    pub classno: i64,
    pub avatar: Option<String>,
    pub total_subjects: i64,
    pub unlocked_subjects: i64,
    pub locked_subjects: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Subject {
    pub id: i64,
    pub classnumber: i64,
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Chapter {
    pub id: i64,
    pub subject_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub chapter_number: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ProgressRecord {
    pub id: i64,
    pub child_id: i64,
    pub subject_id: i64,
    pub chapter_id: i64,
    #[serde(deserialize_with = "bool_from_int")]
    pub completed: bool,
    pub progress_percentage: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct UserSubjectLink {
    pub id: i64,
    pub user_id: i64,
    pub subject_id: i64,
    #[serde(deserialize_with = "bool_from_int")]
    pub locked: bool,
    pub purchase_date: Option<String>,
    pub transaction_id: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: i64,
    pub chapter_id: i64,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub marks: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct QuizScore {
    pub id: i64,
    pub child_id: i64,
    pub chapter_id: i64,
    pub score: i64,
    pub total_marks: i64,
    pub completed_at: String,
}
