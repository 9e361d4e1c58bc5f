use std::collections::HashMap;

use serde::Serialize;

use crate::db::models::QuizQuestion;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSummary {
    pub score: i64,
    pub total_marks: i64,
    pub percentage: i64,
}

/// Grade a quiz attempt: each question awards its marks iff the submitted
/// answer string-equals the stored one (case-sensitive, no normalization).
/// An unanswered question scores 0. Returns `None` for an empty question
/// set so callers never divide by zero.
pub fn grade(
    questions: &[QuizQuestion],
    answers: &HashMap<String, String>,
) -> Option<GradeSummary> {
    if questions.is_empty() {
        return None;
    }

    let mut score = 0;
    let mut total_marks = 0;

    for question in questions {
        total_marks += question.marks;

        let submitted = answers.get(&question.id.to_string());
        if submitted.is_some_and(|a| *a == question.correct_answer) {
            score += question.marks;
        }
    }

    let percentage = ((score as f64 / total_marks as f64) * 100.0).round() as i64;

    Some(GradeSummary {
        score,
        total_marks,
        percentage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: i64, correct: &str, marks: i64) -> QuizQuestion {
        QuizQuestion {
            id,
            chapter_id: 1,
            question: format!("Question {id}"),
            options: vec!["A".to_string(), "B".to_string()],
            correct_answer: correct.to_string(),
            marks,
        }
    }

    fn answers(pairs: &[(i64, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(id, a)| (id.to_string(), a.to_string()))
            .collect()
    }

    #[test]
    fn one_correct_one_wrong_scores_fifty_percent() {
        let questions = [question(1, "A", 1), question(2, "B", 1)];
        let summary = grade(&questions, &answers(&[(1, "A"), (2, "A")])).unwrap();

        assert_eq!(summary.score, 1);
        assert_eq!(summary.total_marks, 2);
        assert_eq!(summary.percentage, 50);
    }

    #[test]
    fn unanswered_questions_score_zero() {
        let questions = [question(1, "A", 3), question(2, "B", 2)];
        let summary = grade(&questions, &answers(&[(1, "A")])).unwrap();

        assert_eq!(summary.score, 3);
        assert_eq!(summary.total_marks, 5);
        assert_eq!(summary.percentage, 60);
    }

    #[test]
    fn comparison_is_case_sensitive_and_exact() {
        let questions = [question(1, "Paris", 1)];

        assert_eq!(grade(&questions, &answers(&[(1, "paris")])).unwrap().score, 0);
        assert_eq!(
            grade(&questions, &answers(&[(1, "Paris ")])).unwrap().score,
            0
        );
        assert_eq!(grade(&questions, &answers(&[(1, "Paris")])).unwrap().score, 1);
    }

    #[test]
    fn score_is_independent_of_answer_insertion_order() {
        let questions = [question(1, "A", 1), question(2, "B", 1), question(3, "C", 1)];

        let forward = answers(&[(1, "A"), (2, "B"), (3, "X")]);
        let backward = answers(&[(3, "X"), (2, "B"), (1, "A")]);

        assert_eq!(
            grade(&questions, &forward).unwrap().score,
            grade(&questions, &backward).unwrap().score
        );
    }

    #[test]
    fn answers_for_unknown_question_ids_are_ignored() {
        let questions = [question(1, "A", 1)];
        let summary = grade(&questions, &answers(&[(1, "A"), (99, "A")])).unwrap();

        assert_eq!(summary.score, 1);
        assert_eq!(summary.total_marks, 1);
    }

    #[test]
    fn empty_question_set_returns_none() {
        assert!(grade(&[], &answers(&[(1, "A")])).is_none());
    }

    #[test]
    fn percentage_rounds_to_nearest_integer() {
        let questions = [question(1, "A", 1), question(2, "B", 1), question(3, "C", 1)];
        let summary = grade(&questions, &answers(&[(1, "A")])).unwrap();

        // 1/3 = 33.33… rounds to 33.
        assert_eq!(summary.percentage, 33);

        let summary = grade(&questions, &answers(&[(1, "A"), (2, "B")])).unwrap();
        // 2/3 = 66.66… rounds to 67.
        assert_eq!(summary.percentage, 67);
    }
}
