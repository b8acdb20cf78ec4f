//! Answer grading.

use quizforge_core::QuizQuestion;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Per-question outcome of a graded attempt.
///
/// This is the only place the correct answer index is paired with user
/// input; pre-grading views of a quiz never expose it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerReview {
    /// The text of the question.
    pub question_text: String,
    /// Candidate answers in display order.
    pub options: Vec<String>,
    /// 0-based index of the correct answer.
    pub correct_answer_index: usize,
    /// The answer the user picked.
    pub user_answer: usize,
    /// Whether the user's answer was correct.
    pub is_correct: bool,
}

/// A fully graded attempt.
#[derive(Debug, Clone)]
pub struct GradedAttempt {
    /// Per-question breakdown in question order.
    pub reviews: Vec<AnswerReview>,
    /// Number of correct answers.
    pub score: usize,
    /// Total number of questions graded.
    pub total_questions: usize,
}

/// Grades an answer sequence against a question sequence.
///
/// The answer sequence must match the question count exactly; a mismatch
/// is rejected before any grading happens.
pub fn grade(questions: &[QuizQuestion], answers: &[usize]) -> Result<GradedAttempt> {
    if answers.len() != questions.len() {
        return Err(Error::AnswerCountMismatch {
            expected: questions.len(),
            actual: answers.len(),
        });
    }

    let mut score = 0;
    let reviews = questions
        .iter()
        .zip(answers)
        .map(|(question, &answer)| {
            let is_correct = question.is_correct(answer);
            if is_correct {
                score += 1;
            }
            AnswerReview {
                question_text: question.question_text.clone(),
                options: question.options.clone(),
                correct_answer_index: question.correct_answer_index,
                user_answer: answer,
                is_correct,
            }
        })
        .collect();

    Ok(GradedAttempt {
        reviews,
        score,
        total_questions: questions.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions() -> Vec<QuizQuestion> {
        (0..4)
            .map(|i| QuizQuestion {
                question_text: format!("Question {i}"),
                options: vec![
                    "A".to_string(),
                    "B".to_string(),
                    "C".to_string(),
                    "D".to_string(),
                ],
                correct_answer_index: i % 4,
            })
            .collect()
    }

    #[test]
    fn all_correct_scores_full() {
        let questions = questions();
        let answers: Vec<usize> = questions.iter().map(|q| q.correct_answer_index).collect();

        let graded = grade(&questions, &answers).unwrap();
        assert_eq!(graded.score, questions.len());
        assert_eq!(graded.total_questions, questions.len());
        assert!(graded.reviews.iter().all(|r| r.is_correct));
    }

    #[test]
    fn all_wrong_scores_zero() {
        let questions = questions();
        let answers: Vec<usize> = questions
            .iter()
            .map(|q| (q.correct_answer_index + 1) % 4)
            .collect();

        let graded = grade(&questions, &answers).unwrap();
        assert_eq!(graded.score, 0);
        assert!(graded.reviews.iter().all(|r| !r.is_correct));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let questions = questions();
        let err = grade(&questions, &[0, 1]).unwrap_err();
        assert!(matches!(
            err,
            Error::AnswerCountMismatch {
                expected: 4,
                actual: 2
            }
        ));
    }

    #[test]
    fn review_carries_user_answer() {
        let questions = questions();
        let answers = vec![0, 0, 0, 0];

        let graded = grade(&questions, &answers).unwrap();
        assert_eq!(graded.reviews[2].user_answer, 0);
        assert_eq!(graded.reviews[2].correct_answer_index, 2);
        assert!(!graded.reviews[2].is_correct);
        assert!(graded.reviews[0].is_correct);
    }
}
