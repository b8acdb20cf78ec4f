//! Multiple-choice question model and validation.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of answer options every generated question must carry.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// A single multiple-choice question produced by the generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    /// The text of the question.
    pub question_text: String,
    /// Candidate answers in display order, exactly [`OPTIONS_PER_QUESTION`].
    pub options: Vec<String>,
    /// 0-based index of the correct answer within `options`.
    pub correct_answer_index: usize,
}

impl QuizQuestion {
    /// Checks whether the given answer index is the correct one.
    #[inline]
    pub fn is_correct(&self, answer: usize) -> bool {
        answer == self.correct_answer_index
    }

    /// Validates the shape of this question.
    fn validate(&self) -> Result<()> {
        if self.question_text.trim().is_empty() {
            return Err(Error::invalid_input().with_message("question text is empty"));
        }
        if self.options.len() != OPTIONS_PER_QUESTION {
            return Err(Error::invalid_input().with_message(format!(
                "expected {} options, got {}",
                OPTIONS_PER_QUESTION,
                self.options.len()
            )));
        }
        if self.correct_answer_index >= self.options.len() {
            return Err(Error::invalid_input().with_message(format!(
                "correct answer index {} out of range",
                self.correct_answer_index
            )));
        }
        Ok(())
    }
}

/// Validates a generated question sequence.
///
/// Every item is checked, and an empty sequence is rejected: a generation
/// run that produced nothing is a failure, not an empty success.
pub fn validate_questions(questions: &[QuizQuestion]) -> Result<()> {
    if questions.is_empty() {
        return Err(Error::invalid_input().with_message("generation returned no questions"));
    }

    for (index, question) in questions.iter().enumerate() {
        question
            .validate()
            .map_err(|err| Error::invalid_input().with_message(format!("question {index}: {err}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: usize) -> QuizQuestion {
        QuizQuestion {
            question_text: "What is the capital of France?".to_string(),
            options: vec![
                "Berlin".to_string(),
                "Paris".to_string(),
                "Madrid".to_string(),
                "Rome".to_string(),
            ],
            correct_answer_index: correct,
        }
    }

    #[test]
    fn valid_sequence_passes() {
        let questions = vec![question(1), question(3)];
        assert!(validate_questions(&questions).is_ok());
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let err = validate_questions(&[]).unwrap_err();
        assert!(err.to_string().contains("no questions"));
    }

    #[test]
    fn wrong_option_count_is_rejected() {
        let mut bad = question(0);
        bad.options.pop();
        assert!(validate_questions(&[bad]).is_err());
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let bad = question(4);
        assert!(validate_questions(&[bad]).is_err());
    }

    #[test]
    fn blank_question_text_is_rejected() {
        let mut bad = question(0);
        bad.question_text = "   ".to_string();
        assert!(validate_questions(&[bad]).is_err());
    }

    #[test]
    fn later_invalid_item_is_still_caught() {
        let mut bad = question(2);
        bad.options.push("Lisbon".to_string());
        let questions = vec![question(0), question(1), bad];
        let err = validate_questions(&questions).unwrap_err();
        assert!(err.to_string().contains("question 2"));
    }

    #[test]
    fn question_serialization_uses_camel_case() {
        let json = serde_json::to_value(question(1)).unwrap();
        assert!(json.get("questionText").is_some());
        assert!(json.get("correctAnswerIndex").is_some());
    }
}
