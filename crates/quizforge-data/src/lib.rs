#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod grading;
mod memory;
mod quiz_session;
mod quiz_set;
mod repository;

pub use error::{Error, Result};
pub use grading::{AnswerReview, GradedAttempt, grade};
pub use memory::MemoryRepository;
pub use quiz_session::QuizSession;
pub use quiz_set::{QuizSet, QuizStatus};
pub use repository::{QuizRepository, QuizStore};
