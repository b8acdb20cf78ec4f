#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod generation;
mod question;
mod source;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use generation::{GenerationProvider, RemoteFile};
pub use question::{OPTIONS_PER_QUESTION, QuizQuestion, validate_questions};
pub use source::SourceFetcher;
