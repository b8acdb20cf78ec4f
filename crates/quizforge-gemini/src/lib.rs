#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod client;
mod config;
mod error;
mod request;
mod response;

pub use client::GeminiClient;
pub use config::GeminiConfig;
pub use error::{Error, Result};

/// Tracing target for Gemini client operations.
pub const TRACING_TARGET: &str = "quizforge_gemini";
