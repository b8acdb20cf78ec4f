//! Reqwest-based client for the Gemini Files and generation APIs.

use std::sync::Arc;

use async_trait::async_trait;
use quizforge_core::{GenerationProvider, QuizQuestion, RemoteFile, validate_questions};
use reqwest::{Client, Response};

use crate::config::GeminiConfig;
use crate::request::{GenerateContentRequest, UploadFileMetadata, UploadStartRequest};
use crate::response::{GenerateContentResponse, UploadFileResponse};
use crate::{Error, Result, TRACING_TARGET};

/// Resumable upload protocol headers.
const UPLOAD_PROTOCOL_HEADER: &str = "X-Goog-Upload-Protocol";
const UPLOAD_COMMAND_HEADER: &str = "X-Goog-Upload-Command";
const UPLOAD_OFFSET_HEADER: &str = "X-Goog-Upload-Offset";
const UPLOAD_LENGTH_HEADER: &str = "X-Goog-Upload-Header-Content-Length";
const UPLOAD_CONTENT_TYPE_HEADER: &str = "X-Goog-Upload-Header-Content-Type";
const UPLOAD_URL_HEADER: &str = "X-Goog-Upload-URL";

struct GeminiClientInner {
    http: Client,
    config: GeminiConfig,
}

/// Client for staging documents and running quiz generation against Gemini.
///
/// Cheaply cloneable; all clones share one HTTP connection pool.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<GeminiClientInner>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.inner.config.model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Creates a new client from the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to create HTTP client: {e}")))?;

        tracing::debug!(
            target: TRACING_TARGET,
            model = %config.model,
            timeout_secs = config.timeout.as_secs(),
            "Created Gemini client"
        );

        Ok(Self {
            inner: Arc::new(GeminiClientInner { http, config }),
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.inner.config
    }

    /// Stages a document with the Files API via a resumable upload.
    pub async fn upload_file(
        &self,
        data: Vec<u8>,
        display_name: &str,
        mime_type: &str,
    ) -> Result<RemoteFile> {
        let config = &self.inner.config;
        let start_url = config
            .base_url
            .join("upload/v1beta/files")
            .map_err(|e| Error::config(format!("invalid base url: {e}")))?;

        let start = self
            .inner
            .http
            .post(start_url)
            .query(&[("key", config.api_key.as_str())])
            .header(UPLOAD_PROTOCOL_HEADER, "resumable")
            .header(UPLOAD_COMMAND_HEADER, "start")
            .header(UPLOAD_LENGTH_HEADER, data.len())
            .header(UPLOAD_CONTENT_TYPE_HEADER, mime_type)
            .json(&UploadStartRequest {
                file: UploadFileMetadata {
                    display_name: display_name.to_string(),
                },
            })
            .send()
            .await?;
        let start = check_status(start).await?;

        let upload_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| Error::invalid_response("upload session returned no upload URL"))?;

        let size = data.len();
        let upload = self
            .inner
            .http
            .post(upload_url)
            .header(UPLOAD_COMMAND_HEADER, "upload, finalize")
            .header(UPLOAD_OFFSET_HEADER, 0)
            .body(data)
            .send()
            .await?;
        let uploaded: UploadFileResponse = check_status(upload).await?.json().await?;

        tracing::info!(
            target: TRACING_TARGET,
            file = %uploaded.file.name,
            display_name = %display_name,
            size = size,
            "Staged document with generation backend"
        );

        Ok(RemoteFile {
            name: uploaded.file.name,
            uri: uploaded.file.uri,
            mime_type: uploaded.file.mime_type,
        })
    }

    /// Runs quiz generation against a staged document.
    pub async fn generate_quiz(&self, file: &RemoteFile) -> Result<Vec<QuizQuestion>> {
        let config = &self.inner.config;
        let url = config
            .base_url
            .join(&format!("v1beta/models/{}:generateContent", config.model))
            .map_err(|e| Error::config(format!("invalid base url: {e}")))?;

        tracing::debug!(
            target: TRACING_TARGET,
            file = %file.name,
            model = %config.model,
            "Requesting quiz generation"
        );

        let request = GenerateContentRequest::quiz(file, config.temperature);
        let response = self
            .inner
            .http
            .post(url)
            .query(&[("key", config.api_key.as_str())])
            .json(&request)
            .send()
            .await?;
        let body: GenerateContentResponse = check_status(response).await?.json().await?;

        let questions = parse_generation_response(body)?;

        tracing::info!(
            target: TRACING_TARGET,
            file = %file.name,
            question_count = questions.len(),
            "Generation complete"
        );

        Ok(questions)
    }

    /// Deletes a staged document from the Files API.
    pub async fn delete_file(&self, file: &RemoteFile) -> Result<()> {
        let config = &self.inner.config;
        let url = config
            .base_url
            .join(&format!("v1beta/{}", file.name))
            .map_err(|e| Error::config(format!("invalid base url: {e}")))?;

        let response = self
            .inner
            .http
            .delete(url)
            .query(&[("key", config.api_key.as_str())])
            .send()
            .await?;
        check_status(response).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            file = %file.name,
            "Released staged document"
        );

        Ok(())
    }
}

/// Maps non-success statuses to [`Error::Api`], keeping the body as context.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::api(status.as_u16(), body))
}

/// Extracts and validates the question list from a generation response.
///
/// A block reason, an empty candidate, unparseable text, or a question
/// sequence that fails validation are all failures; there is no partial
/// success.
fn parse_generation_response(response: GenerateContentResponse) -> Result<Vec<QuizQuestion>> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.as_deref())
    {
        return Err(Error::blocked(reason));
    }

    let text = response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .and_then(|content| content.parts.first())
        .and_then(|part| part.text.as_deref())
        .ok_or_else(|| Error::invalid_response("empty candidate content"))?;

    let questions: Vec<QuizQuestion> = serde_json::from_str(text.trim())
        .map_err(|e| Error::invalid_response(format!("malformed question payload: {e}")))?;

    validate_questions(&questions).map_err(|e| Error::invalid_response(e.to_string()))?;

    Ok(questions)
}

#[async_trait]
impl GenerationProvider for GeminiClient {
    async fn upload_document(
        &self,
        data: Vec<u8>,
        display_name: &str,
        mime_type: &str,
    ) -> quizforge_core::Result<RemoteFile> {
        self.upload_file(data, display_name, mime_type)
            .await
            .map_err(Into::into)
    }

    async fn generate_questions(
        &self,
        file: &RemoteFile,
    ) -> quizforge_core::Result<Vec<QuizQuestion>> {
        self.generate_quiz(file).await.map_err(Into::into)
    }

    async fn delete_document(&self, file: &RemoteFile) -> quizforge_core::Result<()> {
        self.delete_file(file).await.map_err(Into::into)
    }
}
