//! Request wire types for the Gemini REST API.

use quizforge_core::RemoteFile;
use serde::Serialize;

/// Instruction sent alongside the staged document.
///
/// The contract pins the output to a bare JSON array so the response can be
/// parsed without stripping prose or markdown fences.
pub(crate) const QUIZ_PROMPT: &str = "\
Based *only* on the content of the provided PDF file, generate exactly 10 \
multiple-choice quiz questions. For each question, provide: question text, \
an array of 4 options, and the 0-based index of the correct answer. Return \
ONLY a valid JSON array of 10 objects: [{\"questionText\": \"...\", \
\"options\": [\"A\", \"B\", \"C\", \"D\"], \"correctAnswerIndex\": N}]. If \
fewer than 10 questions can be generated, return as many as possible in the \
correct format. If none, return [].";

/// JSON mime type requested for generation output.
const JSON_MIME_TYPE: &str = "application/json";

/// Body of a `generateContent` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// Builds the quiz generation request for a staged document.
    pub fn quiz(file: &RemoteFile, temperature: f64) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::file(&file.uri, &file.mime_type),
                    Part::text(QUIZ_PROMPT),
                ],
            }],
            generation_config: GenerationConfig {
                temperature,
                response_mime_type: JSON_MIME_TYPE.to_string(),
            },
        }
    }
}

/// One conversational turn.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

/// A single content part, either a file reference or text.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_data: Option<FileData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    fn file(uri: &str, mime_type: &str) -> Self {
        Self {
            file_data: Some(FileData {
                file_uri: uri.to_string(),
                mime_type: mime_type.to_string(),
            }),
            text: None,
        }
    }

    fn text(text: &str) -> Self {
        Self {
            file_data: None,
            text: Some(text.to_string()),
        }
    }
}

/// Reference to a file previously staged via the Files API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileData {
    pub file_uri: String,
    pub mime_type: String,
}

/// Generation tuning parameters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub temperature: f64,
    pub response_mime_type: String,
}

/// Metadata body starting a resumable file upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadStartRequest {
    pub file: UploadFileMetadata,
}

/// File metadata carried by the upload start request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadFileMetadata {
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_request_references_the_staged_file() {
        let file = RemoteFile {
            name: "files/abc123".to_string(),
            uri: "https://generativelanguage.googleapis.com/v1beta/files/abc123".to_string(),
            mime_type: "application/pdf".to_string(),
        };

        let request = GenerateContentRequest::quiz(&file, 0.7);
        let json = serde_json::to_value(&request).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["fileData"]["fileUri"], file.uri);
        assert_eq!(parts[0]["fileData"]["mimeType"], "application/pdf");
        assert!(
            parts[1]["text"]
                .as_str()
                .unwrap()
                .contains("multiple-choice")
        );
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }
}
