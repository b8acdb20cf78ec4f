//! Generation backend seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::question::QuizQuestion;
use crate::Result;

/// Handle to a document staged with the generation backend.
///
/// Returned by [`GenerationProvider::upload_document`] and used for both
/// the generation call and the eventual release of the remote resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    /// Backend resource name, used to release the remote copy.
    pub name: String,
    /// Backend URI the generation call references.
    pub uri: String,
    /// MIME type the document was uploaded with.
    pub mime_type: String,
}

/// Boundary to the external content-generation backend.
///
/// Implementations stage a document with the backend, run generation
/// against the staged handle, and release the remote resource once the
/// pipeline is done with it.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Uploads a document and returns a handle bound to the remote copy.
    async fn upload_document(
        &self,
        data: Vec<u8>,
        display_name: &str,
        mime_type: &str,
    ) -> Result<RemoteFile>;

    /// Generates quiz questions from a previously uploaded document.
    ///
    /// A blocked or malformed backend response is an error, never a
    /// partial success.
    async fn generate_questions(&self, file: &RemoteFile) -> Result<Vec<QuizQuestion>>;

    /// Releases the remote copy of a document.
    async fn delete_document(&self, file: &RemoteFile) -> Result<()>;
}
