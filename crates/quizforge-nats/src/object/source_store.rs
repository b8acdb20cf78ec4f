//! Bucket of uploaded source documents.

use std::sync::Arc;

use async_nats::jetstream;
use async_nats::jetstream::context::ObjectStoreErrorKind;
use async_nats::jetstream::object_store::{self, ObjectMetadata};
use async_trait::async_trait;
use jiff::Timestamp;
use quizforge_core::SourceFetcher;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::source_key::SourceKey;
use super::source_reader::SourceReader;
use crate::{Error, Result, TRACING_TARGET_OBJECT};

/// Bucket holding uploaded source documents.
const SOURCE_BUCKET: &str = "quiz-sources";

/// Metadata recorded while a source document streamed into the bucket.
#[derive(Debug, Clone)]
pub struct StoredSource {
    /// Bytes streamed into the bucket, counted on this side of the wire.
    pub size: u64,
    /// SHA-256 of the streamed content, hex-encoded.
    pub sha256_hex: String,
}

/// Store for uploaded source documents, addressed by [`SourceKey`].
///
/// Uploads stream through a [`SourceReader`], so every accepted document
/// has a digest and passed the PDF integrity check; a rejected upload is
/// deleted again and never stays in the bucket.
#[derive(Clone)]
pub struct SourceStore {
    bucket: Arc<object_store::ObjectStore>,
}

impl SourceStore {
    /// Opens the source bucket, creating it on first use.
    ///
    /// Stored documents do not expire; their lifetime is tied to the quiz
    /// sets that reference them.
    pub async fn new(jetstream: &jetstream::Context) -> Result<Self> {
        let bucket = match jetstream.get_object_store(SOURCE_BUCKET).await {
            Ok(bucket) => bucket,
            Err(err) if matches!(err.kind(), ObjectStoreErrorKind::GetStore) => {
                tracing::info!(
                    target: TRACING_TARGET_OBJECT,
                    bucket = %SOURCE_BUCKET,
                    "Creating source document bucket"
                );
                let config = object_store::Config {
                    bucket: SOURCE_BUCKET.to_string(),
                    description: Some("Uploaded quiz source documents".to_string()),
                    ..Default::default()
                };
                jetstream
                    .create_object_store(config)
                    .await
                    .map_err(|e| Error::operation("create_object_store", e.to_string()))?
            }
            Err(err) => {
                return Err(Error::operation("get_object_store", err.to_string()));
            }
        };

        Ok(Self {
            bucket: Arc::new(bucket),
        })
    }

    /// Streams a document into the bucket, inspecting it along the way.
    ///
    /// Content that does not open with the PDF magic is rejected and the
    /// just-written object is deleted again, whatever content type the
    /// upload declared.
    pub async fn put<R>(&self, key: &SourceKey, reader: R) -> Result<StoredSource>
    where
        R: AsyncRead + Unpin,
    {
        let meta = ObjectMetadata {
            name: key.to_string(),
            ..Default::default()
        };

        let mut source_reader = SourceReader::new(reader);
        self.bucket
            .put(meta, &mut source_reader)
            .await
            .map_err(|e| Error::operation("put", e.to_string()))?;

        if !source_reader.has_pdf_magic() {
            // Compensate: the bytes already landed in the bucket.
            if let Err(err) = self.delete(key).await {
                tracing::warn!(
                    target: TRACING_TARGET_OBJECT,
                    key = %key,
                    error = %err,
                    "Failed to delete rejected upload"
                );
            }
            return Err(Error::invalid_source("content is not a PDF document"));
        }

        let size = source_reader.bytes_read();
        let sha256_hex = source_reader.digest_hex();

        tracing::info!(
            target: TRACING_TARGET_OBJECT,
            key = %key,
            size = size,
            sha256 = %sha256_hex,
            "Stored source document"
        );

        Ok(StoredSource { size, sha256_hex })
    }

    /// Deletes a stored document.
    pub async fn delete(&self, key: &SourceKey) -> Result<()> {
        self.bucket
            .delete(&key.to_string())
            .await
            .map_err(|e| Error::operation("delete", e.to_string()))?;

        tracing::info!(
            target: TRACING_TARGET_OBJECT,
            key = %key,
            "Source document deleted"
        );
        Ok(())
    }

    /// Checks whether a document exists.
    pub async fn exists(&self, key: &SourceKey) -> Result<bool> {
        match self.bucket.info(&key.to_string()).await {
            Ok(_) => Ok(true),
            Err(err) if err.to_string().contains("not found") => Ok(false),
            Err(err) => Err(Error::operation("info", err.to_string())),
        }
    }
}

#[async_trait]
impl SourceFetcher for SourceStore {
    async fn fetch(&self, locator: &str) -> quizforge_core::Result<Vec<u8>> {
        let key: SourceKey = locator
            .parse()
            .map_err(|err: Error| quizforge_core::Error::from(err))?;

        let mut object = match self.bucket.get(&key.to_string()).await {
            Ok(object) => object,
            Err(err) if err.to_string().contains("not found") => {
                return Err(quizforge_core::Error::not_found()
                    .with_message(format!("source document '{locator}' not found")));
            }
            Err(err) => {
                return Err(quizforge_core::Error::external_error()
                    .with_message("failed to open source document stream")
                    .with_source(err));
            }
        };

        let mut data = Vec::new();
        object.read_to_end(&mut data).await.map_err(|err| {
            quizforge_core::Error::external_error()
                .with_message("failed to read source document stream")
                .with_source(err)
        })?;

        if let Some(uploaded_at) = key.uploaded_at() {
            let age = Timestamp::now().duration_since(uploaded_at);
            tracing::debug!(
                target: TRACING_TARGET_OBJECT,
                key = %key,
                size = data.len(),
                source_age_secs = age.as_secs().max(0),
                "Fetched source document"
            );
        }

        Ok(data)
    }
}
