//! Streaming inspection of source documents on their way into the bucket.

use std::pin::Pin;
use std::task::{Context, Poll};

use pin_project_lite::pin_project;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, ReadBuf};

/// Leading bytes every well-formed PDF starts with.
const PDF_MAGIC: &[u8; 5] = b"%PDF-";

pin_project! {
    /// An async reader that inspects a source document as it streams.
    ///
    /// While bytes flow to the bucket this reader accumulates everything
    /// the upload path needs to judge the document without a second pass:
    /// the SHA-256 digest, the streamed byte count, and whether the
    /// content opens with the PDF magic. A declared `application/pdf`
    /// content type says nothing about the bytes themselves.
    pub struct SourceReader<R> {
        #[pin]
        inner: R,
        hasher: Sha256,
        bytes_read: u64,
        prefix: [u8; 5],
        prefix_len: usize,
    }
}

impl<R> SourceReader<R> {
    /// Creates a new source reader wrapping the given reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            bytes_read: 0,
            prefix: [0u8; 5],
            prefix_len: 0,
        }
    }

    /// Returns the number of bytes streamed so far.
    ///
    /// After the stream is drained this is the document's authoritative
    /// size, counted on this side of the wire.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Checks whether the streamed content opened with the PDF magic.
    pub fn has_pdf_magic(&self) -> bool {
        self.prefix_len == PDF_MAGIC.len() && &self.prefix == PDF_MAGIC
    }

    /// Consumes the reader and returns the hex-encoded SHA-256 digest.
    pub fn digest_hex(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

impl<R: AsyncRead> AsyncRead for SourceReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let this = self.project();
        let before = buf.filled().len();

        match this.inner.poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                let new_bytes = &buf.filled()[before..];
                if !new_bytes.is_empty() {
                    this.hasher.update(new_bytes);
                    *this.bytes_read += new_bytes.len() as u64;

                    if *this.prefix_len < PDF_MAGIC.len() {
                        let take = (PDF_MAGIC.len() - *this.prefix_len).min(new_bytes.len());
                        this.prefix[*this.prefix_len..*this.prefix_len + take]
                            .copy_from_slice(&new_bytes[..take]);
                        *this.prefix_len += take;
                    }
                }
                Poll::Ready(Ok(()))
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    async fn drain(data: &[u8]) -> SourceReader<&[u8]> {
        let mut reader = SourceReader::new(data);
        let mut sink = Vec::new();
        reader.read_to_end(&mut sink).await.unwrap();
        assert_eq!(sink, data);
        reader
    }

    #[tokio::test]
    async fn recognizes_a_pdf_document() {
        let reader = drain(b"%PDF-1.4 trailing content").await;

        assert!(reader.has_pdf_magic());
        assert_eq!(reader.bytes_read(), 25);
    }

    #[tokio::test]
    async fn rejects_content_without_the_magic() {
        let reader = drain(b"<html>definitely not a pdf</html>").await;
        assert!(!reader.has_pdf_magic());
    }

    #[tokio::test]
    async fn short_documents_are_not_pdfs() {
        let reader = drain(b"%PD").await;
        assert!(!reader.has_pdf_magic());

        let reader = drain(b"").await;
        assert!(!reader.has_pdf_magic());
        assert_eq!(reader.bytes_read(), 0);
    }

    #[tokio::test]
    async fn magic_survives_reads_split_mid_prefix() {
        let data = b"%PDF-1.7 content";
        let mut reader = SourceReader::new(&data[..]);

        // Read in 2-byte chunks so the magic spans several polls.
        let mut chunk = [0u8; 2];
        let mut total = 0;
        loop {
            let n = reader.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            total += n;
        }

        assert_eq!(total, data.len());
        assert!(reader.has_pdf_magic());
    }

    #[tokio::test]
    async fn digest_matches_the_streamed_bytes() {
        let reader = drain(b"Hello, World!").await;
        assert_eq!(reader.bytes_read(), 13);

        // SHA-256 of "Hello, World!"
        let expected = "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f";
        assert_eq!(reader.digest_hex(), expected);
    }
}
