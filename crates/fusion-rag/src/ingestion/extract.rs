//! Text extraction from raw document bytes

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Trait for turning uploaded bytes into plain text
///
/// Implementations:
/// - `PdfExtractor`: `pdf-extract` on a blocking thread
/// - `PlainTextExtractor`: UTF-8 (lossy) decoding
/// - `DefaultExtractor`: picks one of the above by sniffing the PDF header
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract text from bytes
    async fn extract_text(&self, data: &[u8]) -> Result<String>;

    /// Get extractor name for logging
    fn name(&self) -> &str;
}

/// PDF text extraction via `pdf-extract`
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract_text(&self, data: &[u8]) -> Result<String> {
        // pdf-extract is CPU bound, synchronous, and panics on some malformed files
        let data = data.to_vec();
        tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&data)
                .map_err(|e| Error::extraction(format!("pdf-extract failed: {}", e)))
        })
        .await
        .map_err(|e| Error::extraction(format!("pdf-extract aborted: {}", e)))?
    }

    fn name(&self) -> &str {
        "pdf-extract"
    }
}

/// Treats the bytes as UTF-8 text, replacing invalid sequences
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract_text(&self, data: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(data).into_owned())
    }

    fn name(&self) -> &str {
        "plain-text"
    }
}

/// Routes `%PDF` payloads to [`PdfExtractor`], everything else to [`PlainTextExtractor`]
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultExtractor {
    pdf: PdfExtractor,
    text: PlainTextExtractor,
}

impl DefaultExtractor {
    /// Whether the payload carries a PDF header
    pub fn is_pdf(data: &[u8]) -> bool {
        data.starts_with(b"%PDF")
    }
}

#[async_trait]
impl TextExtractor for DefaultExtractor {
    async fn extract_text(&self, data: &[u8]) -> Result<String> {
        if Self::is_pdf(data) {
            self.pdf.extract_text(data).await
        } else {
            self.text.extract_text(data).await
        }
    }

    fn name(&self) -> &str {
        "default"
    }
}
