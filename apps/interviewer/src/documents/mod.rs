//! Document Extractor: turns an uploaded resume or job description into text.
//!
//! Extraction failures are recoverable: callers use [`extract_or_empty`] and
//! carry on with an empty string plus a warning for the operator.

use thiserror::Error;
use tracing::warn;

/// Declared type of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Detects the kind from the declared content type, falling back to the
    /// file extension. Returns `None` for anything that is neither PDF nor text.
    pub fn detect(content_type: Option<&str>, file_name: Option<&str>) -> Option<Self> {
        match content_type.map(|ct| ct.trim().to_ascii_lowercase()).as_deref() {
            Some("application/pdf") => return Some(DocumentKind::Pdf),
            Some(ct) if ct.starts_with("text/plain") => return Some(DocumentKind::PlainText),
            _ => {}
        }

        let extension = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("pdf") => Some(DocumentKind::Pdf),
            Some("txt") => Some(DocumentKind::PlainText),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("document is not valid UTF-8 text: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("failed to read PDF: {0}")]
    Pdf(String),
}

/// Extracts the text of a document.
///
/// PDF parsing runs on a blocking thread; a parser panic surfaces as an
/// [`ExtractError::Pdf`] instead of unwinding through the request.
pub async fn extract_text(bytes: Vec<u8>, kind: DocumentKind) -> Result<String, ExtractError> {
    match kind {
        DocumentKind::PlainText => Ok(String::from_utf8(bytes)?),
        DocumentKind::Pdf => {
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                .await
                .map_err(|e| ExtractError::Pdf(format!("parser aborted: {e}")))?
                .map_err(|e| ExtractError::Pdf(e.to_string()))
        }
    }
}

/// Extracted text plus the warning to surface when extraction failed.
#[derive(Debug)]
pub struct Extracted {
    pub text: String,
    pub warning: Option<String>,
}

/// Extracts text, degrading to an empty string on failure.
pub async fn extract_or_empty(label: &str, bytes: Vec<u8>, kind: DocumentKind) -> Extracted {
    match extract_text(bytes, kind).await {
        Ok(text) => Extracted {
            text,
            warning: None,
        },
        Err(e) => {
            warn!("Could not extract {label}: {e}");
            Extracted {
                text: String::new(),
                warning: Some(format!("Error reading {label}: {e}")),
            }
        }
    }
}
