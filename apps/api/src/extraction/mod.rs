//! Document capabilities the engine consumes: text extraction and page counting.
//!
//! Both are CPU-bound on PDFs; callers on the async runtime run them in
//! `spawn_blocking`.

use thiserror::Error;
use tracing::debug;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type '{0}'. Upload a PDF or plain-text résumé")]
    UnsupportedMime(String),

    #[error("Could not read PDF text: {0}")]
    Pdf(String),

    #[error("Text file is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Error)]
pub enum PageCountError {
    #[error("Page count not available for this document")]
    Unavailable,

    #[error("Could not parse PDF structure: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// Normalizes an upload's declared content type, falling back to the file extension
/// when the client sent nothing useful.
pub fn resolve_mime(content_type: Option<&str>, file_name: Option<&str>) -> String {
    let declared = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");
    if let Some(ct) = declared {
        return ct;
    }

    let ext = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => MIME_PDF.to_string(),
        Some("txt") | Some("text") => MIME_TEXT.to_string(),
        Some("docx") => MIME_DOCX.to_string(),
        _ => "application/octet-stream".to_string(),
    }
}

/// Extracts UTF-8 text from an uploaded document.
pub fn extract_text(bytes: &[u8], mime_type: &str) -> Result<String, ExtractionError> {
    match mime_type {
        MIME_PDF => {
            // pdf-extract panics on some malformed files
            let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
                .map_err(|_| ExtractionError::Pdf("malformed PDF".to_string()))?
                .map_err(|e| ExtractionError::Pdf(e.to_string()))?;
            debug!("Extracted {} characters of PDF text", text.chars().count());
            Ok(text)
        }
        MIME_TEXT => Ok(String::from_utf8(bytes.to_vec())?),
        other => Err(ExtractionError::UnsupportedMime(other.to_string())),
    }
}

/// Where the engine gets a document's physical page count. Failures are
/// recovered by the caller, never propagated.
pub trait PageCountSource {
    fn page_count(&self) -> Result<usize, PageCountError>;
}

/// Counts pages straight from the PDF object tree.
pub struct PdfPageCounter<'a> {
    bytes: &'a [u8],
}

impl<'a> PdfPageCounter<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl PageCountSource for PdfPageCounter<'_> {
    fn page_count(&self) -> Result<usize, PageCountError> {
        let doc = lopdf::Document::load_mem(self.bytes)?;
        Ok(doc.get_pages().len())
    }
}

/// A count the caller already knows, e.g. supplied alongside pre-extracted text.
#[derive(Debug, Clone, Copy)]
pub struct KnownPageCount(pub usize);

impl PageCountSource for KnownPageCount {
    fn page_count(&self) -> Result<usize, PageCountError> {
        Ok(self.0)
    }
}

/// No page information at all; the engine estimates from word count.
#[derive(Debug, Clone, Copy)]
pub struct NoPageCount;

impl PageCountSource for NoPageCount {
    fn page_count(&self) -> Result<usize, PageCountError> {
        Err(PageCountError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_mime_prefers_declared_type() {
        assert_eq!(resolve_mime(Some("Application/PDF"), Some("cv.txt")), MIME_PDF);
        assert_eq!(
            resolve_mime(Some("text/plain; charset=utf-8"), None),
            MIME_TEXT
        );
    }

    #[test]
    fn test_resolve_mime_falls_back_to_extension() {
        assert_eq!(
            resolve_mime(Some("application/octet-stream"), Some("Resume.PDF")),
            MIME_PDF
        );
        assert_eq!(resolve_mime(None, Some("cv.docx")), MIME_DOCX);
        assert_eq!(resolve_mime(None, None), "application/octet-stream");
    }

    #[test]
    fn test_extract_plain_text() {
        let text = extract_text("Jane Doe\nEngineer".as_bytes(), MIME_TEXT).unwrap();
        assert_eq!(text, "Jane Doe\nEngineer");
    }

    #[test]
    fn test_extract_rejects_invalid_utf8() {
        let err = extract_text(&[0xff, 0xfe, 0xfd], MIME_TEXT).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidUtf8(_)));
    }

    #[test]
    fn test_docx_is_unsupported() {
        let err = extract_text(b"PK\x03\x04", MIME_DOCX).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedMime(_)));
    }

    #[test]
    fn test_garbage_pdf_fails_page_count() {
        let counter = PdfPageCounter::new(b"not a pdf");
        assert!(counter.page_count().is_err());
    }

    #[test]
    fn test_static_sources() {
        assert_eq!(KnownPageCount(2).page_count().unwrap(), 2);
        assert!(matches!(
            NoPageCount.page_count(),
            Err(PageCountError::Unavailable)
        ));
    }
}
