//! Input extractors: decode each uploaded artifact into its normalized form

use crate::error::AnalysisError;
use lopdf::Document;
use serde_json::Value;
use tracewise_domain::{AnalysisRequest, NormalizedInputs};
use tracing::{debug, warn};

/// Extract the text layer of a PDF, pages concatenated in page order
///
/// Pages whose text cannot be extracted, or that carry only whitespace, are
/// skipped. The document as a whole must yield some text.
pub fn extract_text(document: &[u8]) -> Result<String, AnalysisError> {
    let doc = Document::load_mem(document)
        .map_err(|e| AnalysisError::DocumentParse(format!("not a valid PDF: {}", e)))?;

    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(AnalysisError::DocumentParse("document has no pages".to_string()));
    }

    let mut text = String::new();
    let mut skipped = 0usize;

    // get_pages is keyed by page number, so iteration is in page order
    for page_number in pages.keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(page_text) if !page_text.trim().is_empty() => text.push_str(&page_text),
            Ok(_) => {
                debug!("Page {} has no text layer", page_number);
                skipped += 1;
            }
            Err(e) => {
                warn!("Failed to extract text from page {}: {}", page_number, e);
                skipped += 1;
            }
        }
    }

    if text.trim().is_empty() {
        return Err(AnalysisError::DocumentParse(format!(
            "none of the {} pages has extractable text",
            pages.len()
        )));
    }

    debug!(
        "Extracted {} chars from {} pages ({} skipped)",
        text.len(),
        pages.len(),
        skipped
    );

    Ok(text)
}

/// Decode bytes as UTF-8 text
pub fn read_text(bytes: &[u8]) -> Result<String, AnalysisError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| {
        AnalysisError::Encoding(format!(
            "invalid byte sequence at offset {}",
            e.utf8_error().valid_up_to()
        ))
    })
}

/// Parse bytes as JSON (mapping, sequence or scalar)
pub fn read_structured(bytes: &[u8]) -> Result<Value, AnalysisError> {
    serde_json::from_slice(bytes).map_err(|e| AnalysisError::MalformedInput(e.to_string()))
}

/// Run all three extractors over a request
///
/// Artifacts are decoded in a fixed order (requirements, code, test cases)
/// and the first failure is returned.
pub fn normalize(request: &AnalysisRequest) -> Result<NormalizedInputs, AnalysisError> {
    Ok(NormalizedInputs {
        requirements_text: extract_text(&request.requirements)?,
        code_text: read_text(&request.code)?,
        test_cases: read_structured(&request.test_cases)?,
    })
}
