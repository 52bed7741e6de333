//! Parse LLM output into a traceability report

use crate::error::AnalysisError;
use tracewise_domain::TraceabilityReport;
use tracing::warn;

/// Parse the model's completion into a [`TraceabilityReport`]
///
/// The completion must contain a single JSON object with exactly the three
/// report sections. Markdown fences and prose around the object are
/// tolerated, including prose that itself contains braces; any deviation
/// from the schema is a `ResponseSchema` error. Violations of the
/// cross-section invariants are logged but do not fail the mapping.
pub fn map_to_report(completion_text: &str) -> Result<TraceabilityReport, AnalysisError> {
    let report = find_report(completion_text)?;

    for issue in report.consistency_issues() {
        warn!("Inconsistent traceability report: {}", issue);
    }

    Ok(report)
}

/// Locate the report object inside a completion
///
/// Fenced code blocks are tried first, then every `{` in order. The first
/// candidate that deserializes completely wins; when none does, the error
/// from the earliest candidate is reported.
fn find_report(response: &str) -> Result<TraceabilityReport, AnalysisError> {
    if response.trim().is_empty() {
        return Err(AnalysisError::ResponseSchema("Empty completion".to_string()));
    }

    let mut first_error: Option<serde_json::Error> = None;

    for block in fenced_blocks(response) {
        match serde_json::from_str::<TraceabilityReport>(block) {
            Ok(report) => return Ok(report),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    for (start, _) in response.match_indices('{') {
        let mut stream = serde_json::Deserializer::from_str(&response[start..])
            .into_iter::<TraceabilityReport>();
        match stream.next() {
            Some(Ok(report)) => return Ok(report),
            Some(Err(e)) => {
                first_error.get_or_insert(e);
            }
            None => {}
        }
    }

    Err(AnalysisError::ResponseSchema(match first_error {
        Some(e) => e.to_string(),
        None => "Completion contains no JSON object".to_string(),
    }))
}

/// Bodies of the closed markdown code fences in a response, info string removed
fn fenced_blocks(response: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = response;

    while let Some(open) = rest.find("```") {
        let after_open = &rest[open + 3..];
        let Some(newline) = after_open.find('\n') else {
            break;
        };
        let body = &after_open[newline + 1..];
        let Some(close) = body.find("```") else {
            break;
        };
        blocks.push(body[..close].trim());
        rest = &body[close + 3..];
    }

    blocks
}
