//! Core Analyzer implementation

use crate::config::AnalyzerConfig;
use crate::error::AnalysisError;
use crate::input::normalize;
use crate::parser::map_to_report;
use crate::prompt::compose;
use std::sync::Arc;
use tokio::time::timeout;
use tracewise_domain::{AnalysisRequest, CompletionProvider, TraceabilityReport};
use tracewise_llm::LlmError;
use tracing::{debug, info};

/// The Analyzer turns three artifacts into a traceability report
///
/// Holds no per-request state: one instance serves all requests
/// concurrently, and nothing is locked while the completion is in flight.
pub struct Analyzer<P>
where
    P: CompletionProvider<Error = LlmError>,
{
    provider: Arc<P>,
    config: AnalyzerConfig,
}

impl<P> Clone for Analyzer<P>
where
    P: CompletionProvider<Error = LlmError>,
{
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            config: self.config.clone(),
        }
    }
}

impl<P> Analyzer<P>
where
    P: CompletionProvider<Error = LlmError>,
{
    /// Create a new Analyzer
    pub fn new(provider: P, config: AnalyzerConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            config,
        }
    }

    /// Run extraction, composition, completion and mapping for one request
    pub async fn analyze(
        &self,
        request: AnalysisRequest,
    ) -> Result<TraceabilityReport, AnalysisError> {
        info!(
            "Starting analysis: requirements {} bytes, code {} bytes, test cases {} bytes",
            request.requirements.len(),
            request.code.len(),
            request.test_cases.len()
        );

        let normalized = normalize(&request)?;

        let payload = compose(&normalized);
        let prompt_chars = payload.char_count();
        debug!("Prompt length: {} chars", prompt_chars);

        if prompt_chars > self.config.max_prompt_chars {
            return Err(AnalysisError::InputTooLarge(
                prompt_chars,
                self.config.max_prompt_chars,
            ));
        }

        // Call LLM with timeout
        let completion = timeout(
            self.config.completion_timeout(),
            self.provider.complete(&payload),
        )
        .await
        .map_err(|_| AnalysisError::UpstreamTimeout(self.config.completion_timeout_secs))??;

        debug!("LLM response length: {} chars", completion.len());

        let report = map_to_report(&completion)?;

        info!(
            "Analysis complete: {} test cases, {} requirements traced, {} recommendations",
            report.test_case_analysis.len(),
            report.code_traceability.len(),
            report.recommendations.len()
        );

        Ok(report)
    }
}
