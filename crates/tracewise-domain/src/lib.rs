//! TraceWise Domain Layer
//!
//! Core data model for the traceability relay. This crate performs no I/O;
//! it defines the values that flow through one analysis request and the
//! trait seam behind which the completion service lives.
//!
//! ## Key Concepts
//!
//! - **Artifact**: one of the three uploads (requirements document, code file, test-case file)
//! - **Normalized inputs**: the artifacts decoded into text and structured data
//! - **Prompt payload**: the system instruction and user message sent to the model
//! - **Traceability report**: requirement → test case → code region links, verdicts and fixes
//!
//! ## Lifecycle
//!
//! Every value here is created, used and dropped within a single request.
//! Nothing is shared across requests.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod report;
pub mod request;
pub mod traits;

// Re-exports for convenience
pub use report::{ConsistencyIssue, Recommendation, TraceabilityReport, Verdict};
pub use request::{AnalysisRequest, NormalizedInputs, PromptPayload};
pub use traits::CompletionProvider;
