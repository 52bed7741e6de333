//! TraceWise Analyzer
//!
//! Turns a requirements document, a source file and a set of test cases into
//! a traceability report, using an LLM for the analysis itself.
//!
//! # Architecture
//!
//! ```text
//! Artifacts → Input Extractors → Prompt Composer → LLM → Response Mapper → Report
//! ```
//!
//! # Key Features
//!
//! - **Input Extraction**: PDF text layer, UTF-8 source, JSON test cases
//! - **Prompt Composition**: Fixed, versioned reviewer instruction plus the artifacts
//! - **Schema Validation**: The model's reply is parsed strictly, never trusted
//! - **Bounded Calls**: Prompt size limit and an overall completion timeout
//!
//! # Example Usage
//!
//! ```no_run
//! use tracewise_analyzer::{Analyzer, AnalyzerConfig};
//! use tracewise_domain::AnalysisRequest;
//! use tracewise_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(
//!     r#"{"test_case_analysis": {}, "code_traceability": {}, "recommendations": {}}"#,
//! );
//! let analyzer = Analyzer::new(llm, AnalyzerConfig::default());
//!
//! let requirements = std::fs::read("requirements.pdf")?;
//! let request = AnalysisRequest::new(requirements, "function addNote() {}", "[]");
//!
//! let report = analyzer.analyze(request).await?;
//! println!("Analyzed {} test cases", report.test_case_analysis.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod analyzer;
mod config;
mod error;
pub mod input;
pub mod parser;
pub mod prompt;


pub use analyzer::Analyzer;
pub use config::AnalyzerConfig;
pub use error::AnalysisError;
pub use parser::map_to_report;
pub use prompt::{compose, SYSTEM_INSTRUCTION_VERSION};
