//! HTTP request handlers for the TraceWise service.
//!
//! `POST /trace` runs one analysis per request in three phases:
//! receiving (collect the three uploads), processing (the analyzer
//! pipeline) and responding (report or error body). `GET /` is a liveness
//! probe.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracewise_analyzer::{AnalysisError, Analyzer};
use tracewise_domain::{AnalysisRequest, CompletionProvider, TraceabilityReport};
use tracewise_llm::LlmError;
use tracing::{debug, error, warn};

/// Error body for a request missing any of the three uploads
pub const MISSING_FILES_MESSAGE: &str =
    "Missing one or more required files: requirements, code, test_cases";

/// Body of the liveness route
pub const LIVENESS_MESSAGE: &str = "Extended TraceWise Backend Running";

/// Shared application state
pub struct AppState<P>
where
    P: CompletionProvider<Error = LlmError>,
{
    /// Analysis pipeline, shared by all requests
    pub analyzer: Analyzer<P>,
    /// Largest accepted request body (bytes)
    pub max_upload_bytes: usize,
}

impl<P> Clone for AppState<P>
where
    P: CompletionProvider<Error = LlmError>,
{
    fn clone(&self) -> Self {
        Self {
            analyzer: self.analyzer.clone(),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Upload is missing a file or is not a readable form
    InvalidInput(String),
    /// Upload exceeds the body limit
    PayloadTooLarge(String),
    /// Any failure while processing the artifacts
    Analysis(AnalysisError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidInput(msg) => {
                debug!("Rejected upload: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::PayloadTooLarge(msg) => {
                warn!("Upload too large: {}", msg);
                (StatusCode::PAYLOAD_TOO_LARGE, msg)
            }
            AppError::Analysis(e) => {
                error!("Error during analysis: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<AnalysisError> for AppError {
    fn from(e: AnalysisError) -> Self {
        AppError::Analysis(e)
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(e.body_text())
        } else {
            AppError::InvalidInput(e.body_text())
        }
    }
}

/// Artifacts collected from the multipart form
#[derive(Debug, Default)]
struct TraceUpload {
    requirements: Option<Vec<u8>>,
    code: Option<Vec<u8>>,
    test_cases: Option<Vec<u8>>,
}

impl TraceUpload {
    /// Read every form field, keeping the three known artifacts
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut upload = TraceUpload::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("requirements") => upload.requirements = Some(field.bytes().await?.to_vec()),
                Some("code") => upload.code = Some(field.bytes().await?.to_vec()),
                Some("test_cases") => upload.test_cases = Some(field.bytes().await?.to_vec()),
                other => debug!("Ignoring form field {:?}", other),
            }
        }

        Ok(upload)
    }

    /// All three artifacts, or the input-validation failure
    fn into_request(self) -> Result<AnalysisRequest, AppError> {
        match (self.requirements, self.code, self.test_cases) {
            (Some(requirements), Some(code), Some(test_cases)) => Ok(AnalysisRequest {
                requirements,
                code,
                test_cases,
            }),
            _ => Err(AppError::InvalidInput(MISSING_FILES_MESSAGE.to_string())),
        }
    }
}

/// POST /trace - Analyze requirements, code and test cases
async fn trace<P>(
    State(state): State<AppState<P>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TraceabilityReport>, AppError>
where
    P: CompletionProvider<Error = LlmError> + 'static,
{
    // Receiving: a body that is not a multipart form carries no files
    let multipart = multipart.map_err(|rejection| {
        debug!("Not a multipart request: {}", rejection.body_text());
        AppError::InvalidInput(MISSING_FILES_MESSAGE.to_string())
    })?;
    let request = TraceUpload::from_multipart(multipart).await?.into_request()?;

    // Processing
    let report = state.analyzer.analyze(request).await?;

    // Responding
    Ok(Json(report))
}

/// GET / - Liveness probe
async fn home() -> &'static str {
    LIVENESS_MESSAGE
}

/// Create the axum router with all routes
pub fn create_router<P>(state: AppState<P>) -> AxumRouter
where
    P: CompletionProvider<Error = LlmError> + 'static,
{
    let max_upload_bytes = state.max_upload_bytes;

    AxumRouter::new()
        .route("/", get(home))
        .route("/trace", post(trace::<P>))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt; // for oneshot
    use tracewise_analyzer::AnalyzerConfig;
    use tracewise_llm::MockProvider;

    fn create_test_state(llm: MockProvider) -> AppState<MockProvider> {
        AppState {
            analyzer: Analyzer::new(llm, AnalyzerConfig::default()),
            max_upload_bytes: 1024 * 1024,
        }
    }

    #[tokio::test]
    async fn test_home() {
        let app = create_router(create_test_state(MockProvider::default()));

        let request = Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], LIVENESS_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_trace_without_multipart_body() {
        let llm = MockProvider::default();
        let app = create_router(create_test_state(llm.clone()));

        let request = Request::builder()
            .method("POST")
            .uri("/trace")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, MISSING_FILES_MESSAGE);
        assert_eq!(llm.call_count(), 0);
    }

    #[test]
    fn test_upload_requires_all_three_files() {
        let upload = TraceUpload {
            requirements: Some(vec![1]),
            code: None,
            test_cases: Some(vec![2]),
        };
        match upload.into_request() {
            Err(AppError::InvalidInput(msg)) => assert_eq!(msg, MISSING_FILES_MESSAGE),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_analysis_error_is_500() {
        let response =
            AppError::Analysis(AnalysisError::ResponseSchema("bad".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
