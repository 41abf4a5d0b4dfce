//! HTTP surface for the solver.
//!
//! A single endpoint is exposed:
//!
//! - `POST /api/` – multipart form with a required `question` text field and an optional `file`
//!   upload. Responds with `{ "answer": "..." }`.
//!
//! CORS is fully permissive. Failures are reported as `{ "error": "..." }` with `422` for an
//! invalid form, `400` for an unreadable upload, `502` when the completion service fails, and
//! `500` otherwise.

use crate::service::{SolveError, SolverApi, Upload};
use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::Instrument;
use uuid::Uuid;

/// Largest request body accepted by `POST /api/`.
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Build the HTTP router exposing the question endpoint.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: SolverApi + 'static,
{
    Router::new()
        .route("/api/", post(solve_question::<S>))
        .route("/api", post(solve_question::<S>))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(service)
}

/// Problems with the submitted form itself.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The body was not a readable multipart form.
    #[error("invalid multipart body: {0}")]
    Rejected(#[from] MultipartRejection),
    /// A multipart field could not be read.
    #[error("invalid multipart field: {0}")]
    Field(#[from] MultipartError),
    /// The required `question` field was absent.
    #[error("missing required field `question`")]
    MissingQuestion,
}

/// Success response for `POST /api/`.
#[derive(Debug, Serialize)]
struct AnswerResponse {
    answer: String,
}

/// Form fields decoded from the multipart body.
struct QuestionForm {
    question: String,
    upload: Option<Upload>,
}

async fn read_form(mut multipart: Multipart) -> Result<QuestionForm, ValidationError> {
    let mut question = None;
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("question") => question = Some(field.text().await?),
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // browsers send an empty, nameless part when no file was chosen
                if !file_name.is_empty() {
                    upload = Some(Upload::new(file_name, bytes.to_vec()));
                }
            }
            other => tracing::debug!(field = ?other, "Ignoring unexpected form field"),
        }
    }

    Ok(QuestionForm {
        question: question.ok_or(ValidationError::MissingQuestion)?,
        upload,
    })
}

/// Answer a question, optionally grounded in an uploaded file.
async fn solve_question<S>(
    State(service): State<Arc<S>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnswerResponse>, AppError>
where
    S: SolverApi,
{
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("solve", %request_id);

    async move {
        let form = read_form(multipart?).await?;
        tracing::info!(
            question_chars = form.question.len(),
            file_name = form.upload.as_ref().map(|upload| upload.file_name.as_str()),
            "Question received"
        );
        let answer = service.solve(&form.question, form.upload).await?;
        Ok::<_, AppError>(Json(AnswerResponse { answer }))
    }
    .instrument(span)
    .await
}

#[derive(Debug)]
enum AppError {
    Validation(ValidationError),
    Solve(SolveError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Solve(SolveError::Parse(_)) => StatusCode::BAD_REQUEST,
            Self::Solve(SolveError::Oracle(_)) => StatusCode::BAD_GATEWAY,
            Self::Solve(SolveError::Staging(_) | SolveError::Task(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Validation(error) => error.to_string(),
            Self::Solve(error) => error.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.message(), "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self.message(), "Request rejected");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(inner: ValidationError) -> Self {
        Self::Validation(inner)
    }
}

impl From<MultipartRejection> for AppError {
    fn from(inner: MultipartRejection) -> Self {
        Self::Validation(inner.into())
    }
}

impl From<SolveError> for AppError {
    fn from(inner: SolveError) -> Self {
        Self::Solve(inner)
    }
}
