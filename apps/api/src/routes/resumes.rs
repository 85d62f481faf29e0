use axum::{
    extract::{Multipart, State},
    http::{header, HeaderName},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::compose::{compose_pdf, resume_filename, RenderedResume, PDF_CONTENT_TYPE};
use crate::errors::AppError;
use crate::extract::extract_resume_text;
use crate::optimizer::{OptimizationRequest, OptimizedText};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub result: String,
    pub ats_score: Option<String>,
    pub model: String,
    pub attempts: u32,
}

impl From<OptimizedText> for OptimizeResponse {
    fn from(optimized: OptimizedText) -> Self {
        Self {
            result: optimized.text,
            ats_score: optimized.ats_score,
            model: optimized.model_id,
            attempts: optimized.attempts,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub text: String,
    #[serde(default)]
    pub ats_score: Option<String>,
}

/// POST /api/v1/resumes/optimize
pub async fn handle_optimize(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<OptimizeResponse>, AppError> {
    let request = read_upload(multipart).await?;
    let optimized = state.orchestrator.optimize(&request).await?;
    Ok(Json(optimized.into()))
}

/// POST /api/v1/resumes/render
pub async fn handle_render(
    State(state): State<AppState>,
    Json(req): Json<RenderRequest>,
) -> Result<Response, AppError> {
    let rendered = render_blocking(&state, req.text, req.ats_score).await?;
    Ok(pdf_response(rendered))
}

/// POST /api/v1/resumes/generate
/// Optimize, then compose the result into a PDF.
pub async fn handle_generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let request = read_upload(multipart).await?;
    let optimized = state.orchestrator.optimize(&request).await?;
    info!(
        model = %optimized.model_id,
        attempts = optimized.attempts,
        "Optimized résumé, composing PDF"
    );
    let rendered = render_blocking(&state, optimized.text, optimized.ats_score).await?;
    Ok(pdf_response(rendered))
}

/// Layout and PDF serialization are CPU-bound; keep them off the async executor.
async fn render_blocking(
    state: &AppState,
    text: String,
    ats_score: Option<String>,
) -> Result<RenderedResume, AppError> {
    let layout = state.layout.clone();
    let rendered =
        tokio::task::spawn_blocking(move || compose_pdf(&text, ats_score.as_deref(), &layout))
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("spawn_blocking failed in render: {e}"))
            })??;
    info!(
        pages = rendered.pages,
        degraded = rendered.degraded,
        bytes = rendered.pdf.len(),
        "Rendered résumé PDF"
    );
    Ok(rendered)
}

/// Tells the client whether the structured layout or the plain fallback was used.
pub const LAYOUT_HEADER: &str = "x-resume-layout";

fn pdf_response(rendered: RenderedResume) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", resume_filename(Utc::now()));
    let layout = if rendered.degraded { "plain" } else { "structured" };
    (
        [
            (header::CONTENT_TYPE, PDF_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (HeaderName::from_static(LAYOUT_HEADER), layout.to_string()),
        ],
        Bytes::from(rendered.pdf),
    )
        .into_response()
}

/// Reads `resume` (PDF file) or `resume_text`, plus `job_description`.
/// A non-empty PDF upload wins over `resume_text`. Unknown fields are ignored.
async fn read_upload(mut multipart: Multipart) -> Result<OptimizationRequest, AppError> {
    let mut resume_pdf: Option<Bytes> = None;
    let mut resume_text = String::new();
    let mut job_description = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let read_err = |e: axum::extract::multipart::MultipartError| {
            AppError::Validation(format!("Could not read field '{name}': {e}"))
        };
        match name.as_str() {
            "resume" => resume_pdf = Some(field.bytes().await.map_err(read_err)?),
            "resume_text" => resume_text = field.text().await.map_err(read_err)?,
            "job_description" => job_description = field.text().await.map_err(read_err)?,
            _ => {}
        }
    }

    if let Some(pdf) = resume_pdf.filter(|b| !b.is_empty()) {
        resume_text = extract_resume_text(pdf).await?;
    }

    Ok(OptimizationRequest::new(resume_text, job_description))
}
