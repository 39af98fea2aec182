//! Axum route handlers for the analysis API.
//!
//! Input validation happens here, before the pipeline is ever invoked:
//! unsupported file types and an empty job description are client errors,
//! not pipeline failures. Results and rendered reports are persisted to the
//! cache under the analysis id at request completion.

use axum::{
    extract::{Multipart, Path, State},
    response::Html,
    Json,
};
use bytes::Bytes;
use std::time::Duration;
use uuid::Uuid;

use crate::cache::{report_key, result_key};
use crate::errors::AppError;
use crate::extract::is_supported;
use crate::pipeline::orchestrator;
use crate::pipeline::state::{AnalysisInput, AnalysisResponse, AnalysisState};
use crate::state::AppState;

/// POST /api/v1/analyze
///
/// Multipart form: `resume` (PDF/DOCX file), `job_description` (text), and
/// optional `job_url` / `company_name`. Returns the merged public state.
pub async fn handle_analyze(
    State(app): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let input = read_analyze_form(multipart).await?;

    let state = orchestrator::run(&app.deps, AnalysisState::new(input)).await;

    if let Some(error) = &state.error {
        return Err(AppError::Analysis(error.clone()));
    }

    let response = state.to_response();
    let ttl = Duration::from_secs(app.config.result_ttl_secs);

    app.deps
        .cache
        .set_json(&result_key(state.id), &response, ttl)
        .await;
    if let Some(html) = &state.html_report {
        app.deps
            .cache
            .set_json(&report_key(state.id, "html"), html, ttl)
            .await;
    }
    if let Some(text) = &state.text_report {
        app.deps
            .cache
            .set_json(&report_key(state.id, "text"), text, ttl)
            .await;
    }

    Ok(Json(response))
}

/// GET /api/v1/analyses/:id
///
/// Re-fetches a previously completed analysis from the results cache.
pub async fn handle_get_analysis(
    State(app): State<AppState>,
    Path(analysis_id): Path<Uuid>,
) -> Result<Json<AnalysisResponse>, AppError> {
    app.deps
        .cache
        .get_json::<AnalysisResponse>(&result_key(analysis_id))
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Analysis {analysis_id} not found or expired")))
}

/// GET /api/v1/reports/:id
///
/// Plain-text report for an analysis.
pub async fn handle_get_report_text(
    State(app): State<AppState>,
    Path(analysis_id): Path<Uuid>,
) -> Result<String, AppError> {
    app.deps
        .cache
        .get_json::<String>(&report_key(analysis_id, "text"))
        .await
        .ok_or_else(|| AppError::NotFound(format!("Report for {analysis_id} not found or expired")))
}

/// GET /api/v1/reports/:id/html
///
/// HTML report for an analysis.
pub async fn handle_get_report_html(
    State(app): State<AppState>,
    Path(analysis_id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    app.deps
        .cache
        .get_json::<String>(&report_key(analysis_id, "html"))
        .await
        .map(Html)
        .ok_or_else(|| AppError::NotFound(format!("Report for {analysis_id} not found or expired")))
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart parsing + validation
// ────────────────────────────────────────────────────────────────────────────

async fn read_analyze_form(mut multipart: Multipart) -> Result<AnalysisInput, AppError> {
    let mut resume: Option<(Bytes, String)> = None;
    let mut job_description = String::new();
    let mut job_url: Option<String> = None;
    let mut company_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let filename = field.file_name().unwrap_or("resume").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read resume upload: {e}")))?;
                resume = Some((data, filename));
            }
            "job_description" => {
                job_description = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read job_description: {e}")))?;
            }
            "job_url" => {
                job_url = Some(field.text().await.unwrap_or_default());
            }
            "company_name" => {
                company_name = Some(field.text().await.unwrap_or_default());
            }
            _ => {} // unknown fields are ignored
        }
    }

    let (resume_file, resume_filename) = resume
        .ok_or_else(|| AppError::Validation("A resume file is required".to_string()))?;

    if !is_supported(&resume_filename) {
        return Err(AppError::UnsupportedFormat(format!(
            "'{resume_filename}' — only PDF and DOCX are accepted"
        )));
    }
    if resume_file.is_empty() {
        return Err(AppError::Validation("Resume file is empty".to_string()));
    }
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "A job description is required".to_string(),
        ));
    }

    Ok(AnalysisInput {
        resume_file,
        resume_filename,
        job_description,
        job_url: job_url.filter(|v| !v.trim().is_empty()),
        company_name: company_name.filter(|v| !v.trim().is_empty()),
    })
}
