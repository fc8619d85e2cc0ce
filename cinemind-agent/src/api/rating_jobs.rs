//! Rating job API handlers
//!
//! POST /api/jobs, GET /api/jobs/:job_id, GET /api/jobs/:job_id/result

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use cinemind_common::text::format_review;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{JobState, JobStatus, ReviewRequest},
    AppState,
};

/// POST /api/jobs response
#[derive(Debug, Serialize)]
pub struct SubmitJobResponse {
    pub job_id: Uuid,
    pub state: &'static str,
    pub submitted_at: DateTime<Utc>,
}

/// GET /api/jobs/:job_id/result query
#[derive(Debug, Default, Deserialize)]
pub struct ResultQuery {
    /// "json" (default) or "markdown"
    #[serde(default)]
    pub format: Option<String>,
}

/// POST /api/jobs
///
/// Queue a review generation job. Returns 202 Accepted with the job ID; the
/// pipeline runs in a background task.
pub async fn submit_job(
    State(state): State<AppState>,
    Json(request): Json<ReviewRequest>,
) -> ApiResult<(StatusCode, Json<SubmitJobResponse>)> {
    let agent = state.require_agent()?;
    request.validate()?;

    let status = state.jobs.submit(request.clone()).await;
    let job_id = status.job_id;
    let handle = state.jobs.handle(job_id);

    let state_clone = state.clone();
    tokio::spawn(async move {
        tracing::info!(job_id = %job_id, "Background rating task started");

        agent.run_job(request, handle).await;

        if let Some(JobStatus { error: Some(error), .. }) = state_clone.jobs.status(job_id).await {
            state_clone.record_error(error).await;
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitJobResponse {
            job_id,
            state: status.state,
            submitted_at: status.submitted_at,
        }),
    ))
}

/// GET /api/jobs/:job_id
///
/// Poll job progress.
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> ApiResult<Json<JobStatus>> {
    let status = state
        .jobs
        .status(job_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Job not found: {}", job_id)))?;

    tracing::debug!(job_id = %job_id, state = status.state, percent = status.percent, "Status query");
    Ok(Json(status))
}

/// GET /api/jobs/:job_id/result
///
/// Completed review as JSON, or markdown with `?format=markdown`. 409 while
/// the job is still running, 502 when it failed.
pub async fn get_job_result(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(query): Query<ResultQuery>,
) -> ApiResult<Response> {
    let job = state
        .jobs
        .snapshot(job_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Job not found: {}", job_id)))?;

    match job.state {
        JobState::Completed { result } => match query.format.as_deref() {
            None | Some("json") => Ok(Json(*result).into_response()),
            Some("markdown") | Some("md") => Ok((
                [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
                format_review(&result.review, &result.title, result.rating),
            )
                .into_response()),
            Some(other) => Err(ApiError::BadRequest(format!("Unknown format: {}", other))),
        },
        JobState::Failed { error } => Err(ApiError::Upstream(error)),
        other => Err(ApiError::Conflict(format!(
            "Job {} is still {}",
            job_id,
            other.name()
        ))),
    }
}

/// Build rating job routes
pub fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/api/jobs", post(submit_job))
        .route("/api/jobs/:job_id", get(get_job_status))
        .route("/api/jobs/:job_id/result", get(get_job_result))
}
