//! Job posting handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use tracing::info;

use careers_models::{InsertAck, JobPosting};

use crate::authz::EmailQuery;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

/// `GET /careers`, optionally only postings whose `hr_email` equals `email`.
pub async fn list_careers(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> ApiResult<Json<Vec<JobPosting>>> {
    let postings = state.store.list_job_postings(query.email.as_deref()).await?;
    Ok(Json(postings))
}

/// `GET /careers/{id}`; an unknown id yields `null`.
pub async fn get_career(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Option<JobPosting>>> {
    let posting = state.store.get_job_posting(&id).await?;
    Ok(Json(posting))
}

/// `POST /careers`
pub async fn create_career(
    State(state): State<AppState>,
    ApiJson(posting): ApiJson<JobPosting>,
) -> ApiResult<Json<InsertAck>> {
    let ack = state.store.create_job_posting(posting).await?;
    info!(id = %ack.inserted_id, "Job posting created");
    Ok(Json(ack))
}
