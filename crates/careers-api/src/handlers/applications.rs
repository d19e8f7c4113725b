//! Application handlers.

use axum::extract::{Path, State};
use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use tracing::{info, warn};

use careers_models::{Application, InsertAck, StatusUpdate, UpdateAck};

use crate::authz::ApplicantEmail;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;
use crate::store::ApplicationFilter;

/// Lists the application ids left out of a partial listing.
pub const UNRESOLVED_HEADER: HeaderName = HeaderName::from_static("x-unresolved-applications");

/// `GET /applications?email=`, the caller's own applications with job details.
pub async fn list_applicant_applications(
    State(state): State<AppState>,
    Extension(ApplicantEmail(email)): Extension<ApplicantEmail>,
) -> ApiResult<Response> {
    let applications = state
        .store
        .list_applications(ApplicationFilter::Applicant(&email))
        .await?;
    let aggregated = state.aggregator.enrich(applications).await?;

    let partial = aggregated.is_partial();
    let unresolved = aggregated.unresolved.join(",");
    let mut response = Json(aggregated.applications).into_response();

    if partial {
        match HeaderValue::from_str(&unresolved) {
            Ok(value) => {
                response.headers_mut().insert(UNRESOLVED_HEADER, value);
            }
            Err(e) => warn!("Unresolved application ids do not fit a header: {}", e),
        }
    }

    Ok(response)
}

/// `GET /applications/job/{id}`
pub async fn list_job_applications(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Vec<Application>>> {
    let applications = state.store.list_applications(ApplicationFilter::Job(&job_id)).await?;
    Ok(Json(applications))
}

/// `POST /applications`
pub async fn create_application(
    State(state): State<AppState>,
    ApiJson(application): ApiJson<Application>,
) -> ApiResult<Json<InsertAck>> {
    let ack = state.store.create_application(application).await?;
    info!(id = %ack.inserted_id, "Application submitted");
    Ok(Json(ack))
}

/// `PATCH /application/{id}`; only `status` is applied.
pub async fn update_application_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> ApiResult<Json<UpdateAck>> {
    let ack = state.store.update_application_status(&id, update.status).await?;
    Ok(Json(ack))
}
