use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use holders_replication::Dispatch;
use holders_store::{DocumentFilter, OrganizationSnapshot, OrganizationSummary, OwnersView};
use holders_types::{NewPerson, NewShare, OrgNr, Organization, Person, ShareId};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

/// A committed share as returned by the write endpoint: the request shape
/// plus the assigned id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareResponse {
    pub id: ShareId,
    #[serde(flatten)]
    pub share: NewShare,
}

fn payload<T>(body: Result<Json<T>, JsonRejection>) -> ServerResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ServerError::BadRequest(rejection.body_text()))
}

fn orgnr(path: Result<Path<OrgNr>, PathRejection>) -> ServerResult<OrgNr> {
    path.map(|Path(orgnr)| orgnr)
        .map_err(|rejection| ServerError::BadRequest(rejection.body_text()))
}

fn document(state: &AppState, orgnr: OrgNr) -> ServerResult<OrganizationSnapshot> {
    state
        .store
        .find_one(orgnr)?
        .ok_or_else(|| ServerError::NotFound(format!("no document for organization {orgnr}")))
}

/// Health check handler.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

pub async fn create_organization(
    State(state): State<AppState>,
    body: Result<Json<Organization>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<Organization>)> {
    let organization = state.service.create_organization(&payload(body)?)?;
    Ok((StatusCode::CREATED, Json(organization)))
}

pub async fn create_person(
    State(state): State<AppState>,
    body: Result<Json<NewPerson>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<Person>)> {
    let person = state.service.create_person(&payload(body)?)?;
    Ok((StatusCode::CREATED, Json(person)))
}

/// Commit a share. In synchronous mode the response is sent only after the
/// read model has been updated.
pub async fn create_share(
    State(state): State<AppState>,
    body: Result<Json<NewShare>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<ShareResponse>)> {
    let commit = state.service.create_share(&payload(body)?).await?;
    match &commit.dispatch {
        Dispatch::Replicated(outcome) => {
            debug!(share_id = %commit.share.id, version = outcome.version, "replicated inline")
        }
        Dispatch::Published { exchange, queues } => {
            debug!(share_id = %commit.share.id, exchange = %exchange, queues, "queued for replication")
        }
    }
    let response = ShareResponse {
        id: commit.share.id,
        share: NewShare::from(&commit.share),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Owner sequences of one organization.
pub async fn owners(
    State(state): State<AppState>,
    path: Result<Path<OrgNr>, PathRejection>,
) -> ServerResult<Json<OwnersView>> {
    let doc = document(&state, orgnr(path)?)?;
    Ok(Json(doc.owners()))
}

/// Documents of every organization the given one holds shares in.
pub async fn holding(
    State(state): State<AppState>,
    path: Result<Path<OrgNr>, PathRejection>,
) -> ServerResult<Json<Vec<OrganizationSnapshot>>> {
    let orgnr = orgnr(path)?;
    let held = state.store.find_many(&DocumentFilter::HeldBy(orgnr))?;
    if held.is_empty() {
        return Err(ServerError::NotFound(format!(
            "organization {orgnr} holds no shares"
        )));
    }
    Ok(Json(held))
}

pub async fn summary(
    State(state): State<AppState>,
    path: Result<Path<OrgNr>, PathRejection>,
) -> ServerResult<Json<OrganizationSummary>> {
    let doc = document(&state, orgnr(path)?)?;
    Ok(Json(doc.summary()))
}
