use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use holders_ledger::LedgerError;
use holders_replication::ReplicationError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("replication error: {0}")]
    Replication(#[from] ReplicationError),

    #[error("store error: {0}")]
    Store(#[from] holders_store::StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Replication(ReplicationError::Ledger(err)) => match err {
                LedgerError::UnknownOrganization(_)
                | LedgerError::UnknownPerson(_)
                | LedgerError::ShareNotFound(_) => StatusCode::NOT_FOUND,
                LedgerError::InvalidShare(_)
                | LedgerError::DuplicateOrganization(_)
                | LedgerError::NegativeAmount(_)
                | LedgerError::AmountOverflow(_)
                | LedgerError::EmptyName => StatusCode::BAD_REQUEST,
            },
            Self::Replication(ReplicationError::AmountOverflow(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(status: StatusCode) -> &'static str {
        match status {
            StatusCode::BAD_REQUEST => "BAD_REQUEST",
            StatusCode::NOT_FOUND => "NOT_FOUND",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let body = Json(json!({
            "error": Self::code(status),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holders_types::{OrgNr, ShareId, TypeError};

    #[test]
    fn ledger_errors_map_to_client_statuses() {
        let missing: ServerError =
            ReplicationError::from(LedgerError::UnknownOrganization(OrgNr::new(1))).into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let invalid: ServerError =
            ReplicationError::from(LedgerError::InvalidShare(TypeError::BothOwners)).into();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let overflow: ServerError =
            ReplicationError::from(LedgerError::AmountOverflow(OrgNr::new(1))).into();
        assert_eq!(overflow.status(), StatusCode::BAD_REQUEST);
        let overflow: ServerError = ReplicationError::AmountOverflow(OrgNr::new(1)).into();
        assert_eq!(overflow.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn replication_failures_are_internal() {
        let err: ServerError = ReplicationError::ShareNotFound(ShareId::new(3)).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_carries_the_status() {
        let response = ServerError::NotFound("organization 9".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
