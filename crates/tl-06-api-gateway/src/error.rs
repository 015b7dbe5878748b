//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tl_05_ledger_service::LedgerError;
use tracing::{error, warn};

/// Plain-text body returned for unparseable requests.
pub const MALFORMED_BODY: &str = "Request body should be properly formatted JSON";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request body should be properly formatted JSON")]
    MalformedBody(#[source] serde_json::Error),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::Ledger(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Ledger(e) if e.is_integrity() => {
                error!("[tl-06] integrity violation served as {}: {}", status, e)
            }
            Self::Ledger(e) if status.is_server_error() => {
                warn!("[tl-06] request failed: {}", e)
            }
            _ => {}
        }
        (status, self.to_string()).into_response()
    }
}
