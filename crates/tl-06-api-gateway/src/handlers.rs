//! Route handlers

use crate::error::ApiError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ledger_types::{ProposedTransaction, TxPosition};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use tl_05_ledger_service::LedgerApi;

/// Application state shared across handlers
pub(crate) type AppState = Arc<dyn LedgerApi>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBlockRequest {
    pub block_num: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResponse {
    pub block_num: u64,
    pub hash: String,
    pub consistent: bool,
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(ApiError::MalformedBody)
}

fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

pub(crate) async fn propose_transaction(
    State(ledger): State<AppState>,
    body: String,
) -> Result<Response, ApiError> {
    let proposed: ProposedTransaction = parse(&body)?;
    let position = ledger.propose_transaction(proposed).await?;
    Ok((StatusCode::ACCEPTED, Json(position)).into_response())
}

pub(crate) async fn get_transaction(
    State(ledger): State<AppState>,
    body: String,
) -> Result<Response, ApiError> {
    let position: TxPosition = parse(&body)?;
    Ok(match ledger.get_transaction(position).await? {
        Some(tx) => Json(tx).into_response(),
        None => no_content(),
    })
}

pub(crate) async fn get_block(
    State(ledger): State<AppState>,
    body: String,
) -> Result<Response, ApiError> {
    let request: GetBlockRequest = parse(&body)?;
    Ok(match ledger.get_block(request.block_num).await? {
        Some(block) => Json(block.as_ref()).into_response(),
        None => no_content(),
    })
}

pub(crate) async fn audit_block(
    State(ledger): State<AppState>,
    body: String,
) -> Result<Response, ApiError> {
    let request: GetBlockRequest = parse(&body)?;
    Ok(match ledger.audit_block(request.block_num).await? {
        Some(block) => Json(AuditResponse {
            block_num: block.block_num(),
            hash: block.hash().to_string(),
            consistent: true,
        })
        .into_response(),
        None => no_content(),
    })
}

pub(crate) async fn status(State(ledger): State<AppState>) -> Result<Response, ApiError> {
    Ok(Json(ledger.status().await?).into_response())
}

pub(crate) async fn hello_world() -> &'static str {
    "Hello world!\n"
}
