use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use txpeek_core::session::{Dispatched, RequestToken, SessionEvent, SessionView};
use txpeek_core::{LookupError, TransactionRecord};

use super::error::{lookup_error_status, AppError};
use super::SharedState;

// ==============================================================================
// DTOs
// ==============================================================================

#[derive(Deserialize)]
pub(super) struct LookupRequest {
    txid: String,
}

/// The outcome of this request's own lookup. `superseded` is set when a
/// newer lookup was submitted meanwhile, in which case the session view
/// shows that newer lookup instead.
#[derive(Serialize)]
pub(super) struct LookupResponse {
    token: RequestToken,
    txid: String,
    compare_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<TransactionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    superseded: bool,
}

// ==============================================================================
// Handlers
// ==============================================================================

pub(super) async fn post_lookup(
    State(state): State<SharedState>,
    Json(request): Json<LookupRequest>,
) -> Result<(StatusCode, Json<LookupResponse>), AppError> {
    let dispatched = state
        .session
        .write()
        .await
        .dispatch(SessionEvent::Submit(request.txid));
    let ticket = match dispatched {
        Dispatched::Fetch(ticket) => ticket,
        Dispatched::Rejected(err) => return Err(AppError::BadRequest(err.to_string())),
        Dispatched::Applied | Dispatched::Stale => {
            return Err(AppError::Internal(
                "session did not issue a lookup ticket".to_string(),
            ))
        }
    };

    // The session lock is not held while the explorer is queried.
    let outcome = state.service.lookup(&ticket.txid).await;

    let (status, record, error) = match &outcome {
        Ok(record) => (StatusCode::OK, Some(record.clone()), None),
        Err(err) => {
            let record = match err {
                LookupError::RemoteNotFound { record } => Some(record.as_ref().clone()),
                _ => None,
            };
            (lookup_error_status(err), record, Some(err.to_string()))
        }
    };

    let applied = state.session.write().await.dispatch(SessionEvent::Resolve {
        token: ticket.token,
        outcome,
    });

    Ok((
        status,
        Json(LookupResponse {
            token: ticket.token,
            compare_url: state.endpoint.compare_url(&ticket.txid),
            txid: ticket.txid,
            record,
            error,
            superseded: matches!(applied, Dispatched::Stale),
        }),
    ))
}

pub(super) async fn get_session(State(state): State<SharedState>) -> Json<SessionView> {
    Json(state.session.read().await.view(&state.endpoint))
}
