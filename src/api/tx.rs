use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, warn};

use super::models::{AppState, ErrorResponse, NewTxRequest, NewTxResponse, PendingResponse};

/// Relay a transaction to the ledger's mempool.
#[post("/transactions/")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> impl Responder {
    let req = body.into_inner();
    if let Err(msg) = req.validate() {
        warn!("POST /transactions/ - rejected: {msg}");
        return HttpResponse::BadRequest().body(msg);
    }

    let tx = req.into_transaction();
    debug!(
        "POST /transactions/ - {} -> {} ({})",
        tx.sender, tx.receiver, tx.amount
    );
    match state.relay.send(&tx).await {
        Ok(message) => HttpResponse::Ok().json(NewTxResponse { message }),
        Err(e) => {
            warn!("POST /transactions/ - ledger failed: {e}");
            HttpResponse::BadGateway().json(ErrorResponse {
                error: e.to_string(),
            })
        }
    }
}

/// Transactions waiting in the ledger's mempool.
#[get("/transactions/pending/")]
pub async fn get_pending(state: web::Data<AppState>) -> impl Responder {
    match state.relay.pending().await {
        Ok(transactions) => HttpResponse::Ok().json(PendingResponse {
            size: transactions.len(),
            transactions,
        }),
        Err(e) => {
            warn!("GET /transactions/pending/ - ledger failed: {e}");
            HttpResponse::BadGateway().json(ErrorResponse {
                error: e.to_string(),
            })
        }
    }
}
