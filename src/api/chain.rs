use actix_web::{HttpResponse, Responder, get, post, web};

use super::models::{AppState, ChainResponse};

/// Local chain snapshot, as last synced.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let snapshot = state.session.chain().current();
    HttpResponse::Ok().json(ChainResponse {
        length: snapshot.len(),
        chain: snapshot.blocks(),
    })
}

/// Refresh the snapshot from the ledger. Never fails: a ledger outage
/// answers with the previous snapshot.
#[post("/chain/sync/")]
pub async fn sync_chain(state: web::Data<AppState>) -> impl Responder {
    let snapshot = state.session.chain().fetch_snapshot().await;
    HttpResponse::Ok().json(ChainResponse {
        length: snapshot.len(),
        chain: snapshot.blocks(),
    })
}
