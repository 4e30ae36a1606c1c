use actix_web::{HttpResponse, Responder, get, post, web};
use log::warn;

use super::models::{AppState, BusyResponse, CancelResponse, ErrorResponse, StartResponse};
use crate::error::SessionError;

fn busy(err: SessionError) -> HttpResponse {
    let SessionError::Busy(state) = err;
    HttpResponse::Conflict().json(BusyResponse {
        error: err.to_string(),
        state,
    })
}

/// Latest mining status.
#[get("/mining/status/")]
pub async fn get_status(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.session.status())
}

/// Run one mining cycle and answer with its report.
/// The cycle runs on its own task, so a client hanging up does not abort it.
#[post("/mining/cycle/")]
pub async fn run_cycle(state: web::Data<AppState>) -> impl Responder {
    let handle = match state.session.spawn_mining_cycle() {
        Ok(handle) => handle,
        Err(e) => return busy(e),
    };
    match handle.await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => {
            warn!("mining cycle task failed: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: e.to_string(),
            })
        }
    }
}

/// Start a cycle in the background.
#[post("/mining/start/")]
pub async fn start_cycle(state: web::Data<AppState>) -> impl Responder {
    match state.session.spawn_mining_cycle() {
        Ok(_) => HttpResponse::Accepted().json(StartResponse {
            started: true,
            state: state.session.state(),
        }),
        Err(e) => busy(e),
    }
}

#[post("/mining/cancel/")]
pub async fn cancel_cycle(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(CancelResponse {
        cancelled: state.session.cancel(),
    })
}
