mod chain;
mod health;
mod mining;
pub mod models;
mod tx;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(mining::get_status)
            .service(mining::run_cycle)
            .service(mining::start_cycle)
            .service(mining::cancel_cycle)
            .service(chain::get_chain)
            .service(chain::sync_chain)
            .service(tx::post_transaction)
            .service(tx::get_pending),
    );
}
