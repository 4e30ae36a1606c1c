use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::{error, info};
use std::io;
use std::sync::Arc;

use ledger_miner::api::{self, AppState};
use ledger_miner::{LedgerClient, MinerConfig, MiningSession, TransactionRelay};

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = MinerConfig::from_env().map_err(|e| {
        error!("configuration: {e}");
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let client =
        LedgerClient::new(&config.ledger_url, config.http_timeout).map_err(io::Error::other)?;
    let session = Arc::new(MiningSession::with_client(client.clone(), &config));

    // initial view of the chain; an unreachable ledger just leaves it empty
    let snapshot = session.chain().fetch_snapshot().await;
    info!(
        "ledger {} has {} blocks, {} mined by {}",
        config.ledger_url,
        snapshot.len(),
        snapshot.blocks_mined_by(&config.miner_address),
        config.miner_address
    );

    println!(
        "⛏️ Miner control API at http://{}:{}/api/v1 (ledger {})",
        config.host, config.port, config.ledger_url
    );

    let state = web::Data::new(AppState {
        session,
        relay: TransactionRelay::new(client),
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
