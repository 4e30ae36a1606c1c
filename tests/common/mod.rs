#![allow(dead_code)]

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use serde::Deserialize;
use serde_json::{Number, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ledger_miner::chain::{Block, Transaction};
use ledger_miner::pow::{CancelToken, MiningOutcome, NonceSearcher, meets_target};
use ledger_miner::{LedgerClient, MinerConfig};

pub const MINER: &str = "miner-1";

/// Address nothing listens on.
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

/// In-process stand-in for the ledger service, speaking its HTTP contract.
pub struct MockLedger {
    pub url: String,
    pub state: web::Data<LedgerState>,
    handle: ServerHandle,
}

pub struct LedgerState {
    difficulty: Mutex<u32>,
    chain: Mutex<Vec<Block>>,
    candidate: Mutex<Option<Block>>,
    mempool: Mutex<Vec<Transaction>>,
    forced_submit_status: Mutex<Option<u16>>,
    raw_chain_body: Mutex<Option<String>>,
    raw_job_body: Mutex<Option<String>>,
    job_requests: AtomicUsize,
    submissions: AtomicUsize,
    chain_requests: AtomicUsize,
}

#[derive(Deserialize)]
struct JobBody {
    address: String,
}

#[derive(Deserialize)]
struct SubmitBody {
    nonce: u64,
}

fn now() -> Number {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_secs_f64();
    Number::from_f64(secs).expect("finite")
}

/// Mine `candidate` at difficulty 1.
pub fn seal(candidate: Block) -> Block {
    match NonceSearcher::default().search(&candidate.payload(), 1, u64::MAX, &CancelToken::new()) {
        MiningOutcome::Found { nonce, .. } => candidate.seal(nonce),
        other => panic!("could not seal block: {other:?}"),
    }
}

pub fn genesis() -> Block {
    seal(Block::candidate(
        0,
        now(),
        vec![],
        "0".into(),
        "SISTEMA".into(),
    ))
}

pub fn config_for(url: &str) -> MinerConfig {
    let mut config = MinerConfig::new(url, MINER);
    config.http_timeout = Duration::from_secs(5);
    config
}

pub fn client_for(url: &str) -> LedgerClient {
    LedgerClient::new(url, Duration::from_secs(5)).expect("client")
}

async fn get_chain(state: web::Data<LedgerState>) -> impl Responder {
    state.chain_requests.fetch_add(1, Ordering::SeqCst);
    if let Some(raw) = state.raw_chain_body.lock().expect("mutex").clone() {
        return HttpResponse::Ok()
            .content_type("application/json")
            .body(raw);
    }
    let chain = state.chain.lock().expect("mutex").clone();
    HttpResponse::Ok().json(json!({ "length": chain.len(), "chain": chain }))
}

async fn get_job(state: web::Data<LedgerState>, body: web::Json<JobBody>) -> impl Responder {
    state.job_requests.fetch_add(1, Ordering::SeqCst);
    if let Some(raw) = state.raw_job_body.lock().expect("mutex").clone() {
        return HttpResponse::Ok()
            .content_type("application/json")
            .body(raw);
    }

    let (index, previous_hash) = {
        let chain = state.chain.lock().expect("mutex");
        let tip = chain.last().expect("genesis");
        (chain.len() as u64, tip.hash.clone())
    };
    let mut transactions = state.mempool.lock().expect("mutex").clone();
    transactions.push(Transaction::new("SISTEMA", body.address.clone(), 1u64));

    let candidate = Block::candidate(
        index,
        now(),
        transactions,
        previous_hash,
        body.address.clone(),
    );
    let block_string = candidate.payload();
    *state.candidate.lock().expect("mutex") = Some(candidate);

    let difficulty = *state.difficulty.lock().expect("mutex");
    HttpResponse::Ok().json(json!({ "difficulty": difficulty, "block_string": block_string }))
}

async fn submit_solution(
    state: web::Data<LedgerState>,
    body: web::Json<SubmitBody>,
) -> impl Responder {
    state.submissions.fetch_add(1, Ordering::SeqCst);

    if let Some(code) = *state.forced_submit_status.lock().expect("mutex") {
        let status = actix_web::http::StatusCode::from_u16(code).expect("status");
        return HttpResponse::build(status).json(json!({ "mensaje": "otro minero fue primero" }));
    }

    let Some(candidate) = state.candidate.lock().expect("mutex").take() else {
        return HttpResponse::BadRequest().json(json!({ "mensaje": "No hay trabajo activo" }));
    };

    let difficulty = *state.difficulty.lock().expect("mutex");
    let block = candidate.clone().seal(body.nonce);
    if !meets_target(&block.hash, difficulty) {
        *state.candidate.lock().expect("mutex") = Some(candidate);
        return HttpResponse::BadRequest().json(json!({ "mensaje": "Nonce incorrecto" }));
    }

    let hash = block.hash.clone();
    state.chain.lock().expect("mutex").push(block);
    state.mempool.lock().expect("mutex").clear();
    HttpResponse::Ok().json(json!({ "mensaje": "Bloque validado", "hash": hash }))
}

async fn new_transaction(
    state: web::Data<LedgerState>,
    body: web::Json<Transaction>,
) -> impl Responder {
    let mut mempool = state.mempool.lock().expect("mutex");
    mempool.push(body.into_inner());
    let index = state.chain.lock().expect("mutex").len();
    HttpResponse::Created().json(json!({
        "mensaje": format!("La transacción se añadirá al bloque {index}")
    }))
}

async fn pending(state: web::Data<LedgerState>) -> impl Responder {
    let mempool = state.mempool.lock().expect("mutex").clone();
    HttpResponse::Ok().json(json!({
        "transacciones_pendientes": mempool,
        "cantidad": mempool.len()
    }))
}

impl MockLedger {
    pub async fn start(difficulty: u32) -> Self {
        let state = web::Data::new(LedgerState {
            difficulty: Mutex::new(difficulty),
            chain: Mutex::new(vec![genesis()]),
            candidate: Mutex::new(None),
            mempool: Mutex::new(Vec::new()),
            forced_submit_status: Mutex::new(None),
            raw_chain_body: Mutex::new(None),
            raw_job_body: Mutex::new(None),
            job_requests: AtomicUsize::new(0),
            submissions: AtomicUsize::new(0),
            chain_requests: AtomicUsize::new(0),
        });

        let data = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/chain", web::get().to(get_chain))
                .route("/mine/get-job", web::post().to(get_job))
                .route("/mine/submit-solution", web::post().to(submit_solution))
                .route("/transactions/new", web::post().to(new_transaction))
                .route("/transactions/pending", web::get().to(pending))
        })
        .workers(1)
        .disable_signals()
        .shutdown_timeout(1)
        .bind(("127.0.0.1", 0))
        .expect("bind mock ledger");

        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            url: format!("http://{addr}"),
            state,
            handle,
        }
    }

    pub fn set_difficulty(&self, difficulty: u32) {
        *self.state.difficulty.lock().expect("mutex") = difficulty;
    }

    /// Answer every submission with `status` instead of validating it.
    pub fn force_submit_status(&self, status: u16) {
        *self.state.forced_submit_status.lock().expect("mutex") = Some(status);
    }

    pub fn serve_raw_chain(&self, body: &str) {
        *self.state.raw_chain_body.lock().expect("mutex") = Some(body.to_string());
    }

    pub fn serve_raw_job(&self, body: &str) {
        *self.state.raw_job_body.lock().expect("mutex") = Some(body.to_string());
    }

    pub fn push_block(&self, miner: &str) -> Block {
        let mut chain = self.state.chain.lock().expect("mutex");
        let tip = chain.last().expect("genesis");
        let block = seal(Block::candidate(
            chain.len() as u64,
            now(),
            vec![Transaction::new("SISTEMA", miner, 1u64)],
            tip.hash.clone(),
            miner.to_string(),
        ));
        chain.push(block.clone());
        block
    }

    pub fn chain(&self) -> Vec<Block> {
        self.state.chain.lock().expect("mutex").clone()
    }

    pub fn mempool(&self) -> Vec<Transaction> {
        self.state.mempool.lock().expect("mutex").clone()
    }

    pub fn job_requests(&self) -> usize {
        self.state.job_requests.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> usize {
        self.state.submissions.load(Ordering::SeqCst)
    }

    pub fn chain_requests(&self) -> usize {
        self.state.chain_requests.load(Ordering::SeqCst)
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}
