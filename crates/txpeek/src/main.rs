mod cli;
mod server;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use eyre::{eyre, WrapErr};
use tokio::sync::RwLock;

use txpeek_core::explorer::{Endpoint, MempoolClient};
use txpeek_core::session::LookupSession;
use txpeek_core::store::{DocumentStore, JsonlStore, MemoryStore};
use txpeek_core::{LookupError, LookupService};

use cli::{Cli, Command, StoreKind};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let endpoint = match &args.api_base {
        Some(base) => Endpoint::parse(base),
        None => Endpoint::for_network(args.network),
    }
    .wrap_err("resolve explorer endpoint")?;

    let explorer = MempoolClient::new(
        endpoint.clone(),
        Some(Duration::from_secs(args.connect_timeout_secs)),
        args.request_timeout_secs.map(Duration::from_secs),
    )
    .wrap_err("build explorer HTTP client")?;
    tracing::info!(base = endpoint.base(), "using explorer");

    let store = open_store(&args)?;
    let service = LookupService::new(Arc::new(explorer), store);
    if !service.persists() {
        tracing::info!("no store configured, lookup results will not be persisted");
    }

    match args.command {
        Command::Lookup { txid } => run_lookup(&service, &endpoint, &txid).await,
        Command::Serve { bind, port } => serve(service, endpoint, &bind, port).await,
    }
}

fn open_store(args: &Cli) -> eyre::Result<Option<Arc<dyn DocumentStore>>> {
    let store: Arc<dyn DocumentStore> = match args.store {
        StoreKind::None => return Ok(None),
        StoreKind::Memory => Arc::new(MemoryStore::new()),
        StoreKind::Jsonl => {
            let store = JsonlStore::open(&args.store_dir).context("open JSONL store")?;
            tracing::info!(path = %store.dir().display(), "loaded JSONL store");
            Arc::new(store)
        }
    };
    Ok(Some(store))
}

/// One-shot lookup. The record goes to stdout as JSON; a not-found answer
/// still prints the negative record before failing.
async fn run_lookup(service: &LookupService, endpoint: &Endpoint, txid: &str) -> eyre::Result<()> {
    let record = match service.lookup(txid).await {
        Ok(record) => record,
        Err(LookupError::RemoteNotFound { record }) => {
            print_record(&record, endpoint)?;
            return Err(eyre!("Transaction not found"));
        }
        Err(err) => return Err(eyre!(err)),
    };
    print_record(&record, endpoint)
}

fn print_record(record: &txpeek_core::TransactionRecord, endpoint: &Endpoint) -> eyre::Result<()> {
    let json = serde_json::to_string_pretty(record).context("encode record")?;
    println!("{json}");
    eprintln!();
    eprintln!("{record}");
    eprintln!("compare: {}", endpoint.compare_url(&record.txid));
    if let Some(doc_ref) = &record.storage_ref {
        eprintln!("storage ref: {doc_ref}");
    }
    Ok(())
}

async fn serve(service: LookupService, endpoint: Endpoint, bind: &str, port: u16) -> eyre::Result<()> {
    let state = server::AppState {
        service,
        endpoint,
        session: Arc::new(RwLock::new(LookupSession::new())),
    };

    let bind_addr = format!("{bind}:{port}");
    let origin = format!("http://{bind}:{port}");
    let router = server::build_router(state, &origin).context("build router")?;

    if bind == "0.0.0.0" {
        tracing::warn!("server is bound to 0.0.0.0 — it is accessible from the network");
    }

    println!();
    println!("  txpeek is running:");
    println!("    URL:       http://{bind_addr}/api/v1/session");
    println!();

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context("bind TCP listener")?;

    tracing::info!("listening on {bind_addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("run HTTP server")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
    }
    tracing::info!("shutting down");
}
