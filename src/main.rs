use cartkeeper::application::engine::CartEngine;
use cartkeeper::domain::identity::SessionIdentity;
use cartkeeper::domain::ports::LocalCartStoreRef;
use cartkeeper::domain::summary::PricingConfig;
use cartkeeper::error::Result as CartResult;
use cartkeeper::infrastructure::in_memory::{InMemoryLocalCartStore, InMemoryRemoteCartStore};
use cartkeeper::interfaces::csv::command_reader::{CartCommand, CommandReader};
use cartkeeper::interfaces::csv::snapshot_writer::SnapshotWriter;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input cart commands CSV file
    input: PathBuf,

    /// Path to a persistent guest cart database (optional). If provided, uses RocksDB.
    #[arg(long, env = "CARTKEEPER_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Tax charged on the subtotal, as a fraction
    #[arg(long, default_value = "0.18")]
    tax_rate: Decimal,

    /// Subtotals above this amount ship free
    #[arg(long, default_value = "500")]
    free_shipping_threshold: Decimal,

    /// Shipping fee charged below the free shipping threshold
    #[arg(long, default_value = "99")]
    shipping_fee: Decimal,

    /// Append the checkout summary after the cart totals
    #[arg(long)]
    summary: bool,
}

#[cfg(feature = "storage-rocksdb")]
fn local_store(db_path: Option<PathBuf>) -> Result<LocalCartStoreRef> {
    use cartkeeper::infrastructure::rocksdb::RocksDBLocalCartStore;

    match db_path {
        Some(path) => Ok(Arc::new(RocksDBLocalCartStore::open(path).into_diagnostic()?)),
        None => Ok(Arc::new(InMemoryLocalCartStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn local_store(db_path: Option<PathBuf>) -> Result<LocalCartStoreRef> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: --db-path ignored, this build has no 'storage-rocksdb' support. The guest cart is kept in memory only."
        );
    }
    Ok(Arc::new(InMemoryLocalCartStore::new()))
}

async fn apply(engine: &CartEngine, session: &SessionIdentity, command: CartCommand) -> CartResult<()> {
    match command {
        CartCommand::Add { product, quantity } => engine.add_item(&product, quantity).await?,
        CartCommand::Update {
            product_id,
            quantity,
        } => engine.update_item(&product_id, quantity).await?,
        CartCommand::Remove { product_id } => engine.remove_item(&product_id).await?,
        CartCommand::Clear => engine.clear().await?,
        CartCommand::Login { identity } => {
            session.sign_in(identity).await;
            engine.identity_changed().await?
        }
        CartCommand::Logout => {
            session.sign_out().await;
            engine.identity_changed().await?
        }
        CartCommand::Load => engine.load().await?,
        CartCommand::Order => engine.order_placed().await?,
    };
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let pricing = PricingConfig::new(cli.tax_rate, cli.free_shipping_threshold, cli.shipping_fee)
        .into_diagnostic()?;

    let session = SessionIdentity::new();
    let engine = CartEngine::new(
        Arc::new(InMemoryRemoteCartStore::new()),
        local_store(cli.db_path)?,
        Arc::new(session.clone()),
    );

    if let Err(e) = engine.load().await {
        eprintln!("Error loading cart: {}", e);
    }

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for command in reader.commands() {
        match command {
            Ok(command) => {
                if let Err(e) = apply(&engine, &session, command).await {
                    eprintln!("Error applying command: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading command: {}", e);
            }
        }
    }

    let snapshot = engine.snapshot();
    let stdout = io::stdout();
    let mut writer = SnapshotWriter::new(stdout.lock());
    writer.write_snapshot(&snapshot).into_diagnostic()?;
    if cli.summary {
        let summary = engine.summary(&pricing).into_diagnostic()?;
        writer.write_summary(&summary).into_diagnostic()?;
    }

    Ok(())
}
