//! Tournament server binary.
//!
//! Serves the admin HTTP surface and the WebSocket table channel.
//! `DB_URL` selects the Postgres repository; without it state lives in
//! process memory.

use clap::Parser;
use mttpoker::repo::MemoryRepo;
use mttpoker::repo::Postgres;
use mttpoker::repo::Repository;
use mttpoker::server::Server;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "mttpoker", about = "Multi-table hold'em tournament server")]
struct Args {
    /// address to listen on; falls back to BIND_ADDR, then a default
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    mttpoker::init();
    let bind = args
        .bind
        .or_else(|| std::env::var("BIND_ADDR").ok())
        .unwrap_or_else(|| "127.0.0.1:8080".to_string());
    let repo: Arc<dyn Repository> = match std::env::var("DB_URL") {
        Ok(_) => {
            let postgres = Postgres::from(mttpoker::db().await);
            postgres
                .migrate()
                .await
                .map_err(|e| anyhow::anyhow!("migration failed: {}", e))?;
            Arc::new(postgres)
        }
        Err(_) => {
            log::warn!("DB_URL not set, state is in-memory only");
            Arc::new(MemoryRepo::default())
        }
    };
    Server::run(repo, bind).await?;
    Ok(())
}
