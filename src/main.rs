//! Cortex Recall CLI - semantic code and git-history recall.

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use clap::Parser;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::stdio;
use rmcp::transport::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::ServiceExt;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cortex_recall::{Commands, Container, ContainerConfig, CortexRecallMcpServer, Router as CommandRouter};

/// Cortex Recall - semantic code and git-history recall with risk/stability
/// synthesis.
#[derive(Parser)]
#[command(name = "cortex-recall")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Repository to operate on. Falls back to `CORTEX_RECALL_REPO`, then
    /// the current working directory (§6).
    #[arg(short, long, global = true)]
    repository: Option<String>,

    /// Use a non-persistent in-memory vector store instead of DuckDB.
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ContainerConfig::resolve(cli.repository, cli.memory)?;
    let container = Container::new(config)?;

    match cli.command {
        Commands::Mcp { http, public } => run_mcp(container, http, public).await,
        command => {
            let router = CommandRouter::new(&container);
            let output = router.route(command).await?;
            println!("{output}");
            Ok(())
        }
    }
}

async fn run_mcp(container: Container, http: Option<u16>, public: bool) -> Result<()> {
    let container = Arc::new(container);

    match http {
        None => {
            info!("starting MCP server on stdio");
            let server = CortexRecallMcpServer::new(container);
            let service = server.serve(stdio()).await?;
            service.waiting().await?;
        }
        Some(port) => {
            let host = if public { "0.0.0.0" } else { "127.0.0.1" };
            let bind_addr: std::net::SocketAddr = format!("{host}:{port}").parse()?;
            info!(%bind_addr, "starting MCP server on streamable HTTP");

            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            let service = StreamableHttpService::new(
                move || Ok(CortexRecallMcpServer::new(container.clone())),
                Arc::new(LocalSessionManager::default()),
                StreamableHttpServerConfig::default(),
            );
            let app = Router::new().nest_service("/mcp", service);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
