use clap::Parser;
use std::process;
use nds_mcp::cli::{Cli, Commands};
use nds_mcp::cli_handlers;
use nds_mcp::config::ServerConfig;
use nds_mcp::mcp::run_mcp_server;
use nds_mcp::quantities::QuantityFamily;

#[tokio::main]
async fn main() {
    // stdout carries the MCP transport, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::default();

    let result = match cli.command {
        Commands::Info => cli_handlers::handle_info(&config),
        Commands::Separation { z, a, kind } => {
            cli_handlers::handle_lookup(
                &config,
                QuantityFamily::SeparationEnergy,
                z,
                a,
                kind.as_deref(),
            )
            .await
        }
        Commands::QValue { z, a, kind } => {
            cli_handlers::handle_lookup(&config, QuantityFamily::QValue, z, a, kind.as_deref())
                .await
        }
        Commands::Serve => {
            if let Err(e) = run_mcp_server(config).await {
                eprintln!("MCP server error: {e:#}");
                process::exit(1);
            }
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
