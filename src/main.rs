use std::process::ExitCode;
use std::sync::Arc;

use azure_search_mcp::observability::init_logging;
use azure_search_mcp::{AzureSearchServer, SearchClient, SearchConfig, ServerConfig, server};
use tracing::{error, info};

fn main() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("failed to initialize logging: {e}");
    }

    let (search, settings) = match (SearchConfig::from_env(), ServerConfig::from_env()) {
        (Ok(search), Ok(settings)) => (search, settings),
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match server::runtime_for(&settings.transport) {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(async move {
        let client = match SearchClient::new(search) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                error!(error = %e, "Failed to create search client");
                return ExitCode::FAILURE;
            }
        };

        info!(
            version = env!("CARGO_PKG_VERSION"),
            transport = %settings.transport,
            "Starting Azure Search MCP server"
        );

        match server::run(settings.transport, AzureSearchServer::new(client)).await {
            Ok(()) => {
                info!("Server stopped");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "Server failed");
                ExitCode::FAILURE
            }
        }
    });

    // A pending blocking stdin read must not hold up exit.
    runtime.shutdown_background();
    code
}
