//! Stdio and streamable-HTTP transports.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::runtime::{Builder, Runtime};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::AzureSearchServer;
use crate::config::Transport;
use crate::{Error, Result};

const SSE_KEEP_ALIVE: Duration = Duration::from_secs(15);

/// Runtime suited to `transport`.
///
/// rmcp handles every request on its own task. Stdio runs them on a single
/// thread so tasks start in arrival order and queue on the serial lock in
/// that order. HTTP sessions get the multi-threaded scheduler.
pub fn runtime_for(transport: &Transport) -> std::io::Result<Runtime> {
    match transport {
        Transport::Stdio => Builder::new_current_thread().enable_all().build(),
        Transport::Http { .. } => Builder::new_multi_thread().enable_all().build(),
    }
}

/// Serve until the client disconnects or Ctrl-C.
///
/// Bind failures are returned before anything is served.
pub async fn run(transport: Transport, server: AzureSearchServer) -> Result<()> {
    match transport {
        Transport::Stdio => serve_stdio(server.serialized()).await,
        Transport::Http { addr, path } => {
            let listener = TcpListener::bind(addr)
                .await
                .map_err(|e| Error::Transport(format!("failed to bind {addr}: {e}")))?;

            let ct = CancellationToken::new();
            tokio::spawn({
                let ct = ct.clone();
                async move {
                    shutdown_signal().await;
                    ct.cancel();
                }
            });

            serve_http(listener, &path, server, ct).await
        }
    }
}

/// JSON-RPC over stdin/stdout. Returns when stdin closes or on Ctrl-C.
pub async fn serve_stdio(server: AzureSearchServer) -> Result<()> {
    let (stdin, stdout) = stdio();
    serve_io(server, stdin, stdout).await
}

/// Newline-delimited JSON-RPC over any reader/writer pair.
pub async fn serve_io<R, W>(server: AzureSearchServer, reader: R, writer: W) -> Result<()>
where
    R: AsyncRead + Send + Unpin + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
{
    info!(serialized = server.is_serialized(), "Serving MCP over stdio");

    let running = server
        .serve((reader, writer))
        .await
        .map_err(|e| Error::Transport(format!("stdio handshake failed: {e}")))?;

    tokio::select! {
        quit = running.waiting() => {
            let reason = quit.map_err(|e| Error::Transport(e.to_string()))?;
            info!(reason = ?reason, "Stdio session ended");
        }
        _ = shutdown_signal() => info!("Shutdown requested"),
    }
    Ok(())
}

/// Serve on an already-bound listener until `ct` is cancelled.
pub async fn serve_http(
    listener: TcpListener,
    path: &str,
    server: AzureSearchServer,
    ct: CancellationToken,
) -> Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, path, "Serving MCP over streamable HTTP");

    let app = router(server, path, ct.child_token());
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { ct.cancelled_owned().await })
        .await?;

    info!("HTTP transport stopped");
    Ok(())
}

/// Router with the MCP endpoint mounted at `path`.
///
/// Every session gets a clone of `server`, so all sessions share one
/// search client.
pub fn router(server: AzureSearchServer, path: &str, ct: CancellationToken) -> Router {
    let service: StreamableHttpService<AzureSearchServer, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(server.clone()),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                stateful_mode: true,
                sse_keep_alive: Some(SSE_KEEP_ALIVE),
                cancellation_token: ct,
                ..Default::default()
            },
        );

    match path.trim_end_matches('/') {
        "" => Router::new().fallback_service(service),
        mount => Router::new().nest_service(mount, service),
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::runtime::RuntimeFlavor;

    #[test]
    fn test_stdio_runs_on_one_thread() {
        let runtime = runtime_for(&Transport::Stdio).unwrap();
        assert_eq!(runtime.handle().runtime_flavor(), RuntimeFlavor::CurrentThread);

        let runtime = runtime_for(&Transport::default()).unwrap();
        assert_eq!(runtime.handle().runtime_flavor(), RuntimeFlavor::MultiThread);
    }
}
