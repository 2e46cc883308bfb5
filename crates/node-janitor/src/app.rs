use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use tokio::sync::oneshot;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::api::ApiServer;
use crate::api::AuthConfig;
use crate::config::JanitorArgs;
use crate::config::ServeArgs;
use crate::janitor::JanitorConfig;
use crate::janitor::NodeJanitor;
use crate::k8s::init_kube_client;
use crate::k8s::KubeNodeDeleter;

/// Builds the janitor with a client created once for the process lifetime.
///
/// A client that cannot be created here does not stop the process: the
/// failure is logged and construction is retried on each request, which
/// fails with a connection error until it succeeds.
pub async fn build_janitor(args: &JanitorArgs) -> NodeJanitor {
    let config = JanitorConfig::from(args);

    let deleter = match init_kube_client(args.kubeconfig.clone()).await {
        Ok(client) => KubeNodeDeleter::new(client),
        Err(report) => {
            error!(
                error = ?report,
                "Failed to initialize Kubernetes client, retrying on next request"
            );
            KubeNodeDeleter::connect_lazily(args.kubeconfig.clone())
        }
    };

    match config.node_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => info!(node_name = name, "Node identity resolved"),
        _ => warn!("NODE_NAME is not set, self-destruct requests will be rejected"),
    }
    if config.dry_run {
        info!("Dry-run mode enabled, node deletes will not be persisted");
    }

    NodeJanitor::new(config, Arc::new(deleter))
}

/// Serves the HTTP API until SIGINT or SIGTERM.
pub async fn serve(args: ServeArgs) -> Result<()> {
    let janitor = Arc::new(build_janitor(&args.janitor).await);
    let auth = AuthConfig::from(&args);
    if auth.token.is_none() {
        warn!("SELF_DESTRUCT_TOKEN is not set, /self-destruct accepts unauthenticated requests");
    }

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        let _ = shutdown_tx.send(());
    });

    ApiServer::new(janitor, args.listen_addr, auth)
        .run(shutdown_rx)
        .await
        .map_err(|report| anyhow::anyhow!("{report:?}"))?;

    info!("node-janitor stopped");
    Ok(())
}

/// Runs one self-destruct without the HTTP server.
pub async fn self_destruct_once(args: JanitorArgs) -> Result<()> {
    let janitor = build_janitor(&args).await;
    run_once(&janitor).await.map(|_| ())
}

/// Deletes the node once, returning the confirmation message.
pub async fn run_once(janitor: &NodeJanitor) -> Result<String> {
    let message = janitor
        .self_destruct()
        .await
        .map_err(|report| anyhow::anyhow!("{report:?}"))
        .context("self-destruct failed")?;

    info!("{message}");
    Ok(message)
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl-c, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
