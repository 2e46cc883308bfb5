use std::sync::Arc;

use error_stack::Report;
use poem::get;
use poem::listener::TcpListener;
use poem::middleware::Tracing;
use poem::post;
use poem::Endpoint;
use poem::EndpointExt;
use poem::Route;
use poem::Server;
use tokio::sync::oneshot;
use tracing::error;
use tracing::info;

use super::auth::AuthConfig;
use super::auth::BearerAuthMiddleware;
use super::errors::ApiError;
use super::handlers::healthz;
use super::handlers::self_destruct;
use crate::janitor::NodeJanitor;

/// Builds the route tree. Only `POST` and `DELETE` reach the self-destruct
/// handler; other methods get `405 Method Not Allowed`.
pub fn create_routes(janitor: Arc<NodeJanitor>, auth: AuthConfig) -> impl Endpoint {
    Route::new()
        .at(
            "/self-destruct",
            post(self_destruct)
                .delete(self_destruct)
                .with(BearerAuthMiddleware::new(auth)),
        )
        .at("/healthz", get(healthz))
        .data(janitor)
}

/// HTTP API server exposing the self-destruct endpoint
pub struct ApiServer {
    janitor: Arc<NodeJanitor>,
    listen_addr: String,
    auth: AuthConfig,
}

impl ApiServer {
    pub fn new(janitor: Arc<NodeJanitor>, listen_addr: String, auth: AuthConfig) -> Self {
        Self {
            janitor,
            listen_addr,
            auth,
        }
    }

    /// Start the API server
    ///
    /// # Errors
    ///
    /// - [`ApiError::ServerError`] if the server fails to start or bind to the address
    pub async fn run(self, mut shutdown_rx: oneshot::Receiver<()>) -> Result<(), Report<ApiError>> {
        info!("Starting HTTP API server on {}", self.listen_addr);

        let app = create_routes(self.janitor, self.auth).with(Tracing);

        let listener = TcpListener::bind(&self.listen_addr);
        let server = Server::new(listener);

        tokio::select! {
            result = server.run(app) => {
                match result {
                    Ok(()) => {
                        info!("API server stopped normally");
                        Ok(())
                    }
                    Err(e) => {
                        error!("API server failed: {e}");
                        Err(Report::new(ApiError::ServerError {
                            message: format!("Server failed: {e}"),
                        }))
                    }
                }
            }
            _ = &mut shutdown_rx => {
                info!("API server shutdown requested");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::janitor::JanitorConfig;
    use crate::k8s::mock::InMemoryNodeDeleter;

    fn test_janitor() -> Arc<NodeJanitor> {
        Arc::new(NodeJanitor::new(
            JanitorConfig {
                node_name: Some("worker-7".to_string()),
                delete_timeout: Duration::from_secs(1),
                dry_run: false,
            },
            Arc::new(InMemoryNodeDeleter::with_nodes(["worker-7"])),
        ))
    }

    #[test]
    fn api_server_can_be_created() {
        let janitor = test_janitor();
        let server = ApiServer::new(
            janitor.clone(),
            "127.0.0.1:8080".to_string(),
            AuthConfig::default(),
        );

        assert_eq!(server.listen_addr, "127.0.0.1:8080");
        assert!(server.auth.token.is_none());
        assert!(
            Arc::ptr_eq(&server.janitor, &janitor),
            "Janitor should be the same reference"
        );
    }

    #[tokio::test]
    async fn api_server_stops_on_shutdown_signal() {
        let server = ApiServer::new(
            test_janitor(),
            "127.0.0.1:0".to_string(),
            AuthConfig::default(),
        );
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        shutdown_tx.send(()).expect("should send shutdown signal");

        let result = tokio::time::timeout(Duration::from_secs(5), server.run(shutdown_rx))
            .await
            .expect("server should stop promptly");

        assert!(result.is_ok(), "shutdown should not be an error");
    }

    #[tokio::test]
    async fn api_server_reports_bind_failure() {
        let server = ApiServer::new(
            test_janitor(),
            "not-an-address".to_string(),
            AuthConfig::default(),
        );
        let (_shutdown_tx, shutdown_rx) = oneshot::channel();

        let err = tokio::time::timeout(Duration::from_secs(5), server.run(shutdown_rx))
            .await
            .expect("bind failure should return promptly")
            .expect_err("invalid address should fail");

        assert!(matches!(err.current_context(), ApiError::ServerError { .. }));
    }
}
