//! Deletion of the Node object hosting this process.

use core::error::Error;
use std::sync::Arc;
use std::time::Duration;

use error_stack::Report;
use tokio::time::timeout;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::k8s::KubernetesError;
use crate::k8s::NodeDeleter;

/// Resolved janitor settings, built once at startup.
#[derive(Debug, Clone)]
pub struct JanitorConfig {
    /// Name of the Node this pod runs on.
    pub node_name: Option<String>,
    /// Upper bound for a single delete call.
    pub delete_timeout: Duration,
    /// Forward `dryRun=All` to the API server.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum JanitorError {
    #[display("Node name is not configured (set NODE_NAME)")]
    MissingNodeName,
    #[display("Deleting node {node_name} timed out after {timeout_secs}s")]
    Timeout { node_name: String, timeout_secs: u64 },
    #[display("{_0}")]
    Kubernetes(KubernetesError),
}

impl Error for JanitorError {}

/// Deletes the node named in its configuration through an injected
/// [`NodeDeleter`].
pub struct NodeJanitor {
    config: JanitorConfig,
    deleter: Arc<dyn NodeDeleter>,
}

impl NodeJanitor {
    pub fn new(config: JanitorConfig, deleter: Arc<dyn NodeDeleter>) -> Self {
        Self { config, deleter }
    }

    /// Returns the configured node name, rejecting unset or blank values.
    pub fn node_name(&self) -> Result<&str, JanitorError> {
        self.config
            .node_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(JanitorError::MissingNodeName)
    }

    /// Deletes the configured node and returns the confirmation message.
    ///
    /// At most one delete is sent per call; nothing is retried.
    pub async fn self_destruct(&self) -> Result<String, Report<JanitorError>> {
        let node_name = self.node_name().map_err(|e| {
            error!("Refusing to delete node: {e}");
            Report::new(e)
        })?;
        let dry_run = self.config.dry_run;

        info!(node_name, dry_run, "Deleting own node");

        let result = timeout(
            self.config.delete_timeout,
            self.deleter.delete_node(node_name, dry_run),
        )
        .await;

        match result {
            Ok(Ok(())) => {
                info!(node_name, dry_run, "Node marked for deletion");
                Ok(format!("Node {node_name} marked for deletion"))
            }
            Ok(Err(report)) => {
                warn!(node_name, error = ?report, "Node delete rejected");
                let context = JanitorError::Kubernetes(report.current_context().clone());
                Err(report.change_context(context))
            }
            Err(_) => {
                let timeout_secs = self.config.delete_timeout.as_secs();
                warn!(node_name, timeout_secs, "Node delete timed out");
                Err(Report::new(JanitorError::Timeout {
                    node_name: node_name.to_string(),
                    timeout_secs,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;
    use test_log::test;

    use super::*;
    use crate::k8s::mock::InMemoryNodeDeleter;

    fn janitor(node_name: Option<&str>, deleter: &InMemoryNodeDeleter) -> NodeJanitor {
        NodeJanitor::new(
            JanitorConfig {
                node_name: node_name.map(str::to_string),
                delete_timeout: Duration::from_secs(5),
                dry_run: false,
            },
            Arc::new(deleter.clone()),
        )
    }

    #[test(tokio::test)]
    async fn deletes_configured_node() {
        let deleter = InMemoryNodeDeleter::with_nodes(["worker-7", "worker-8"]);

        let message = janitor(Some("worker-7"), &deleter)
            .self_destruct()
            .await
            .expect("delete should succeed");

        assert_eq!(message, "Node worker-7 marked for deletion");
        assert_eq!(deleter.nodes(), vec!["worker-8".to_string()]);
    }

    #[test(tokio::test)]
    async fn blank_node_name_never_reaches_the_api() {
        let deleter = InMemoryNodeDeleter::with_nodes(["worker-7"]);

        for name in [None, Some(""), Some("   ")] {
            let err = janitor(name, &deleter)
                .self_destruct()
                .await
                .expect_err("missing node name should fail");
            assert_eq!(err.current_context(), &JanitorError::MissingNodeName);
        }

        assert!(deleter.calls().is_empty(), "no delete may be issued");
    }

    #[test(tokio::test)]
    async fn surrounding_whitespace_is_trimmed() {
        let deleter = InMemoryNodeDeleter::with_nodes(["worker-7"]);

        janitor(Some(" worker-7\n"), &deleter)
            .self_destruct()
            .await
            .expect("trimmed name should match");

        assert_eq!(deleter.calls()[0].node_name, "worker-7");
    }

    #[test(tokio::test)]
    async fn api_error_keeps_kubernetes_context() {
        let deleter = InMemoryNodeDeleter::with_nodes(Vec::<String>::new());

        let err = janitor(Some("worker-7"), &deleter)
            .self_destruct()
            .await
            .expect_err("unknown node should fail");

        assert_eq!(
            err.current_context(),
            &JanitorError::Kubernetes(KubernetesError::NodeNotFound {
                node_name: "worker-7".to_string(),
                message: r#"nodes "worker-7" not found"#.to_string(),
            })
        );
        assert_eq!(
            err.current_context().to_string(),
            r#"Node worker-7 not found: nodes "worker-7" not found"#
        );
    }

    #[test(tokio::test)]
    async fn slow_delete_times_out() {
        let deleter =
            InMemoryNodeDeleter::with_nodes(["worker-7"]).with_delay(Duration::from_secs(30));
        let janitor = NodeJanitor::new(
            JanitorConfig {
                node_name: Some("worker-7".to_string()),
                delete_timeout: Duration::from_millis(20),
                dry_run: false,
            },
            Arc::new(deleter.clone()),
        );

        let err = janitor
            .self_destruct()
            .await
            .expect_err("delete should time out");

        assert!(matches!(
            err.current_context(),
            JanitorError::Timeout { node_name, .. } if node_name == "worker-7"
        ));
        assert!(deleter.contains("worker-7"));
    }
}
