use std::path::PathBuf;

use async_trait::async_trait;
use error_stack::Report;
use k8s_openapi::api::core::v1::Node;
use kube::api::DeleteParams;
use kube::Api;
use kube::Client;
use tokio::sync::OnceCell;
use tracing::debug;
use tracing::info;

use crate::k8s::init_kube_client;
use crate::k8s::KubernetesError;

/// Removes Node objects from the cluster.
#[async_trait]
pub trait NodeDeleter: Send + Sync {
    /// Issues a single delete for `node_name`. No retries.
    async fn delete_node(
        &self,
        node_name: &str,
        dry_run: bool,
    ) -> Result<(), Report<KubernetesError>>;
}

/// [`NodeDeleter`] backed by the Kubernetes API server.
///
/// The client is created at most once. Until that succeeds every delete
/// retries construction and fails with [`KubernetesError::ConnectionFailed`].
pub struct KubeNodeDeleter {
    kubeconfig: Option<PathBuf>,
    nodes: OnceCell<Api<Node>>,
}

impl KubeNodeDeleter {
    pub fn new(client: Client) -> Self {
        Self {
            kubeconfig: None,
            nodes: OnceCell::new_with(Some(Api::all(client))),
        }
    }

    /// Defers client construction to the first delete.
    pub fn connect_lazily(kubeconfig: Option<PathBuf>) -> Self {
        Self {
            kubeconfig,
            nodes: OnceCell::new(),
        }
    }

    async fn nodes(&self) -> Result<&Api<Node>, Report<KubernetesError>> {
        self.nodes
            .get_or_try_init(|| async {
                let client = init_kube_client(self.kubeconfig.clone()).await?;
                info!("Kubernetes client initialized");
                Ok::<_, Report<KubernetesError>>(Api::all(client))
            })
            .await
    }
}

fn delete_params(dry_run: bool) -> DeleteParams {
    let mut params = DeleteParams::default();
    params.dry_run = dry_run;
    params
}

#[async_trait]
impl NodeDeleter for KubeNodeDeleter {
    async fn delete_node(
        &self,
        node_name: &str,
        dry_run: bool,
    ) -> Result<(), Report<KubernetesError>> {
        let nodes = self.nodes().await?;

        debug!(node_name, dry_run, "Sending node delete request");

        match nodes.delete(node_name, &delete_params(dry_run)).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(response)) => {
                let context = KubernetesError::from_api_response(node_name, &response);
                Err(Report::new(kube::Error::Api(response)).change_context(context))
            }
            Err(e) => {
                let context = KubernetesError::DeleteFailed {
                    node_name: node_name.to_string(),
                    message: e.to_string(),
                };
                Err(Report::new(e).change_context(context))
            }
        }
    }
}
