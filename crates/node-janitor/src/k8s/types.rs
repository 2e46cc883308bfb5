use core::error::Error;

use kube::error::ErrorResponse;

/// Errors that can occur during Kubernetes operations.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum KubernetesError {
    #[display("Failed to connect to Kubernetes API: {message}")]
    ConnectionFailed { message: String },
    #[display("Node {node_name} not found: {message}")]
    NodeNotFound { node_name: String, message: String },
    #[display("Not allowed to delete node {node_name}: {message}")]
    Forbidden { node_name: String, message: String },
    #[display("Conflict while deleting node {node_name}: {message}")]
    Conflict { node_name: String, message: String },
    #[display("Failed to delete node {node_name}: {message}")]
    DeleteFailed { node_name: String, message: String },
}

impl Error for KubernetesError {}

impl KubernetesError {
    /// Classifies a status returned by the API server for a node delete.
    pub fn from_api_response(node_name: &str, response: &ErrorResponse) -> Self {
        let node_name = node_name.to_string();
        let message = response.message.clone();
        match response.code {
            404 => Self::NodeNotFound { node_name, message },
            403 => Self::Forbidden { node_name, message },
            409 => Self::Conflict { node_name, message },
            _ => Self::DeleteFailed { node_name, message },
        }
    }
}
