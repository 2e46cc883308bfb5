//! Kubernetes integration module.
//!
//! Provides client construction and the [`NodeDeleter`] seam used to remove
//! the Node object this process runs on.

pub mod kube_client;
pub mod mock;
pub mod node_deleter;
pub mod types;

pub use kube_client::init_kube_client;
pub use node_deleter::KubeNodeDeleter;
pub use node_deleter::NodeDeleter;
pub use types::KubernetesError;
