//! In-memory [`NodeDeleter`] used by tests and local runs.
//!
//! Behaves like a multi-tenant API server holding a set of Node names: a
//! delete removes the node, a second delete reports it as not found.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use async_trait::async_trait;
use error_stack::Report;

use super::KubernetesError;
use super::NodeDeleter;

/// One recorded call to [`NodeDeleter::delete_node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteCall {
    pub node_name: String,
    pub dry_run: bool,
}

#[derive(Default)]
struct State {
    nodes: BTreeSet<String>,
    calls: Vec<DeleteCall>,
    forced_error: Option<KubernetesError>,
}

#[derive(Clone, Default)]
pub struct InMemoryNodeDeleter {
    state: Arc<Mutex<State>>,
    delay: Option<Duration>,
}

impl InMemoryNodeDeleter {
    pub fn with_nodes<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let deleter = Self::default();
        deleter.lock().nodes = nodes.into_iter().map(Into::into).collect();
        deleter
    }

    /// Makes every delete wait for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes every subsequent delete fail with `error`.
    pub fn fail_with(&self, error: KubernetesError) {
        self.lock().forced_error = Some(error);
    }

    pub fn contains(&self, node_name: &str) -> bool {
        self.lock().nodes.contains(node_name)
    }

    pub fn nodes(&self) -> Vec<String> {
        self.lock().nodes.iter().cloned().collect()
    }

    pub fn calls(&self) -> Vec<DeleteCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // a panicking test must not poison the other assertions
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl NodeDeleter for InMemoryNodeDeleter {
    async fn delete_node(
        &self,
        node_name: &str,
        dry_run: bool,
    ) -> Result<(), Report<KubernetesError>> {
        self.lock().calls.push(DeleteCall {
            node_name: node_name.to_string(),
            dry_run,
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        if let Some(error) = state.forced_error.clone() {
            return Err(Report::new(error));
        }

        let exists = if dry_run {
            state.nodes.contains(node_name)
        } else {
            state.nodes.remove(node_name)
        };

        if exists {
            Ok(())
        } else {
            Err(Report::new(KubernetesError::NodeNotFound {
                node_name: node_name.to_string(),
                message: format!(r#"nodes "{node_name}" not found"#),
            }))
        }
    }
}
