use std::sync::Arc;

use poem::handler;
use poem::web::Data;
use tracing::error;

use super::errors::janitor_error_status;
use crate::janitor::NodeJanitor;

/// Delete the Node this pod runs on
#[handler]
pub async fn self_destruct(janitor: Data<&Arc<NodeJanitor>>) -> poem::Result<String> {
    janitor.self_destruct().await.map_err(|report| {
        let context = report.current_context();
        error!(error = ?report, "Self-destruct failed");
        poem::Error::from_string(context.to_string(), janitor_error_status(context))
    })
}

/// Liveness probe
#[handler]
pub async fn healthz() -> &'static str {
    "ok"
}
