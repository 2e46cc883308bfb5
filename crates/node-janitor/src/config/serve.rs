use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use clap::Parser;

use crate::api::AuthConfig;
use crate::janitor::JanitorConfig;

/// Settings shared by every command that deletes the node.
#[derive(Args, Clone, Debug)]
pub struct JanitorArgs {
    #[arg(
        long,
        env = "NODE_NAME",
        help = "Name of the Node this pod runs on, usually injected through the downward API"
    )]
    pub node_name: Option<String>,

    #[arg(
        long,
        env = "KUBECONFIG",
        value_hint = clap::ValueHint::FilePath,
        help = "Path to kubeconfig file (defaults to cluster config or ~/.kube/config)"
    )]
    pub kubeconfig: Option<PathBuf>,

    #[arg(
        long,
        env = "SELF_DESTRUCT_TIMEOUT_SECS",
        default_value = "30",
        help = "Upper bound in seconds for the node delete call"
    )]
    pub delete_timeout_secs: u64,

    #[arg(
        long,
        env = "SELF_DESTRUCT_DRY_RUN",
        default_value_t = false,
        action = clap::ArgAction::Set,
        help = "Ask the API server to validate the delete without persisting it"
    )]
    pub dry_run: bool,
}

#[derive(Parser, Clone, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub janitor: JanitorArgs,

    #[arg(
        long,
        env = "API_LISTEN_ADDR",
        default_value = "0.0.0.0:8080",
        help = "HTTP API server listen address"
    )]
    pub listen_addr: String,

    #[arg(
        long,
        env = "SELF_DESTRUCT_TOKEN",
        hide_env_values = true,
        help = "Bearer token required on /self-destruct; the endpoint is unauthenticated when unset"
    )]
    pub auth_token: Option<String>,
}

impl From<&JanitorArgs> for JanitorConfig {
    fn from(args: &JanitorArgs) -> Self {
        Self {
            node_name: args.node_name.clone(),
            delete_timeout: Duration::from_secs(args.delete_timeout_secs.max(1)),
            dry_run: args.dry_run,
        }
    }
}

impl From<&ServeArgs> for AuthConfig {
    fn from(args: &ServeArgs) -> Self {
        Self {
            token: args.auth_token.clone().filter(|t| !t.is_empty()),
        }
    }
}
