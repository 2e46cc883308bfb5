use anyhow::Result;
use clap::Parser;
use node_janitor::app;
use node_janitor::config::Cli;
use node_janitor::config::Commands;
use utils::version;

/// Sets up global panic hooks.
fn setup_global_hooks() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        default_hook(panic_info);
        tracing::error!("Thread panicked: {}", panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_global_hooks();

    let cli = Cli::parse();
    let _guard = utils::logging::init();

    tracing::info!("Starting node-janitor {}", &**version::VERSION);

    match cli.command {
        Commands::Serve(args) => app::serve(args).await,
        Commands::SelfDestruct(args) => app::self_destruct_once(args).await,
    }
}
