use clap::{Parser, Subcommand};
use utils::version;

use crate::config::serve::{JanitorArgs, ServeArgs};

#[derive(Parser)]
#[command(about, long_about, version = &**version::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the self-destruct HTTP endpoint
    Serve(ServeArgs),
    /// Delete the current node once and exit
    #[command(name = "self-destruct")]
    SelfDestruct(JanitorArgs),
}
