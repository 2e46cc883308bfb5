pub mod cli;
pub mod serve;

pub use cli::*;
pub use serve::*;
