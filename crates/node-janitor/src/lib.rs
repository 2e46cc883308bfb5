pub mod api;
pub mod app;
pub mod config;
pub mod janitor;
pub mod k8s;

pub use janitor::JanitorConfig;
pub use janitor::JanitorError;
pub use janitor::NodeJanitor;
