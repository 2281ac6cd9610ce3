pub mod config;
pub mod tracing;
pub mod wiring;

pub use config::{load_config, load_or_default, ConfigSource};
pub use tracing::init_tracing_subscriber;
pub use wiring::{wire_shell, Wired};
