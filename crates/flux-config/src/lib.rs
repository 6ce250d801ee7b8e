pub mod global;
pub mod loader;
pub mod session;

pub use global::{GlobalConfig, ListenConfig, LogFormat, LoggingConfig};
pub use loader::ConfigLoader;
pub use session::SessionConfig;
