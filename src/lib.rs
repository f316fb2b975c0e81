// yuzu-manager - install, detect and provision the yuzu / Eden Switch emulator
//
// This is the library crate containing the core business logic and data structures.
// The binary crate (main.rs) provides the command-line entry point.

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod models;
pub mod notify;
pub mod platform;
pub mod services;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use context::ManagerContext;
pub use error::InstallError;
pub use models::{AppConfig, Branch, EmulatorConfig, History};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
