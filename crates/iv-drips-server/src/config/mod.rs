mod app;
mod auth;
mod log;
mod server;
mod store;

pub use app::IvDripsConfig;
pub use auth::AuthConfig;
pub use log::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use server::ServerConfig;
pub use store::{StoreBackend, StoreConfig};

pub const DEFAULT_CONFIG_FILE_PATH: &str = "iv-drips.toml";

pub const DEFAULT_PORT: u16 = 5000;

/// Seconds in-flight requests get to finish after a shutdown signal.
pub const DEFAULT_SHUTDOWN_TIMEOUT: u64 = 10;

pub const DEFAULT_SNAPSHOT_PATH: &str = "data/patients.json";

/// Signing secret used when none is configured. Tokens signed with it are
/// only fit for local development.
pub const DEFAULT_AUTH_SECRET: &str = "supersecretkey";

pub const IVD_PREFIX: &str = "IVD";

/// Bare variable set by hosting platforms; wins over `IVD_SERVER__PORT`.
pub const PORT_ENV: &str = "PORT";
