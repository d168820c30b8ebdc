use super::{
    AuthConfig, LogConfig, ServerConfig, StoreConfig, DEFAULT_CONFIG_FILE_PATH, IVD_PREFIX,
    PORT_ENV,
};
use crate::cli::Args;
use crate::error::{ConfigError, Error};
use config::{Config, Environment};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct IvDripsConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Config defaults to a file called `iv-drips.toml` in the current directory.
/// Every value has a default, so the file is optional.
///
/// ENV vars override file settings. They must be prefixed with `IVD_`, with
/// nested values separated by `__`, e.g. `IVD_STORE__BACKEND=sqlite`.
///
impl IvDripsConfig {
    pub fn default_path() -> String {
        DEFAULT_CONFIG_FILE_PATH.to_string()
    }

    pub fn load(args: &Args) -> Result<IvDripsConfig, Error> {
        if !PathBuf::from(&args.config_file_path).exists() {
            println!(
                "Configuration file was not found: {}",
                args.config_file_path
            );
            println!("Loading config values from environment variables.");
        }
        let mut config = IvDripsConfig::build(&args.config_file_path)?;

        // If log level is default, it has not been set by the user in config
        if config.log.level == LogConfig::default_log_level() {
            config.log.level = args.log_level;
        }

        // If log format is default, it has not been set by the user in config
        if config.log.format == LogConfig::default_log_format() {
            config.log.format = args.log_format;
        }

        config.apply_port_override(env::var(PORT_ENV).ok())?;

        Ok(config)
    }

    pub fn build(path: &str) -> Result<Self, Error> {
        // For parsing top-level values such as IVD_STORE__PATH
        let ivd_env_source = Environment::with_prefix(IVD_PREFIX)
            .try_parsing(true)
            .separator("__")
            .prefix_separator("_");

        let config: Self = Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(ivd_env_source)
            .build()
            .map_err(ConfigError::from)?
            .try_deserialize()
            .map_err(ConfigError::from)?;

        Ok(config)
    }

    fn apply_port_override(&mut self, port: Option<String>) -> Result<(), ConfigError> {
        if let Some(value) = port {
            self.server.port =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidParameter {
                        name: PORT_ENV.to_string(),
                        value,
                    })?;
        }
        Ok(())
    }
}
