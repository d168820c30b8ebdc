use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    FileOrEnvironment(#[from] config::ConfigError),

    #[error("Invalid value '{value}' for {name}")]
    InvalidParameter { name: String, value: String },
}
