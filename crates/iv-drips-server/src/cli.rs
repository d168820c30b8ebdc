use crate::config::{LogConfig, LogFormat, LogLevel, DEFAULT_CONFIG_FILE_PATH};
use clap::Parser;

#[derive(Clone, Debug, Parser)]
#[command(version, about, verbatim_doc_comment)]
///
/// IV Drips Server
///
/// Registry API for ward IV drip monitors: sign-up, login and patient infusion records.
///
pub struct Args {
    /// Optional path to a configuration file.
    ///
    /// Default is "iv-drips.toml".
    /// Configuration is loaded from this file, if present.
    /// Environment variables prefixed with IVD_ override any values defined in the file.
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_FILE_PATH, verbatim_doc_comment)]
    pub config_file_path: String,

    ///
    /// Optional log level.
    ///
    #[arg(short, long, value_enum, default_value_t = LogConfig::default_log_level(), env = "IVD_LOG__LEVEL")]
    pub log_level: LogLevel,

    ///
    /// Optional log format. Default is "pretty" if running in a terminal session, otherwise "structured".
    ///
    #[arg(short = 'f', long, value_enum, default_value_t = LogConfig::default_log_format(), env = "IVD_LOG__FORMAT")]
    pub log_format: LogFormat,
}
