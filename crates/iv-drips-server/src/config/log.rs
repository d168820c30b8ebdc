use std::{fmt::Display, io::IsTerminal};

use clap::ValueEnum;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_ansi_enabled")]
    pub ansi_enabled: bool,

    #[serde(default = "LogConfig::default_log_format")]
    pub format: LogFormat,

    #[serde(default = "LogConfig::default_log_output")]
    pub output: LogOutput,

    #[serde(default = "LogConfig::default_log_level")]
    pub level: LogLevel,

    #[serde(default = "LogConfig::default_log_level")]
    pub authentication_level: LogLevel,

    #[serde(default = "LogConfig::default_log_level")]
    pub registry_level: LogLevel,

    #[serde(default = "LogConfig::default_log_level")]
    pub persistence_level: LogLevel,

    #[serde(default = "LogConfig::default_log_level")]
    pub http_level: LogLevel,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[serde(alias = "Pretty", alias = "PRETTY")]
    Pretty,
    #[serde(alias = "Structured", alias = "STRUCTURED")]
    Structured,
    #[serde(alias = "Text", alias = "TEXT")]
    Text,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[serde(alias = "Stdout", alias = "STDOUT")]
    Stdout,
    #[serde(alias = "Stderr", alias = "STDERR")]
    Stderr,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[serde(alias = "Error", alias = "ERROR")]
    Error,
    #[serde(alias = "Warn", alias = "WARN")]
    Warn,
    #[serde(alias = "Info", alias = "INFO")]
    Info,
    #[serde(alias = "Debug", alias = "DEBUG")]
    Debug,
    #[serde(alias = "Trace", alias = "TRACE")]
    Trace,
}

impl LogLevel {
    /// Directive name understood by `EnvFilter`.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Debug and trace output carries thread ids and source locations.
    pub fn is_verbose(self) -> bool {
        matches!(self, LogLevel::Debug | LogLevel::Trace)
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::with_level(LogConfig::default_log_level())
    }
}

impl LogConfig {
    pub fn with_level(level: LogLevel) -> Self {
        LogConfig {
            format: LogConfig::default_log_format(),
            output: LogConfig::default_log_output(),
            ansi_enabled: LogConfig::default_ansi_enabled(),
            level,
            authentication_level: level,
            registry_level: level,
            persistence_level: level,
            http_level: level,
        }
    }

    /// Pretty in a terminal session, otherwise structured JSON.
    pub fn default_log_format() -> LogFormat {
        if std::io::stdout().is_terminal() {
            LogFormat::Pretty
        } else {
            LogFormat::Structured
        }
    }

    pub fn default_log_output() -> LogOutput {
        LogOutput::Stdout
    }

    pub fn default_ansi_enabled() -> bool {
        std::io::stdout().is_terminal()
    }

    pub fn default_log_level() -> LogLevel {
        LogLevel::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_case_insensitive() {
        let levels: Vec<LogLevel> = serde_json::from_str(r#"["warn", "WARN", "Warn"]"#).unwrap();
        assert!(levels.iter().all(|l| *l == LogLevel::Warn));
    }

    #[test]
    fn test_with_level_sets_every_target() {
        let config = LogConfig::with_level(LogLevel::Debug);
        assert_eq!(config.authentication_level, LogLevel::Debug);
        assert_eq!(config.persistence_level, LogLevel::Debug);
        assert_eq!(config.http_level, LogLevel::Debug);
        assert!(config.level.is_verbose());
    }
}
