use crate::config::{LogConfig, LogLevel, LogOutput};
use crate::log::{AUTHENTICATION, HTTP, PERSISTENCE, REGISTRY};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::FmtSubscriber;

fn log_targets() -> Vec<&'static str> {
    vec![AUTHENTICATION, REGISTRY, PERSISTENCE, HTTP]
}

fn log_level_for(config: &LogConfig, target: &str) -> LogLevel {
    match target {
        AUTHENTICATION => config.authentication_level,
        REGISTRY => config.registry_level,
        PERSISTENCE => config.persistence_level,
        HTTP => config.http_level,
        _ => config.level,
    }
}

pub fn builder(
    config: &LogConfig,
) -> SubscriberBuilder<DefaultFields, Format, EnvFilter, BoxMakeWriter> {
    let mut env_filter: EnvFilter = EnvFilter::builder().parse_lossy(config.level.as_str());

    let mut verbose = config.level.is_verbose();

    for &target in log_targets().iter() {
        let level = log_level_for(config, target);

        // If any target is verbose, include source locations
        if level.is_verbose() {
            verbose = true;
        }

        if let Ok(directive) = format!("{target}={level}").parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    let writer = match config.output {
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
    };

    let mut builder = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_ansi(config.ansi_enabled)
        .with_writer(writer);

    if verbose {
        builder = builder
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);
    };

    builder
}
