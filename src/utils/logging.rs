//! Structured logging setup.
//!
//! Installs a global `tracing-subscriber` registry from [`LoggingConfig`],
//! with one fmt layer per enabled output. `RUST_LOG` takes precedence over
//! the configured level when set.

use crate::config::LoggingConfig;
use crate::error::{constants, HookError, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Where formatted events are written
#[derive(Debug, Clone, PartialEq, Eq)]
enum Sink {
    Console,
    File(PathBuf),
}

/// Outputs enabled by `config`, console first
fn sinks(config: &LoggingConfig) -> Vec<Sink> {
    let mut sinks = Vec::with_capacity(2);
    if config.log_to_console {
        sinks.push(Sink::Console);
    }
    if config.log_to_file {
        if let Some(path) = &config.log_file_path {
            sinks.push(Sink::File(PathBuf::from(path)));
        }
    }
    sinks
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str().to_lowercase()))
}

fn fmt_layer<W>(writer: W, json: bool, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(writer);
    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

fn build_layers(config: &LoggingConfig) -> Result<Vec<BoxedLayer>> {
    sinks(config)
        .into_iter()
        .map(|sink| match sink {
            Sink::Console => Ok(fmt_layer(std::io::stdout, config.json_format, true)),
            Sink::File(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Ok(fmt_layer(Mutex::new(file), config.json_format, false))
            }
        })
        .collect()
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(HookError::ConfigError(errors.join("; ")));
    }

    tracing_subscriber::registry()
        .with(build_layers(config)?)
        .with(env_filter(config))
        .try_init()
        .map_err(|e| HookError::ConfigError(format!("{}: {e}", constants::ERR_LOGGING_INIT)))?;

    tracing::info!(app = %config.app_name, level = %config.log_level, "Logging initialized");
    Ok(())
}
