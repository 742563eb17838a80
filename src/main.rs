mod checksum;
mod cli;
mod config;
mod engine;
mod manifest;
mod path_filter;
mod progress;

use cli::Cli;
use config::{Config, Mode, ResetPolicy};
use engine::{Engine, EngineError};
use std::fmt as stdfmt;
use std::io::{IsTerminal, stderr};
use std::process::ExitCode;
use tracing::{Event, Level, Subscriber, debug, error, info};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt as tracing_fmt;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;

struct SealExitCode;

impl SealExitCode {
    /// Exit code used when validation found a missing or modified file.
    fn validation_failed() -> ExitCode {
        ExitCode::from(1)
    }

    /// Exit code used for other errors (I/O errors, not initialized, etc.).
    fn any_error() -> ExitCode {
        ExitCode::from(255)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_level.as_deref());

    let config = cli.config();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            match err.downcast_ref::<EngineError>() {
                Some(e) if e.is_validation_failure() => SealExitCode::validation_failed(),
                _ => SealExitCode::any_error(),
            }
        }
    }
}

fn run(config: &Config) -> anyhow::Result<()> {
    let mut engine = Engine::new(config)?;
    debug!(
        "Manifest {} (initialized: {})",
        engine.manifest_file().display(),
        engine.is_initialized()
    );
    let report = |percent: u8| info!("{percent}%");

    match config.mode {
        Mode::Init => {
            let summary = engine.initialize(report)?;
            info!(
                "Initialized {} with {} files",
                engine.root().display(),
                summary.files_recorded
            );
        }
        Mode::Validate => {
            let summary = engine.validate(report)?;
            info!(
                "Validation successful: {} files unchanged",
                summary.files_validated
            );
        }
        Mode::Reset => {
            match config.reset {
                ResetPolicy::BestEffort => engine.reset(),
                ResetPolicy::Strict => engine.try_reset()?,
            }
            info!("Removed {}", engine.manifest_dir().display());
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8, log_level: Option<&str>) {
    let stderr_is_terminal = stderr().is_terminal();
    let formatter = EmojiFormatter { stderr_is_terminal };

    // Progress is the main output, so info is shown unless asked otherwise.
    let filter = match (log_level, verbose) {
        (Some(level), _) => EnvFilter::new(level),
        (None, 0) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        (None, 1) => EnvFilter::new("debug"),
        (None, _) => EnvFilter::new("trace"),
    };

    let fmt_layer = tracing_fmt::layer()
        .event_format(formatter)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

struct EmojiFormatter {
    stderr_is_terminal: bool,
}

impl<S, N> FormatEvent<S, N> for EmojiFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        if self.stderr_is_terminal {
            match *event.metadata().level() {
                Level::TRACE | Level::DEBUG => write!(writer, "🔍 ")?,
                Level::INFO => write!(writer, "ℹ️ ")?,
                Level::WARN => write!(writer, "⚠️  ")?,
                _ => write!(writer, "❌️ ")?,
            }
        } else {
            match *event.metadata().level() {
                Level::TRACE => writer.write_str("TRACE: ")?,
                Level::DEBUG => writer.write_str("DEBUG: ")?,
                Level::INFO => writer.write_str("INFO: ")?,
                Level::WARN => writer.write_str("WARN: ")?,
                _ => writer.write_str("ERROR: ")?,
            }
        }

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
