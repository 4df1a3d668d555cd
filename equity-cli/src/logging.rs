use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

/// Level used when neither `RUST_LOG`, `-v` nor the config sets one.
const DEFAULT_DIRECTIVE: &str = "warn";

// ─── Formatter ───────────────────────────────────────────────────────────────

/// `LEVEL fields` on the terminal; the log file also gets a local timestamp
/// and the emitting module.
struct EquityFmt {
    timestamps: bool,
}

impl<S, N> FormatEvent<S, N> for EquityFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();

        if self.timestamps {
            write!(writer, "{} ", Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"))?;
        }

        let (pre, post) = if ansi {
            match *meta.level() {
                Level::ERROR => ("\x1b[1;31m", "\x1b[0m"),
                Level::WARN => ("\x1b[1;33m", "\x1b[0m"),
                Level::INFO => ("\x1b[1;32m", "\x1b[0m"),
                Level::DEBUG => ("\x1b[1;34m", "\x1b[0m"),
                Level::TRACE => ("\x1b[1;35m", "\x1b[0m"),
            }
        } else {
            ("", "")
        };
        write!(writer, "{}{:>5}{} ", pre, meta.level(), post)?;

        if self.timestamps {
            write!(writer, "{}: ", meta.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// ─── Setup ───────────────────────────────────────────────────────────────────

/// Filter directive for the given `-v` count and configured level.
fn filter_directive(
    verbosity: u8,
    configured: Option<&str>,
) -> &str {
    match verbosity {
        0 => configured.unwrap_or(DEFAULT_DIRECTIVE),
        1 => "debug",
        _ => "trace",
    }
}

fn make_filter(
    verbosity: u8,
    configured: Option<&str>,
) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directive = filter_directive(verbosity, configured);
    EnvFilter::try_new(directive).with_context(|| format!("invalid log level '{directive}'"))
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Installs the global subscriber: stderr always, plus the configured log
/// file when there is one.
pub fn init_logging(
    config: &LoggingConfig,
    verbosity: u8,
) -> Result<()> {
    let filter = make_filter(verbosity, config.level.as_deref())?;

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(EquityFmt { timestamps: false })
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal());

    let file_layer = match &config.file {
        Some(path) => {
            let file = open_log_file(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .event_format(EquityFmt { timestamps: true })
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install the log subscriber")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn verbosity_overrides_configured_level() {
        assert_eq!(filter_directive(0, None), "warn");
        assert_eq!(filter_directive(0, Some("info,equity_core=debug")), "info,equity_core=debug");
        assert_eq!(filter_directive(1, Some("error")), "debug");
        assert_eq!(filter_directive(3, None), "trace");
    }
}
