use colored::*;
use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Event formatter for the analysis console output
///
/// Colors the whole line by level and marks warnings and errors with a
/// `warning:`/`error:` prefix. No timestamps, targets or level columns.
pub struct ColorizedFormatter;

impl ColorizedFormatter {
    fn prefix(level: &Level) -> &'static str {
        match *level {
            Level::WARN => "warning: ",
            Level::ERROR => "error: ",
            _ => "",
        }
    }
}

impl<S, N> FormatEvent<S, N> for ColorizedFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let level = event.metadata().level();
        let mut buffer = String::from(Self::prefix(level));
        let mut buf_writer = Writer::new(&mut buffer);
        ctx.format_fields(buf_writer.by_ref(), event)?;

        let colored_output = match *level {
            Level::INFO => buffer.normal(),
            Level::WARN => buffer.yellow(),
            Level::ERROR => buffer.red().bold(),
            Level::DEBUG => buffer.blue(),
            Level::TRACE => buffer.purple(),
        };

        writeln!(writer, "{}", colored_output)
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` overrides the default `info` filter. Verbose mode switches to
/// the standard formatter with levels and targets and defaults to `debug`.
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    if verbose {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .event_format(ColorizedFormatter)
            .init();
    }
}
