use miette::{miette, Result};
use owo_colors::OwoColorize;
use time::{macros::format_description, OffsetDateTime, UtcOffset};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{format, FmtContext, FormatEvent, FormatFields},
    registry::LookupSpan,
    FmtSubscriber,
};

/// Initialize the logging system, writing to stderr.
///
/// Must be called before spawning any thread, or the local time offset
/// cannot be determined and UTC is used instead.
pub fn init_logging(level: Level) -> Result<()> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let subscriber = FmtSubscriber::builder()
        .event_format(CompactFormatter { offset })
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| miette!("Setting default subscriber failed: {err}"))
}

/// Select the log level from the verbosity flags
pub fn level_from_flags(verbose: u8, quiet: bool) -> Level {
    match (quiet, verbose) {
        (true, _) => Level::WARN,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

/// `HH:MM:SS LEVEL message`, nothing else
struct CompactFormatter {
    offset: UtcOffset,
}

impl<S, N> FormatEvent<S, N> for CompactFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let level = event.metadata().level();

        let now = OffsetDateTime::now_utc()
            .to_offset(self.offset)
            .format(format_description!("[hour]:[minute]:[second]"))
            .map_err(|_| std::fmt::Error)?;

        if writer.has_ansi_escapes() {
            let level = match *level {
                Level::ERROR => level.red().to_string(),
                Level::WARN => level.yellow().to_string(),
                Level::DEBUG => level.blue().to_string(),
                Level::TRACE => level.purple().to_string(),
                _ => level.green().to_string(),
            };

            write!(&mut writer, "{} {:>5} ", now.dimmed(), level)?;
        } else {
            write!(&mut writer, "{now} {level:>5} ")?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_flags() {
        assert_eq!(level_from_flags(0, false), Level::INFO);
        assert_eq!(level_from_flags(1, false), Level::DEBUG);
        assert_eq!(level_from_flags(3, false), Level::TRACE);
        assert_eq!(level_from_flags(2, true), Level::WARN);
    }
}
