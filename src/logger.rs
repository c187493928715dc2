use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use spdlog::sink::{RotatingFileSink, RotationPolicy, StdStream, StdStreamSink};
use spdlog::{Level, LevelFilter, Logger};

use crate::config::{Config, Log, LogLevel};

/// Daily log files kept next to `location`
const KEPT_LOG_FILES: usize = 30;

impl From<LogLevel> for Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Critical => Level::Critical,
            LogLevel::Error => Level::Error,
            LogLevel::Warn => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        }
    }
}

/// Where the records of a `[log]` section go. Something always receives them:
/// without a `location` the console is used even if `log_to_console` is off.
#[derive(Debug, PartialEq)]
struct Destinations<'a> {
    file: Option<&'a Path>,
    console: bool,
}

impl<'a> Destinations<'a> {
    fn of(log: &'a Log) -> Destinations<'a> {
        let file = log.location.as_deref();
        Destinations {
            file,
            console: log.log_to_console || file.is_none(),
        }
    }
}

/// Build progress on stdout, warnings and errors on stderr
fn console_sink(stream: StdStream, filter: LevelFilter) -> spdlog::Result<Arc<StdStreamSink>> {
    let sink = StdStreamSink::builder()
        .std_stream(stream)
        .level_filter(filter)
        .build()?;
    Ok(Arc::new(sink))
}

fn daily_file_sink(location: &Path) -> spdlog::Result<Arc<RotatingFileSink>> {
    let sink = RotatingFileSink::builder()
        .base_path(location)
        .rotation_policy(RotationPolicy::Daily { hour: 0, minute: 0 })
        .max_files(KEPT_LOG_FILES)
        .rotate_on_open(false)
        .build()?;
    Ok(Arc::new(sink))
}

fn build_logger(log: &Log) -> spdlog::Result<Arc<Logger>> {
    let destinations = Destinations::of(log);
    let mut builder = Logger::builder();

    if let Some(location) = destinations.file {
        builder.sink(daily_file_sink(location)?);
    }
    if destinations.console {
        builder.sink(console_sink(StdStream::Stdout, LevelFilter::MoreVerbose(Level::Warn))?);
        builder.sink(console_sink(StdStream::Stderr, LevelFilter::MoreSevereEqual(Level::Warn))?);
    }

    let logger = Arc::new(builder.build()?);
    logger.set_level_filter(LevelFilter::MoreSevereEqual(log.level.into()));
    logger.set_flush_level_filter(LevelFilter::MoreSevereEqual(Level::Info));
    logger.set_flush_period(Some(Duration::from_secs(2)));
    Ok(logger)
}

/// Replaces the default logger when the configuration has a `[log]` section.
/// Without it, spdlog's default console logger stays in place.
pub fn configure_logger(config: &Config) -> spdlog::Result<()> {
    if let Some(ref log) = config.log {
        spdlog::set_default_logger(build_logger(log)?);
    }
    Ok(())
}
