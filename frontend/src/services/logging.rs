use log::{Level, LevelFilter, Log, Metadata};

/// `log` backend writing to the browser console, one line per record:
/// `[target] message`
struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}", record.target(), record.args());
        match record.level() {
            Level::Error => gloo::console::error!(line),
            Level::Warn => gloo::console::warn!(line),
            Level::Info => gloo::console::info!(line),
            Level::Debug | Level::Trace => gloo::console::debug!(line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Install the console logger. Safe to call more than once.
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

/// `data-log-level` value to a filter; unknown values keep `fallback`
pub fn parse_level(value: &str, fallback: LevelFilter) -> LevelFilter {
    value.trim().parse().unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug", LevelFilter::Info), LevelFilter::Debug);
        assert_eq!(parse_level(" WARN ", LevelFilter::Info), LevelFilter::Warn);
        assert_eq!(parse_level("loud", LevelFilter::Info), LevelFilter::Info);
    }
}
