//! Logging setup: env_logger behind the `log` facade, routed through
//! indicatif when a progress bar owns the terminal.

use indicatif::MultiProgress;

/// Padded label and optional ANSI color for a level.
fn level_label(level: log::Level, color: bool) -> String {
    let (label, ansi) = match level {
        log::Level::Error => ("ERROR", "\x1b[31m"),
        log::Level::Warn => ("WARN ", "\x1b[33m"),
        log::Level::Info => ("INFO ", "\x1b[32m"),
        log::Level::Debug => ("DEBUG", "\x1b[36m"),
        log::Level::Trace => ("TRACE", "\x1b[35m"),
    };
    if color {
        format!("{ansi}{label}\x1b[0m")
    } else {
        label.to_string()
    }
}

/// Filter used when `RUST_LOG` is unset. Dependencies stay at `warn` so
/// reqwest/hyper chatter does not drown row diagnostics.
fn default_filter(quiet: bool, debug: bool) -> String {
    let ours = if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    format!("warn,backfill_core={ours},backfill_providers={ours},backfill_engine={ours},backfill={ours}")
}

/// Logger that prints through indicatif MultiProgress so lines do not tear the batch bar.
pub struct IndicatifLogger {
    inner: env_logger::Logger,
    multi: MultiProgress,
}

impl IndicatifLogger {
    pub fn new(inner: env_logger::Logger, multi: MultiProgress) -> Self {
        Self { inner, multi }
    }
}

impl log::Log for IndicatifLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.inner.enabled(record.metadata()) {
            let line = format!("[{}] {}", level_label(record.level(), true), record.args());
            self.multi.suspend(|| eprintln!("{line}"));
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Initialize logging; pass the progress `MultiProgress` in TTY mode.
///
/// Safe to call more than once: later calls are ignored.
pub fn init_logging(quiet: bool, debug: bool, multi: Option<&MultiProgress>) {
    use std::io::Write;

    let env = env_logger::Env::default().default_filter_or(default_filter(quiet, debug));

    if let Some(multi) = multi {
        let logger = env_logger::Builder::from_env(env).build();
        let max_level = logger.filter();
        if log::set_boxed_logger(Box::new(IndicatifLogger::new(logger, multi.clone()))).is_ok() {
            log::set_max_level(max_level);
        }
    } else {
        // Non-TTY: plain labels with timestamps for log files
        let _ = env_logger::Builder::from_env(env)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{} [{}] {}",
                    buf.timestamp_millis(),
                    level_label(record.level(), false),
                    record.args()
                )
            })
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_labels_are_padded() {
        assert_eq!(level_label(log::Level::Warn, false), "WARN ");
        assert_eq!(level_label(log::Level::Error, false), "ERROR");
    }

    #[test]
    fn colored_label_wraps_reset() {
        let label = level_label(log::Level::Info, true);
        assert!(label.starts_with("\x1b[32m"));
        assert!(label.ends_with("\x1b[0m"));
    }

    #[test]
    fn default_filter_levels() {
        assert!(default_filter(false, true).contains("backfill_engine=debug"));
        assert!(default_filter(true, false).contains("backfill_engine=warn"));
        assert!(default_filter(false, false).starts_with("warn,"));
    }
}
