// In: src/logging.rs

//! Opt-in logging for the resolver. The library itself only emits through the
//! `log` facade; this helper wires up `env_logger` for callers that have no
//! logger of their own.

use std::fs::OpenOptions;
use std::sync::Once;

use log::LevelFilter;

use crate::error::LyneError;

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` at `Trace` level, writing `[LEVEL] message` lines
/// to stderr or, when `log_file` is given, appending to that file.
///
/// Only the first call has any effect. A log file that cannot be opened is
/// reported as an error and leaves logging uninitialised.
pub fn enable_verbose_logging(log_file: Option<String>) -> Result<(), LyneError> {
    let target = match log_file {
        Some(filename) => Some(OpenOptions::new().append(true).create(true).open(filename)?),
        None => None,
    };

    INIT_LOGGER.call_once(move || {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(LevelFilter::Trace);

        // Custom formatter: just print the level and message
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = target {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unopenable_log_file_is_an_io_error() {
        let result = enable_verbose_logging(Some("/nonexistent-dir/lyne/trace.log".to_string()));
        assert!(matches!(result, Err(LyneError::Io(_))));
    }
}
