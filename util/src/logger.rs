//! Logging setup for executables
//!
//! Log lines are stamped with the seconds elapsed since the session epoch and
//! a short coloured level tag. Debug and trace lines also carry the module
//! path they came from.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{self, info, Record};
use std::fmt::Arguments;
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Info messages must not be filtered out, found minimum level `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Could not open the session log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("A logger is already installed: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Install the global logger.
///
/// Output goes to stdout, and to the session's log file when a session is
/// given. `module_levels` overrides `min_level` for individual module paths,
/// for example to keep a chatty module at `Debug` while everything else logs
/// at `Trace`.
///
/// Can only succeed once per process.
pub fn logger_init(
    min_level: LevelFilter,
    session: Option<&session::Session>,
    module_levels: &[(&'static str, LevelFilter)]
) -> Result<(), LoggerInitError> {

    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    // Logging without a session still needs an epoch for the timestamps
    session::init_epoch();

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("{}", format_line(message, record)))
        })
        .level(min_level);

    for (module, level) in module_levels {
        dispatch = dispatch.level_for(*module, *level);
    }

    dispatch = dispatch.chain(std::io::stdout());

    if let Some(s) = session {
        let file = fern::log_file(&s.log_file_path)
            .map_err(LoggerInitError::LogFileInitError)?;
        dispatch = dispatch.chain(file);
    }

    dispatch.apply().map_err(LoggerInitError::FernInitError)?;

    info!("Logger installed at {:?}, epoch {}", min_level, session::get_epoch());
    if let Some(s) = session {
        info!("    Writing to {:?}", s.log_file_path);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn format_line(message: &Arguments, record: &Record) -> String {
    if record.level() > log::Level::Info {
        format!(
            "[{:10.6} {}] {}: {}",
            session::get_elapsed_seconds(),
            level_tag(record.level()),
            record.target(),
            message
        )
    }
    else {
        format!(
            "[{:10.6} {}] {}",
            session::get_elapsed_seconds(),
            level_tag(record.level()),
            message
        )
    }
}

/// Three letter tag for a log level
fn level_tag(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info  => "INF".normal(),
        log::Level::Warn  => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_min_level_rejected() {
        // Rejected before any global state is touched
        assert!(matches!(
            logger_init(LevelFilter::Warn, None, &[]),
            Err(LoggerInitError::InvalidMinLogLevel(LevelFilter::Warn))
        ));
    }
}
