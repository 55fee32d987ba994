// Logging setup
//
// Operations log through the `log` facade. The CLI installs a fern dispatcher:
// a stderr chain when --verbose is set and a file chain when --log-file is given.
// With neither, no logger is installed and log records are discarded.

use std::env;
use std::path::Path;
use std::process;
use std::thread;

use chrono::Local;
use fern::Dispatch;
use log::LevelFilter;

use crate::constants::ENV_LOG_LEVEL;

/// Map a level name to a filter. Unknown names fall back to Info.
pub fn parse_level(name: &str) -> LevelFilter {
    match name.trim().to_uppercase().as_str() {
        "OFF" => LevelFilter::Off,
        "ERROR" => LevelFilter::Error,
        "WARN" | "WARNING" => LevelFilter::Warn,
        "DEBUG" => LevelFilter::Debug,
        "TRACE" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Verbose forces Debug, otherwise AUGMENT_FREE_LOG, otherwise Info.
pub fn effective_level(verbose: bool, env_value: Option<&str>) -> LevelFilter {
    if verbose {
        return LevelFilter::Debug;
    }
    env_value.map(parse_level).unwrap_or(LevelFilter::Info)
}

pub fn setup_logging(verbose: bool, log_file: Option<&Path>) -> Result<(), fern::InitError> {
    if !verbose && log_file.is_none() {
        return Ok(());
    }

    let env_level = env::var(ENV_LOG_LEVEL).ok();
    let level = effective_level(verbose, env_level.as_deref());

    let mut dispatch = Dispatch::new()
        .format(|out, msg, record| {
            out.finish(format_args!(
                "[{}][{:5}][{}][pid={}][tid={:?}] {}",
                Local::now().to_rfc3339(),
                record.level(),
                record.target(),
                process::id(),
                thread::current().id(),
                msg
            ))
        })
        .level(level);

    if verbose {
        dispatch = dispatch.chain(std::io::stderr());
    }

    if let Some(path) = log_file {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level(" WARN "), LevelFilter::Warn);
        assert_eq!(parse_level("warning"), LevelFilter::Warn);
        assert_eq!(parse_level("off"), LevelFilter::Off);
        assert_eq!(parse_level("chatty"), LevelFilter::Info);
    }

    #[test]
    fn test_effective_level() {
        assert_eq!(effective_level(true, Some("error")), LevelFilter::Debug);
        assert_eq!(effective_level(false, Some("error")), LevelFilter::Error);
        assert_eq!(effective_level(false, None), LevelFilter::Info);
    }

    #[test]
    fn test_nothing_to_install_is_ok() {
        assert!(setup_logging(false, None).is_ok());
    }
}
