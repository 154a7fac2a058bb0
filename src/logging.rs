//! Logging setup.
//!
//! Uses `log4rs.yml` from the working directory when it exists, otherwise a
//! stderr console appender.

use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::Path;

pub const DEFAULT_LOG_CONFIG: &str = "log4rs.yml";

const STDERR_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {h({l:<5})} {t} - {m}{n}";

/// Install the global logger. Failing to set up logging is reported and ignored.
pub fn init(config_file: &str, verbose: bool) {
    if Path::new(config_file).exists() {
        if let Err(e) = log4rs::init_file(config_file, Default::default()) {
            eprintln!("Error initializing log4rs from {config_file}: {e}");
        }
        return;
    }

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let result = stderr_config(level).and_then(|config| {
        log4rs::init_config(config)
            .map(|_handle| ())
            .map_err(|e| e.to_string())
    });
    if let Err(e) = result {
        eprintln!("Error initializing log4rs: {e}");
    }
}

/// Console-only configuration at `level`.
pub fn stderr_config(level: LevelFilter) -> Result<Config, String> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(STDERR_PATTERN)))
        .build();

    Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .map_err(|e| e.to_string())
}
