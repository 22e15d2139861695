//! Logger installation for binaries.
//!
//! The library only emits through the `log` facade; a binary calls
//! [`init_logging`] once at startup. Raw-mode screens must log to a file,
//! since terminal output would corrupt the display.

use std::fs::File;
use std::path::PathBuf;

use log::LevelFilter;
use simplelog::{ColorChoice, Config, ConfigBuilder, TermLogger, TerminalMode, WriteLogger};

/// Level used when `--verbose` is off.
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Terminal,
    File(PathBuf),
}

impl LogTarget {
    /// `$TMPDIR/taskdesk.log`, used while the interactive browser owns the screen.
    pub fn default_file() -> Self {
        LogTarget::File(std::env::temp_dir().join("taskdesk.log"))
    }
}

pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        DEFAULT_LEVEL
    }
}

fn terminal_config() -> Config {
    ConfigBuilder::new()
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .add_filter_allow_str("taskdesk")
        .build()
}

/// Install the logger. A second call is a no-op.
pub fn init_logging(verbose: bool, target: &LogTarget) {
    let level = level_for(verbose);
    let result = match target {
        LogTarget::Terminal => TermLogger::init(
            level,
            terminal_config(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
        LogTarget::File(path) => match File::create(path) {
            Ok(file) => WriteLogger::init(level, terminal_config(), file),
            Err(e) => {
                eprintln!("Warning: cannot open log file {}: {}", path.display(), e);
                return;
            }
        },
    };
    if result.is_err() {
        log::debug!("logger already initialized");
    }
}
