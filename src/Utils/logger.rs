//! Logger setup for binaries and examples. Library code only emits through `log`.
use log::LevelFilter;
use simplelog::{ColorChoice, Config, SimpleLogger, TermLogger, TerminalMode};

/// Installs a terminal logger, or a plain stdout logger where no terminal is available.
/// Returns `false` when a logger was already installed.
pub fn init_logger(level: LevelFilter) -> bool {
    if TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto).is_ok() {
        return true;
    }
    SimpleLogger::init(level, Config::default()).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        let _ = init_logger(LevelFilter::Warn);
        assert!(!init_logger(LevelFilter::Info));
        log::info!("logger installed");
    }
}
