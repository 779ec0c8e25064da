pub const LOG_FILE: &str = "log.out";

/// Log to a terminal, if available. Else, log to [`LOG_FILE`] in the working directory.
pub fn init(level: log::LevelFilter) {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    if has_term {
        // Only fails if a logger is already installed, which is fine.
        let _ = env_logger::builder().filter_level(level).try_init();
    } else {
        let _ = simple_logging::log_to_file(LOG_FILE, level);
    }
}
