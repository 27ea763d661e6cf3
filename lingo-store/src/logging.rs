use lingo_core::LogSettings;
use lingo_logger::{LoggerConfig, WorkerGuard};

/// 按设置初始化日志，返回的 guard 需要一直持有
pub fn init_logging(settings: &LogSettings) -> Option<WorkerGuard> {
    logger_config(settings).init()
}

pub fn logger_config(settings: &LogSettings) -> LoggerConfig {
    let config = LoggerConfig::new()
        .level(settings.level.as_str())
        .enable_console(settings.console)
        .enable_file(settings.file)
        .log_dir(settings.dir.clone())
        .file_prefix(settings.file_prefix.as_str());

    match settings.max_files {
        Some(count) => config.max_files(count),
        None => config,
    }
}
