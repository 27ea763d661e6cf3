use log::{error, warn};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const DEFAULT_LOG_DIR: &str = "./logs";
const DEFAULT_FILE_PREFIX: &str = "lingo.log";

/// 日志配置构建器
///
/// 控制台输出与按天滚动的文件输出可分别开关。设置了 `RUST_LOG` 时以其为准，
/// 否则使用 `level`。
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// 日志文件前缀 (实际文件名会包含日期，如 lingo.log.2026-10-01)
    file_prefix: String,
    log_dir: PathBuf,
    time_format: String,
    level: String,
    console: bool,
    file: bool,
    /// 保留的最大日志文件数量
    max_files: Option<usize>,
    /// 后台清理的检查间隔；为空时只在初始化时清理一次
    cleanup_interval: Option<Duration>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            level: "info".to_string(),
            console: true,
            file: false,
            max_files: None,
            cleanup_interval: None,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    /// 格式参考 chrono::format::strftime
    pub fn time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    /// 过滤指令，既可以是级别（`debug`），也可以是 `info,lingo_store=trace` 形式
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn enable_console(mut self, enable: bool) -> Self {
        self.console = enable;
        self
    }

    pub fn enable_file(mut self, enable: bool) -> Self {
        self.file = enable;
        self
    }

    pub fn max_files(mut self, count: usize) -> Self {
        self.max_files = Some(count);
        self
    }

    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = Some(interval);
        self
    }

    /// 初始化日志系统
    ///
    /// 返回的 `WorkerGuard` 必须被持有，以确保文件日志在程序结束前被刷新。
    /// 全局 subscriber 已存在时只记录警告，不会覆盖。
    pub fn init(self) -> Option<WorkerGuard> {
        let filter = self.build_filter();
        let console_layer = self.build_console_layer();
        let (file_layer, guard) = self.build_file_layer();

        if let Err(e) = Registry::default()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()
        {
            warn!("Logger already initialized: {}", e);
        }

        self.start_cleanup();
        guard
    }

    fn build_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }

    fn build_console_layer<S>(&self) -> Option<impl Layer<S>>
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        self.console.then(|| {
            fmt::layer()
                .with_timer(ChronoLocal::new(self.time_format.clone()))
                .with_writer(io::stdout)
        })
    }

    fn build_file_layer<S>(&self) -> (Option<impl Layer<S>>, Option<WorkerGuard>)
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        if !self.file {
            return (None, None);
        }

        let file_appender = tracing_appender::rolling::daily(&self.log_dir, &self.file_prefix);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let layer = fmt::layer()
            .with_timer(ChronoLocal::new(self.time_format.clone()))
            .with_ansi(false)
            .with_writer(non_blocking);

        (Some(layer), Some(guard))
    }

    fn start_cleanup(&self) {
        let Some(max_files) = self.max_files.filter(|_| self.file) else {
            return;
        };

        run_cleanup(&self.log_dir, &self.file_prefix, max_files);

        if let Some(interval) = self.cleanup_interval {
            let log_dir = self.log_dir.clone();
            let file_prefix = self.file_prefix.clone();
            std::thread::spawn(move || {
                loop {
                    std::thread::sleep(interval);
                    run_cleanup(&log_dir, &file_prefix, max_files);
                }
            });
        }
    }
}

fn run_cleanup(log_dir: &Path, file_prefix: &str, max_files: usize) {
    if let Err(e) = prune_rolled_logs(log_dir, file_prefix, max_files) {
        error!("Failed to clean up log directory {}: {}", log_dir.display(), e);
    }
}

/// 保留最新的 `keep` 个以 `file_prefix` 开头的日志文件，返回删除的数量
///
/// 依赖滚动文件名的日期后缀可按字典序排序（如 `.2026-10-01`）。
pub fn prune_rolled_logs(log_dir: &Path, file_prefix: &str, keep: usize) -> io::Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let mut log_files: Vec<(PathBuf, String)> = std::fs::read_dir(log_dir)?
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let file_name = entry.file_name().into_string().ok()?;
            file_name
                .starts_with(file_prefix)
                .then(|| (entry.path(), file_name))
        })
        .collect();

    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0;
    for (path, _) in log_files.iter().skip(keep) {
        match std::fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(e) => error!("Failed to remove old log file {:?}: {}", path, e),
        }
    }
    Ok(removed)
}
