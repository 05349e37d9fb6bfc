use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Registry, fmt};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("无法打开日志文件{path:?}：{source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("全局日志已初始化过")]
    AlreadyInitialised,
}

/// 安装全局`tracing`订阅者：终端输出一份，若给了`log_file`再以追加方式（不带颜色）写一份。
/// 级别均为INFO
pub fn init_logging(log_file: Option<&Path>) -> Result<(), LoggingError> {
    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_ansi(std::io::stdout().is_terminal());

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggingError::LogFile {
                    path: path.to_path_buf(),
                    source,
                })?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    Registry::default()
        .with(LevelFilter::INFO)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialised)
}
