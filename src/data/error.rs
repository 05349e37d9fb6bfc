//! 数据加载错误类型定义

use std::path::PathBuf;
use thiserror::Error;

/// 数据加载相关错误
#[derive(Debug, Error)]
pub enum DataError {
    /// 文件未找到（且未开启下载）
    #[error("文件未找到: {0}")]
    FileNotFound(PathBuf),

    /// IO 错误
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    /// IDX 文件格式错误（magic number、尺寸或长度不符）
    #[error("IDX 格式错误({path:?}): {message}")]
    FormatError { path: PathBuf, message: String },

    /// 索引越界
    #[error("索引越界: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// 图像与标签数量不一致
    #[error("样本数不一致: 图像 {images} 个, 标签 {labels} 个")]
    LengthMismatch { images: usize, labels: usize },

    /// 下载错误
    #[error("下载错误: {0}")]
    DownloadError(String),

    /// 校验和不匹配
    #[error("MD5 校验和不匹配: 期望 {expected}, 实际 {got}")]
    ChecksumMismatch { expected: String, got: String },
}
