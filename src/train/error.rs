use std::path::PathBuf;

use thiserror::Error;

use crate::data::DataError;
use crate::nn::NnError;

#[derive(Error, Debug)]
pub enum TrainError {
    #[error(transparent)]
    Nn(#[from] NnError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("写入记录文件{path:?}失败：{source}")]
    Records { path: PathBuf, source: csv::Error },
    #[error("IO错误：{0}")]
    Io(#[from] std::io::Error),
}
