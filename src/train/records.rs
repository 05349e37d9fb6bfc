/*
 * @Date         : 2026-10-14
 * @Description  : 训练与测试记录。运行期间只在内存中累积，训练结束时一次性写成CSV
 */

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::TrainError;

/// 可写成CSV的一行记录；`HEADERS`保证即使没有任何记录，文件里也有表头
pub trait Record: Serialize {
    const HEADERS: &'static [&'static str];
}

/// 训练过程中每个宏步的一行：列为`Epoch,Batch,K,K_acc,K_loss`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainRecord {
    #[serde(rename = "Epoch")]
    pub epoch: usize,
    #[serde(rename = "Batch")]
    pub batch: usize,
    /// 宏步编号k
    #[serde(rename = "K")]
    pub step: usize,
    #[serde(rename = "K_acc")]
    pub accuracy: f32,
    #[serde(rename = "K_loss")]
    pub loss: f32,
}

impl Record for TrainRecord {
    const HEADERS: &'static [&'static str] = &["Epoch", "Batch", "K", "K_acc", "K_loss"];
}

/// 每个epoch结束后的测试准确率：列为`Epoch,Acc`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    #[serde(rename = "Epoch")]
    pub epoch: usize,
    #[serde(rename = "Acc")]
    pub accuracy: f32,
}

impl Record for TestRecord {
    const HEADERS: &'static [&'static str] = &["Epoch", "Acc"];
}

/// 把记录整体写入`path`（覆盖已有文件）
pub fn write_records<T: Record, P: AsRef<Path>>(path: P, records: &[T]) -> Result<(), TrainError> {
    let path = path.as_ref();
    let to_error = |source: csv::Error| TrainError::Records {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(to_error)?;
    writer.write_record(T::HEADERS).map_err(to_error)?;
    for record in records {
        writer.serialize(record).map_err(to_error)?;
    }
    writer.flush()?;
    Ok(())
}
