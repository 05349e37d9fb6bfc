/*
 * @Date         : 2026-10-12
 * @Description  : 检查点文件的读写
 *
 * 格式：magic(4) + version(4, 小端) + bincode编码的 名称→张量 映射，
 * 恰好包含`W1`、`W2`、`b`三项
 */

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::NnError;
use crate::tensor::Tensor;

/// 检查点文件魔数
const CHECKPOINT_MAGIC: &[u8; 4] = b"NMCK";
/// 检查点文件版本
const CHECKPOINT_VERSION: u32 = 1;

pub const PARAMETER_NAMES: [&str; 3] = ["W1", "W2", "b"];

pub fn save_checkpoint<P: AsRef<Path>>(
    path: P,
    tensors: &BTreeMap<String, Tensor>,
) -> Result<(), NnError> {
    check_keys(tensors)?;
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    writer.write_all(CHECKPOINT_MAGIC)?;
    writer.write_all(&CHECKPOINT_VERSION.to_le_bytes())?;
    bincode::serialize_into(&mut writer, tensors)?;
    writer.flush()?;
    Ok(())
}

pub fn load_checkpoint<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, Tensor>, NnError> {
    let mut reader = BufReader::new(File::open(path.as_ref())?);

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != CHECKPOINT_MAGIC {
        return Err(NnError::InvalidCheckpoint(
            "魔数不符，这不是nmode格式的检查点文件".to_string(),
        ));
    }
    let mut version_bytes = [0u8; 4];
    reader.read_exact(&mut version_bytes)?;
    let version = u32::from_le_bytes(version_bytes);
    if version != CHECKPOINT_VERSION {
        return Err(NnError::InvalidCheckpoint(format!(
            "不支持的检查点版本：{version}"
        )));
    }

    let tensors: BTreeMap<String, Tensor> = bincode::deserialize_from(&mut reader)?;
    check_keys(&tensors)?;
    Ok(tensors)
}

fn check_keys(tensors: &BTreeMap<String, Tensor>) -> Result<(), NnError> {
    let keys_ok = tensors.len() == PARAMETER_NAMES.len()
        && PARAMETER_NAMES.iter().all(|name| tensors.contains_key(*name));
    if keys_ok {
        Ok(())
    } else {
        Err(NnError::InvalidCheckpoint(format!(
            "参数名须恰好为{:?}，实际为{:?}",
            PARAMETER_NAMES,
            tensors.keys().collect::<Vec<_>>()
        )))
    }
}
