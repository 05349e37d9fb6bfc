//! 通用下载工具：HTTP 下载 + MD5 校验

use std::io::Read;
use std::path::Path;

use md5::{Digest, Md5};
use tracing::info;

use super::error::DataError;

/// 下载文件并保存到`dest_path`
///
/// 提供`expected_md5`时先校验下载内容，校验失败不会写入文件
pub fn download_file(
    url: &str,
    dest_path: &Path,
    expected_md5: Option<&str>,
) -> Result<(), DataError> {
    info!("正在下载 {url} ...");

    let response = ureq::get(url)
        .call()
        .map_err(|e| DataError::DownloadError(format!("HTTP 请求失败: {e}")))?;

    if response.status() != 200 {
        return Err(DataError::DownloadError(format!(
            "HTTP 状态码: {}",
            response.status()
        )));
    }

    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| DataError::DownloadError(format!("读取响应失败: {e}")))?;

    if let Some(expected) = expected_md5 {
        verify_md5(&bytes, expected)?;
    }

    std::fs::write(dest_path, &bytes)?;
    info!("下载完成: {dest_path:?}");
    Ok(())
}

/// 校验数据的 MD5（十六进制小写）
pub fn verify_md5(data: &[u8], expected: &str) -> Result<(), DataError> {
    let got = compute_md5(data);
    if got == expected {
        Ok(())
    } else {
        Err(DataError::ChecksumMismatch {
            expected: expected.to_string(),
            got,
        })
    }
}

/// 计算数据的 MD5 校验码
pub fn compute_md5(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
