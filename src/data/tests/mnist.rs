//! MNIST 数据集单元测试
//!
//! 使用临时目录中合成的小型 IDX 文件，不依赖网络

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use approx::assert_abs_diff_eq;
use flate2::Compression;
use flate2::write::GzEncoder;

use crate::data::download::{compute_md5, verify_md5};
use crate::data::{DataError, MnistDataset, default_data_dir};

fn idx_images(count: usize) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&2051u32.to_be_bytes());
    bytes.extend_from_slice(&(count as u32).to_be_bytes());
    bytes.extend_from_slice(&28u32.to_be_bytes());
    bytes.extend_from_slice(&28u32.to_be_bytes());
    for i in 0..count {
        // 第i张图的每个像素都是 i*50
        bytes.extend(std::iter::repeat((i * 50) as u8).take(784));
    }
    bytes
}

fn idx_labels(labels: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&2049u32.to_be_bytes());
    bytes.extend_from_slice(&(labels.len() as u32).to_be_bytes());
    bytes.extend_from_slice(labels);
    bytes
}

fn write_gz(path: &Path, bytes: &[u8]) {
    let mut encoder = GzEncoder::new(fs::File::create(path).unwrap(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap();
}

fn write_pair(dir: &Path, images: &[u8], labels: &[u8]) -> (PathBuf, PathBuf) {
    let images_path = dir.join("images-idx3-ubyte");
    let labels_path = dir.join("labels-idx1-ubyte");
    fs::write(&images_path, images).unwrap();
    fs::write(&labels_path, labels).unwrap();
    (images_path, labels_path)
}

#[test]
fn test_default_data_dir() {
    let dir = default_data_dir();
    assert!(dir.to_string_lossy().contains("nmode"));
    assert!(dir.to_string_lossy().contains("datasets"));
}

#[test]
fn test_parse_raw_idx_files() {
    let dir = tempfile::tempdir().unwrap();
    let (images, labels) = write_pair(dir.path(), &idx_images(3), &idx_labels(&[7, 0, 3]));
    let dataset = MnistDataset::from_idx_files(&images, &labels).unwrap();

    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.images().shape(), &[3, 784]);
    assert_eq!(dataset.labels().shape(), &[3, 10]);

    let (image, label) = dataset.get(1).unwrap();
    assert_eq!(image.shape(), &[784]);
    assert_abs_diff_eq!(image[[0]], 50.0 / 255.0, epsilon = 1e-7);
    assert_eq!(label[[0]], 1.0);
    assert_eq!(label.sum(), 1.0);

    assert!(matches!(
        dataset.get(3),
        Err(DataError::IndexOutOfBounds { index: 3, len: 3 })
    ));
}

#[test]
fn test_load_gz_files_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_gz(&dir.path().join("t10k-images-idx3-ubyte.gz"), &idx_images(2));
    write_gz(&dir.path().join("t10k-labels-idx1-ubyte.gz"), &idx_labels(&[4, 9]));

    let dataset = MnistDataset::load(Some(dir.path()), false, false).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.labels()[[1, 9]], 1.0);

    let tensor_dataset = dataset.into_tensor_dataset();
    assert_eq!(tensor_dataset.len(), 2);
}

#[test]
fn test_missing_files_without_download() {
    let dir = tempfile::tempdir().unwrap();
    let err = MnistDataset::load(Some(dir.path()), true, false).unwrap_err();
    assert!(matches!(err, DataError::FileNotFound(_)));
}

#[test]
fn test_invalid_magic() {
    let dir = tempfile::tempdir().unwrap();
    let mut images = idx_images(1);
    images[3] = 0x01;
    let (images, labels) = write_pair(dir.path(), &images, &idx_labels(&[1]));
    let err = MnistDataset::from_idx_files(&images, &labels).unwrap_err();
    assert!(err.to_string().contains("magic number"), "错误信息: {err}");
}

#[test]
fn test_truncated_and_mismatched_files() {
    let dir = tempfile::tempdir().unwrap();

    let mut truncated = idx_images(2);
    truncated.truncate(16 + 784 + 10);
    let (images, labels) = write_pair(dir.path(), &truncated, &idx_labels(&[1, 2]));
    assert!(matches!(
        MnistDataset::from_idx_files(&images, &labels),
        Err(DataError::FormatError { .. })
    ));

    let (images, labels) = write_pair(dir.path(), &idx_images(2), &idx_labels(&[1, 2, 3]));
    assert!(matches!(
        MnistDataset::from_idx_files(&images, &labels),
        Err(DataError::LengthMismatch { images: 2, labels: 3 })
    ));

    let (images, labels) = write_pair(dir.path(), &idx_images(1), &idx_labels(&[12]));
    assert!(matches!(
        MnistDataset::from_idx_files(&images, &labels),
        Err(DataError::FormatError { .. })
    ));
}

#[test]
fn test_md5() {
    assert_eq!(compute_md5(b""), "d41d8cd98f00b204e9800998ecf8427e");
    assert!(verify_md5(b"", "d41d8cd98f00b204e9800998ecf8427e").is_ok());
    assert!(matches!(
        verify_md5(b"abc", "d41d8cd98f00b204e9800998ecf8427e"),
        Err(DataError::ChecksumMismatch { .. })
    ));
}
