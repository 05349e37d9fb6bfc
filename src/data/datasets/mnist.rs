//! MNIST 手写数字数据集
//!
//! 支持：
//! - IDX 二进制格式解析（支持 .gz 压缩）
//! - 像素归一化 (0-255 → 0-1)，并展平为 [N, 784]
//! - 标签 one-hot 编码 [N, 10]
//! - 可选自动下载（带 MD5 校验）

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::debug;

use crate::data::download::download_file;
use crate::data::error::DataError;
use crate::data::transforms::{normalize_pixels, one_hot};
use crate::data::TensorDataset;
use crate::tensor::Tensor;

/// MNIST 下载地址（使用 AWS S3 镜像，原官网 yann.lecun.com 不稳定）
const MNIST_BASE_URL: &str = "https://ossci-datasets.s3.amazonaws.com/mnist/";

const IMAGE_SIDE: usize = 28;
const NUM_CLASSES: usize = 10;

/// MNIST 文件名（不含 .gz）及其压缩包的 MD5
pub const MNIST_FILES: [(&str, &str); 4] = [
    ("train-images-idx3-ubyte", "f68b3c2dcbeaaa9fbdd348bbdeb94873"),
    ("train-labels-idx1-ubyte", "d53e105ee54ea40749a09fcbcd1e9432"),
    ("t10k-images-idx3-ubyte", "9fb629c4189551a2d022fa330f9573f3"),
    ("t10k-labels-idx1-ubyte", "ec29112dd5afa0611ce80d1b7f02629c"),
];

/// MNIST 手写数字数据集
///
/// 训练集 60,000 个样本，测试集 10,000 个样本。
/// 每个样本是 28x28 的灰度图像（展平为784维），标签为 0-9。
#[derive(Debug, Clone)]
pub struct MnistDataset {
    /// 图像数据 [N, 784]，取值 [0, 1]
    images: Tensor,
    /// 标签数据 [N, 10] (one-hot)
    labels: Tensor,
    len: usize,
}

impl MnistDataset {
    /// # 参数
    /// - `root`: 数据目录，None 则使用默认目录（见[`default_data_dir`]）
    /// - `train`: true=训练集, false=测试集
    /// - `download`: true=自动下载缺失文件
    pub fn load(root: Option<&Path>, train: bool, download: bool) -> Result<Self, DataError> {
        let data_dir = root
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_data_dir().join("mnist"));

        let (images_entry, labels_entry) = if train {
            (MNIST_FILES[0], MNIST_FILES[1])
        } else {
            (MNIST_FILES[2], MNIST_FILES[3])
        };

        let images_path = ensure_file(&data_dir, images_entry, download)?;
        let labels_path = ensure_file(&data_dir, labels_entry, download)?;
        Self::from_idx_files(&images_path, &labels_path)
    }

    /// 直接从一对 IDX 文件（可为 .gz）构建数据集
    pub fn from_idx_files(images_path: &Path, labels_path: &Path) -> Result<Self, DataError> {
        let images_raw = parse_idx_images(images_path)?;
        let labels_raw = parse_idx_labels(labels_path)?;

        let len = labels_raw.size();
        if images_raw.shape()[0] != len {
            return Err(DataError::LengthMismatch {
                images: images_raw.shape()[0],
                labels: len,
            });
        }
        debug!("已解析 {len} 个 MNIST 样本: {images_path:?}");

        Ok(Self {
            images: normalize_pixels(&images_raw),
            labels: one_hot(&labels_raw, NUM_CLASSES),
            len,
        })
    }

    /// 返回数据集中的样本数量
    pub fn len(&self) -> usize {
        self.len
    }

    /// 数据集是否为空
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 获取第 index 个样本：(image [784], label [10])
    pub fn get(&self, index: usize) -> Result<(Tensor, Tensor), DataError> {
        if index >= self.len {
            return Err(DataError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        let image = self.images.select_rows(&[index]).flatten();
        let label = self.labels.select_rows(&[index]).flatten();
        Ok((image, label))
    }

    pub fn images(&self) -> &Tensor {
        &self.images
    }

    pub fn labels(&self) -> &Tensor {
        &self.labels
    }

    /// 转为可供[`crate::data::DataLoader`]使用的数据集
    pub fn into_tensor_dataset(self) -> TensorDataset {
        TensorDataset::new(self.images, self.labels)
    }
}

/// 获取默认数据目录
pub fn default_data_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nmode")
        .join("datasets")
}

/// 确保文件存在，必要时下载（下载 .gz 版本并校验 MD5）
fn ensure_file(
    data_dir: &Path,
    (base_name, md5): (&str, &str),
    download: bool,
) -> Result<PathBuf, DataError> {
    // 优先使用解压后的文件
    let uncompressed_path = data_dir.join(base_name);
    if uncompressed_path.exists() {
        return Ok(uncompressed_path);
    }

    let gz_path = data_dir.join(format!("{base_name}.gz"));
    if gz_path.exists() {
        return Ok(gz_path);
    }

    if download {
        std::fs::create_dir_all(data_dir)?;
        let url = format!("{MNIST_BASE_URL}{base_name}.gz");
        download_file(&url, &gz_path, Some(md5))?;
        Ok(gz_path)
    } else {
        Err(DataError::FileNotFound(uncompressed_path))
    }
}

/// 按扩展名决定是否经过 gzip 解压
fn open_idx(path: &Path) -> Result<Box<dyn Read>, DataError> {
    let file = File::open(path).map_err(|_| DataError::FileNotFound(path.to_path_buf()))?;
    let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

fn format_error(path: &Path, message: String) -> DataError {
    DataError::FormatError {
        path: path.to_path_buf(),
        message,
    }
}

fn read_be_u32(header: &[u8], offset: usize) -> usize {
    u32::from_be_bytes([
        header[offset],
        header[offset + 1],
        header[offset + 2],
        header[offset + 3],
    ]) as usize
}

/// 解析 IDX 图像文件，返回 [N, 784] 的原始像素值（0-255）
///
/// IDX 格式（大端序）：
/// - [0-3] magic number (0x00000803 = 2051)
/// - [4-7] number of images
/// - [8-11] number of rows
/// - [12-15] number of columns
/// - [16+] pixel data (unsigned byte)
pub(crate) fn parse_idx_images(path: &Path) -> Result<Tensor, DataError> {
    let mut reader = open_idx(path)?;
    let mut header = [0u8; 16];
    reader
        .read_exact(&mut header)
        .map_err(|e| format_error(path, format!("读取头部失败: {e}")))?;

    let magic = read_be_u32(&header, 0);
    if magic != 2051 {
        return Err(format_error(
            path,
            format!("无效的 magic number: {magic} (期望 2051)"),
        ));
    }
    let num_images = read_be_u32(&header, 4);
    let (num_rows, num_cols) = (read_be_u32(&header, 8), read_be_u32(&header, 12));
    if num_rows != IMAGE_SIDE || num_cols != IMAGE_SIDE {
        return Err(format_error(
            path,
            format!("无效的图像尺寸: {num_rows}x{num_cols} (期望 28x28)"),
        ));
    }

    let pixel_count = num_images * IMAGE_SIDE * IMAGE_SIDE;
    let mut pixels = vec![0u8; pixel_count];
    reader
        .read_exact(&mut pixels)
        .map_err(|e| format_error(path, format!("读取像素数据失败: {e}")))?;

    let data: Vec<f32> = pixels.into_iter().map(f32::from).collect();
    Ok(Tensor::new(&data, &[num_images, IMAGE_SIDE * IMAGE_SIDE]))
}

/// 解析 IDX 标签文件，返回 [N] 的类别索引
///
/// IDX 格式（大端序）：
/// - [0-3] magic number (0x00000801 = 2049)
/// - [4-7] number of labels
/// - [8+] label data (unsigned byte, 0-9)
pub(crate) fn parse_idx_labels(path: &Path) -> Result<Tensor, DataError> {
    let mut reader = open_idx(path)?;
    let mut header = [0u8; 8];
    reader
        .read_exact(&mut header)
        .map_err(|e| format_error(path, format!("读取头部失败: {e}")))?;

    let magic = read_be_u32(&header, 0);
    if magic != 2049 {
        return Err(format_error(
            path,
            format!("无效的 magic number: {magic} (期望 2049)"),
        ));
    }
    let num_labels = read_be_u32(&header, 4);

    let mut labels = vec![0u8; num_labels];
    reader
        .read_exact(&mut labels)
        .map_err(|e| format_error(path, format!("读取标签数据失败: {e}")))?;
    if let Some(&bad) = labels.iter().find(|&&l| usize::from(l) >= NUM_CLASSES) {
        return Err(format_error(path, format!("标签越界: {bad}")));
    }

    let data: Vec<f32> = labels.into_iter().map(f32::from).collect();
    Ok(Tensor::new(&data, &[num_labels]))
}
