//! 数据加载模块
//!
//! 提供数据集加载、变换和批处理功能。
//!
//! # 主要组件
//!
//! - [`DataLoader`]: `PyTorch` 风格的数据批量加载器
//! - [`TensorDataset`]: 持有特征和标签的数据集
//! - [`MnistDataset`]: MNIST 手写数字数据集
//! - [`transforms`]: 数据变换（归一化、one-hot、随机增广）
//! - [`DataError`]: 数据加载错误类型

mod dataloader;
pub mod datasets;
pub mod download;
pub mod error;
pub mod transforms;

#[cfg(test)]
mod tests;

pub use dataloader::{DataLoader, DataLoaderIterator, TensorDataset};
pub use datasets::{MnistDataset, default_data_dir};
pub use error::DataError;
pub use transforms::Augment;
