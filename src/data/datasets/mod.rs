//! 内置数据集：MNIST 手写数字（分类）

mod mnist;

pub use mnist::{MNIST_FILES, MnistDataset, default_data_dir};
