/*
 * @Date         : 2026-10-13
 * @Description  : DataLoader - PyTorch 风格的数据批量加载器
 *
 * 提供统一的数据迭代 API，支持：
 * - 自动分批 (batch_size)
 * - 随机打乱 (shuffle)，随机源在各轮之间持续推进，因此每轮顺序不同但整体可复现
 * - 丢弃不完整批次 (drop_last，默认关闭)
 * - 逐样本随机增广 (augment)
 */

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::transforms::Augment;
use crate::tensor::Tensor;

/// TensorDataset - 持有特征和标签的数据集
///
/// # 示例
/// ```ignore
/// let dataset = TensorDataset::new(features, labels);
/// println!("样本数: {}", dataset.len());
/// ```
#[derive(Debug, Clone)]
pub struct TensorDataset {
    features: Tensor,
    labels: Tensor,
    len: usize,
}

impl TensorDataset {
    /// # Panics
    /// 如果 features 和 labels 的样本数（第一维）不一致
    pub fn new(features: Tensor, labels: Tensor) -> Self {
        let len = features.shape()[0];
        assert_eq!(
            len,
            labels.shape()[0],
            "TensorDataset: features 和 labels 的样本数必须一致，得到 {} vs {}",
            len,
            labels.shape()[0]
        );
        Self {
            features,
            labels,
            len,
        }
    }

    /// 获取样本数量
    pub fn len(&self) -> usize {
        self.len
    }

    /// 检查数据集是否为空
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn features(&self) -> &Tensor {
        &self.features
    }

    pub fn labels(&self) -> &Tensor {
        &self.labels
    }
}

/// DataLoader - PyTorch 风格的数据批量加载器
///
/// # 示例
/// ```ignore
/// let mut loader = DataLoader::new(dataset, 256)
///     .shuffle(true)
///     .seed(22)
///     .augment(Augment::mnist());
///
/// for epoch in 0..epochs {
///     for (x_batch, y_batch) in loader.iter() {
///         // ...
///     }
/// }
/// ```
pub struct DataLoader {
    dataset: TensorDataset,
    batch_size: usize,
    shuffle: bool,
    drop_last: bool,
    rng: StdRng,
    augment: Option<Augment>,
}

impl DataLoader {
    pub fn new(dataset: TensorDataset, batch_size: usize) -> Self {
        assert!(batch_size > 0, "DataLoader: batch_size 必须大于 0");
        Self {
            dataset,
            batch_size,
            shuffle: false,
            drop_last: false,
            rng: StdRng::seed_from_u64(0),
            augment: None,
        }
    }

    /// 设置是否打乱数据
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// 设置是否丢弃最后一个不完整的批次
    pub fn drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    /// 设置随机种子（打乱与增广共用同一随机源）
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// 设置逐样本增广
    pub fn augment(mut self, augment: Augment) -> Self {
        self.augment = Some(augment);
        self
    }

    /// 获取批次数量
    pub fn num_batches(&self) -> usize {
        let n = self.dataset.len();
        if self.drop_last {
            n / self.batch_size
        } else {
            n.div_ceil(self.batch_size)
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// 获取数据集大小
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// 开始新的一轮遍历
    pub fn iter(&mut self) -> DataLoaderIterator<'_> {
        let mut indices: Vec<usize> = (0..self.dataset.len()).collect();
        if self.shuffle {
            indices.shuffle(&mut self.rng);
        }
        DataLoaderIterator {
            loader: self,
            indices,
            current_batch: 0,
        }
    }
}

/// DataLoader 迭代器
pub struct DataLoaderIterator<'a> {
    loader: &'a mut DataLoader,
    indices: Vec<usize>,
    current_batch: usize,
}

impl Iterator for DataLoaderIterator<'_> {
    type Item = (Tensor, Tensor);

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.indices.len();
        let batch_size = self.loader.batch_size;
        let start = self.current_batch * batch_size;
        if start >= n {
            return None;
        }

        let end = (start + batch_size).min(n);
        // 如果 drop_last 且批次不完整，则结束
        if self.loader.drop_last && end - start < batch_size {
            return None;
        }
        self.current_batch += 1;

        let batch_indices = &self.indices[start..end];
        let features = self.loader.dataset.features.select_rows(batch_indices);
        let labels = self.loader.dataset.labels.select_rows(batch_indices);
        let features = match &self.loader.augment {
            Some(augment) => augment.apply_batch(&features, &mut self.loader.rng),
            None => features,
        };
        Some((features, labels))
    }
}
