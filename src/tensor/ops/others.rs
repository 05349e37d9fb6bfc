use crate::errors::TensorError;
use crate::tensor::Tensor;
use ndarray::Axis;

impl From<f32> for Tensor {
    /// 实现 From<f32> trait 用于将`f32`类型转换为形状为`[1]`的张量
    fn from(scalar: f32) -> Self {
        Tensor::new(&[scalar], &[1])
    }
}

impl Tensor {
    /// 对每个元素施加`f`，返回同形状的新张量
    pub fn map<F: Fn(f32) -> f32>(&self, f: F) -> Tensor {
        Tensor {
            data: self.data.mapv(f),
        }
    }

    pub fn sin(&self) -> Tensor {
        self.map(f32::sin)
    }

    pub fn exp(&self) -> Tensor {
        self.map(f32::exp)
    }

    pub fn ln(&self) -> Tensor {
        self.map(f32::ln)
    }

    pub fn powi(&self, n: i32) -> Tensor {
        self.map(|v| v.powi(n))
    }

    pub fn abs(&self) -> Tensor {
        self.map(f32::abs)
    }

    /// 对张量中的所有元素求和
    pub fn sum(&self) -> f32 {
        self.data.sum()
    }

    /// 所有元素的均值（空张量返回0）
    pub fn mean(&self) -> f32 {
        if self.size() == 0 {
            0.0
        } else {
            self.sum() / self.size() as f32
        }
    }

    /// 元素绝对值的最大值（空张量返回0）
    pub fn max_abs(&self) -> f32 {
        self.data.iter().fold(0.0f32, |acc, v| acc.max(v.abs()))
    }

    /// 沿指定轴求和，该轴被消去。如`[b, h]`沿轴0求和得到`[h]`
    pub fn sum_axis(&self, axis: usize) -> Tensor {
        assert!(
            axis < self.dimension(),
            "{}",
            TensorError::AxisOutOfRange {
                axis,
                dimension: self.dimension(),
            }
        );
        Tensor {
            data: self.data.sum_axis(Axis(axis)),
        }
    }

    /// 2阶张量每一行最大值所在的列号（并列时取第一个）
    pub fn argmax_rows(&self) -> Vec<usize> {
        assert!(
            self.dimension() == 2,
            "{}",
            TensorError::DimensionMismatch {
                expected: 2,
                got: self.dimension(),
            }
        );
        self.data
            .outer_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, f32::NEG_INFINITY), |(best_i, best_v), (i, &v)| {
                        if v > best_v { (i, v) } else { (best_i, best_v) }
                    })
                    .0
            })
            .collect()
    }
}
