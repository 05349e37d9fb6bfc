use super::Tensor;
use crate::errors::{Operator, TensorError};
use ndarray::{Axis, IxDyn};

impl Tensor {
    pub fn reshape(&self, shape: &[usize]) -> Self {
        let new_total_elements: usize = shape.iter().product();
        assert!(
            self.size() == new_total_elements,
            "{}",
            TensorError::IncompatibleShape
        );
        let data = self
            .data
            .as_standard_layout()
            .into_owned()
            .into_shape(IxDyn(shape))
            .unwrap_or_else(|e| panic!("{e}"));
        Self { data }
    }

    /// 展平为1阶张量
    pub fn flatten(&self) -> Self {
        self.reshape(&[self.size()])
    }

    /// 矩阵转置（仅限2阶张量），结果为标准（行优先）内存布局
    pub fn transpose(&self) -> Self {
        assert!(
            self.dimension() == 2,
            "{}",
            TensorError::DimensionMismatch {
                expected: 2,
                got: self.dimension(),
            }
        );
        Self {
            data: self.data.t().as_standard_layout().into_owned(),
        }
    }

    /// 判断两个张量能否按 NumPy 规则广播：从右向左对齐，每个维度相等或其中一个为1
    pub fn can_broadcast_with(&self, other: &Self) -> bool {
        self.shape()
            .iter()
            .rev()
            .zip(other.shape().iter().rev())
            .all(|(&a, &b)| a == b || a == 1 || b == 1)
    }

    /// 沿新的第0维堆叠若干形状一致的张量，如2个`[b, h]`得到`[2, b, h]`
    pub fn stack(tensors: &[&Tensor]) -> Self {
        assert!(!tensors.is_empty(), "{}", TensorError::EmptyList);
        let first = tensors[0];
        for t in &tensors[1..] {
            assert!(
                t.is_same_shape(first),
                "{}",
                TensorError::OperatorError {
                    operator: Operator::Stack,
                    tensor1_shape: first.shape().to_vec(),
                    tensor2_shape: t.shape().to_vec(),
                }
            );
        }
        let views = tensors.iter().map(|t| t.data.view()).collect::<Vec<_>>();
        let data = ndarray::stack(Axis(0), &views).unwrap_or_else(|e| panic!("{e}"));
        Self { data }
    }

    /// 取出第0维上的第`index`个子张量（`stack`的逆操作之一）
    pub fn select_first_axis(&self, index: usize) -> Self {
        assert!(
            self.dimension() >= 1,
            "{}",
            TensorError::AxisOutOfRange {
                axis: 0,
                dimension: self.dimension(),
            }
        );
        Self {
            data: self.data.index_axis(Axis(0), index).to_owned(),
        }
    }

    /// 按给定的行号（第0维索引）挑选出若干行组成新张量
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            data: self.data.select(Axis(0), indices),
        }
    }
}
