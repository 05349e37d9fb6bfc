use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use ndarray::{ArrayView2, Ix2};

impl Tensor {
    /// 实现矩阵乘法。只接受2阶张量，否则会触发panic。
    /// 需要保证前一个张量的列数（col）等于后一个张量的行数（row），否则也会触发panic。
    pub fn mat_mul(&self, other: &Tensor) -> Tensor {
        let self_data = self.as_matrix();
        let other_data = other.as_matrix();
        // 检查前一个张量的列数是否等于后一个张量的行数
        assert!(
            self.shape()[1] == other.shape()[0],
            "{}",
            TensorError::OperatorError {
                operator: Operator::MatMul,
                tensor1_shape: self.shape().to_vec(),
                tensor2_shape: other.shape().to_vec(),
            }
        );
        Tensor::from_array(self_data.dot(&other_data).into_dyn())
    }

    /// 将动态维度数组转换为常量维度（2维）的视图
    fn as_matrix(&self) -> ArrayView2<'_, f32> {
        assert!(
            self.dimension() == 2,
            "{}",
            TensorError::DimensionMismatch {
                expected: 2,
                got: self.dimension(),
            }
        );
        self.data
            .view()
            .into_dimensionality::<Ix2>()
            .unwrap_or_else(|e| panic!("{e}"))
    }
}
