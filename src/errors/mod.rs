use thiserror::Error;
mod ops;
pub use self::ops::*;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    // 张量二元运算
    #[error(
        "形状不兼容，故无法{operator}：第一个张量的形状为{tensor1_shape:?}，第二个张量的形状为{tensor2_shape:?}"
    )]
    OperatorError {
        operator: Operator,
        tensor1_shape: Vec<usize>,
        tensor2_shape: Vec<usize>,
    },
    #[error("数据长度{data_len}与形状{shape:?}的元素个数不一致")]
    DataLenMismatch { data_len: usize, shape: Vec<usize> },
    #[error("输入的张量维度必须为{expected}，实际为{got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("张量列表为空")]
    EmptyList,
    #[error("张量形状不兼容")]
    IncompatibleShape,
    #[error("轴{axis}超出范围：张量只有{dimension}个维度")]
    AxisOutOfRange { axis: usize, dimension: usize },
}
