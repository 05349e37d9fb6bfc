use thiserror::Error;

use crate::ode::OdeError;

#[derive(Error, Debug)]
pub enum NnError {
    #[error("{message}：期望形状{expected:?}，实际为{got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },
    #[error("宏步顺序错误：期望第{expected}步，实际收到第{got}步（每批次须先重置状态再按0..K依次执行）")]
    StepOutOfOrder { expected: usize, got: usize },
    #[error("宏步{k}超出范围：每批次只有{steps}步")]
    StepOutOfRange { k: usize, steps: usize },
    #[error("缓存为空，需先执行前向传播：{0}")]
    EmptyCache(&'static str),
    #[error("ODE积分失败：{0}")]
    Ode(#[from] OdeError),
    #[error("无效的检查点文件：{0}")]
    InvalidCheckpoint(String),
    #[error("检查点读写失败：{0}")]
    Io(#[from] std::io::Error),
    #[error("检查点编解码失败：{0}")]
    Codec(#[from] bincode::Error),
}

impl NnError {
    pub(crate) fn shape_mismatch(expected: &[usize], got: &[usize], message: &str) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
            message: message.to_string(),
        }
    }
}
