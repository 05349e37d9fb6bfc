use thiserror::Error;

/// 数值积分过程中的错误。出现任何一种都意味着本次积分结果不可用
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OdeError {
    #[error("积分区间无效：[{t0}, {t1}]（终点须为有限值且不小于起点）")]
    InvalidSpan { t0: f32, t1: f32 },
    #[error("固定步长必须为有限正数，实际为{0}")]
    InvalidStepSize(f32),
    #[error("在t={t}处出现非有限值（NaN或Inf），数值发散")]
    NonFinite { t: f32 },
    #[error("在t={t}处步长{h}过小，时间已无法继续推进")]
    StepSizeUnderflow { t: f32, h: f32 },
    #[error("已用尽最大步数{max_steps}仍未积分到终点（停在t={t}）")]
    MaxStepsExceeded { max_steps: usize, t: f32 },
}
