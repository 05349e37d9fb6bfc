/*
 * @Date         : 2026-10-12
 * @Description  : 优化器模块，实现 PyTorch 风格的梯度优化算法
 */

mod sgd;

pub use sgd::Sgd;

use super::{Module, NnError};

/// Optimizer trait（PyTorch 风格）
///
/// # 使用示例
/// ```ignore
/// let mut optimizer = Sgd::new(0.05, 0.9);
/// optimizer.zero_grad(&mut net);
/// let probs = net.forward(&x, k)?;
/// let loss = criterion.forward(&probs, &labels)?;
/// net.backward(&criterion.backward()?)?;
/// optimizer.step(&mut net)?;
/// ```
pub trait Optimizer {
    /// 清零所有参数的梯度
    fn zero_grad(&mut self, module: &mut dyn Module) {
        for param in module.parameters_mut() {
            param.zero_grad();
        }
    }

    /// 用已累积的梯度更新参数；没有梯度的参数保持不变
    fn step(&mut self, module: &mut dyn Module) -> Result<(), NnError>;

    /// 获取学习率
    fn learning_rate(&self) -> f32;

    /// 设置学习率
    fn set_learning_rate(&mut self, lr: f32);

    /// 重置累积状态（如动量缓冲）
    fn reset(&mut self);
}
