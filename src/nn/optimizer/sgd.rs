use std::collections::HashMap;

use super::Optimizer;
use crate::nn::{Module, NnError};
use crate::tensor::Tensor;

/// 带动量的 SGD 优化器（PyTorch 语义）
///
/// - 首次更新：buf = g
/// - 之后：buf = μ * buf + g
/// - θ = θ - α * buf
///
/// μ = 0 时即普通的 θ = θ - α * ∇θ
pub struct Sgd {
    lr: f32,
    momentum: f32,
    /// 动量缓冲（按参数名索引）
    velocity: HashMap<String, Tensor>,
}

impl Sgd {
    pub fn new(lr: f32, momentum: f32) -> Self {
        Self {
            lr,
            momentum,
            velocity: HashMap::new(),
        }
    }

    pub fn momentum(&self) -> f32 {
        self.momentum
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, module: &mut dyn Module) -> Result<(), NnError> {
        for param in module.parameters_mut() {
            let Some(grad) = param.grad() else {
                continue;
            };
            let update = if self.momentum == 0.0 {
                grad.clone()
            } else {
                let buf = match self.velocity.remove(param.name()) {
                    Some(buf) => buf * self.momentum + grad,
                    None => grad.clone(),
                };
                self.velocity.insert(param.name().to_string(), buf.clone());
                buf
            };
            let new_value = param.value() - update * self.lr;
            param.set_value(new_value)?;
        }
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.lr
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn reset(&mut self) {
        self.velocity.clear();
    }
}
