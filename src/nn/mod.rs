/*
 * @Date         : 2026-10-11
 * @Description  : 负责nmODE网络的构建：参数、ODE耦合层、损失、优化器与检查点
 */

mod checkpoint;
mod dynamics;
mod error;
mod loss;
mod module;
mod network;
mod ode_layer;
pub mod optimizer;
mod parameter;

pub use checkpoint::{PARAMETER_NAMES, load_checkpoint, save_checkpoint};
pub use dynamics::AdjointDynamics;
pub use error::NnError;
pub use loss::{CrossEntropyLoss, softmax_backward, softmax_rows};
pub use module::Module;
pub use network::{HiddenState, OdeNet};
pub use ode_layer::{OdeLayer, OdeLayerGrads, gamma, integrate_pair, step_span};
pub use optimizer::{Optimizer, Sgd};
pub use parameter::Parameter;

#[cfg(test)]
mod tests;
