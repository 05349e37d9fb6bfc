//! # nmode
//!
//! 神经记忆ODE（nmODE）的前向学习：隐状态由一组耦合ODE驱动，
//! 训练时不穿过数值积分器求导，而是同时积分一个伴随状态`q`，
//! 直接给出输入权重与偏置的梯度。
//!
//! - [`ode`]: 数值积分器（Dormand–Prince 5(4)、RK4、Euler）
//! - [`nn`]: ODE耦合层、循环ODE网络、损失、优化器与检查点
//! - [`data`]: MNIST读取、批处理与随机增广
//! - [`train`]: 训练驱动、CSV记录与日志
//! - [`config`]: 训练配置

pub mod config;
pub mod data;
pub mod errors;
pub mod nn;
pub mod ode;
pub mod tensor;
pub mod train;
