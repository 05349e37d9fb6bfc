/*
 * @Date         : 2026-10-10
 * @Description  : 常微分方程（ODE）数值积分。
 *                 只关心“给定向量场、时间区间和初值，求终点状态”这一件事，
 *                 不输出中间时刻的轨迹。
 */

mod dopri5;
mod error;
mod euler;
mod rk4;

pub use dopri5::Dopri5;
pub use error::OdeError;
pub use euler::Euler;
pub use rk4::Rk4;

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::tensor::Tensor;

#[cfg(test)]
mod tests;

/// 向量场 dy/dt = f(t, y)
pub trait OdeFunc {
    fn evaluate(&self, t: f32, state: &Tensor) -> Tensor;
}

#[enum_dispatch]
pub trait OdeSolver {
    /// 从`y0`出发，在`t_span = (t0, t1)`上积分，返回t1时刻的状态。
    /// `t0 == t1`时原样返回`y0`；`t1 < t0`或区间端点非有限值时返回错误。
    fn integrate(
        &self,
        func: &dyn OdeFunc,
        y0: &Tensor,
        t_span: (f32, f32),
    ) -> Result<Tensor, OdeError>;

    fn name(&self) -> &'static str;
}

#[enum_dispatch(OdeSolver)]
#[derive(Debug, Clone, PartialEq)]
pub enum Solver {
    Dopri5(Dopri5),
    Rk4(Rk4),
    Euler(Euler),
}

impl Solver {
    pub fn from_config(config: &SolverConfig) -> Self {
        match config.method {
            SolverMethod::Dopri5 => {
                Dopri5::with_tolerances(config.rtol, config.atol, config.max_steps).into()
            }
            SolverMethod::Rk4 => Rk4::new(config.step_size).into(),
            SolverMethod::Euler => Euler::new(config.step_size).into(),
        }
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::from_config(&SolverConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverMethod {
    #[default]
    Dopri5,
    Rk4,
    Euler,
}

/// 积分器配置。`rtol`/`atol`/`max_steps`只对自适应的`dopri5`有效，
/// `step_size`只对定步长的`rk4`/`euler`有效
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub method: SolverMethod,
    pub rtol: f32,
    pub atol: f32,
    pub max_steps: usize,
    pub step_size: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            method: SolverMethod::Dopri5,
            rtol: 1e-5,
            atol: 1e-7,
            max_steps: 10_000,
            step_size: 0.005,
        }
    }
}

/// 检查积分区间。返回`Ok(true)`表示区间长度为0，调用方应直接返回初值
pub(crate) fn check_span(t_span: (f32, f32)) -> Result<bool, OdeError> {
    let (t0, t1) = t_span;
    if !t0.is_finite() || !t1.is_finite() || t1 < t0 {
        return Err(OdeError::InvalidSpan { t0, t1 });
    }
    Ok(t0 == t1)
}

/// `y + h * Σ coef_i * k_i`，各阶段的线性组合
pub(crate) fn combine(y: &Tensor, h: f32, terms: &[(f32, &Tensor)]) -> Tensor {
    terms
        .iter()
        .fold(y.clone(), |acc, (coef, k)| acc + *k * (h * coef))
}

/// 定步长方法的步数与实际步长：`n = ceil(span / step_size)`，`h = span / n`
pub(crate) fn fixed_steps(t_span: (f32, f32), step_size: f32) -> (usize, f32) {
    let span = t_span.1 - t_span.0;
    let n = ((span / step_size).ceil() as usize).max(1);
    (n, span / n as f32)
}
