/*
 * @Date         : 2026-10-11
 * @Description  : ODE耦合层：前向用数值积分推进一个宏步，反向不穿过积分器，
 *                 而是直接用保存的伴随状态q给出W1与b的梯度：
 *                 ξ = grad_y ⊙ q，grad_W1 = ξᵗ·x，grad_b = Σ_batch ξ。
 */

use super::{AdjointDynamics, NnError};
use crate::ode::{OdeSolver, Solver};
use crate::tensor::Tensor;

/// 一次前向为反向保存的上下文，只存活于一对前向/反向之间
#[derive(Debug, Clone)]
struct OdeLayerContext {
    x: Tensor,
    y: Tensor,
    q: Tensor,
    w1: Tensor,
    b: Tensor,
}

/// 反向传播的结果：与前向的7个输入一一对应，只有`w1`和`b`有梯度
#[derive(Debug, Default)]
pub struct OdeLayerGrads {
    pub x: Option<Tensor>,
    pub w1: Option<Tensor>,
    pub b: Option<Tensor>,
    pub tbar: Option<Tensor>,
    pub y_prev: Option<Tensor>,
    pub q_prev: Option<Tensor>,
    pub k: Option<Tensor>,
}

pub struct OdeLayer {
    solver: Solver,
    saved: Option<OdeLayerContext>,
}

impl OdeLayer {
    pub fn new(solver: Solver) -> Self {
        Self {
            solver,
            saved: None,
        }
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    pub fn has_context(&self) -> bool {
        self.saved.is_some()
    }

    pub fn clear_context(&mut self) {
        self.saved = None;
    }

    /// 执行第`k`个宏步：以(y, q)为初值在`[(k-1)*tbar, k*tbar]`上积分，返回新的(y, q)
    #[allow(clippy::too_many_arguments)]
    pub fn forward(
        &mut self,
        x: &Tensor,
        w1: &Tensor,
        b: &Tensor,
        tbar: f32,
        y: &Tensor,
        q: &Tensor,
        k: usize,
    ) -> Result<(Tensor, Tensor), NnError> {
        let gamma = gamma(x, w1, b)?;
        if !y.is_same_shape(&gamma) || !q.is_same_shape(&gamma) {
            return Err(NnError::shape_mismatch(
                gamma.shape(),
                if y.is_same_shape(&gamma) { q.shape() } else { y.shape() },
                "隐状态(y, q)的形状须为[batch, hidden]",
            ));
        }
        let (new_y, new_q) = integrate_pair(&self.solver, &gamma, step_span(k, tbar), y, q)?;
        self.saved = Some(OdeLayerContext {
            x: x.clone(),
            y: new_y.clone(),
            q: new_q.clone(),
            w1: w1.clone(),
            b: b.clone(),
        });
        Ok((new_y, new_q))
    }

    /// 自定义反向传播。`grad_q`不参与计算。
    /// 没有先执行前向（上下文缺失）属于调用方的编程错误，直接panic
    pub fn backward(&mut self, grad_y: &Tensor, _grad_q: &Tensor) -> Result<OdeLayerGrads, NnError> {
        let ctx = match self.saved.take() {
            Some(ctx) => ctx,
            None => panic!("ODE耦合层的反向传播缺少前向上下文：须先调用forward，且每次forward只能对应一次backward"),
        };
        if !grad_y.is_same_shape(&ctx.y) {
            return Err(NnError::shape_mismatch(
                ctx.y.shape(),
                grad_y.shape(),
                "grad_y的形状须与该步输出的y一致",
            ));
        }
        let xi = grad_y * &ctx.q;
        let grad_w1 = xi.transpose().mat_mul(&ctx.x);
        let grad_b = xi.sum_axis(0);
        debug_assert!(grad_w1.is_same_shape(&ctx.w1));
        debug_assert!(grad_b.is_same_shape(&ctx.b));
        Ok(OdeLayerGrads {
            w1: Some(grad_w1),
            b: Some(grad_b),
            ..Default::default()
        })
    }
}

/// γ = x·W1ᵗ + b
pub fn gamma(x: &Tensor, w1: &Tensor, b: &Tensor) -> Result<Tensor, NnError> {
    if x.dimension() != 2 || w1.dimension() != 2 || x.shape()[1] != w1.shape()[1] {
        return Err(NnError::shape_mismatch(
            &[x.shape().first().copied().unwrap_or(0), w1.shape().get(1).copied().unwrap_or(0)],
            x.shape(),
            "输入x的形状须为[batch, input]且与W1的列数一致",
        ));
    }
    if b.shape() != [w1.shape()[0]] {
        return Err(NnError::shape_mismatch(
            &[w1.shape()[0]],
            b.shape(),
            "偏置b的形状须为[hidden]",
        ));
    }
    Ok(x.mat_mul(&w1.transpose()) + b)
}

/// 第`k`个宏步的积分窗口`[(k-1)*tbar, k*tbar]`
pub fn step_span(k: usize, tbar: f32) -> (f32, f32) {
    let k = k as f32;
    ((k - 1.0) * tbar, k * tbar)
}

/// 把(p, q)堆叠后一起积分，再拆回两个张量
pub fn integrate_pair(
    solver: &Solver,
    gamma: &Tensor,
    t_span: (f32, f32),
    p0: &Tensor,
    q0: &Tensor,
) -> Result<(Tensor, Tensor), NnError> {
    let dynamics = AdjointDynamics::new(gamma);
    let state = solver.integrate(&dynamics, &Tensor::stack(&[p0, q0]), t_span)?;
    Ok((state.select_first_axis(0), state.select_first_axis(1)))
}
