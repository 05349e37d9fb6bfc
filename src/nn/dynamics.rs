/*
 * @Date         : 2026-10-11
 * @Description  : 状态p与伴随状态q的耦合向量场（逐元素）：
 *                 dp = -p + sin²(p + γ)
 *                 dq = -q + sin(2(p + γ)) ⊙ (1 + q)
 *                 时间t不参与计算。q恰好满足p关于γ的敏感度方程，故从q=0出发时q = ∂p/∂γ。
 */

use crate::ode::OdeFunc;
use crate::tensor::Tensor;

pub struct AdjointDynamics<'a> {
    gamma: &'a Tensor,
}

impl<'a> AdjointDynamics<'a> {
    pub fn new(gamma: &'a Tensor) -> Self {
        Self { gamma }
    }

    pub fn derivatives(&self, p: &Tensor, q: &Tensor) -> (Tensor, Tensor) {
        let shifted = p + self.gamma;
        let dp = shifted.sin().powi(2) - p;
        let dq = (&shifted * 2.0).sin() * (1.0 + q) - q;
        (dp, dq)
    }
}

/// 积分时(p, q)堆叠为一个形状为`[2, batch, hidden]`的张量
impl OdeFunc for AdjointDynamics<'_> {
    fn evaluate(&self, _t: f32, state: &Tensor) -> Tensor {
        let p = state.select_first_axis(0);
        let q = state.select_first_axis(1);
        let (dp, dq) = self.derivatives(&p, &q);
        Tensor::stack(&[&dp, &dq])
    }
}
