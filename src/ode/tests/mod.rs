
use crate::ode::OdeFunc;
use crate::tensor::Tensor;

/// 用闭包表示的向量场
struct ClosureOde<F>
where
    F: Fn(f32, &Tensor) -> Tensor,
{
    func: F,
}

impl<F> ClosureOde<F>
where
    F: Fn(f32, &Tensor) -> Tensor,
{
    fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> OdeFunc for ClosureOde<F>
where
    F: Fn(f32, &Tensor) -> Tensor,
{
    fn evaluate(&self, t: f32, state: &Tensor) -> Tensor {
        (self.func)(t, state)
    }
}
