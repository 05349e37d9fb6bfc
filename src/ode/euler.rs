use super::{OdeError, OdeFunc, OdeSolver, check_span, combine, fixed_steps};
use crate::tensor::Tensor;

/// 显式 Euler 法，定步长。精度最低，主要用于对照
#[derive(Debug, Clone, PartialEq)]
pub struct Euler {
    step_size: f32,
}

impl Euler {
    pub fn new(step_size: f32) -> Self {
        Self { step_size }
    }
}

impl OdeSolver for Euler {
    fn integrate(
        &self,
        func: &dyn OdeFunc,
        y0: &Tensor,
        t_span: (f32, f32),
    ) -> Result<Tensor, OdeError> {
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(OdeError::InvalidStepSize(self.step_size));
        }
        if check_span(t_span)? {
            return Ok(y0.clone());
        }
        let (n, h) = fixed_steps(t_span, self.step_size);

        let mut y = y0.clone();
        for i in 0..n {
            let t = t_span.0 + i as f32 * h;
            let dy = func.evaluate(t, &y);
            y = combine(&y, h, &[(1.0, &dy)]);
            if !y.is_all_finite() {
                return Err(OdeError::NonFinite { t: t + h });
            }
        }
        Ok(y)
    }

    fn name(&self) -> &'static str {
        "euler"
    }
}
