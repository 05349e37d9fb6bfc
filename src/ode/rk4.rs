use super::{OdeError, OdeFunc, OdeSolver, check_span, combine, fixed_steps};
use crate::tensor::Tensor;

/// 经典4阶 Runge–Kutta，定步长
#[derive(Debug, Clone, PartialEq)]
pub struct Rk4 {
    step_size: f32,
}

impl Rk4 {
    pub fn new(step_size: f32) -> Self {
        Self { step_size }
    }
}

impl OdeSolver for Rk4 {
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
            let k1 = func.evaluate(t, &y);
            let k2 = func.evaluate(t + 0.5 * h, &combine(&y, h, &[(0.5, &k1)]));
            let k3 = func.evaluate(t + 0.5 * h, &combine(&y, h, &[(0.5, &k2)]));
            let k4 = func.evaluate(t + h, &combine(&y, h, &[(1.0, &k3)]));
            y = combine(
                &y,
                h,
                &[(1.0 / 6.0, &k1), (1.0 / 3.0, &k2), (1.0 / 3.0, &k3), (1.0 / 6.0, &k4)],
            );
            if !y.is_all_finite() {
                return Err(OdeError::NonFinite { t: t + h });
            }
        }
        Ok(y)
    }

    fn name(&self) -> &'static str {
        "rk4"
    }
}
