/*
 * @Date         : 2026-10-10
 * @Description  : Dormand–Prince 5(4) 自适应步长积分器。
 *                 5阶解推进，内嵌4阶解估计局部误差；第7个阶段的导数即下一步的第1个阶段（FSAL）。
 */

use super::{OdeError, OdeFunc, OdeSolver, check_span, combine};
use crate::tensor::Tensor;

// 节点
const C2: f32 = 1.0 / 5.0;
const C3: f32 = 3.0 / 10.0;
const C4: f32 = 4.0 / 5.0;
const C5: f32 = 8.0 / 9.0;

const A21: f32 = 1.0 / 5.0;
const A31: f32 = 3.0 / 40.0;
const A32: f32 = 9.0 / 40.0;
const A41: f32 = 44.0 / 45.0;
const A42: f32 = -56.0 / 15.0;
const A43: f32 = 32.0 / 9.0;
const A51: f32 = 19372.0 / 6561.0;
const A52: f32 = -25360.0 / 2187.0;
const A53: f32 = 64448.0 / 6561.0;
const A54: f32 = -212.0 / 729.0;
const A61: f32 = 9017.0 / 3168.0;
const A62: f32 = -355.0 / 33.0;
const A63: f32 = 46732.0 / 5247.0;
const A64: f32 = 49.0 / 176.0;
const A65: f32 = -5103.0 / 18656.0;

// 5阶权重（同时也是第7阶段的系数）
const B1: f32 = 35.0 / 384.0;
const B3: f32 = 500.0 / 1113.0;
const B4: f32 = 125.0 / 192.0;
const B5: f32 = -2187.0 / 6784.0;
const B6: f32 = 11.0 / 84.0;

// 5阶与4阶权重之差，用于误差估计
const E1: f32 = 71.0 / 57600.0;
const E3: f32 = -71.0 / 16695.0;
const E4: f32 = 71.0 / 1920.0;
const E5: f32 = -17253.0 / 339200.0;
const E6: f32 = 22.0 / 525.0;
const E7: f32 = -1.0 / 40.0;

const SAFETY: f32 = 0.9;
const MIN_FACTOR: f32 = 0.2;
const MAX_FACTOR: f32 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Dopri5 {
    rtol: f32,
    atol: f32,
    max_steps: usize,
}

impl Dopri5 {
    pub fn with_tolerances(rtol: f32, atol: f32, max_steps: usize) -> Self {
        Self {
            rtol,
            atol,
            max_steps,
        }
    }

    pub fn rtol(&self) -> f32 {
        self.rtol
    }

    pub fn atol(&self) -> f32 {
        self.atol
    }

    /// 单步推进，返回(5阶解, 误差估计, 终点导数)
    fn step(
        &self,
        func: &dyn OdeFunc,
        t: f32,
        y: &Tensor,
        k1: &Tensor,
        h: f32,
    ) -> (Tensor, Tensor, Tensor) {
        let k2 = func.evaluate(t + C2 * h, &combine(y, h, &[(A21, k1)]));
        let k3 = func.evaluate(t + C3 * h, &combine(y, h, &[(A31, k1), (A32, &k2)]));
        let k4 = func.evaluate(
            t + C4 * h,
            &combine(y, h, &[(A41, k1), (A42, &k2), (A43, &k3)]),
        );
        let k5 = func.evaluate(
            t + C5 * h,
            &combine(y, h, &[(A51, k1), (A52, &k2), (A53, &k3), (A54, &k4)]),
        );
        let k6 = func.evaluate(
            t + h,
            &combine(
                y,
                h,
                &[(A61, k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)],
            ),
        );
        let y_new = combine(
            y,
            h,
            &[(B1, k1), (B3, &k3), (B4, &k4), (B5, &k5), (B6, &k6)],
        );
        let k7 = func.evaluate(t + h, &y_new);
        let y_err = combine(
            &y.zeros_like(),
            h,
            &[(E1, k1), (E3, &k3), (E4, &k4), (E5, &k5), (E6, &k6), (E7, &k7)],
        );
        (y_new, y_err, k7)
    }

    /// 加权均方根范数，权重为`atol + rtol * max(|y|, |y_new|)`
    fn error_norm(&self, y_err: &Tensor, y: &Tensor, y_new: &Tensor) -> f32 {
        let n = y_err.size().max(1);
        let sum = y_err
            .iter()
            .zip(y.iter().zip(y_new.iter()))
            .map(|(e, (a, b))| {
                let scale = self.atol + self.rtol * a.abs().max(b.abs());
                (e / scale).powi(2)
            })
            .sum::<f32>();
        (sum / n as f32).sqrt()
    }

    fn rms_scaled(&self, v: &Tensor, y: &Tensor) -> f32 {
        let n = v.size().max(1);
        let sum = v
            .iter()
            .zip(y.iter())
            .map(|(x, a)| (x / (self.atol + self.rtol * a.abs())).powi(2))
            .sum::<f32>();
        (sum / n as f32).sqrt()
    }

    /// Hairer 的初始步长估计
    fn initial_step(&self, func: &dyn OdeFunc, t0: f32, y0: &Tensor, f0: &Tensor) -> f32 {
        let d0 = self.rms_scaled(y0, y0);
        let d1 = self.rms_scaled(f0, y0);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };
        let y1 = combine(y0, h0, &[(1.0, f0)]);
        let f1 = func.evaluate(t0 + h0, &y1);
        let d2 = self.rms_scaled(&(&f1 - f0), y0) / h0;
        let h1 = if d1.max(d2) <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(1.0 / 5.0)
        };
        (100.0 * h0).min(h1)
    }

    fn next_step_size(&self, h: f32, err: f32, accepted: bool) -> f32 {
        let factor = if err == 0.0 {
            MAX_FACTOR
        } else {
            (SAFETY * err.powf(-1.0 / 5.0)).clamp(MIN_FACTOR, MAX_FACTOR)
        };
        // 被拒绝的步不允许放大
        if accepted { h * factor } else { h * factor.min(1.0) }
    }
}

impl OdeSolver for Dopri5 {
    fn integrate(
        &self,
        func: &dyn OdeFunc,
        y0: &Tensor,
        t_span: (f32, f32),
    ) -> Result<Tensor, OdeError> {
        if check_span(t_span)? {
            return Ok(y0.clone());
        }
        let (t0, t1) = t_span;

        let mut t = t0;
        let mut y = y0.clone();
        let mut f = func.evaluate(t, &y);
        if !f.is_all_finite() {
            return Err(OdeError::NonFinite { t });
        }
        let mut h = self.initial_step(func, t0, &y, &f).min(t1 - t0);

        let mut steps = 0;
        while t < t1 {
            if steps >= self.max_steps {
                return Err(OdeError::MaxStepsExceeded {
                    max_steps: self.max_steps,
                    t,
                });
            }
            steps += 1;

            let remaining = t1 - t;
            let is_last = h >= remaining;
            let h_try = if is_last { remaining } else { h };
            if !is_last && t + h_try == t {
                return Err(OdeError::StepSizeUnderflow { t, h: h_try });
            }

            let (y_new, y_err, f_new) = self.step(func, t, &y, &f, h_try);
            let err = self.error_norm(&y_err, &y, &y_new);
            if !err.is_finite() {
                return Err(OdeError::NonFinite { t });
            }

            let accepted = err <= 1.0;
            if accepted {
                t = if is_last { t1 } else { t + h_try };
                y = y_new;
                f = f_new;
            }
            h = self.next_step_size(h_try, err, accepted);
        }

        if !y.is_all_finite() {
            return Err(OdeError::NonFinite { t });
        }
        Ok(y)
    }

    fn name(&self) -> &'static str {
        "dopri5"
    }
}
