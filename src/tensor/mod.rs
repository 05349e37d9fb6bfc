/*
 * @Date         : 2026-10-09
 * @Description  : 张量（Tensor）。对`ndarray`的动态维数组做一层薄封装，
 *                 只提供nmODE训练所需的构造、运算、形状变换等方法。
 */

use ndarray::{Array, ArrayD, IxDyn};
use rand::Rng;
use rand::distributions::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

use crate::errors::TensorError;

mod ops {
    pub mod arith;
    pub mod eq;
    pub mod index;
    pub mod mat_mul;
    pub mod others;
}

mod property;
mod shape;

#[cfg(test)]
mod tests;

/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 注：只要通Tensor初始化的都是张量（即使标量也是张量）；
/// 而通常意义上的数字（类型为usize、i32、f32等）就只是纯数（number），在这里不被认为是张量。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tensor {
    data: ArrayD<f32>,
}

impl Tensor {
    /// 创建一个张量，若为标量，`shape`可以是[]、[1]、[1,1]...
    /// 若为向量，`shape`可以是[n]、[1,n]、[n,1]；
    /// 若为矩阵，`shape`可以是[n,m]；
    /// 注：`data`的长度必须和`shape`中所有元素的乘积相等，否则panic。
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        let expected: usize = shape.iter().product();
        assert!(
            data.len() == expected,
            "{}",
            TensorError::DataLenMismatch {
                data_len: data.len(),
                shape: shape.to_vec(),
            }
        );
        let data = Array::from_shape_vec(IxDyn(shape), data.to_vec())
            .unwrap_or_else(|e| panic!("{e}"));
        Self { data }
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: ArrayD::zeros(IxDyn(shape)),
        }
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self {
            data: ArrayD::ones(IxDyn(shape)),
        }
    }

    pub fn zeros_like(&self) -> Self {
        Self::zeros(self.shape())
    }

    /// 创建一个随机张量，其值服从[min, max]闭区间上的均匀分布，随机源由调用方提供（便于复现）
    pub fn uniform_with_rng<R: Rng + ?Sized>(min: f32, max: f32, shape: &[usize], rng: &mut R) -> Self {
        let dist = Uniform::new_inclusive(min, max);
        let len = shape.iter().product::<usize>();
        let data = (0..len).map(|_| dist.sample(rng)).collect::<Vec<_>>();
        Self::new(&data, shape)
    }

    /// Kaiming/He 均匀初始化（mode=fan_out，nonlinearity=relu）。
    ///
    /// 对形状为`[out, in]`的权重，`fan_out = out`，采样区间为`[-bound, bound]`，
    /// 其中`bound = sqrt(6 / fan_out)`（即 gain=√2 时的 `gain * sqrt(3 / fan_out)`）。
    pub fn kaiming_uniform_with_rng<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Self {
        assert!(
            shape.len() >= 2,
            "{}",
            TensorError::DimensionMismatch {
                expected: 2,
                got: shape.len(),
            }
        );
        let receptive: usize = shape[2..].iter().product();
        let fan_out = (shape[0] * receptive).max(1);
        let bound = (6.0 / fan_out as f32).sqrt();
        Self::uniform_with_rng(-bound, bound, shape, rng)
    }

    pub(crate) fn from_array(data: ArrayD<f32>) -> Self {
        Self { data }
    }
}
