/*
 * @Date         : 2026-10-12
 * @Description  : 循环ODE网络。持有参数W1、W2、b以及跨宏步传递的隐状态(y, q)；
 *                 每个批次先重置状态，再按0..K依次执行宏步，每步输出类别概率。
 */

use std::collections::BTreeMap;
use std::path::Path;

use rand::Rng;

use super::checkpoint::{load_checkpoint, save_checkpoint};
use super::loss::{softmax_backward, softmax_rows};
use super::ode_layer::{gamma, integrate_pair};
use super::{Module, NnError, OdeLayer, Parameter};
use crate::config::Config;
use crate::ode::Solver;
use crate::tensor::Tensor;

/// 隐状态对(y, q)，形状均为[batch, hidden]
#[derive(Debug, Clone, PartialEq)]
pub struct HiddenState {
    pub y: Tensor,
    pub q: Tensor,
}

impl HiddenState {
    pub fn zeros(batch_size: usize, hidden_size: usize) -> Self {
        Self {
            y: Tensor::zeros(&[batch_size, hidden_size]),
            q: Tensor::zeros(&[batch_size, hidden_size]),
        }
    }

    /// 按值拷贝出一份，作为下一步的初值（不携带任何梯度历史）
    pub fn detached(&self) -> Self {
        self.clone()
    }
}

/// 最近一次前向为网络自身的反向保存的量
#[derive(Debug, Clone)]
struct StepCache {
    y: Tensor,
    probs: Tensor,
}

pub struct OdeNet {
    w1: Parameter,
    w2: Parameter,
    b: Parameter,
    input_size: usize,
    hidden_size: usize,
    num_classes: usize,
    batch_size: usize,
    tbar: f32,
    steps: usize,
    state: HiddenState,
    next_step: usize,
    layer: OdeLayer,
    step_cache: Option<StepCache>,
}

impl OdeNet {
    /// W1、W2采用 Kaiming 均匀初始化（fan_out），b 初始化为0；随机源由调用方给定
    pub fn new<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> Self {
        let w1 = Tensor::kaiming_uniform_with_rng(&[config.hidden_size, config.input_size], rng);
        let w2 = Tensor::kaiming_uniform_with_rng(&[config.num_classes, config.hidden_size], rng);
        let b = Tensor::zeros(&[config.hidden_size]);
        Self {
            w1: Parameter::new("W1", w1),
            w2: Parameter::new("W2", w2),
            b: Parameter::new("b", b),
            input_size: config.input_size,
            hidden_size: config.hidden_size,
            num_classes: config.num_classes,
            batch_size: config.batch_size,
            tbar: config.tbar,
            steps: config.steps,
            state: HiddenState::zeros(config.batch_size, config.hidden_size),
            next_step: 0,
            layer: OdeLayer::new(Solver::from_config(&config.solver)),
            step_cache: None,
        }
    }

    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓属性↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    pub fn w1(&self) -> &Parameter {
        &self.w1
    }

    pub fn w2(&self) -> &Parameter {
        &self.w2
    }

    pub fn b(&self) -> &Parameter {
        &self.b
    }

    pub fn state(&self) -> &HiddenState {
        &self.state
    }

    /// 下一个应执行的宏步编号
    pub fn next_step(&self) -> usize {
        self.next_step
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn tbar(&self) -> f32 {
        self.tbar
    }
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑属性↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

    /// 把(y, q)清零为[batch_size, hidden]，并回到第0步。多次调用结果相同
    pub fn init_state(&mut self) {
        self.state = HiddenState::zeros(self.batch_size, self.hidden_size);
        self.next_step = 0;
        self.step_cache = None;
        self.layer.clear_context();
    }

    /// 执行第`k`个宏步，就地更新隐状态，返回`softmax(y·W2ᵗ)`
    pub fn forward(&mut self, input: &Tensor, k: usize) -> Result<Tensor, NnError> {
        if k >= self.steps {
            return Err(NnError::StepOutOfRange {
                k,
                steps: self.steps,
            });
        }
        if k != self.next_step {
            return Err(NnError::StepOutOfOrder {
                expected: self.next_step,
                got: k,
            });
        }
        let expected = [self.batch_size, self.input_size];
        if input.shape() != expected {
            return Err(NnError::shape_mismatch(&expected, input.shape(), "输入批次的形状不符"));
        }

        let prev = self.state.detached();
        let (y, q) = self.layer.forward(
            input,
            self.w1.value(),
            self.b.value(),
            self.tbar,
            &prev.y,
            &prev.q,
            k,
        )?;
        let probs = softmax_rows(&y.mat_mul(&self.w2.value().transpose()));

        self.step_cache = Some(StepCache {
            y: y.clone(),
            probs: probs.clone(),
        });
        self.state = HiddenState { y, q };
        self.next_step += 1;
        Ok(probs)
    }

    /// 已知损失对本步输出概率的梯度，把梯度累加到W1、W2、b上
    pub fn backward(&mut self, grad_probs: &Tensor) -> Result<(), NnError> {
        let cache = self
            .step_cache
            .take()
            .ok_or(NnError::EmptyCache("循环ODE网络"))?;
        let grad_z = softmax_backward(&cache.probs, grad_probs)?;
        let grad_w2 = grad_z.transpose().mat_mul(&cache.y);
        let grad_y = grad_z.mat_mul(self.w2.value());
        let grads = self.layer.backward(&grad_y, &grad_y.zeros_like())?;

        self.w2.accumulate_grad(&grad_w2)?;
        if let Some(grad_w1) = grads.w1 {
            self.w1.accumulate_grad(&grad_w1)?;
        }
        if let Some(grad_b) = grads.b {
            self.b.accumulate_grad(&grad_b)?;
        }
        Ok(())
    }

    /// 推理：从零状态出发一次性积分整个时域`[0, K*tbar]`，不保存任何反向上下文。
    /// 批次大小取输入的行数
    pub fn evaluate(&self, input: &Tensor) -> Result<Tensor, NnError> {
        let gamma = gamma(input, self.w1.value(), self.b.value())?;
        let rows = input.shape()[0];
        let zeros = Tensor::zeros(&[rows, self.hidden_size]);
        let horizon = self.steps as f32 * self.tbar;
        let (y, _q) = integrate_pair(self.layer.solver(), &gamma, (0.0, horizon), &zeros, &zeros)?;
        Ok(softmax_rows(&y.mat_mul(&self.w2.value().transpose())))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), NnError> {
        let tensors = self
            .parameters()
            .into_iter()
            .map(|p| (p.name().to_string(), p.value().clone()))
            .collect::<BTreeMap<_, _>>();
        save_checkpoint(path, &tensors)
    }

    /// 读入检查点并替换全部三个参数；任一形状不符则不做任何修改
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), NnError> {
        let mut tensors = load_checkpoint(path)?;
        for p in self.parameters() {
            let loaded = tensors.get(p.name()).ok_or_else(|| {
                NnError::InvalidCheckpoint(format!("缺少参数`{}`", p.name()))
            })?;
            if !loaded.is_same_shape(p.value()) {
                return Err(NnError::shape_mismatch(
                    p.value().shape(),
                    loaded.shape(),
                    &format!("检查点中参数`{}`的形状与网络不符", p.name()),
                ));
            }
        }
        for p in self.parameters_mut() {
            if let Some(value) = tensors.remove(p.name()) {
                p.set_value(value)?;
            }
            p.zero_grad();
        }
        Ok(())
    }
}

impl Module for OdeNet {
    fn parameters(&self) -> Vec<&Parameter> {
        vec![&self.w1, &self.w2, &self.b]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        vec![&mut self.w1, &mut self.w2, &mut self.b]
    }
}
