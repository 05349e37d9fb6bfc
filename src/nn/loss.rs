/*
 * @Date         : 2026-10-12
 * @Description  : Softmax 与交叉熵损失，均按行（每个样本）计算
 */

use super::NnError;
use crate::tensor::Tensor;

/// 数值稳定的按行softmax
/// 输入: [batch, num_classes]
/// 输出: [batch, num_classes]
pub fn softmax_rows(logits: &Tensor) -> Tensor {
    let shape = logits.shape();
    let (batch_size, num_classes) = (shape[0], shape[1]);

    let mut result = Tensor::zeros(shape);
    for r in 0..batch_size {
        let max_val = (0..num_classes)
            .map(|c| logits[[r, c]])
            .fold(f32::NEG_INFINITY, f32::max);
        let mut sum_exp = 0.0f32;
        for c in 0..num_classes {
            let exp_val = (logits[[r, c]] - max_val).exp();
            result[[r, c]] = exp_val;
            sum_exp += exp_val;
        }
        for c in 0..num_classes {
            result[[r, c]] /= sum_exp;
        }
    }
    result
}

/// softmax的反向：已知输出s与上游梯度g，`∂L/∂z = s ⊙ (g - Σ_c g⊙s)`
pub fn softmax_backward(output: &Tensor, upstream: &Tensor) -> Result<Tensor, NnError> {
    if !output.is_same_shape(upstream) || output.dimension() != 2 {
        return Err(NnError::shape_mismatch(
            output.shape(),
            upstream.shape(),
            "softmax反向的上游梯度须与输出同形",
        ));
    }
    let rows = output.shape()[0];
    let dot = (upstream * output).sum_axis(1).reshape(&[rows, 1]);
    Ok(output * (upstream - dot))
}

/// 交叉熵损失（batch平均），标签为one-hot
///
/// 注意：网络输出已经是概率，这里仍会对输入再做一次softmax，
/// 所以梯度是`(softmax(input) - labels) / batch`
#[derive(Debug, Default)]
pub struct CrossEntropyLoss {
    /// 缓存 softmax 结果，用于反向传播
    softmax_cache: Option<Tensor>,
    /// 缓存 labels，用于反向传播
    labels_cache: Option<Tensor>,
}

impl CrossEntropyLoss {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forward(&mut self, input: &Tensor, labels: &Tensor) -> Result<f32, NnError> {
        if !input.is_same_shape(labels) || input.dimension() != 2 {
            return Err(NnError::shape_mismatch(
                input.shape(),
                labels.shape(),
                "交叉熵的输入与one-hot标签须同为[batch, num_classes]",
            ));
        }
        let shape = input.shape();
        let (batch_size, num_classes) = (shape[0], shape[1]);

        // L = -Σ y_c * (x_c - max - log Σ exp(x_j - max))
        let mut total_loss = 0.0f32;
        for r in 0..batch_size {
            let max_val = (0..num_classes)
                .map(|c| input[[r, c]])
                .fold(f32::NEG_INFINITY, f32::max);
            let log_sum_exp = (0..num_classes)
                .map(|c| (input[[r, c]] - max_val).exp())
                .sum::<f32>()
                .ln();
            let label_sum = (0..num_classes).map(|c| labels[[r, c]]).sum::<f32>();
            let dot_product = (0..num_classes)
                .map(|c| input[[r, c]] * labels[[r, c]])
                .sum::<f32>();
            total_loss += -dot_product + (max_val + log_sum_exp) * label_sum;
        }

        self.softmax_cache = Some(softmax_rows(input));
        self.labels_cache = Some(labels.clone());
        Ok(total_loss / batch_size.max(1) as f32)
    }

    /// 损失对输入的梯度
    pub fn backward(&self) -> Result<Tensor, NnError> {
        let softmax = self
            .softmax_cache
            .as_ref()
            .ok_or(NnError::EmptyCache("交叉熵损失"))?;
        let labels = self
            .labels_cache
            .as_ref()
            .ok_or(NnError::EmptyCache("交叉熵损失"))?;
        let batch_size = softmax.shape()[0].max(1) as f32;
        Ok((softmax - labels) / batch_size)
    }
}
