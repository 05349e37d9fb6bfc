use super::NnError;
use crate::tensor::Tensor;

/// 可训练参数：值与（可选的）累积梯度。梯度为`None`表示自上次清零后没有任何梯度流入
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    value: Tensor,
    grad: Option<Tensor>,
}

impl Parameter {
    pub fn new(name: &str, value: Tensor) -> Self {
        Self {
            name: name.to_string(),
            value,
            grad: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Tensor {
        &self.value
    }

    pub fn grad(&self) -> Option<&Tensor> {
        self.grad.as_ref()
    }

    /// 替换参数值，形状必须与原值一致
    pub fn set_value(&mut self, value: Tensor) -> Result<(), NnError> {
        if !value.is_same_shape(&self.value) {
            return Err(NnError::shape_mismatch(
                self.value.shape(),
                value.shape(),
                &format!("参数`{}`的新值形状不符", self.name),
            ));
        }
        self.value = value;
        Ok(())
    }

    pub fn zero_grad(&mut self) {
        self.grad = None;
    }

    /// 把`grad`累加到已有梯度上
    pub fn accumulate_grad(&mut self, grad: &Tensor) -> Result<(), NnError> {
        if !grad.is_same_shape(&self.value) {
            return Err(NnError::shape_mismatch(
                self.value.shape(),
                grad.shape(),
                &format!("参数`{}`的梯度形状不符", self.name),
            ));
        }
        self.grad = Some(match self.grad.take() {
            Some(acc) => acc + grad,
            None => grad.clone(),
        });
        Ok(())
    }
}
