/*
 * @Date         : 2026-10-11
 * @Description  : Module trait 定义
 */

use super::Parameter;

/// 模块 trait
///
/// - `forward()` **不是** trait 方法（签名各异）
/// - `parameters()`/`parameters_mut()` 签名一致，放入 trait，供优化器与检查点使用
pub trait Module {
    /// 获取所有可训练参数（只读）
    fn parameters(&self) -> Vec<&Parameter>;

    /// 获取所有可训练参数（可写），顺序须与`parameters()`一致
    fn parameters_mut(&mut self) -> Vec<&mut Parameter>;

    /// 参数张量的个数
    fn num_params(&self) -> usize {
        self.parameters().len()
    }

    /// 所有参数的标量元素总数
    fn num_elements(&self) -> usize {
        self.parameters().iter().map(|p| p.value().size()).sum()
    }
}
