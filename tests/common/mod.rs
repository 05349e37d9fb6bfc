//! 集成测试共用的小网络配置与合成数据
#![allow(dead_code)]

use nmode::config::Config;
use nmode::tensor::Tensor;

/// batch 4、input 4、hidden 8、2类、K=2，不带动量
pub fn tiny_config() -> Config {
    Config {
        batch_size: 4,
        input_size: 4,
        hidden_size: 8,
        num_classes: 2,
        steps: 2,
        tbar: 0.5,
        alpha: 0.5,
        momentum: 0.0,
        ..Config::default()
    }
}

/// 两类样本分别集中在前两维和后两维
pub fn synthetic_batch() -> (Tensor, Tensor) {
    let x = Tensor::new(
        &[
            1.0, 0.8, 0.0, 0.1, //
            0.9, 1.0, 0.1, 0.0, //
            0.0, 0.1, 1.0, 0.9, //
            0.1, 0.0, 0.8, 1.0,
        ],
        &[4, 4],
    );
    let labels = Tensor::new(&[1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0], &[4, 2]);
    (x, labels)
}
