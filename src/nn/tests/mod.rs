mod network;
mod parameter;

use crate::config::Config;

/// 端到端测试所用的小网络：batch 4、input 4、hidden 8、2类、K=2
pub(super) fn tiny_config() -> Config {
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
