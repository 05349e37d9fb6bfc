/*
 * @Date         : 2026-10-11
 * @Description  : 训练配置。启动时构建一次，之后以引用的形式传给网络与训练器。
 *                 可从JSON文件读取，缺省字段取默认值（MNIST上的默认训练设置）。
 */

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ode::SolverConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("无法读取配置文件{path:?}：{source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("配置文件解析失败：{0}")]
    Parse(#[from] serde_json::Error),
    #[error("配置项`{field}`无效：{message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// 计算设备。目前只支持CPU，JSON里写其他值会在解析时报错
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Cpu,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub epochs: usize,
    pub batch_size: usize,
    pub input_size: usize,
    pub hidden_size: usize,
    pub num_classes: usize,
    /// 学习率
    pub alpha: f32,
    /// 保留项，目前不参与任何计算
    pub beta: f32,
    pub momentum: f32,
    /// 每个宏步的时长
    pub tbar: f32,
    /// 每个批次的宏步数K
    #[serde(alias = "K")]
    pub steps: usize,
    pub seed: u64,
    pub device: Device,
    pub solver: SolverConfig,

    /// MNIST文件所在目录，为空时使用用户缓存目录
    pub data_dir: Option<PathBuf>,
    pub download: bool,
    /// 训练集是否做随机增广（填充+随机裁剪+随机旋转）
    pub augment: bool,

    pub output_dir: PathBuf,
    pub log_file: String,
    pub train_csv: String,
    pub test_csv: String,
    pub checkpoint_prefix: String,
    /// 训练前先从该检查点恢复参数
    pub resume: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            epochs: 1000,
            batch_size: 256,
            input_size: 784,
            hidden_size: 4096,
            num_classes: 10,
            alpha: 0.05,
            beta: 0.05,
            momentum: 0.9,
            tbar: 0.05,
            steps: 10,
            seed: 22,
            device: Device::Cpu,
            solver: SolverConfig::default(),
            data_dir: None,
            download: true,
            augment: true,
            output_dir: PathBuf::from("."),
            log_file: "0514_mnist.log".to_string(),
            train_csv: "mnist_train.csv".to_string(),
            test_csv: "mnist_test.csv".to_string(),
            checkpoint_prefix: "mnist_0514".to_string(),
            resume: None,
        }
    }
}

impl Config {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive_sizes = [
            ("epochs", self.epochs),
            ("batch_size", self.batch_size),
            ("input_size", self.input_size),
            ("hidden_size", self.hidden_size),
            ("num_classes", self.num_classes),
            ("steps", self.steps),
        ];
        for (field, value) in positive_sizes {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    message: "必须大于0".to_string(),
                });
            }
        }
        let positive_reals = [("alpha", self.alpha), ("tbar", self.tbar)];
        for (field, value) in positive_reals {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    message: format!("必须为有限正数，实际为{value}"),
                });
            }
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(ConfigError::Invalid {
                field: "momentum",
                message: format!("必须位于[0, 1)，实际为{}", self.momentum),
            });
        }
        if !(self.solver.rtol > 0.0 && self.solver.atol > 0.0) {
            return Err(ConfigError::Invalid {
                field: "solver",
                message: "rtol与atol必须为正数".to_string(),
            });
        }
        if !(self.solver.step_size.is_finite() && self.solver.step_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "solver",
                message: format!("step_size必须为有限正数，实际为{}", self.solver.step_size),
            });
        }
        if self.solver.max_steps == 0 {
            return Err(ConfigError::Invalid {
                field: "solver",
                message: "max_steps必须大于0".to_string(),
            });
        }
        Ok(())
    }

    /// 整个推理时域`[0, K*tbar]`的终点
    pub fn horizon(&self) -> f32 {
        self.steps as f32 * self.tbar
    }

    pub fn train_csv_path(&self) -> PathBuf {
        self.output_dir.join(&self.train_csv)
    }

    pub fn test_csv_path(&self) -> PathBuf {
        self.output_dir.join(&self.test_csv)
    }

    pub fn log_file_path(&self) -> PathBuf {
        self.output_dir.join(&self.log_file)
    }

    /// 检查点文件名：`{prefix}_K={K}_{acc:.4}.bin`
    pub fn checkpoint_path(&self, accuracy: f32) -> PathBuf {
        self.output_dir.join(format!(
            "{}_K={}_{:.4}.bin",
            self.checkpoint_prefix, self.steps, accuracy
        ))
    }
}
