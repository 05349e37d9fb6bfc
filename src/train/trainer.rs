/*
 * @Date         : 2026-10-14
 * @Description  : 训练驱动。每个epoch：逐批次训练（批次大小与配置不符的直接跳过），
 *                 每个保留的批次先重置隐状态，再按k=0..K依次执行
 *                 清梯度→前向→损失→记录→反向→更新；随后在测试集上评估，
 *                 准确率不低于历史最好时保存检查点。
 */

use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use super::{TestRecord, TrainError, TrainRecord, write_records};
use crate::config::Config;
use crate::data::DataLoader;
use crate::nn::optimizer::{Optimizer, Sgd};
use crate::nn::{CrossEntropyLoss, NnError, OdeNet};
use crate::tensor::Tensor;

/// 单个宏步的训练指标
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepMetrics {
    pub step: usize,
    pub loss: f32,
    pub accuracy: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// 批次大小与配置不符，未做任何计算
    Skipped,
    /// 按顺序给出每个宏步的指标
    Trained(Vec<StepMetrics>),
}

/// 测试集上的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalSummary {
    pub correct: usize,
    pub total: usize,
    /// 因批次大小不符而跳过的批次数
    pub skipped_batches: usize,
}

impl EvalSummary {
    /// 没有任何被评估的样本时记为0
    pub fn accuracy(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f32 / self.total as f32
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BestAccuracy {
    pub epoch: usize,
    pub accuracy: f32,
    pub checkpoint: PathBuf,
}

/// 预测（概率最大的类）与one-hot标签一致的行数
pub fn count_correct(probs: &Tensor, labels: &Tensor) -> usize {
    probs
        .argmax_rows()
        .into_iter()
        .zip(labels.argmax_rows())
        .filter(|(pred, truth)| pred == truth)
        .count()
}

/// 用[`OdeNet::evaluate`]逐批次评估；批次大小与网络配置不符的批次跳过
pub fn evaluate_batches<I>(net: &OdeNet, batches: I) -> Result<EvalSummary, NnError>
where
    I: IntoIterator<Item = (Tensor, Tensor)>,
{
    let mut summary = EvalSummary::default();
    for (x, labels) in batches {
        let rows = x.shape()[0];
        if rows != net.batch_size() {
            summary.skipped_batches += 1;
            continue;
        }
        let probs = net.evaluate(&x)?;
        summary.correct += count_correct(&probs, &labels);
        summary.total += rows;
    }
    Ok(summary)
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

pub struct Trainer<'a, O: Optimizer = Sgd> {
    config: &'a Config,
    net: OdeNet,
    optimizer: O,
    criterion: CrossEntropyLoss,
    train_records: Vec<TrainRecord>,
    test_records: Vec<TestRecord>,
    best: Option<BestAccuracy>,
}

impl<'a> Trainer<'a, Sgd> {
    /// SGD，学习率为`alpha`，动量取配置值
    pub fn with_sgd(config: &'a Config, net: OdeNet) -> Self {
        let optimizer = Sgd::new(config.alpha, config.momentum);
        Self::new(config, net, optimizer)
    }
}

impl<'a, O: Optimizer> Trainer<'a, O> {
    pub fn new(config: &'a Config, net: OdeNet, optimizer: O) -> Self {
        Self {
            config,
            net,
            optimizer,
            criterion: CrossEntropyLoss::new(),
            train_records: Vec::new(),
            test_records: Vec::new(),
            best: None,
        }
    }

    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓属性↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    pub fn net(&self) -> &OdeNet {
        &self.net
    }

    pub fn net_mut(&mut self) -> &mut OdeNet {
        &mut self.net
    }

    pub fn into_net(self) -> OdeNet {
        self.net
    }

    pub fn optimizer(&self) -> &O {
        &self.optimizer
    }

    pub fn train_records(&self) -> &[TrainRecord] {
        &self.train_records
    }

    pub fn test_records(&self) -> &[TestRecord] {
        &self.test_records
    }

    pub fn best(&self) -> Option<&BestAccuracy> {
        self.best.as_ref()
    }
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑属性↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

    /// 训练前从检查点恢复参数；优化器的动量缓冲随之清空
    pub fn resume<P: AsRef<Path>>(&mut self, path: P) -> Result<(), TrainError> {
        self.net.load(path.as_ref())?;
        self.optimizer.reset();
        info!("已从检查点恢复参数：{:?}", path.as_ref());
        Ok(())
    }

    /// 训练一个批次。批次大小与配置不符时直接跳过，网络状态与参数都不变
    pub fn train_batch(
        &mut self,
        epoch: usize,
        batch: usize,
        x: &Tensor,
        labels: &Tensor,
    ) -> Result<BatchOutcome, TrainError> {
        let rows = x.shape()[0];
        if rows != self.config.batch_size {
            debug!(
                "跳过批次{batch}：样本数{rows}与配置的批次大小{}不符",
                self.config.batch_size
            );
            return Ok(BatchOutcome::Skipped);
        }

        self.net.init_state();
        let mut metrics = Vec::with_capacity(self.net.steps());
        for k in 0..self.net.steps() {
            self.optimizer.zero_grad(&mut self.net);
            let probs = self.net.forward(x, k)?;
            let loss = self.criterion.forward(&probs, labels)?;
            let accuracy = count_correct(&probs, labels) as f32 / rows as f32;
            self.train_records.push(TrainRecord {
                epoch,
                batch,
                step: k,
                accuracy,
                loss,
            });

            let grad = self.criterion.backward()?;
            self.net.backward(&grad)?;
            self.optimizer.step(&mut self.net)?;
            metrics.push(StepMetrics {
                step: k,
                loss,
                accuracy,
            });
        }
        Ok(BatchOutcome::Trained(metrics))
    }

    pub fn evaluate<I>(&self, batches: I) -> Result<EvalSummary, TrainError>
    where
        I: IntoIterator<Item = (Tensor, Tensor)>,
    {
        Ok(evaluate_batches(&self.net, batches)?)
    }

    /// 记下本轮的测试准确率；不低于历史最好时保存检查点并返回其路径
    pub fn record_epoch(
        &mut self,
        epoch: usize,
        accuracy: f32,
    ) -> Result<Option<PathBuf>, TrainError> {
        self.test_records.push(TestRecord { epoch, accuracy });

        if let Some(best) = self.best.as_ref().filter(|best| accuracy < best.accuracy) {
            info!(
                "Epoch: {epoch}, Test Acc is: {accuracy:.5}, Best Test Acc is: {:.5} in epoch: {}",
                best.accuracy, best.epoch
            );
            return Ok(None);
        }

        let checkpoint = self.config.checkpoint_path(accuracy);
        self.net.save(&checkpoint)?;
        info!("Epoch: {epoch}, Test Acc improved to: {accuracy:.5}");
        debug!("检查点已保存：{checkpoint:?}");
        self.best = Some(BestAccuracy {
            epoch,
            accuracy,
            checkpoint: checkpoint.clone(),
        });
        Ok(Some(checkpoint))
    }

    /// 把训练与测试记录写成CSV
    pub fn write_records(&self) -> Result<(), TrainError> {
        let train_path = self.config.train_csv_path();
        let test_path = self.config.test_csv_path();
        write_records(&train_path, &self.train_records)?;
        write_records(&test_path, &self.test_records)?;
        info!("训练记录已写入{train_path:?}，测试记录已写入{test_path:?}");
        Ok(())
    }

    /// 完整的训练流程，结束时写出CSV记录，返回最好的测试结果
    pub fn fit(
        &mut self,
        train_loader: &mut DataLoader,
        test_loader: &mut DataLoader,
    ) -> Result<Option<BestAccuracy>, TrainError> {
        fs::create_dir_all(&self.config.output_dir)?;
        let num_batches = train_loader.num_batches();
        info!(
            "开始训练：{}个epoch，每轮{num_batches}个批次，学习率{}",
            self.config.epochs,
            self.optimizer.learning_rate()
        );

        for epoch in 0..self.config.epochs {
            let pb = ProgressBar::new(num_batches as u64);
            pb.set_style(progress_style());

            let mut train_accuracy = 0.0;
            for (batch, (x, labels)) in train_loader.iter().enumerate() {
                let outcome = self.train_batch(epoch, batch, &x, &labels)?;
                if let BatchOutcome::Trained(metrics) = outcome {
                    if let Some(last) = metrics.last() {
                        train_accuracy = last.accuracy;
                    }
                }
                pb.set_message(format!(
                    "Epoch: {epoch}, Batch: {batch}/{num_batches}, Train Acc: {train_accuracy:.5}"
                ));
                pb.inc(1);
            }
            pb.finish_and_clear();

            let summary = self.evaluate(test_loader.iter())?;
            if summary.total == 0 {
                warn!("Epoch: {epoch}, 测试集中没有可评估的完整批次");
            }
            self.record_epoch(epoch, summary.accuracy())?;
        }

        self.write_records()?;
        Ok(self.best.clone())
    }
}
