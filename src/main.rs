use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::info;

use nmode::config::Config;
use nmode::data::{Augment, DataLoader, MnistDataset};
use nmode::nn::OdeNet;
use nmode::train::{Trainer, evaluate_batches, init_logging};

#[derive(Parser)]
#[command(name = "nmode", version, about = "nmODE前向学习：在MNIST上训练/评估ODE隐状态网络")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 训练网络，按epoch在测试集上评估并保存最好的检查点
    Train {
        /// JSON配置文件，缺省使用内置默认值
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        epochs: Option<usize>,
        #[arg(long)]
        batch_size: Option<usize>,
        #[arg(long)]
        hidden_size: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// 训练前先从该检查点恢复参数
        #[arg(long)]
        resume: Option<PathBuf>,
    },
    /// 在测试集上评估一个检查点
    Eval {
        #[arg(short, long)]
        config: Option<PathBuf>,
        checkpoint: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("加载配置文件{path:?}失败")),
        None => Ok(Config::default()),
    }
}

fn train(mut config: Config) -> Result<()> {
    config.validate()?;
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("无法创建输出目录{:?}", config.output_dir))?;
    init_logging(Some(&config.log_file_path()))?;
    info!("配置：{}", serde_json::to_string(&config)?);

    // 唯一的随机源：参数初始化、打乱与增广都由它派生
    let mut rng = StdRng::seed_from_u64(config.seed);
    let net = OdeNet::new(&config, &mut rng);

    let data_dir = config.data_dir.as_deref();
    let train_set = MnistDataset::load(data_dir, true, config.download)?;
    let test_set = MnistDataset::load(data_dir, false, config.download)?;
    info!("训练集{}个样本，测试集{}个样本", train_set.len(), test_set.len());

    let mut train_loader = DataLoader::new(train_set.into_tensor_dataset(), config.batch_size)
        .shuffle(true)
        .seed(rng.next_u64());
    if config.augment {
        train_loader = train_loader.augment(Augment::mnist());
    }
    let mut test_loader = DataLoader::new(test_set.into_tensor_dataset(), config.batch_size);

    let resume = config.resume.take();
    let mut trainer = Trainer::with_sgd(&config, net);
    if let Some(path) = resume {
        trainer.resume(&path)?;
    }
    match trainer.fit(&mut train_loader, &mut test_loader)? {
        Some(best) => info!(
            "训练结束，最好的测试准确率{:.5}（epoch {}），检查点：{:?}",
            best.accuracy, best.epoch, best.checkpoint
        ),
        None => info!("训练结束"),
    }
    Ok(())
}

fn eval(config: Config, checkpoint: PathBuf) -> Result<()> {
    init_logging(None)?;
    let mut net = OdeNet::new(&config, &mut StdRng::seed_from_u64(config.seed));
    net.load(&checkpoint)
        .with_context(|| format!("加载检查点{checkpoint:?}失败"))?;

    let test_set = MnistDataset::load(config.data_dir.as_deref(), false, config.download)?;
    let mut test_loader = DataLoader::new(test_set.into_tensor_dataset(), config.batch_size);
    let summary = evaluate_batches(&net, test_loader.iter())?;
    info!(
        "Test Acc: {:.5} ({}/{}，跳过{}个不完整批次)",
        summary.accuracy(),
        summary.correct,
        summary.total,
        summary.skipped_batches
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Train {
            config,
            epochs,
            batch_size,
            hidden_size,
            seed,
            resume,
        } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(epochs) = epochs {
                config.epochs = epochs;
            }
            if let Some(batch_size) = batch_size {
                config.batch_size = batch_size;
            }
            if let Some(hidden_size) = hidden_size {
                config.hidden_size = hidden_size;
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if resume.is_some() {
                config.resume = resume;
            }
            train(config)
        }
        Command::Eval { config, checkpoint } => eval(load_config(config.as_ref())?, checkpoint),
    }
}
