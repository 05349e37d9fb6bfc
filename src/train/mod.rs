//! 训练驱动
//!
//! - [`Trainer`]: 逐批次、逐宏步的训练循环，以及测试集评估与检查点保存
//! - [`TrainRecord`] / [`TestRecord`]: 训练结束时写出的CSV记录
//! - [`init_logging`]: 终端+日志文件两路`tracing`输出

mod error;
mod logging;
mod records;
mod trainer;


pub use error::TrainError;
pub use logging::{LoggingError, init_logging};
pub use records::{Record, TestRecord, TrainRecord, write_records};
pub use trainer::{
    BatchOutcome, BestAccuracy, EvalSummary, StepMetrics, Trainer, count_correct, evaluate_batches,
};
