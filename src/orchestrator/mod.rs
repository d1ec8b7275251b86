//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `worker_pool` - 有界工作池
//! - Semaphore 限制同时持有渲染会话的任务数
//! - 按完成先后收集结果，结果携带原始索引
//! - 单任务失败就地转换，致命错误中止整批
//!
//! ### `batch_processor` - 批次检查点处理器
//! - 切分批次、跳过已完成批次
//! - 排序后写出批次文件与失败文件
//!
//! ### `retry_driver` - 失败重试
//! - 一次调用一轮，失败文件被覆盖为"最新仍未解决"的集合
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor / retry_driver (处理 Vec<Task>)
//!     ↓
//! worker_pool (并发调度)
//!     ↓
//! workflow::TaskFlow (处理单个 Task)
//!     ↓
//! services (能力层：extract / checkpoint / failure)
//!     ↓
//! infrastructure (基础设施：Renderer)
//! ```

pub mod batch_processor;
pub mod retry_driver;
pub mod worker_pool;

pub use batch_processor::{BatchProcessor, RunSummary};
pub use retry_driver::{RetryDriver, RetryOutcome};
pub use worker_pool::WorkerPool;
