//! # Page Harvest
//!
//! 从一组预先收集好的链接中批量抓取页面、抽取结构化记录，
//! 并以可续跑的有序文本批次写入磁盘。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `browser/` - 每个任务一个独立浏览器会话，独占一次性工作目录
//! - `infrastructure/` - `Renderer` 能力：链接 → 渲染后的页面内容
//!
//! ### ② 业务能力层（Services）
//! - `RecordExtractor` - 页面内容 → 结构化记录（纯函数，不会失败）
//! - `NoiseFilter` - 可替换的噪声判定
//! - `CheckpointStore` / `FailureStore` - 批次文件与失败文件的读写
//!
//! ### ③ 流程层（Workflow）
//! - `TaskFlow` - 一个任务的完整流程（render → pacing → extract）
//!
//! ### ④ 编排层（Orchestration）
//! - `WorkerPool` - 有界并发
//! - `BatchProcessor` - 批次切分、断点跳过、有序落盘
//! - `RetryDriver` - 单轮失败重试
//!
//! ## 模块结构

pub mod app;
pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult, FetchError};
pub use infrastructure::{ChromeRenderer, Renderer};
pub use models::{BatchRange, ExtractionResult, FailureSet, LocatorSource, StructuredText, Task};
pub use orchestrator::{BatchProcessor, RetryDriver, RunSummary, WorkerPool};
pub use services::{NoiseFilter, RecordExtractor};
pub use workflow::TaskFlow;
