use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::browser::SessionOptions;
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{ChromeRenderer, Renderer};
use crate::models::loaders::load_schema;
use crate::models::task::LocatorSource;
use crate::orchestrator::{BatchProcessor, RetryDriver, RetryOutcome, RunSummary, WorkerPool};
use crate::services::{CheckpointStore, FailureStore, RecordExtractor};
use crate::utils::logging;
use crate::workflow::TaskFlow;

/// 应用主结构
///
/// 持有配置与组装好的流水线，渲染器可替换。
pub struct App<R = ChromeRenderer> {
    config: Config,
    flow: Arc<TaskFlow<R>>,
    pool: WorkerPool,
    store: CheckpointStore,
}

impl App<ChromeRenderer> {
    /// 使用 Chrome 渲染器初始化应用
    pub fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;
        let extractor = compile_extractor(&config)?;

        let renderer = ChromeRenderer::new(SessionOptions {
            headless: config.headless,
            chrome_executable: config.chrome_executable.clone(),
            readiness_selector: extractor.readiness_selector().to_string(),
            wait_timeout: config.wait_timeout(),
            settle_delay: config.settle_delay(),
        });

        Self::assemble(config, renderer, extractor)
    }
}

impl<R: Renderer> App<R> {
    /// 使用自定义渲染器初始化应用
    pub fn with_renderer(config: Config, renderer: R) -> AppResult<Self> {
        config.validate()?;
        let extractor = compile_extractor(&config)?;
        Self::assemble(config, renderer, extractor)
    }

    fn assemble(config: Config, renderer: R, extractor: RecordExtractor) -> AppResult<Self> {
        logging::log_startup(&config);

        let store = CheckpointStore::new(&config.output_dir, &config.file_prefix);
        store.prepare()?;

        let flow = Arc::new(TaskFlow::new(
            renderer,
            Arc::new(extractor),
            config.pacing_delay(),
        ));

        Ok(Self {
            pool: WorkerPool::new(config.max_workers),
            config,
            flow,
            store,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 运行应用主逻辑：按批次处理配置的索引范围
    pub async fn run(&self) -> AppResult<RunSummary> {
        info!("\n📁 正在读取链接列表: {}", self.config.locator_file.display());
        let source = LocatorSource::load(&self.config.locator_file)?;

        if source.is_empty() {
            warn!("⚠️ 链接列表为空，程序结束");
            return Ok(RunSummary::default());
        }

        let range = source.resolve_range(self.config.start_index, self.config.end_index)?;
        logging::log_locators_loaded(source.len(), range, self.config.batch_width);

        let processor = BatchProcessor::new(
            Arc::clone(&self.flow),
            self.pool,
            self.store.clone(),
            self.config.batch_width,
        );
        let summary = processor.run(&source, range).await?;

        let outstanding = FailureStore::outstanding(self.store.output_dir(), self.store.prefix())?;
        logging::print_final_stats(&summary, &outstanding);

        Ok(summary)
    }

    /// 对单个失败文件重试一轮
    pub async fn retry(&self, failure_path: &Path) -> AppResult<RetryOutcome> {
        let driver = RetryDriver::new(Arc::clone(&self.flow), self.pool);
        let outcome = driver.retry(failure_path).await?;
        logging::print_retry_stats(std::slice::from_ref(&outcome));
        Ok(outcome)
    }

    /// 对输出目录中所有未解决的失败文件各重试一轮
    pub async fn retry_all(&self) -> AppResult<Vec<RetryOutcome>> {
        let driver = RetryDriver::new(Arc::clone(&self.flow), self.pool);
        let outcomes = driver.retry_all(&self.store).await?;
        logging::print_retry_stats(&outcomes);
        Ok(outcomes)
    }
}

fn compile_extractor(config: &Config) -> AppResult<RecordExtractor> {
    let schema = load_schema(&config.schema)?;
    RecordExtractor::compile(&schema)
}
