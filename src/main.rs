use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use page_harvest::{logger, App, Config};

#[derive(Parser)]
#[command(name = "page-harvest", version, about = "分批并发抓取页面并写出可续跑的文本检查点")]
struct Cli {
    /// TOML 配置文件（也可用 HARVEST_CONFIG 指定）
    #[arg(long, global = true, env = "HARVEST_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// 按批次处理索引范围（默认）
    Run {
        #[arg(long)]
        start: Option<usize>,
        #[arg(long)]
        end: Option<usize>,
        #[arg(long)]
        workers: Option<usize>,
        #[arg(long)]
        batch_width: Option<usize>,
    },
    /// 对一个失败文件重试一轮
    Retry { failed: PathBuf },
    /// 对输出目录中所有未解决的失败文件各重试一轮
    RetryAll,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置：默认值 → 配置文件 → 环境变量 → 命令行
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?.with_env(),
        None => Config::from_env(),
    };

    let command = cli.command.unwrap_or(Command::Run {
        start: None,
        end: None,
        workers: None,
        batch_width: None,
    });

    if let Command::Run {
        start,
        end,
        workers,
        batch_width,
    } = &command
    {
        config.start_index = start.unwrap_or(config.start_index);
        config.end_index = end.or(config.end_index);
        config.max_workers = workers.unwrap_or(config.max_workers);
        config.batch_width = batch_width.unwrap_or(config.batch_width);
    }

    // 初始化日志
    logger::init(config.verbose_logging);

    let app = App::initialize(config)?;

    match command {
        Command::Run { .. } => {
            app.run().await?;
        }
        Command::Retry { failed } => {
            app.retry(&failed).await?;
        }
        Command::RetryAll => {
            app.retry_all().await?;
        }
    }

    Ok(())
}
