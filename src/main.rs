use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use bulk_field_rewrite::browser::connect_to_browser_and_page;
use bulk_field_rewrite::cli::Cli;
use bulk_field_rewrite::config::Config;
use bulk_field_rewrite::infrastructure::JsExecutor;
use bulk_field_rewrite::models::{load_last_input, save_last_input};
use bulk_field_rewrite::orchestrator::{spawn_progress_reporter, RunOrchestrator};
use bulk_field_rewrite::services::{AutoConfirm, ConsolePrompt, ReportWriter, RunPrompt};
use bulk_field_rewrite::surface::DomSurface;
use bulk_field_rewrite::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::from_env();
    cli.apply_to(&mut config);

    // 初始化日志
    logging::init(config.verbose_logging);
    config.validate()?;

    // 确定本次输入
    let last_input_path = PathBuf::from(&config.last_input_path);
    let saved = load_last_input(&last_input_path).await.unwrap_or_else(|e| {
        warn!("⚠️ 读取上次输入失败: {:#}", e);
        None
    });
    let Some(input) = cli.resolve_input(saved) else {
        anyhow::bail!("用法: bulk_field_rewrite <旧值> <新值>（省略时沿用上次输入）");
    };
    if let Err(e) = save_last_input(&last_input_path, &input).await {
        warn!("⚠️ 保存输入失败: {:#}", e);
    }

    // 连接浏览器
    let (_browser, page) = connect_to_browser_and_page(
        config.browser_debug_port,
        &config.target_url,
        config.target_title.as_deref(),
    )
    .await?;

    let surface = Arc::new(DomSurface::new(JsExecutor::new(page)));
    let prompt: Arc<dyn RunPrompt> = if config.assume_yes {
        Arc::new(AutoConfirm(true))
    } else {
        Arc::new(ConsolePrompt)
    };
    let orchestrator = Arc::new(RunOrchestrator::new(surface, prompt, config.timing()));

    // Ctrl-C 请求停止
    let stopper = orchestrator.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stopper.stop();
        }
    });

    let progress = spawn_progress_reporter(
        orchestrator.ledger(),
        Duration::from_millis(config.progress_interval_ms),
    );
    let result = orchestrator
        .start(&input.expected_old, &input.desired_new)
        .await;
    drop(progress);

    // 导出报告
    let writer = ReportWriter::new(&config.report_path);
    if let Err(e) = writer.write(&orchestrator.ledger()).await {
        warn!("⚠️ 导出报告失败: {:#}", e);
    }

    match result {
        Ok(_) => Ok(()),
        Err(e) if e.is_precondition() => {
            info!("未执行任何修改: {}", e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
