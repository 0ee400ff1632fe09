//! 运行进度输出
//!
//! 定时读取账本快照并打印，只读，不影响运行。
//! 看到本次运行的统计被封存后自行结束。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::models::RunStats;
use crate::services::OutcomeLedger;

/// 进度输出任务，drop 时停止
pub struct ProgressReporter {
    handle: JoinHandle<()>,
    reports: Arc<AtomicUsize>,
}

impl ProgressReporter {
    /// 已输出的进度行数
    pub fn reports(&self) -> usize {
        self.reports.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// 等待任务结束（统计封存后的下一次定时）
    pub async fn finished(&mut self) {
        let _ = (&mut self.handle).await;
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// 启动进度输出
///
/// # 参数
/// - `ledger`: 要观察的账本句柄
/// - `every`: 输出间隔
///
/// # 返回
/// 后台任务句柄。每隔 `every` 打印一次有变化的未封存统计；
/// 启动之后开始的那次运行被封存时任务结束。
pub fn spawn_progress_reporter(ledger: OutcomeLedger, every: Duration) -> ProgressReporter {
    let reports = Arc::new(AtomicUsize::new(0));
    let counter = reports.clone();
    // 启动前已封存的统计属于上一次运行，不作为结束信号
    let previous = ledger.snapshot().filter(RunStats::is_sealed).map(|s| s.started_at);

    let handle = tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_processed = None;
        let mut seen_running = false;
        loop {
            ticker.tick().await;
            let Some(stats) = ledger.snapshot() else {
                continue;
            };
            if stats.is_sealed() {
                if !seen_running && previous == Some(stats.started_at) {
                    continue;
                }
                debug!("统计已封存，停止进度输出");
                break;
            }
            seen_running = true;
            if last_processed == Some(stats.processed_count) {
                continue;
            }
            last_processed = Some(stats.processed_count);
            counter.fetch_add(1, Ordering::SeqCst);
            info!(
                "📈 进度: {}/{} | 匹配 {} | 成功 {} | 失败 {} | 未确认 {} | 跳过 {} | 错误 {}",
                stats.processed_count,
                stats.total_count,
                stats.matched_count,
                stats.success_count(),
                stats.failed_count(),
                stats.unconfirmed_count(),
                stats.skipped_count(),
                stats.error_count()
            );
        }
    });
    ProgressReporter { handle, reports }
}
