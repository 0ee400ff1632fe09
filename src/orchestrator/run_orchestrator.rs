//! 运行编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **前置校验**：旧值、新值非空且不相等，否则不改变任何状态
//! 2. **人工确认**：修改不可撤销，开始前交给 `RunPrompt` 确认
//! 3. **遍历快照**：只取一次列表，按列表顺序逐条处理
//! 4. **协作式取消**：每条记录开始前检查运行标志，不打断处理中的记录
//! 5. **失败隔离**：单条记录的任何错误只记为该记录的结果，运行继续
//! 6. **统计封存**：无论从哪条路径退出，统计都被封存、输入都被恢复

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::Timing;
use crate::error::{AppResult, RunError};
use crate::models::{Outcome, RunStats, RunStatus};
use crate::orchestrator::run_control::RunControl;
use crate::services::{OutcomeLedger, RecordMatcher, RunPrompt};
use crate::surface::{RecordRef, SurfaceDriver};
use crate::utils::logging;
use crate::workflow::EditorFlow;

/// 运行编排器
///
/// 对外只暴露 `start` / `stop` / `get_stats`。
pub struct RunOrchestrator {
    surface: Arc<dyn SurfaceDriver>,
    prompt: Arc<dyn RunPrompt>,
    control: RunControl,
    ledger: OutcomeLedger,
    editor: EditorFlow,
    timing: Timing,
}

/// 运行结束时恢复输入
struct InputsRestore<'a>(&'a dyn RunPrompt);

impl Drop for InputsRestore<'_> {
    fn drop(&mut self) {
        self.0.set_inputs_enabled(true);
    }
}

impl RunOrchestrator {
    pub fn new(surface: Arc<dyn SurfaceDriver>, prompt: Arc<dyn RunPrompt>, timing: Timing) -> Self {
        let editor = EditorFlow::new(surface.clone(), timing);
        Self {
            surface,
            prompt,
            control: RunControl::new(),
            ledger: OutcomeLedger::new(),
            editor,
            timing,
        }
    }

    /// 使用外部提供的运行控制（与其他组件共享停止标志）
    pub fn with_control(mut self, control: RunControl) -> Self {
        self.control = control;
        self
    }

    /// 替换编辑状态机（自定义字段定位策略）
    pub fn with_editor(mut self, editor: EditorFlow) -> Self {
        self.editor = editor;
        self
    }

    pub fn control(&self) -> RunControl {
        self.control.clone()
    }

    pub fn ledger(&self) -> OutcomeLedger {
        self.ledger.clone()
    }

    /// 请求停止
    ///
    /// 正在处理的记录会先完成，之后剩余记录不再访问，统计状态为 `Cancelled`。
    /// 没有运行时调用无副作用。
    pub fn stop(&self) {
        if self.control.is_running() {
            info!("⏹️ 收到停止请求，当前记录处理完后停止");
        }
        self.control.stop();
    }

    /// 最近一次运行的统计快照
    ///
    /// # 返回
    /// 运行中返回未封存的快照；从未运行过时为 None
    pub fn get_stats(&self) -> Option<RunStats> {
        self.ledger.snapshot()
    }

    /// 执行一次完整运行
    ///
    /// # 参数
    /// - `expected_old`: 需要修改的旧值，逐字匹配
    /// - `desired_new`: 写入的新值
    ///
    /// # 返回
    /// - `Ok(RunStats)`: 已封存的统计，状态为 `Completed` 或 `Cancelled`
    /// - `Err`: 输入校验失败、已有运行、用户未确认，或无法获取记录列表
    pub async fn start(&self, expected_old: &str, desired_new: &str) -> AppResult<RunStats> {
        validate_inputs(expected_old, desired_new)?;

        let _guard = self.control.try_acquire().ok_or(RunError::AlreadyRunning)?;

        if !self.prompt.confirm(expected_old, desired_new).await {
            info!("用户取消了本次修改");
            return Err(RunError::NotConfirmed.into());
        }

        self.prompt.set_inputs_enabled(false);
        let _inputs = InputsRestore(self.prompt.as_ref());

        self.ledger.begin(expected_old, desired_new);

        let records = match self.surface.list_records().await {
            Ok(records) => records,
            Err(e) => {
                let message = format!("{:#}", e);
                error!("❌ 无法获取记录列表: {}", message);
                self.ledger.seal(RunStatus::Aborted {
                    message: message.clone(),
                });
                return Err(RunError::ListingFailed { message }.into());
            }
        };

        self.ledger.set_total(records.len());
        logging::log_run_start(expected_old, desired_new, records.len());

        let status = self.visit_records(&records, expected_old, desired_new).await;

        let stats = self
            .ledger
            .seal(status)
            .unwrap_or_else(|| RunStats::new(expected_old, desired_new));
        logging::print_final_stats(&stats);
        Ok(stats)
    }

    /// 按列表顺序访问记录，返回运行的最终状态
    async fn visit_records(&self, records: &[RecordRef], expected_old: &str, desired_new: &str) -> RunStatus {
        let matcher = RecordMatcher::new(expected_old);
        let total = records.len();

        for (visited, record) in records.iter().enumerate() {
            if !self.control.is_running() {
                info!("⏹️ 运行已停止，剩余 {} 条记录未访问", total - visited);
                return RunStatus::Cancelled;
            }

            logging::log_record_start(record.index, total);

            let decision = matcher.classify(record);
            let outcome = match decision.skip_reason {
                None => {
                    self.ledger.record_match();
                    self.process_match(record, expected_old, desired_new).await
                }
                Some(reason) => Outcome::Skipped {
                    index: record.index,
                    observed_value: record.observed_value.clone(),
                    reason,
                },
            };

            logging::log_outcome(&outcome);
            self.ledger.append(outcome);

            sleep(self.timing.record_settle).await;
        }

        RunStatus::Completed
    }

    /// 处理一条匹配记录，任何错误都收敛为该记录的结果
    async fn process_match(&self, record: &RecordRef, expected_old: &str, desired_new: &str) -> Outcome {
        match self.editor.run(record, expected_old, desired_new).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("[记录 {}] ❌ 处理过程中发生错误: {:#}", record.index, e);
                self.force_close().await;
                Outcome::Error {
                    index: record.index,
                    message: format!("{:#}", e),
                }
            }
        }
    }

    async fn force_close(&self) {
        if let Err(e) = self.surface.force_close_editor().await {
            warn!("⚠️ 强制关闭编辑框失败: {}", e);
        }
        if let Err(e) = self.surface.close_action_menu().await {
            warn!("⚠️ 关闭操作菜单失败: {}", e);
        }
    }
}

fn validate_inputs(expected_old: &str, desired_new: &str) -> Result<(), RunError> {
    if expected_old.is_empty() {
        return Err(RunError::EmptyValue { field: "旧值" });
    }
    if desired_new.is_empty() {
        return Err(RunError::EmptyValue { field: "新值" });
    }
    if expected_old == desired_new {
        return Err(RunError::SameValue);
    }
    Ok(())
}
