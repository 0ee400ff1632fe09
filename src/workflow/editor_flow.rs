//! 编辑状态机 - 流程层
//!
//! 把一条已匹配的记录驱动到唯一的最终结果：
//!
//! ```text
//! Closed → OpeningMenu → MenuOpen → EditorOpening → EditorOpen
//!        → Verifying → Mutating → Saving → Confirmed | Aborted
//! ```
//!
//! 列表快照可能已经过期，所以写入前在编辑框内重新读取并核对旧值。
//! 无论从哪个阶段退出，返回前菜单和编辑框都已关闭。

use std::sync::Arc;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Timing;
use crate::models::{FailReason, Outcome};
use crate::surface::{FieldHandle, FieldLocator, RecordRef, SurfaceDriver};
use crate::workflow::edit_session::{EditPhase, EditSession};

/// 编辑状态机
///
/// 不持有任何运行状态，可以在整个运行中复用。
pub struct EditorFlow {
    surface: Arc<dyn SurfaceDriver>,
    timing: Timing,
    locators: Vec<FieldLocator>,
}

impl EditorFlow {
    pub fn new(surface: Arc<dyn SurfaceDriver>, timing: Timing) -> Self {
        Self::with_locators(surface, timing, FieldLocator::default_chain())
    }

    pub fn with_locators(
        surface: Arc<dyn SurfaceDriver>,
        timing: Timing,
        locators: Vec<FieldLocator>,
    ) -> Self {
        Self {
            surface,
            timing,
            locators,
        }
    }

    /// 处理一条记录
    ///
    /// # 参数
    /// - `record`: 列表阶段已匹配的记录
    /// - `expected_old` / `desired_new`: 本次运行的旧值、新值
    ///
    /// # 返回
    /// - `Ok(Outcome::Success)`: 保存后编辑框关闭
    /// - `Ok(Outcome::Failed)`: 在某个阶段中止
    /// - `Err`: 界面原语报错，或未确认的记录清理后菜单/编辑框仍未关闭
    ///
    /// 任何情况下返回前都已尝试清理。
    pub async fn run(&self, record: &RecordRef, expected_old: &str, desired_new: &str) -> Result<Outcome> {
        let mut session = EditSession::new(record.index, expected_old, desired_new);

        let driven = self.drive(record, &mut session).await;
        let cleanup = self.close_everything(&session).await;

        driven?;
        if let Err(e) = cleanup {
            // 保存已确认时不改写结果，只记录清理问题
            if session.phase() != EditPhase::Confirmed {
                return Err(e.context(format!("[记录 {}] 清理菜单/编辑框失败", record.index)));
            }
            warn!("{} ⚠️ 清理菜单/编辑框失败: {:#}", session, e);
        }
        session
            .into_outcome()
            .ok_or_else(|| anyhow::anyhow!("[记录 {}] 状态机未到达终态", record.index))
    }

    async fn drive(&self, record: &RecordRef, session: &mut EditSession) -> Result<()> {
        let surface = self.surface.as_ref();
        let poll = self.timing.poll_interval;

        // ========== 打开操作菜单 ==========
        session.advance(EditPhase::OpeningMenu);
        if !self.open_menu(record, session).await? {
            session.abort(FailReason::MenuOpenFailed);
            return Ok(());
        }
        session.advance(EditPhase::MenuOpen);

        // ========== 打开编辑框 ==========
        session.advance(EditPhase::EditorOpening);
        if !surface.invoke_edit(record).await? {
            session.abort(FailReason::EditControlMissing);
            return Ok(());
        }
        if !surface
            .wait_for_editor_open(self.timing.editor_open_timeout, poll)
            .await?
        {
            session.abort(FailReason::EditorOpenTimeout);
            return Ok(());
        }
        session.advance(EditPhase::EditorOpen);

        // ========== 定位并核对字段 ==========
        let Some(handle) = self.locate_field(session).await? else {
            session.abort(FailReason::FieldNotFound);
            return Ok(());
        };

        session.advance(EditPhase::Verifying);
        let current = surface.read_handle(&handle).await?;
        session.verified_value = Some(current.clone());
        if current != session.expected_old {
            warn!(
                "{} ⚠️ 编辑框内的值 \"{}\" 与预期 \"{}\" 不一致，放弃修改",
                session, current, session.expected_old
            );
            session.abort(FailReason::ValueMismatch { observed: current });
            return Ok(());
        }

        // ========== 写入 ==========
        session.advance(EditPhase::Mutating);
        surface
            .set_field_and_notify(&handle, &session.desired_new)
            .await?;
        sleep(self.timing.mutate_settle).await;

        // ========== 保存并等待确认 ==========
        session.advance(EditPhase::Saving);
        if !surface.invoke_save().await? {
            session.abort(FailReason::SaveControlUnavailable);
            return Ok(());
        }
        // 编辑框关闭是界面唯一的保存成功信号
        if !surface
            .wait_for_editor_closed(self.timing.save_close_timeout, poll)
            .await?
        {
            warn!("{} ⚠️ 保存后编辑框未关闭，结果不确定", session);
            session.abort(FailReason::SaveNoConfirmation);
            return Ok(());
        }

        session.confirm();
        info!(
            "{} ✓ 已修改: {} -> {}",
            session, session.expected_old, session.desired_new
        );
        Ok(())
    }

    /// 打开操作菜单，失败时用更长的等待重试一次
    async fn open_menu(&self, record: &RecordRef, session: &EditSession) -> Result<bool> {
        let waits = [self.timing.menu_open_wait, self.timing.menu_retry_wait];
        for (attempt, wait) in waits.into_iter().enumerate() {
            if attempt > 0 {
                debug!("{} 操作菜单未打开，第 {} 次重试", session, attempt);
            }
            if !self.surface.open_action_menu(record).await? {
                debug!("{} 未找到操作菜单按钮", session);
                continue;
            }
            if self
                .surface
                .wait_for_action_menu(wait, self.timing.poll_interval)
                .await?
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// 按顺序尝试每个定位策略，返回第一个命中的
    async fn locate_field(&self, session: &EditSession) -> Result<Option<FieldHandle>> {
        for locator in &self.locators {
            if let Some(handle) = self.surface.locate_mutable_field(locator).await? {
                debug!("{} 字段定位成功: {}", session, locator);
                return Ok(Some(handle));
            }
        }
        Ok(None)
    }

    /// 关闭菜单和编辑框，再确认两者都已关闭
    ///
    /// 两个关闭动作互不依赖，一个失败不会跳过另一个。
    async fn close_everything(&self, session: &EditSession) -> Result<()> {
        let surface = self.surface.as_ref();
        let mut problems = Vec::new();
        debug!("{} 清理菜单/编辑框 (阶段: {:?})", session, session.phase());

        if let Err(e) = surface.force_close_editor().await {
            problems.push(format!("关闭编辑框: {:#}", e));
        }
        if let Err(e) = surface.close_action_menu().await {
            problems.push(format!("关闭操作菜单: {:#}", e));
        }

        match surface.is_editor_open().await {
            Ok(false) => {}
            Ok(true) => problems.push("编辑框仍处于打开状态".to_string()),
            Err(e) => problems.push(format!("检查编辑框: {:#}", e)),
        }
        match surface.is_action_menu_open().await {
            Ok(false) => {}
            Ok(true) => problems.push("操作菜单仍处于打开状态".to_string()),
            Err(e) => problems.push(format!("检查操作菜单: {:#}", e)),
        }

        if problems.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(problems.join("; "))
        }
    }
}
