//! 单条记录的编辑会话
//!
//! 由编辑状态机独占，记录处理结束即销毁。

use std::fmt::Display;

use tracing::debug;

use crate::models::{FailReason, Outcome};

/// 编辑阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    Closed,
    OpeningMenu,
    MenuOpen,
    EditorOpening,
    EditorOpen,
    Verifying,
    Mutating,
    Saving,
    Confirmed,
    Aborted,
}

impl EditPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, EditPhase::Confirmed | EditPhase::Aborted)
    }

    /// 合法的下一阶段（不含中止）
    fn next(self) -> Option<EditPhase> {
        match self {
            EditPhase::Closed => Some(EditPhase::OpeningMenu),
            EditPhase::OpeningMenu => Some(EditPhase::MenuOpen),
            EditPhase::MenuOpen => Some(EditPhase::EditorOpening),
            EditPhase::EditorOpening => Some(EditPhase::EditorOpen),
            EditPhase::EditorOpen => Some(EditPhase::Verifying),
            EditPhase::Verifying => Some(EditPhase::Mutating),
            EditPhase::Mutating => Some(EditPhase::Saving),
            EditPhase::Saving => Some(EditPhase::Confirmed),
            EditPhase::Confirmed | EditPhase::Aborted => None,
        }
    }
}

/// 编辑会话
#[derive(Debug, Clone)]
pub struct EditSession {
    pub index: usize,
    pub expected_old: String,
    pub desired_new: String,
    /// 编辑框内修改前读到的值
    pub verified_value: Option<String>,
    phase: EditPhase,
    outcome: Option<Outcome>,
}

impl EditSession {
    pub fn new(index: usize, expected_old: impl Into<String>, desired_new: impl Into<String>) -> Self {
        Self {
            index,
            expected_old: expected_old.into(),
            desired_new: desired_new.into(),
            verified_value: None,
            phase: EditPhase::Closed,
            outcome: None,
        }
    }

    pub fn phase(&self) -> EditPhase {
        self.phase
    }

    pub fn into_outcome(self) -> Option<Outcome> {
        self.outcome
    }

    /// 进入下一阶段
    ///
    /// 只允许按顺序前进；`Confirmed` 必须通过 [`EditSession::confirm`] 进入。
    pub(crate) fn advance(&mut self, to: EditPhase) {
        debug_assert!(to != EditPhase::Confirmed, "Confirmed 只能由 confirm() 进入");
        debug_assert_eq!(self.phase.next(), Some(to), "非法阶段跳转 {:?} -> {:?}", self.phase, to);
        debug!("{} {:?} -> {:?}", self, self.phase, to);
        self.phase = to;
    }

    pub(crate) fn abort(&mut self, reason: FailReason) {
        debug!("{} {:?} -> Aborted ({})", self, self.phase, reason);
        self.phase = EditPhase::Aborted;
        self.outcome = Some(Outcome::Failed {
            index: self.index,
            reason,
        });
    }

    pub(crate) fn confirm(&mut self) {
        debug_assert_eq!(self.phase, EditPhase::Saving);
        self.phase = EditPhase::Confirmed;
        self.outcome = Some(Outcome::Success {
            index: self.index,
            old_value: self
                .verified_value
                .clone()
                .unwrap_or_else(|| self.expected_old.clone()),
            new_value: self.desired_new.clone(),
        });
    }
}

impl Display for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[记录 {}]", self.index)
    }
}
