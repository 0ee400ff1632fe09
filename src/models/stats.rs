//! 运行统计

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::outcome::Outcome;

/// 运行状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    /// 收到停止请求，剩余记录未访问
    Cancelled,
    /// 运行级错误
    Aborted { message: String },
}

/// 一次运行的统计
///
/// 运行开始时创建，结束时封存（`ended_at` 被设置），之后只读。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub expected_old: String,
    pub desired_new: String,
    pub started_at: DateTime<Local>,
    pub ended_at: Option<DateTime<Local>>,
    pub status: RunStatus,
    /// 已访问的记录数
    pub processed_count: usize,
    /// 快照中的记录总数
    pub total_count: usize,
    /// 列表阶段字段等于旧值的记录数
    pub matched_count: usize,
    pub outcomes: Vec<Outcome>,
}

impl RunStats {
    pub fn new(expected_old: impl Into<String>, desired_new: impl Into<String>) -> Self {
        Self {
            expected_old: expected_old.into(),
            desired_new: desired_new.into(),
            started_at: Local::now(),
            ended_at: None,
            status: RunStatus::Running,
            processed_count: 0,
            total_count: 0,
            matched_count: 0,
            outcomes: Vec::new(),
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.ended_at.is_some()
    }

    pub fn success_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Success { .. }))
    }

    /// 确定失败的数量，不含保存未确认
    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }) && !o.is_ambiguous())
    }

    /// 保存未确认的数量
    pub fn unconfirmed_count(&self) -> usize {
        self.count(Outcome::is_ambiguous)
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped { .. }))
    }

    pub fn error_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Error { .. }))
    }

    pub fn outcome_for(&self, index: usize) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| o.index() == index)
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.ended_at.unwrap_or_else(Local::now) - self.started_at
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}
