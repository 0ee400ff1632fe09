//! 结果账本 - 业务能力层
//!
//! 只追加；任何时候（包括运行中）都可以取只读快照。

use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use parking_lot::RwLock;
use tracing::warn;

use crate::models::{FailReason, Outcome, RunStats, RunStatus};

/// 报告格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Csv,
}

/// 结果账本
///
/// 克隆得到的是同一份账本的句柄。
#[derive(Debug, Clone, Default)]
pub struct OutcomeLedger {
    inner: Arc<RwLock<Option<RunStats>>>,
}

impl OutcomeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始新的一次运行，替换（而非合并）上一次的统计
    pub fn begin(&self, expected_old: &str, desired_new: &str) {
        *self.inner.write() = Some(RunStats::new(expected_old, desired_new));
    }

    pub fn set_total(&self, total: usize) {
        self.with_open(|stats| stats.total_count = total);
    }

    pub fn record_match(&self) {
        self.with_open(|stats| stats.matched_count += 1);
    }

    /// 追加一条结果
    ///
    /// # 参数
    /// - `outcome`: 一条记录的最终结果
    ///
    /// # 返回
    /// 是否被接受。同一索引只接受一次，已封存或已满的统计不再接受结果
    pub fn append(&self, outcome: Outcome) -> bool {
        let mut guard = self.inner.write();
        let Some(stats) = guard.as_mut().filter(|s| !s.is_sealed()) else {
            warn!("统计已封存，丢弃结果: {:?}", outcome);
            return false;
        };
        if stats.outcome_for(outcome.index()).is_some() {
            warn!("[记录 {}] 已有结果，丢弃重复结果", outcome.index());
            return false;
        }
        if stats.processed_count >= stats.total_count {
            warn!("[记录 {}] 超出快照范围，丢弃结果", outcome.index());
            return false;
        }
        stats.processed_count += 1;
        stats.outcomes.push(outcome);
        true
    }

    /// 封存本次统计
    ///
    /// # 参数
    /// - `status`: 运行的最终状态，已封存时忽略
    ///
    /// # 返回
    /// 封存后的统计；尚未运行过时为 None
    pub fn seal(&self, status: RunStatus) -> Option<RunStats> {
        let mut guard = self.inner.write();
        let stats = guard.as_mut()?;
        if !stats.is_sealed() {
            stats.status = status;
            stats.ended_at = Some(Local::now());
        }
        Some(stats.clone())
    }

    /// 当前统计的快照，尚未运行过时为 None
    pub fn snapshot(&self) -> Option<RunStats> {
        self.inner.read().clone()
    }

    /// 把当前快照导出为报告文本
    ///
    /// # 参数
    /// - `format`: JSON 或 CSV
    ///
    /// # 返回
    /// 报告文本；尚未运行过时为 `Ok(None)`
    pub fn export(&self, format: ReportFormat) -> Result<Option<String>> {
        self.snapshot()
            .map(|stats| -> Result<String> {
                match format {
                    ReportFormat::Json => Ok(serde_json::to_string_pretty(&stats)?),
                    ReportFormat::Csv => Ok(to_csv(&stats)),
                }
            })
            .transpose()
    }

    fn with_open(&self, f: impl FnOnce(&mut RunStats)) {
        if let Some(stats) = self.inner.write().as_mut().filter(|s| !s.is_sealed()) {
            f(stats);
        }
    }
}

fn to_csv(stats: &RunStats) -> String {
    let mut out = String::from("index,kind,old_value,value,reason\n");
    for outcome in &stats.outcomes {
        let (old, value, reason) = match outcome {
            Outcome::Success {
                old_value,
                new_value,
                ..
            } => (old_value.clone(), new_value.clone(), String::new()),
            Outcome::Failed { reason, .. } => {
                let observed = match reason {
                    FailReason::ValueMismatch { observed } => observed.clone(),
                    _ => String::new(),
                };
                (stats.expected_old.clone(), observed, reason.code().to_string())
            }
            Outcome::Skipped {
                observed_value,
                reason,
                ..
            } => (
                String::new(),
                observed_value.clone().unwrap_or_default(),
                reason.code().to_string(),
            ),
            Outcome::Error { message, .. } => {
                (stats.expected_old.clone(), String::new(), message.clone())
            }
        };
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            outcome.index(),
            outcome.kind(),
            csv_field(&old),
            csv_field(&value),
            csv_field(&reason)
        ));
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SkipReason;

    fn started(total: usize) -> OutcomeLedger {
        let ledger = OutcomeLedger::new();
        ledger.begin("a.example", "c.example");
        ledger.set_total(total);
        ledger
    }

    fn success(index: usize) -> Outcome {
        Outcome::Success {
            index,
            old_value: "a.example".to_string(),
            new_value: "c.example".to_string(),
        }
    }

    #[test]
    fn test_no_snapshot_before_first_run() {
        assert!(OutcomeLedger::new().snapshot().is_none());
    }

    #[test]
    fn test_duplicate_index_is_rejected() {
        let ledger = started(3);
        assert!(ledger.append(success(1)));
        assert!(!ledger.append(Outcome::Error {
            index: 1,
            message: "重复".to_string(),
        }));

        let stats = ledger.snapshot().unwrap();
        assert_eq!(stats.processed_count, 1);
        assert_eq!(stats.outcomes, vec![success(1)]);
    }

    #[test]
    fn test_processed_never_exceeds_total() {
        let ledger = started(1);
        assert!(ledger.append(success(1)));
        assert!(!ledger.append(success(2)));
        let stats = ledger.snapshot().unwrap();
        assert_eq!(stats.processed_count, stats.total_count);
    }

    #[test]
    fn test_sealed_stats_are_immutable() {
        let ledger = started(2);
        ledger.append(success(1));
        let sealed = ledger.seal(RunStatus::Cancelled).unwrap();
        assert!(sealed.is_sealed());

        assert!(!ledger.append(success(2)));
        ledger.record_match();
        // 再次封存不改变状态
        let again = ledger.seal(RunStatus::Completed).unwrap();
        assert_eq!(again, sealed);
    }

    #[test]
    fn test_begin_supersedes_previous_run() {
        let ledger = started(2);
        ledger.append(success(1));
        ledger.seal(RunStatus::Completed);

        ledger.begin("c.example", "d.example");
        let stats = ledger.snapshot().unwrap();
        assert_eq!(stats.expected_old, "c.example");
        assert!(stats.outcomes.is_empty());
        assert_eq!(stats.status, RunStatus::Running);
    }

    #[test]
    fn test_counts_keep_unconfirmed_apart() {
        let ledger = started(4);
        ledger.append(success(1));
        ledger.append(Outcome::Failed {
            index: 2,
            reason: FailReason::SaveNoConfirmation,
        });
        ledger.append(Outcome::Failed {
            index: 3,
            reason: FailReason::FieldNotFound,
        });
        ledger.append(Outcome::Skipped {
            index: 4,
            observed_value: Some("b.example".to_string()),
            reason: SkipReason::NotMatching,
        });

        let stats = ledger.snapshot().unwrap();
        assert_eq!(stats.success_count(), 1);
        assert_eq!(stats.unconfirmed_count(), 1);
        assert_eq!(stats.failed_count(), 1);
        assert_eq!(stats.skipped_count(), 1);
        assert_eq!(stats.error_count(), 0);
    }

    #[test]
    fn test_csv_export_quotes_fields() {
        let ledger = started(2);
        ledger.append(success(1));
        ledger.append(Outcome::Error {
            index: 2,
            message: "脚本失败, \"超时\"".to_string(),
        });

        let csv = ledger.export(ReportFormat::Csv).unwrap().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "index,kind,old_value,value,reason");
        assert_eq!(lines[1], "1,success,a.example,c.example,");
        assert_eq!(lines[2], "2,error,a.example,,\"脚本失败, \"\"超时\"\"\"");
    }

    #[test]
    fn test_json_export_round_trips_snapshot() {
        let ledger = started(1);
        ledger.append(success(1));
        let json = ledger.export(ReportFormat::Json).unwrap().unwrap();
        let parsed: RunStats = serde_json::from_str(&json).unwrap();
        assert_eq!(Some(parsed), ledger.snapshot());
    }
}
