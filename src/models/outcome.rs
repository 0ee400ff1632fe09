//! 单条记录的最终结果

use serde::{Deserialize, Serialize};

use super::record::SkipReason;

/// 编辑流程中止原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "kebab-case")]
pub enum FailReason {
    MenuOpenFailed,
    EditControlMissing,
    EditorOpenTimeout,
    FieldNotFound,
    /// 编辑框内读到的值与旧值不一致
    ValueMismatch { observed: String },
    SaveControlUnavailable,
    /// 已点击保存但编辑框未关闭，服务端可能已经保存成功
    SaveNoConfirmation,
}

impl FailReason {
    pub fn code(&self) -> &'static str {
        match self {
            FailReason::MenuOpenFailed => "menu-open-failed",
            FailReason::EditControlMissing => "edit-control-missing",
            FailReason::EditorOpenTimeout => "editor-open-timeout",
            FailReason::FieldNotFound => "field-not-found",
            FailReason::ValueMismatch { .. } => "value-mismatch",
            FailReason::SaveControlUnavailable => "save-control-unavailable",
            FailReason::SaveNoConfirmation => "save-no-confirmation",
        }
    }

    /// 结果是否不确定（既不能算成功，也不能算确定失败）
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, FailReason::SaveNoConfirmation)
    }
}

impl std::fmt::Display for FailReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailReason::ValueMismatch { observed } => {
                write!(f, "{} (实际值: {})", self.code(), observed)
            }
            _ => f.write_str(self.code()),
        }
    }
}

/// 单条记录的最终结果，写入后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Success {
        index: usize,
        old_value: String,
        new_value: String,
    },
    Failed {
        index: usize,
        reason: FailReason,
    },
    Skipped {
        index: usize,
        observed_value: Option<String>,
        reason: SkipReason,
    },
    Error {
        index: usize,
        message: String,
    },
}

impl Outcome {
    pub fn index(&self) -> usize {
        match self {
            Outcome::Success { index, .. }
            | Outcome::Failed { index, .. }
            | Outcome::Skipped { index, .. }
            | Outcome::Error { index, .. } => *index,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Success { .. } => "success",
            Outcome::Failed { reason, .. } if reason.is_ambiguous() => "unconfirmed",
            Outcome::Failed { .. } => "failed",
            Outcome::Skipped { .. } => "skipped",
            Outcome::Error { .. } => "error",
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Outcome::Failed { reason, .. } if reason.is_ambiguous())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_no_confirmation_is_ambiguous_not_failed() {
        let outcome = Outcome::Failed {
            index: 2,
            reason: FailReason::SaveNoConfirmation,
        };
        assert!(outcome.is_ambiguous());
        assert_eq!(outcome.kind(), "unconfirmed");

        let definite = Outcome::Failed {
            index: 2,
            reason: FailReason::EditorOpenTimeout,
        };
        assert!(!definite.is_ambiguous());
        assert_eq!(definite.kind(), "failed");
    }

    #[test]
    fn test_value_mismatch_serializes_reason_code_and_observed() {
        let outcome = Outcome::Failed {
            index: 4,
            reason: FailReason::ValueMismatch {
                observed: "x.example".to_string(),
            },
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "failed");
        assert_eq!(json["reason"]["code"], "value-mismatch");
        assert_eq!(json["reason"]["observed"], "x.example");
        assert_eq!(outcome.index(), 4);
    }

    #[test]
    fn test_display_includes_observed_value() {
        let reason = FailReason::ValueMismatch {
            observed: "b.example".to_string(),
        };
        assert_eq!(reason.to_string(), "value-mismatch (实际值: b.example)");
        assert_eq!(FailReason::FieldNotFound.to_string(), "field-not-found");
    }
}
