use serde::{Deserialize, Serialize};

use crate::surface::RecordRef;

/// 跳过原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// 字段值与旧值不同
    NotMatching,
    /// 列表中读不到字段
    FieldUnreadable,
}

impl SkipReason {
    pub fn code(self) -> &'static str {
        match self {
            SkipReason::NotMatching => "not-matching",
            SkipReason::FieldUnreadable => "field-unreadable",
        }
    }
}

/// 匹配判定，仅在分类当下使用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchDecision<'a> {
    pub record: &'a RecordRef,
    pub is_match: bool,
    /// 未匹配时的原因
    pub skip_reason: Option<SkipReason>,
}
