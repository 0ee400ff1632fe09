//! 记录匹配 - 业务能力层
//!
//! 只负责判断"这一行是否需要修改"，纯读取，无副作用

use crate::models::{MatchDecision, SkipReason};
use crate::surface::RecordRef;

/// 记录匹配器
///
/// 逐字比较，不做大小写折叠或空白归一化。
#[derive(Debug, Clone)]
pub struct RecordMatcher {
    expected_old: String,
}

impl RecordMatcher {
    pub fn new(expected_old: impl Into<String>) -> Self {
        Self {
            expected_old: expected_old.into(),
        }
    }

    /// 判断一条记录是否需要修改
    ///
    /// # 参数
    /// - `record`: 列表快照中的一条记录
    ///
    /// # 返回
    /// 字段读不到时为 `FieldUnreadable` 跳过；与旧值逐字相等时为匹配；其余为 `NotMatching` 跳过
    pub fn classify<'a>(&self, record: &'a RecordRef) -> MatchDecision<'a> {
        let skip_reason = match record.observed_value.as_deref() {
            None => Some(SkipReason::FieldUnreadable),
            Some(value) if value == self.expected_old => None,
            Some(_) => Some(SkipReason::NotMatching),
        };
        MatchDecision {
            record,
            is_match: skip_reason.is_none(),
            skip_reason,
        }
    }
}
