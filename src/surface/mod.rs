//! 交互界面驱动 - 外部协作者
//!
//! 核心只通过 [`SurfaceDriver`] 读写管理界面，不假设独占访问。

pub mod dom;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::infrastructure::{poll_until, WaitResult};

pub use dom::DomSurface;

/// 列表中的一行
///
/// `index` 从 1 开始，仅在本次快照内有效。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    pub index: usize,
    /// 快照时读到的目标字段值，读不到为 None
    pub observed_value: Option<String>,
}

impl RecordRef {
    pub fn new(index: usize, observed_value: Option<String>) -> Self {
        Self {
            index,
            observed_value,
        }
    }
}

/// 编辑框内已定位到的可编辑字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldHandle {
    /// 命中的定位策略
    pub locator: FieldLocator,
    /// 驱动内部用来再次找到该字段的标识
    pub key: String,
}

/// 字段定位策略，按顺序逐个尝试
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldLocator {
    /// 按表单字段名（name / id）
    ByName(String),
    /// 按标签文字
    ByLabel(String),
    /// 按占位提示
    ByPlaceholder(String),
    /// 编辑框内第一个文本输入框
    FirstTextInput,
}

impl FieldLocator {
    /// 目标管理页面使用的默认策略链
    pub fn default_chain() -> Vec<FieldLocator> {
        vec![
            FieldLocator::ByName("value".to_string()),
            FieldLocator::ByLabel("记录值".to_string()),
            FieldLocator::ByLabel("Value".to_string()),
            FieldLocator::ByPlaceholder("记录值".to_string()),
            FieldLocator::FirstTextInput,
        ]
    }
}

impl std::fmt::Display for FieldLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldLocator::ByName(name) => write!(f, "name={}", name),
            FieldLocator::ByLabel(label) => write!(f, "label={}", label),
            FieldLocator::ByPlaceholder(text) => write!(f, "placeholder={}", text),
            FieldLocator::FirstTextInput => write!(f, "first-text-input"),
        }
    }
}

/// 管理界面的原语
///
/// 所有方法都只做一次观察或一次动作；等待类方法基于
/// [`poll_until`] 提供默认实现。
#[async_trait]
pub trait SurfaceDriver: Send + Sync {
    /// 列表快照
    async fn list_records(&self) -> Result<Vec<RecordRef>>;

    /// 重新读取某行当前渲染的目标字段
    async fn read_field(&self, record: &RecordRef) -> Result<Option<String>>;

    /// 点击某行的操作菜单按钮，返回按钮是否存在
    async fn open_action_menu(&self, record: &RecordRef) -> Result<bool>;

    /// 操作菜单当前是否可见
    async fn is_action_menu_open(&self) -> Result<bool>;

    /// 关闭操作菜单（已关闭时无操作）
    async fn close_action_menu(&self) -> Result<()>;

    /// 点击菜单中的编辑项，返回该控件是否存在
    async fn invoke_edit(&self, record: &RecordRef) -> Result<bool>;

    /// 编辑框当前是否可见
    async fn is_editor_open(&self) -> Result<bool>;

    /// 用单个策略定位可编辑字段
    async fn locate_mutable_field(&self, locator: &FieldLocator) -> Result<Option<FieldHandle>>;

    /// 读取编辑框内字段的当前值
    async fn read_handle(&self, handle: &FieldHandle) -> Result<String>;

    /// 清空并写入新值，补发界面需要的输入事件
    async fn set_field_and_notify(&self, handle: &FieldHandle, value: &str) -> Result<()>;

    /// 点击保存，控件缺失或禁用时返回 false
    async fn invoke_save(&self) -> Result<bool>;

    /// 强制关闭编辑框（已关闭时无操作）
    async fn force_close_editor(&self) -> Result<()>;

    async fn wait_for_action_menu(&self, timeout: Duration, interval: Duration) -> Result<bool> {
        let result = poll_until(timeout, interval, || self.is_action_menu_open()).await?;
        Ok(result.is_reached())
    }

    async fn wait_for_editor_open(&self, timeout: Duration, interval: Duration) -> Result<bool> {
        let result = poll_until(timeout, interval, || self.is_editor_open()).await?;
        Ok(result.is_reached())
    }

    async fn wait_for_editor_closed(&self, timeout: Duration, interval: Duration) -> Result<bool> {
        let result = poll_until(timeout, interval, move || async move {
            Ok(!self.is_editor_open().await?)
        })
        .await?;
        Ok(result == WaitResult::Reached)
    }
}
