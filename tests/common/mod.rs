//! 测试用的内存界面
//!
//! 每一行都可以单独脚本化各个阶段的行为。

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use bulk_field_rewrite::config::Timing;
use bulk_field_rewrite::orchestrator::RunControl;
use bulk_field_rewrite::services::RunPrompt;
use bulk_field_rewrite::surface::{FieldHandle, FieldLocator, RecordRef, SurfaceDriver};

/// 单行脚本
#[derive(Debug, Clone)]
pub struct Row {
    /// 列表中渲染的值，None 表示读不到
    pub value: Option<String>,
    /// 编辑框内显示的值（与列表不一致时模拟过期快照）
    pub editor_value: Option<String>,
    /// 前几次点击操作按钮不会打开菜单
    pub menu_failures: usize,
    pub edit_control_missing: bool,
    pub editor_never_opens: bool,
    /// 能命中字段的定位策略，None 表示都找不到
    pub field_locator: Option<FieldLocator>,
    pub save_unavailable: bool,
    /// 点击保存后编辑框不关闭
    pub save_never_closes: bool,
    /// 读取编辑框字段时界面报错
    pub read_error: bool,
    /// 保存时触发停止请求
    pub stop_on_save: bool,
}

impl Row {
    pub fn new(value: &str) -> Self {
        Self {
            value: Some(value.to_string()),
            editor_value: None,
            menu_failures: 0,
            edit_control_missing: false,
            editor_never_opens: false,
            field_locator: Some(FieldLocator::FirstTextInput),
            save_unavailable: false,
            save_never_closes: false,
            read_error: false,
            stop_on_save: false,
        }
    }

    pub fn unreadable() -> Self {
        Self {
            value: None,
            ..Self::new("")
        }
    }
}

#[derive(Debug, Default)]
struct State {
    rows: Vec<Row>,
    list_error: bool,
    /// 列表中第一条记录的序号
    first_index: usize,
    menu_open_for: Option<usize>,
    editor_open_for: Option<usize>,
    editor_buffer: Option<String>,
    menu_clicks: HashMap<usize, usize>,
    locator_attempts: Vec<FieldLocator>,
    notified_writes: Vec<(usize, String)>,
    edited: Vec<usize>,
}

pub struct FakeSurface {
    state: Mutex<State>,
    control: Option<RunControl>,
}

impl FakeSurface {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            state: Mutex::new(State {
                rows,
                first_index: 1,
                ..State::default()
            }),
            control: None,
        }
    }

    pub fn with_values(values: &[&str]) -> Self {
        Self::new(values.iter().map(|v| Row::new(v)).collect())
    }

    /// 共享运行控制，用于在保存时模拟停止请求
    pub fn with_control(mut self, control: RunControl) -> Self {
        self.control = Some(control);
        self
    }

    /// 列表序号从 `first` 开始（默认从 1 开始）
    pub fn indexed_from(self, first: usize) -> Self {
        self.state.lock().first_index = first;
        self
    }

    pub fn failing_listing() -> Self {
        let surface = Self::new(Vec::new());
        surface.state.lock().list_error = true;
        surface
    }

    pub fn value(&self, index: usize) -> Option<String> {
        let state = self.state.lock();
        state.rows[index - state.first_index].value.clone()
    }

    pub fn values(&self) -> Vec<Option<String>> {
        self.state.lock().rows.iter().map(|r| r.value.clone()).collect()
    }

    pub fn menu_open(&self) -> bool {
        self.state.lock().menu_open_for.is_some()
    }

    pub fn editor_open(&self) -> bool {
        self.state.lock().editor_open_for.is_some()
    }

    pub fn menu_clicks(&self, index: usize) -> usize {
        self.state.lock().menu_clicks.get(&index).copied().unwrap_or(0)
    }

    pub fn locator_attempts(&self) -> Vec<FieldLocator> {
        self.state.lock().locator_attempts.clone()
    }

    pub fn notified_writes(&self) -> Vec<(usize, String)> {
        self.state.lock().notified_writes.clone()
    }

    /// 打开过编辑框的记录
    pub fn edited(&self) -> Vec<usize> {
        self.state.lock().edited.clone()
    }

    fn row(state: &State, index: usize) -> Result<&Row> {
        match state.rows.get(index.wrapping_sub(state.first_index)) {
            Some(row) => Ok(row),
            None => bail!("第 {} 行不存在", index),
        }
    }
}

#[async_trait]
impl SurfaceDriver for FakeSurface {
    async fn list_records(&self) -> Result<Vec<RecordRef>> {
        let state = self.state.lock();
        if state.list_error {
            bail!("列表尚未渲染");
        }
        Ok(state
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| RecordRef::new(i + state.first_index, row.value.clone()))
            .collect())
    }

    async fn read_field(&self, record: &RecordRef) -> Result<Option<String>> {
        let state = self.state.lock();
        Ok(Self::row(&state, record.index)?.value.clone())
    }

    async fn open_action_menu(&self, record: &RecordRef) -> Result<bool> {
        let mut state = self.state.lock();
        let failures = Self::row(&state, record.index)?.menu_failures;
        let clicks = state.menu_clicks.entry(record.index).or_insert(0);
        *clicks += 1;
        if *clicks > failures {
            state.menu_open_for = Some(record.index);
        }
        Ok(true)
    }

    async fn is_action_menu_open(&self) -> Result<bool> {
        Ok(self.state.lock().menu_open_for.is_some())
    }

    async fn close_action_menu(&self) -> Result<()> {
        self.state.lock().menu_open_for = None;
        Ok(())
    }

    async fn invoke_edit(&self, record: &RecordRef) -> Result<bool> {
        let mut state = self.state.lock();
        let row = Self::row(&state, record.index)?.clone();
        if row.edit_control_missing {
            return Ok(false);
        }
        state.menu_open_for = None;
        if !row.editor_never_opens {
            state.editor_open_for = Some(record.index);
            state.editor_buffer = row.editor_value.or(row.value);
            state.edited.push(record.index);
        }
        Ok(true)
    }

    async fn is_editor_open(&self) -> Result<bool> {
        Ok(self.state.lock().editor_open_for.is_some())
    }

    async fn locate_mutable_field(&self, locator: &FieldLocator) -> Result<Option<FieldHandle>> {
        let mut state = self.state.lock();
        state.locator_attempts.push(locator.clone());
        let Some(index) = state.editor_open_for else {
            return Ok(None);
        };
        let row = Self::row(&state, index)?;
        if row.field_locator.as_ref() == Some(locator) {
            Ok(Some(FieldHandle {
                locator: locator.clone(),
                key: format!("row-{}", index),
            }))
        } else {
            Ok(None)
        }
    }

    async fn read_handle(&self, _handle: &FieldHandle) -> Result<String> {
        let state = self.state.lock();
        let Some(index) = state.editor_open_for else {
            bail!("编辑框已关闭");
        };
        if Self::row(&state, index)?.read_error {
            bail!("页面脚本执行失败");
        }
        Ok(state.editor_buffer.clone().unwrap_or_default())
    }

    async fn set_field_and_notify(&self, _handle: &FieldHandle, value: &str) -> Result<()> {
        let mut state = self.state.lock();
        let Some(index) = state.editor_open_for else {
            bail!("编辑框已关闭");
        };
        state.editor_buffer = Some(value.to_string());
        state.notified_writes.push((index, value.to_string()));
        Ok(())
    }

    async fn invoke_save(&self) -> Result<bool> {
        let mut state = self.state.lock();
        let Some(index) = state.editor_open_for else {
            return Ok(false);
        };
        let row = Self::row(&state, index)?.clone();
        if row.save_unavailable {
            return Ok(false);
        }
        if row.stop_on_save {
            if let Some(control) = &self.control {
                control.stop();
            }
        }
        if row.save_never_closes {
            return Ok(true);
        }
        let committed = state.editor_buffer.take();
        let position = index - state.first_index;
        state.rows[position].value = committed;
        state.editor_open_for = None;
        Ok(true)
    }

    async fn force_close_editor(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.editor_open_for = None;
        state.editor_buffer = None;
        Ok(())
    }
}

/// 查询编辑框状态总是报错的界面，其余行为交给内部的 `FakeSurface`
pub struct EditorStateUnreadable(pub Arc<FakeSurface>);

#[async_trait]
impl SurfaceDriver for EditorStateUnreadable {
    async fn list_records(&self) -> Result<Vec<RecordRef>> {
        self.0.list_records().await
    }

    async fn read_field(&self, record: &RecordRef) -> Result<Option<String>> {
        self.0.read_field(record).await
    }

    async fn open_action_menu(&self, record: &RecordRef) -> Result<bool> {
        self.0.open_action_menu(record).await
    }

    async fn is_action_menu_open(&self) -> Result<bool> {
        self.0.is_action_menu_open().await
    }

    async fn close_action_menu(&self) -> Result<()> {
        self.0.close_action_menu().await
    }

    async fn invoke_edit(&self, record: &RecordRef) -> Result<bool> {
        self.0.invoke_edit(record).await
    }

    async fn is_editor_open(&self) -> Result<bool> {
        bail!("编辑框状态脚本执行失败")
    }

    async fn locate_mutable_field(&self, locator: &FieldLocator) -> Result<Option<FieldHandle>> {
        self.0.locate_mutable_field(locator).await
    }

    async fn read_handle(&self, handle: &FieldHandle) -> Result<String> {
        self.0.read_handle(handle).await
    }

    async fn set_field_and_notify(&self, handle: &FieldHandle, value: &str) -> Result<()> {
        self.0.set_field_and_notify(handle, value).await
    }

    async fn invoke_save(&self) -> Result<bool> {
        self.0.invoke_save().await
    }

    async fn force_close_editor(&self) -> Result<()> {
        self.0.force_close_editor().await
    }
}

/// 记录输入锁定/恢复顺序的确认器
pub struct RecordingPrompt {
    pub answer: bool,
    pub inputs: Mutex<Vec<bool>>,
}

impl RecordingPrompt {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn input_changes(&self) -> Vec<bool> {
        self.inputs.lock().clone()
    }
}

#[async_trait]
impl RunPrompt for RecordingPrompt {
    async fn confirm(&self, _expected_old: &str, _desired_new: &str) -> bool {
        self.answer
    }

    fn set_inputs_enabled(&self, enabled: bool) {
        self.inputs.lock().push(enabled);
    }
}

pub fn timing() -> Timing {
    Timing::default()
}

pub fn shared(surface: FakeSurface) -> Arc<FakeSurface> {
    Arc::new(surface)
}
