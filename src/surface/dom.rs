//! 目标管理页面的 DOM 驱动
//!
//! 选择器只针对这一个页面，不是通用的浏览器自动化抽象。

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{FieldHandle, FieldLocator, RecordRef, SurfaceDriver};
use crate::infrastructure::JsExecutor;

const ROW_SELECTOR: &str = "table tbody tr";
const VALUE_CELL_SELECTOR: &str = "td[data-field=\"value\"], td.record-value";
const ACTION_BUTTON_SELECTOR: &str = "[data-action=\"more\"], button.record-actions";
const MENU_SELECTOR: &str = "[role=\"menu\"], .dropdown-menu";
const EDITOR_SELECTOR: &str = "[role=\"dialog\"], .modal";
const EDIT_LABELS: [&str; 2] = ["编辑", "Edit"];
const SAVE_LABELS: [&str; 2] = ["保存", "Save"];
const CLOSE_LABELS: [&str; 3] = ["取消", "关闭", "Cancel"];
/// 定位成功后打在字段上的标记属性
const FIELD_MARK: &str = "data-bulk-edit-target";

/// 所有脚本共享的辅助函数
const PRELUDE: &str = r#"
    const visible = (el) => !!el && el.offsetParent !== null && getComputedStyle(el).visibility !== 'hidden';
    const firstVisible = (sel, root) => Array.from((root || document).querySelectorAll(sel)).find(visible) || null;
    const byText = (root, sel, labels) => Array.from(root.querySelectorAll(sel))
        .find((el) => visible(el) && labels.includes(el.textContent.trim())) || null;
"#;

/// 浏览器页面上的界面驱动
pub struct DomSurface {
    executor: JsExecutor,
}

#[derive(Debug, Deserialize)]
struct LocateReply {
    found: bool,
}

impl DomSurface {
    pub fn new(executor: JsExecutor) -> Self {
        Self { executor }
    }

    async fn run<T: serde::de::DeserializeOwned>(&self, body: &str, args: serde_json::Value) -> Result<T> {
        let script = format!("{}\n{}", PRELUDE, body);
        self.executor.call_as(&script, &args).await
    }

    fn base_args() -> serde_json::Value {
        json!({
            "row": ROW_SELECTOR,
            "cell": VALUE_CELL_SELECTOR,
            "actionButton": ACTION_BUTTON_SELECTOR,
            "menu": MENU_SELECTOR,
            "editor": EDITOR_SELECTOR,
            "editLabels": EDIT_LABELS,
            "saveLabels": SAVE_LABELS,
            "closeLabels": CLOSE_LABELS,
            "mark": FIELD_MARK,
        })
    }

    fn with_args(extra: serde_json::Value) -> serde_json::Value {
        let mut args = Self::base_args();
        if let (Some(base), Some(extra)) = (args.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        args
    }
}

#[async_trait]
impl SurfaceDriver for DomSurface {
    async fn list_records(&self) -> Result<Vec<RecordRef>> {
        let values: Vec<Option<String>> = self
            .run(
                r#"
                return Array.from(document.querySelectorAll(args.row)).map((row) => {
                    const cell = row.querySelector(args.cell);
                    return cell ? cell.textContent.trim() : null;
                });
                "#,
                Self::base_args(),
            )
            .await?;
        debug!("列表快照: {} 行", values.len());
        Ok(values
            .into_iter()
            .enumerate()
            .map(|(i, value)| RecordRef::new(i + 1, value))
            .collect())
    }

    async fn read_field(&self, record: &RecordRef) -> Result<Option<String>> {
        self.run(
            r#"
            const row = document.querySelectorAll(args.row)[args.index - 1];
            const cell = row ? row.querySelector(args.cell) : null;
            return cell ? cell.textContent.trim() : null;
            "#,
            Self::with_args(json!({ "index": record.index })),
        )
        .await
    }

    async fn open_action_menu(&self, record: &RecordRef) -> Result<bool> {
        self.run(
            r#"
            const row = document.querySelectorAll(args.row)[args.index - 1];
            const button = row ? row.querySelector(args.actionButton) : null;
            if (!button) return false;
            button.scrollIntoView({ block: 'center' });
            button.click();
            return true;
            "#,
            Self::with_args(json!({ "index": record.index })),
        )
        .await
    }

    async fn is_action_menu_open(&self) -> Result<bool> {
        self.run("return !!firstVisible(args.menu);", Self::base_args())
            .await
    }

    async fn close_action_menu(&self) -> Result<()> {
        let _: bool = self
            .run(
                r#"
                if (!firstVisible(args.menu)) return false;
                document.dispatchEvent(new KeyboardEvent('keydown', { key: 'Escape', bubbles: true }));
                document.body.click();
                return true;
                "#,
                Self::base_args(),
            )
            .await?;
        Ok(())
    }

    async fn invoke_edit(&self, _record: &RecordRef) -> Result<bool> {
        self.run(
            r#"
            const menu = firstVisible(args.menu);
            if (!menu) return false;
            const item = byText(menu, 'li, a, button, [role="menuitem"]', args.editLabels);
            if (!item) return false;
            item.click();
            return true;
            "#,
            Self::base_args(),
        )
        .await
    }

    async fn is_editor_open(&self) -> Result<bool> {
        self.run("return !!firstVisible(args.editor);", Self::base_args())
            .await
    }

    async fn locate_mutable_field(&self, locator: &FieldLocator) -> Result<Option<FieldHandle>> {
        let (kind, needle) = match locator {
            FieldLocator::ByName(name) => ("name", name.as_str()),
            FieldLocator::ByLabel(label) => ("label", label.as_str()),
            FieldLocator::ByPlaceholder(text) => ("placeholder", text.as_str()),
            FieldLocator::FirstTextInput => ("first", ""),
        };
        let reply: LocateReply = self
            .run(
                r#"
                const editor = firstVisible(args.editor);
                if (!editor) return { found: false };
                const inputs = Array.from(editor.querySelectorAll('input, textarea')).filter(visible)
                    .filter((el) => !el.type || ['text', 'search', 'url', ''].includes(el.type) || el.tagName === 'TEXTAREA');
                let target = null;
                if (args.kind === 'name') {
                    target = inputs.find((el) => el.name === args.needle || el.id === args.needle) || null;
                } else if (args.kind === 'label') {
                    const label = Array.from(editor.querySelectorAll('label')).find((l) => l.textContent.trim() === args.needle);
                    if (label) {
                        target = label.htmlFor ? editor.querySelector('#' + CSS.escape(label.htmlFor)) : null;
                        if (!target) {
                            const item = label.closest('.form-item, .el-form-item, .ant-form-item, div');
                            target = item ? item.querySelector('input, textarea') : null;
                        }
                    }
                } else if (args.kind === 'placeholder') {
                    target = inputs.find((el) => (el.placeholder || '').includes(args.needle)) || null;
                } else {
                    target = inputs[0] || null;
                }
                if (!target) return { found: false };
                document.querySelectorAll('[' + args.mark + ']').forEach((el) => el.removeAttribute(args.mark));
                target.setAttribute(args.mark, '1');
                return { found: true };
                "#,
                Self::with_args(json!({ "kind": kind, "needle": needle })),
            )
            .await?;

        Ok(reply.found.then(|| FieldHandle {
            locator: locator.clone(),
            key: format!("[{}]", FIELD_MARK),
        }))
    }

    async fn read_handle(&self, handle: &FieldHandle) -> Result<String> {
        let value: Option<String> = self
            .run(
                r#"
                const el = document.querySelector(args.key);
                return el ? el.value : null;
                "#,
                Self::with_args(json!({ "key": handle.key })),
            )
            .await?;
        value.ok_or_else(|| anyhow::anyhow!("编辑框字段已消失 ({})", handle.locator))
    }

    async fn set_field_and_notify(&self, handle: &FieldHandle, value: &str) -> Result<()> {
        let written: bool = self
            .run(
                r#"
                const el = document.querySelector(args.key);
                if (!el) return false;
                const proto = el.tagName === 'TEXTAREA' ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
                const setter = Object.getOwnPropertyDescriptor(proto, 'value').set;
                el.focus();
                setter.call(el, '');
                el.dispatchEvent(new Event('input', { bubbles: true }));
                setter.call(el, args.value);
                el.dispatchEvent(new Event('input', { bubbles: true }));
                el.dispatchEvent(new Event('change', { bubbles: true }));
                el.dispatchEvent(new Event('blur', { bubbles: true }));
                el.dispatchEvent(new KeyboardEvent('keyup', { bubbles: true, key: 'End' }));
                el.blur();
                return true;
                "#,
                Self::with_args(json!({ "key": handle.key, "value": value })),
            )
            .await?;
        if !written {
            anyhow::bail!("写入时字段已消失 ({})", handle.locator);
        }
        Ok(())
    }

    async fn invoke_save(&self) -> Result<bool> {
        self.run(
            r#"
            const editor = firstVisible(args.editor);
            if (!editor) return false;
            const button = byText(editor, 'button', args.saveLabels) || editor.querySelector('button[type="submit"]');
            if (!button || button.disabled || button.getAttribute('aria-disabled') === 'true') return false;
            button.click();
            return true;
            "#,
            Self::base_args(),
        )
        .await
    }

    async fn force_close_editor(&self) -> Result<()> {
        let _: bool = self
            .run(
                r#"
                const editor = firstVisible(args.editor);
                if (!editor) return false;
                const button = editor.querySelector('[aria-label="Close"], .close, .modal-close')
                    || byText(editor, 'button', args.closeLabels);
                if (button) {
                    button.click();
                } else {
                    document.dispatchEvent(new KeyboardEvent('keydown', { key: 'Escape', bubbles: true }));
                }
                return true;
                "#,
                Self::base_args(),
            )
            .await?;
        Ok(())
    }
}
