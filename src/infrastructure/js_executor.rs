//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"的能力

use anyhow::{Context, Result};
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力
/// - 不认识记录 / 编辑框
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let js_code = js_code.into();
        let result = self
            .page
            .evaluate(js_code.as_str())
            .await
            .context("页面脚本执行失败")?;
        // 无返回值的脚本得到 undefined，按 null 处理
        let json_value = result.into_value().unwrap_or(JsonValue::Null);
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        debug!("脚本返回: {}", json_value);
        let typed_value = serde_json::from_value(json_value).context("脚本返回值格式不符")?;
        Ok(typed_value)
    }

    /// 以 JSON 字面量形式嵌入参数后执行函数体
    ///
    /// `body` 是一个以 `args` 为参数的函数体。
    pub async fn call_as<A: Serialize, T: DeserializeOwned>(&self, body: &str, args: &A) -> Result<T> {
        let js_code = format!("((args) => {{ {} }})({})", body, serde_json::to_string(args)?);
        self.eval_as(js_code).await
    }
}
