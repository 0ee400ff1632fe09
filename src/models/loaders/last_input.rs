//! 上次使用的 (旧值, 新值) 输入
//!
//! 启动时读取、输入确定时写入；运行过程中核心从不读取它。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastInput {
    #[serde(default)]
    pub expected_old: String,
    #[serde(default)]
    pub desired_new: String,
}

impl LastInput {
    pub fn new(expected_old: impl Into<String>, desired_new: impl Into<String>) -> Self {
        Self {
            expected_old: expected_old.into(),
            desired_new: desired_new.into(),
        }
    }

    /// 由命令行参数决定本次输入
    ///
    /// # 参数
    /// - `old` / `new`: 命令行给出的旧值、新值
    /// - `saved`: 上次保存的输入
    ///
    /// # 返回
    /// 两个参数都给出时使用参数；一个都没有时沿用上次输入；其余情况为 None
    pub fn resolve(old: Option<&str>, new: Option<&str>, saved: Option<LastInput>) -> Option<LastInput> {
        match (old, new) {
            (Some(old), Some(new)) => Some(LastInput::new(old, new)),
            (None, None) => saved.filter(|s| !s.expected_old.is_empty() && !s.desired_new.is_empty()),
            _ => None,
        }
    }
}

/// 从 TOML 文件读取上次输入
///
/// # 参数
/// - `path`: 输入记录文件路径
///
/// # 返回
/// 文件不存在时返回 `Ok(None)`，内容无法解析时返回错误
pub async fn load_last_input(path: &Path) -> Result<Option<LastInput>> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取输入记录文件: {}", path.display()))?;

    let input: LastInput = toml::from_str(&content)
        .with_context(|| format!("无法解析输入记录文件: {}", path.display()))?;

    Ok(Some(input))
}

/// 保存本次输入
///
/// # 参数
/// - `path`: 输入记录文件路径，父目录不存在时自动创建
/// - `input`: 本次的旧值、新值
pub async fn save_last_input(path: &Path, input: &LastInput) -> Result<()> {
    let content = toml::to_string(input).context("无法序列化输入记录")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("无法创建目录: {}", parent.display()))?;
    }
    fs::write(path, content)
        .await
        .with_context(|| format!("无法写入输入记录文件: {}", path.display()))?;
    tracing::debug!("输入已保存至: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_last_input(&dir.path().join("absent.toml")).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_saved_input_is_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("last_input.toml");
        let input = LastInput {
            expected_old: "a.example".to_string(),
            desired_new: "c.example".to_string(),
        };

        save_last_input(&path, &input).await.unwrap();
        let loaded = load_last_input(&path).await.unwrap();

        assert_eq!(loaded, Some(input));
    }

    #[test]
    fn test_resolve_prefers_arguments() {
        let saved = Some(LastInput::new("a.example", "c.example"));
        assert_eq!(
            LastInput::resolve(Some("x.example"), Some("y.example"), saved.clone()),
            Some(LastInput::new("x.example", "y.example"))
        );
        assert_eq!(LastInput::resolve(None, None, saved.clone()), saved);
        assert_eq!(LastInput::resolve(Some("x.example"), None, saved), None);
        assert_eq!(LastInput::resolve(None, None, Some(LastInput::default())), None);
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_input.toml");
        std::fs::write(&path, "expected_old = [").unwrap();

        assert!(load_last_input(&path).await.is_err());
    }
}
