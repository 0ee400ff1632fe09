//! 报告写入服务
//!
//! 只负责把账本快照写到磁盘，不关心流程

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};

pub use super::ledger::ReportFormat;
use super::ledger::OutcomeLedger;

/// 报告写入服务
pub struct ReportWriter {
    report_path: PathBuf,
}

impl ReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            report_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.report_path
    }

    /// 按扩展名选择格式，`.csv` 以外一律写 JSON
    pub fn format(&self) -> ReportFormat {
        match self.report_path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ReportFormat::Csv,
            _ => ReportFormat::Json,
        }
    }

    /// 写入当前快照
    ///
    /// # 参数
    /// - `ledger`: 要导出的账本
    ///
    /// # 返回
    /// 是否写入了文件，尚无运行时返回 false
    pub async fn write(&self, ledger: &OutcomeLedger) -> Result<bool> {
        let Some(content) = ledger.export(self.format())? else {
            warn!("⚠️ 尚未运行，没有可导出的报告");
            return Ok(false);
        };

        fs::write(&self.report_path, content)
            .await
            .with_context(|| format!("无法写入报告: {}", self.report_path.display()))?;

        info!("报告已保存至: {}", self.report_path.display());
        Ok(true)
    }
}
