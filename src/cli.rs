use clap::Parser;

use crate::config::Config;
use crate::models::LastInput;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "bulk_field_rewrite")]
#[command(about = "把管理页面上字段等于旧值的记录批量改为新值")]
#[command(version)]
pub struct Cli {
    /// 旧值（省略时沿用上次输入）
    pub old: Option<String>,

    /// 新值（省略时沿用上次输入）
    pub new: Option<String>,

    /// 跳过运行前确认
    #[arg(short, long)]
    pub yes: bool,

    /// 报告输出路径（.json / .csv），覆盖 REPORT_PATH
    #[arg(long)]
    pub report: Option<String>,
}

impl Cli {
    /// 决定本次输入
    ///
    /// # 参数
    /// - `saved`: 上次保存的输入
    ///
    /// # 返回
    /// 参数不完整且没有可沿用的输入时返回 None
    pub fn resolve_input(&self, saved: Option<LastInput>) -> Option<LastInput> {
        LastInput::resolve(self.old.as_deref(), self.new.as_deref(), saved)
    }

    /// 用命令行参数覆盖环境变量配置
    pub fn apply_to(&self, config: &mut Config) {
        if self.yes {
            config.assume_yes = true;
        }
        if let Some(report) = &self.report {
            config.report_path = report.clone();
        }
    }
}
