//! # Bulk Field Rewrite
//!
//! 在无法控制数据模型的管理界面上批量、有条件地修改记录：
//! 扫描列表，找出目标字段等于旧值的行，逐条打开编辑框、核对、改写、保存并确认。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），提供 eval() 与有界轮询
//! - `browser/` - 连接浏览器
//! - `surface/` - 界面原语（`SurfaceDriver`），以及目标页面的 DOM 实现
//!
//! ### ② 业务能力层（Services）
//! - `RecordMatcher` - 判断记录是否需要修改
//! - `OutcomeLedger` - 只追加的结果账本
//! - `ReportWriter` - 导出报告
//! - `RunPrompt` - 运行前确认
//!
//! ### ③ 流程层（Workflow）
//! - `EditorFlow` - 单条记录的编辑状态机
//!
//! ### ④ 编排层（Orchestration）
//! - `RunOrchestrator` - 遍历快照、取消、汇总
//!
//! `cli` 解析命令行参数，`config` 读取环境变量配置。

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod surface;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::connect_to_browser_and_page;
pub use config::{Config, Timing};
pub use error::{AppError, AppResult, RunError};
pub use infrastructure::JsExecutor;
pub use models::{FailReason, Outcome, RunStats, RunStatus, SkipReason};
pub use orchestrator::{RunControl, RunOrchestrator};
pub use services::{OutcomeLedger, RecordMatcher, RunPrompt};
pub use surface::{DomSurface, FieldHandle, FieldLocator, RecordRef, SurfaceDriver};
pub use workflow::EditorFlow;
