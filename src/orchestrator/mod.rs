//! 编排层（Orchestration Layer）
//!
//! ```text
//! run_orchestrator (遍历列表快照)
//!     ↓
//! services::RecordMatcher (分类)
//!     ↓
//! workflow::EditorFlow (处理单条记录)
//!     ↓
//! surface::SurfaceDriver (界面原语)
//! ```
//!
//! - `run_control` - 进程内唯一的运行标志
//! - `run_orchestrator` - 单次运行的遍历、取消与结果汇总
//! - `progress` - 运行期间定时输出统计快照

pub mod progress;
pub mod run_control;
pub mod run_orchestrator;

pub use progress::{spawn_progress_reporter, ProgressReporter};
pub use run_control::RunControl;
pub use run_orchestrator::RunOrchestrator;
