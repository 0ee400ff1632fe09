//! 运行控制
//!
//! 进程内同一时间只允许一个运行。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Flags {
    /// 运行标志，每条记录前检查；停止请求会把它置为 false
    running: AtomicBool,
    /// 运行任务是否仍持有控制权，直到任务真正退出才释放
    active: AtomicBool,
}

/// 运行控制句柄，克隆后共享同一份状态
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    flags: Arc<Flags>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.flags.running.load(Ordering::SeqCst)
    }

    /// 是否有运行尚未退出（包括已请求停止、正在收尾的运行）
    pub fn is_active(&self) -> bool {
        self.flags.active.load(Ordering::SeqCst)
    }

    /// 请求停止，当前记录处理完后生效
    pub fn stop(&self) {
        self.flags.running.store(false, Ordering::SeqCst);
    }

    /// 尝试取得运行权，已有运行时返回 None
    pub(crate) fn try_acquire(&self) -> Option<RunGuard> {
        self.flags
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        self.flags.running.store(true, Ordering::SeqCst);
        Some(RunGuard {
            control: self.clone(),
        })
    }
}

/// 运行权，drop 时清除两个标志
#[derive(Debug)]
pub(crate) struct RunGuard {
    control: RunControl,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.control.flags.running.store(false, Ordering::SeqCst);
        self.control.flags.active.store(false, Ordering::SeqCst);
    }
}
