//! 有界轮询
//!
//! 等待外部驱动的状态变化（菜单打开、编辑框打开/关闭），
//! 只返回"到达"或"超时"，从不无限阻塞。

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tokio::time::{sleep, Instant};

/// 轮询结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitResult {
    /// 条件已满足
    Reached,
    /// 等待超时
    TimedOut,
}

impl WaitResult {
    pub fn is_reached(self) -> bool {
        self == WaitResult::Reached
    }
}

/// 反复调用 `check` 直到返回 true 或超时
///
/// # 参数
/// - `timeout`: 最长等待时间
/// - `interval`: 两次检查之间的间隔
/// - `check`: 条件检查，返回错误时立即向上传播
///
/// # 返回
/// 条件满足为 `Reached`，否则为 `TimedOut`。超时前至少检查一次，截止时刻再检查最后一次
pub async fn poll_until<F, Fut>(timeout: Duration, interval: Duration, mut check: F) -> Result<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if check().await? {
            return Ok(WaitResult::Reached);
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(WaitResult::TimedOut);
        }
        sleep(interval.min(deadline - now)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_reached_after_a_few_checks() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result = poll_until(Duration::from_secs(2), Duration::from_millis(100), move || async move {
            Ok(calls.fetch_add(1, Ordering::SeqCst) >= 3)
        })
        .await
        .unwrap();

        assert_eq!(result, WaitResult::Reached);
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_within_bound() {
        let start = Instant::now();
        let result = poll_until(Duration::from_secs(2), Duration::from_millis(300), || async {
            Ok(false)
        })
        .await
        .unwrap();

        assert_eq!(result, WaitResult::TimedOut);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_error_propagates() {
        let result = poll_until(Duration::from_secs(1), Duration::from_millis(100), || async {
            Err::<bool, _>(anyhow::anyhow!("页面已关闭"))
        })
        .await;

        assert!(result.is_err());
    }
}
