//! 运行前确认与输入锁定
//!
//! 修改不可撤销，开始前必须由操作者确认 (旧值, 新值)。

use std::io::{BufRead, Write};

use async_trait::async_trait;
use tracing::{debug, warn};

/// 与操作者交互的协作者
#[async_trait]
pub trait RunPrompt: Send + Sync {
    /// 确认本次修改
    async fn confirm(&self, expected_old: &str, desired_new: &str) -> bool;

    /// 运行期间禁用 / 恢复输入
    fn set_inputs_enabled(&self, _enabled: bool) {}
}

/// 终端确认，输入 y / yes 视为同意
pub struct ConsolePrompt;

#[async_trait]
impl RunPrompt for ConsolePrompt {
    async fn confirm(&self, expected_old: &str, desired_new: &str) -> bool {
        let question = format!(
            "即将把所有值为 \"{}\" 的记录改为 \"{}\"，此操作不可撤销。继续? [y/N] ",
            expected_old, desired_new
        );
        let answer = tokio::task::spawn_blocking(move || {
            let mut stdout = std::io::stdout();
            let _ = stdout.write_all(question.as_bytes());
            let _ = stdout.flush();
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => is_yes(&line),
            Ok(Err(e)) => {
                warn!("读取确认输入失败: {}", e);
                false
            }
            Err(e) => {
                warn!("确认任务失败: {}", e);
                false
            }
        }
    }

    fn set_inputs_enabled(&self, enabled: bool) {
        debug!("输入{}", if enabled { "已恢复" } else { "已锁定" });
    }
}

/// 自动同意（--yes 或测试）
pub struct AutoConfirm(pub bool);

#[async_trait]
impl RunPrompt for AutoConfirm {
    async fn confirm(&self, _expected_old: &str, _desired_new: &str) -> bool {
        self.0
    }
}

fn is_yes(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
