use std::time::Duration;

use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 管理页面 URL
    pub target_url: String,
    /// 优先复用标题包含此文本的已打开页面
    pub target_title: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 跳过交互式确认
    pub assume_yes: bool,
    /// 报告输出路径（.json / .csv）
    pub report_path: String,
    /// 上次输入的保存路径
    pub last_input_path: String,
    // --- 时间参数（毫秒） ---
    pub menu_open_wait_ms: u64,
    pub menu_retry_wait_ms: u64,
    pub editor_open_timeout_ms: u64,
    pub save_close_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub mutate_settle_ms: u64,
    pub record_settle_ms: u64,
    pub progress_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 2001,
            target_url: "http://localhost:8080/#/records".to_string(),
            target_title: None,
            verbose_logging: false,
            assume_yes: false,
            report_path: "bulk_edit_report.json".to_string(),
            last_input_path: "last_input.toml".to_string(),
            menu_open_wait_ms: 1000,
            menu_retry_wait_ms: 2500,
            editor_open_timeout_ms: 2000,
            save_close_timeout_ms: 5000,
            poll_interval_ms: 100,
            mutate_settle_ms: 300,
            record_settle_ms: 500,
            progress_interval_ms: 1000,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            browser_debug_port: env_or("BROWSER_DEBUG_PORT", default.browser_debug_port),
            target_url: std::env::var("TARGET_URL").unwrap_or(default.target_url),
            target_title: std::env::var("TARGET_TITLE").ok().or(default.target_title),
            verbose_logging: env_or("VERBOSE_LOGGING", default.verbose_logging),
            assume_yes: env_or("ASSUME_YES", default.assume_yes),
            report_path: std::env::var("REPORT_PATH").unwrap_or(default.report_path),
            last_input_path: std::env::var("LAST_INPUT_PATH").unwrap_or(default.last_input_path),
            menu_open_wait_ms: env_or("MENU_OPEN_WAIT_MS", default.menu_open_wait_ms),
            menu_retry_wait_ms: env_or("MENU_RETRY_WAIT_MS", default.menu_retry_wait_ms),
            editor_open_timeout_ms: env_or("EDITOR_OPEN_TIMEOUT_MS", default.editor_open_timeout_ms),
            save_close_timeout_ms: env_or("SAVE_CLOSE_TIMEOUT_MS", default.save_close_timeout_ms),
            poll_interval_ms: env_or("POLL_INTERVAL_MS", default.poll_interval_ms),
            mutate_settle_ms: env_or("MUTATE_SETTLE_MS", default.mutate_settle_ms),
            record_settle_ms: env_or("RECORD_SETTLE_MS", default.record_settle_ms),
            progress_interval_ms: env_or("PROGRESS_INTERVAL_MS", default.progress_interval_ms),
        }
    }

    /// 校验时间参数
    ///
    /// 等待与轮询间隔为 0 会让有界等待退化成忙等，直接拒绝。
    /// 稳定延迟允许为 0。
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("MENU_OPEN_WAIT_MS", self.menu_open_wait_ms),
            ("MENU_RETRY_WAIT_MS", self.menu_retry_wait_ms),
            ("EDITOR_OPEN_TIMEOUT_MS", self.editor_open_timeout_ms),
            ("SAVE_CLOSE_TIMEOUT_MS", self.save_close_timeout_ms),
            ("POLL_INTERVAL_MS", self.poll_interval_ms),
            ("PROGRESS_INTERVAL_MS", self.progress_interval_ms),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(ConfigError::ZeroDuration { name });
            }
        }
        Ok(())
    }

    pub fn timing(&self) -> Timing {
        Timing {
            menu_open_wait: Duration::from_millis(self.menu_open_wait_ms),
            menu_retry_wait: Duration::from_millis(self.menu_retry_wait_ms),
            editor_open_timeout: Duration::from_millis(self.editor_open_timeout_ms),
            save_close_timeout: Duration::from_millis(self.save_close_timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            mutate_settle: Duration::from_millis(self.mutate_settle_ms),
            record_settle: Duration::from_millis(self.record_settle_ms),
        }
    }
}

/// 流程层使用的时间参数
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// 首次等待操作菜单出现
    pub menu_open_wait: Duration,
    /// 重试时等待操作菜单出现（更长）
    pub menu_retry_wait: Duration,
    /// 等待编辑框出现
    pub editor_open_timeout: Duration,
    /// 保存后等待编辑框关闭
    pub save_close_timeout: Duration,
    /// 轮询间隔
    pub poll_interval: Duration,
    /// 写入字段后、点击保存前的稳定延迟
    pub mutate_settle: Duration,
    /// 每条记录之间的稳定延迟
    pub record_settle: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Config::default().timing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing_matches_targets() {
        let timing = Timing::default();
        assert_eq!(timing.editor_open_timeout, Duration::from_secs(2));
        assert_eq!(timing.save_close_timeout, Duration::from_secs(5));
        assert!(timing.menu_retry_wait > timing.menu_open_wait);
    }

    #[test]
    fn test_validate_rejects_zero_poll_interval() {
        let config = Config {
            poll_interval_ms: 0,
            ..Config::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroDuration {
                name: "POLL_INTERVAL_MS"
            })
        );
    }

    #[test]
    fn test_validate_allows_zero_settle() {
        let config = Config {
            record_settle_ms: 0,
            mutate_settle_ms: 0,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }
}
