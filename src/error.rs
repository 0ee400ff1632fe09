use thiserror::Error;

/// 应用程序错误类型
///
/// 只覆盖"边界"错误：运行前置条件、配置、浏览器连接。
/// 单条记录的失败不是错误，而是 `Outcome`。
#[derive(Debug, Error)]
pub enum AppError {
    /// 运行相关错误
    #[error("运行错误: {0}")]
    Run(#[from] RunError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
}

/// 运行级错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunError {
    /// 输入值为空
    #[error("{field} 不能为空")]
    EmptyValue { field: &'static str },
    /// 旧值与新值相同
    #[error("旧值与新值相同，无需修改")]
    SameValue,
    /// 已有运行中的任务
    #[error("已有任务正在运行")]
    AlreadyRunning,
    /// 用户取消了确认
    #[error("用户未确认本次修改")]
    NotConfirmed,
    /// 无法获取记录列表
    #[error("无法获取记录列表: {message}")]
    ListingFailed { message: String },
}

/// 配置错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 时间参数必须大于 0
    #[error("配置项 {name} 必须大于 0")]
    ZeroDuration { name: &'static str },
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed {
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(port: u16, source: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed { port, source })
    }

    /// 是否为前置条件错误（未改变任何状态）
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            AppError::Run(
                RunError::EmptyValue { .. }
                    | RunError::SameValue
                    | RunError::AlreadyRunning
                    | RunError::NotConfirmed
            )
        )
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
