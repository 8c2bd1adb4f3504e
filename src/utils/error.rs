// ============================================================================
// 统一错误类型定义
// 使用 thiserror 派生宏，按 classpath 解析 / 文件写入 / 启动三类划分
// ============================================================================

use thiserror::Error;

/// 应用统一错误枚举
///
/// 只有 `LaunchError` 会中断 start / stop / restart 等用户操作，
/// 其余错误在服务层被记录日志后降级处理。
/// 通过 `impl From<AppError> for String` 保持与 command 层 `Result<T, String>` 的兼容。
#[derive(Debug, Error)]
pub enum AppError {
    /// 参数验证失败（如偏好设置值为空、清单字段缺失）
    #[error("验证失败：{0}")]
    ValidationError(String),

    /// 项目配置读取失败（无法读取声明条目、无法解析 container）
    #[error("项目配置读取失败：{0}")]
    ConfigError(String),

    /// 工作区中不存在该项目
    #[error("项目不存在：{0}")]
    ProjectNotFound(String),

    /// 启动 / 停止服务进程失败
    #[error("启动失败：{0}")]
    LaunchError(String),

    /// 文件系统 IO 错误
    #[error("IO 错误：{0}")]
    IoError(#[from] std::io::Error),

    /// 数据库操作错误
    #[error("{0}")]
    DatabaseError(String),

    /// 不支持的 Tomcat 版本
    #[error("不支持的 Tomcat 版本：{0}")]
    UnsupportedServerVersion(String),
}

/// 便捷类型别名，统一项目内的 Result 签名
pub type AppResult<T> = Result<T, AppError>;

/// 将 AppError 转换为 String，供 command 层直接返回
impl From<AppError> for String {
    fn from(err: AppError) -> Self {
        err.to_string()
    }
}
