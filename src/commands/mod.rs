// ============================================================================
// Commands 层：命令行与服务层之间的薄接口，统一返回 Result<T, String>
// ⛔ 禁止：包含业务逻辑
// ============================================================================

pub mod server;
pub mod settings;
