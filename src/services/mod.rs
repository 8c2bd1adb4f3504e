// ============================================================================
// 业务层：纯 Rust 核心逻辑
// ✅ 特点：classpath 解析与进程编排都通过 trait 注入协作者，方便写 #[test]
// ⛔ 禁止：直接读取全局状态，所有上下文由调用方显式传入
// ============================================================================

pub mod assembler;
pub mod bootstrap;
pub mod classpath_walker;
pub mod launcher;
pub mod managed_filter;
pub mod normalizer;
pub mod server_config;
pub mod webapp_classpath;
pub mod workspace;

// ============================================================================
// 常量定义
// ============================================================================

/// 每个项目的 webapp classpath 文件名，由启动后的 Tomcat 读取
pub const WEBAPP_CLASSPATH_FILENAME: &str = ".#webclasspath";

/// 平台默认 JRE container，未勾选时不展开
pub const JRE_CONTAINER: &str = "org.eclipse.jdt.launching.JRE_CONTAINER";

/// Maven 依赖 container 标识后缀
pub const MANAGED_CONTAINER_SUFFIX: &str = "MAVEN2_CLASSPATH_CONTAINER";

/// 偏好设置中列表值的分隔符
pub const PREF_LIST_SEPARATOR: &str = ";";

/// Maven 依赖黑名单：Tomcat 自带这些 jar，重复提供不同版本会导致启动失败
///
/// 匹配对象为 jar 文件名，允许最多 10 个版本字符；
/// annotations-api 至少要带一个版本字符，不带版本的 annotations-api.jar 保留。
pub const MANAGED_JAR_DENYLIST: &[&str] = &[
    r"^.*servlet-api[^/\\]{0,10}\.jar$",
    r"^.*jasper[^/\\]{0,10}\.jar$",
    r"^.*annotations-api[^/\\]{0,10}.\.jar$",
    r"^.*el-api[^/\\]{0,10}\.jar$",
    r"^.*jsp-api[^/\\]{0,10}\.jar$",
];

/// 并入 Tomcat 系统 classpath 时需要剔除的 jar 名片段
pub const RUNTIME_JAR_MARKERS: &[&str] = &["servlet-api", "el-api", "jasper-el", "jsp-api"];
