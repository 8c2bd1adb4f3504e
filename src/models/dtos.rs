// ============================================================================
// 数据模型定义
// 工作区清单、项目依赖条目、偏好设置快照，仅包含字段定义和序列化派生
// ⛔ 禁止：包含复杂的业务逻辑方法
// ============================================================================

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// 项目声明的单个依赖条目
///
/// 路径均为工作区路径（如 `/web/bin`）或绝对文件系统路径（如 `/opt/lib/x.jar`），
/// 由 normalizer 统一转换为绝对路径字符串。
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DependencyEntry {
    /// 源码目录，classpath 贡献的是其输出目录
    Source {
        path: String,
        #[serde(default)]
        output_location: Option<String>,
    },
    /// 已解析的 jar / class 目录
    Library { path: String },
    /// 引用工作区中的另一个项目，路径最后一段为项目名
    Project { path: String },
    /// 运行时解析的条目集合（如 Maven、JRE）
    Container { path: String },
    /// 变量条目，walker 不专门识别，按路径加入
    Variable { path: String },
}

impl DependencyEntry {
    /// 条目声明的原始路径
    pub fn path(&self) -> &str {
        match self {
            DependencyEntry::Source { path, .. }
            | DependencyEntry::Library { path }
            | DependencyEntry::Project { path }
            | DependencyEntry::Container { path }
            | DependencyEntry::Variable { path } => path,
        }
    }

    /// 条目类型名称，用于诊断日志
    pub fn kind_name(&self) -> &'static str {
        match self {
            DependencyEntry::Source { .. } => "source",
            DependencyEntry::Library { .. } => "library",
            DependencyEntry::Project { .. } => "project",
            DependencyEntry::Container { .. } => "container",
            DependencyEntry::Variable { .. } => "variable",
        }
    }

    /// PROJECT 条目引用的项目名（路径最后一段）
    pub fn project_name(&self) -> Option<&str> {
        match self {
            DependencyEntry::Project { path } => path
                .trim_end_matches(['/', '\\'])
                .rsplit(['/', '\\'])
                .next()
                .filter(|name| !name.is_empty()),
            _ => None,
        }
    }
}

/// 项目的 Tomcat 设置（存在即表示项目声明了 Tomcat nature）
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TomcatSettings {
    /// 用户勾选进 webapp classpath 的条目路径；`None` 表示从未配置
    #[serde(default)]
    pub web_classpath_entries: Option<Vec<String>>,
    /// 是否额外收集 Maven 管理的依赖
    #[serde(default)]
    pub managed_classpath: bool,
    /// web 根目录（相对项目目录），classpath 文件写在这里
    #[serde(default)]
    pub root_dir: Option<String>,
    /// WAR 导出位置
    #[serde(default)]
    pub war_location: String,
    /// 导出 WAR 时是否包含源码
    #[serde(default)]
    pub export_source: bool,
}

/// 工作区中的一个项目
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ProjectNode {
    /// 项目名（工作区内唯一）
    pub name: String,
    /// 项目目录的绝对路径
    pub location: String,
    /// 输出目录的工作区路径，如 `/web/bin`
    pub output_location: String,
    /// 按声明顺序排列的依赖条目
    #[serde(default)]
    pub entries: Vec<DependencyEntry>,
    #[serde(default = "default_true")]
    pub open: bool,
    #[serde(default = "default_true")]
    pub java_nature: bool,
    #[serde(default)]
    pub tomcat: Option<TomcatSettings>,
}

/// 偏好设置快照，由 `Database::load_preferences` 读出后注入编排器
///
/// 列表类字段保持原始字符串，使用 `;` 分隔，由 assembler 负责切分。
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Preferences {
    /// Tomcat 版本标识（如 "tomcat9"）
    pub tomcat_version: String,
    /// Tomcat 安装目录（CATALINA_HOME）
    pub tomcat_dir: String,
    /// Tomcat 实例目录（CATALINA_BASE），为空时回退到安装目录
    pub tomcat_base: String,
    /// 自定义 server.xml 路径
    pub config_file: Option<String>,
    pub debug_mode: bool,
    /// 额外的 JVM classpath
    pub jvm_classpath: String,
    /// 额外的 boot classpath
    pub jvm_bootclasspath: String,
    /// 额外的 JVM 参数
    pub jvm_parameters: String,
    /// 需要并入 Tomcat 系统 classpath 的项目名
    pub projects_in_cp: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            tomcat_version: "tomcat9".to_string(),
            tomcat_dir: String::new(),
            tomcat_base: String::new(),
            config_file: None,
            debug_mode: false,
            jvm_classpath: String::new(),
            jvm_bootclasspath: String::new(),
            jvm_parameters: String::new(),
            projects_in_cp: String::new(),
        }
    }
}

impl Preferences {
    /// 实例目录，未配置时回退到安装目录
    pub fn effective_base(&self) -> &str {
        if self.tomcat_base.trim().is_empty() {
            &self.tomcat_dir
        } else {
            &self.tomcat_base
        }
    }
}

/// 交给进程启动器的完整启动参数
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LaunchRequest {
    /// 启动配置名称（如 "Tomcat 9.x"）
    pub label: String,
    pub main_class: String,
    pub classpath: Vec<String>,
    pub boot_classpath: Vec<String>,
    /// JVM 参数字符串，每个参数前带一个空格
    pub vm_args: String,
    /// 程序参数字符串，每个参数前带一个空格
    pub program_args: String,
    pub debug: bool,
    /// 是否在调试视图中显示该进程
    pub show_in_debugger: bool,
    /// 是否保存为持久化启动配置
    pub persist_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_entry_json_tagged_by_kind() {
        let json = r#"[
            {"kind": "source", "path": "/web/src", "output_location": "/web/classes"},
            {"kind": "library", "path": "/opt/lib/x.jar"},
            {"kind": "project", "path": "/core"},
            {"kind": "container", "path": "org.eclipse.m2e.MAVEN2_CLASSPATH_CONTAINER"}
        ]"#;
        let entries: Vec<DependencyEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].kind_name(), "source");
        assert_eq!(entries[1].path(), "/opt/lib/x.jar");
        assert_eq!(entries[2].project_name(), Some("core"));
    }

    #[test]
    fn test_project_name_only_for_project_entries() {
        let lib = DependencyEntry::Library { path: "/core".to_string() };
        assert_eq!(lib.project_name(), None);

        let trailing = DependencyEntry::Project { path: "/core/".to_string() };
        assert_eq!(trailing.project_name(), Some("core"));
    }

    #[test]
    fn test_project_node_defaults() {
        let json = r#"{"name": "web", "location": "/ws/web", "output_location": "/web/bin"}"#;
        let node: ProjectNode = serde_json::from_str(json).unwrap();
        assert!(node.open);
        assert!(node.java_nature);
        assert!(node.entries.is_empty());
        assert!(node.tomcat.is_none());
    }

    #[test]
    fn test_effective_base_falls_back_to_dir() {
        let mut prefs = Preferences {
            tomcat_dir: "/opt/tomcat".to_string(),
            ..Preferences::default()
        };
        assert_eq!(prefs.effective_base(), "/opt/tomcat");

        prefs.tomcat_base = "/srv/tomcat-base".to_string();
        assert_eq!(prefs.effective_base(), "/srv/tomcat-base");
    }
}
