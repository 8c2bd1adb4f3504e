// ============================================================================
// 多版本 Tomcat 配置
// ============================================================================
//
// 各版本之间只有少数字段不同（jar 路径、启动参数、context 标签），
// 使用封闭的 ServerVersion 枚举 + ServerConfig 结构体表达，
// 通过 get_server_config 工厂函数在构造时选定。
// 新增版本只需在 ServerVersion 中加一个变体并补齐 match 分支。

use std::path::{Path, PathBuf};

use crate::models::dtos::{DependencyEntry, Preferences};
use crate::utils::error::{AppError, AppResult};

// ============================================================================
// 版本定义
// ============================================================================

/// 支持的 Tomcat 版本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerVersion {
    Tomcat6,
    Tomcat7,
    Tomcat8,
    Tomcat9,
    Tomcat10,
}

/// 支持的版本标识
pub const SUPPORTED_VERSIONS: [&str; 5] = ["tomcat6", "tomcat7", "tomcat8", "tomcat9", "tomcat10"];

impl ServerVersion {
    /// 解析版本标识（如 "tomcat9"，大小写不敏感）
    pub fn parse(id: &str) -> AppResult<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "tomcat6" => Ok(ServerVersion::Tomcat6),
            "tomcat7" => Ok(ServerVersion::Tomcat7),
            "tomcat8" => Ok(ServerVersion::Tomcat8),
            "tomcat9" => Ok(ServerVersion::Tomcat9),
            "tomcat10" => Ok(ServerVersion::Tomcat10),
            _ => Err(AppError::UnsupportedServerVersion(id.to_string())),
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            ServerVersion::Tomcat6 => "tomcat6",
            ServerVersion::Tomcat7 => "tomcat7",
            ServerVersion::Tomcat8 => "tomcat8",
            ServerVersion::Tomcat9 => "tomcat9",
            ServerVersion::Tomcat10 => "tomcat10",
        }
    }

    /// 启动配置名称
    pub fn label(&self) -> &'static str {
        match self {
            ServerVersion::Tomcat6 => "Tomcat 6.x",
            ServerVersion::Tomcat7 => "Tomcat 7.x",
            ServerVersion::Tomcat8 => "Tomcat 8.x",
            ServerVersion::Tomcat9 => "Tomcat 9.x",
            ServerVersion::Tomcat10 => "Tomcat 10.x",
        }
    }
}

/// Tomcat 启动类
pub const BOOTSTRAP_MAIN_CLASS: &str = "org.apache.catalina.startup.Bootstrap";

/// bin/ 下的启动 jar
const BOOTSTRAP_JARS: &[&str] = &["bin/bootstrap.jar", "bin/tomcat-juli.jar"];

// ============================================================================
// ServerConfig
// ============================================================================

/// 某个 Tomcat 版本在某个安装目录下的启动配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub version: ServerVersion,
    /// 安装目录（CATALINA_HOME）
    pub tomcat_dir: PathBuf,
    /// 实例目录（CATALINA_BASE）
    pub tomcat_base: PathBuf,
    /// 自定义 server.xml
    pub config_file: Option<PathBuf>,
}

impl ServerConfig {
    pub fn label(&self) -> &'static str {
        self.version.label()
    }

    pub fn main_class(&self) -> &'static str {
        BOOTSTRAP_MAIN_CLASS
    }

    pub fn start_command(&self) -> &'static str {
        "start"
    }

    pub fn stop_command(&self) -> &'static str {
        "stop"
    }

    /// Tomcat 自身的启动 classpath
    pub fn classpath(&self) -> Vec<String> {
        BOOTSTRAP_JARS
            .iter()
            .map(|jar| self.tomcat_dir.join(jar).to_string_lossy().to_string())
            .collect()
    }

    pub fn vm_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("-Dcatalina.home={}", self.tomcat_dir.display()),
            format!("-Dcatalina.base={}", self.tomcat_base.display()),
            format!("-Djava.io.tmpdir={}", self.tomcat_base.join("temp").display()),
        ];
        if self.version == ServerVersion::Tomcat6 {
            args.push(format!(
                "-Djava.endorsed.dirs={}",
                self.tomcat_dir.join("endorsed").display()
            ));
        }
        args
    }

    /// 程序参数：可选的 `-config <server.xml>`，然后是命令
    pub fn prg_args(&self, command: &str) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(config_file) = &self.config_file {
            args.push("-config".to_string());
            args.push(config_file.to_string_lossy().to_string());
        }
        args.push(command.to_string());
        args
    }

    pub fn servlet_jar_path(&self) -> Option<&'static str> {
        Some("lib/servlet-api.jar")
    }

    pub fn jasper_jar_path(&self) -> Option<&'static str> {
        Some("lib/jasper.jar")
    }

    pub fn jsp_jar_path(&self) -> Option<&'static str> {
        Some("lib/jsp-api.jar")
    }

    /// Tomcat 提供的 servlet / jasper / jsp jar，以 LIBRARY 条目返回
    pub fn runtime_jars(&self) -> Vec<DependencyEntry> {
        [self.servlet_jar_path(), self.jasper_jar_path(), self.jsp_jar_path()]
            .into_iter()
            .flatten()
            .map(|jar| DependencyEntry::Library {
                path: self.tomcat_dir.join(jar).to_string_lossy().to_string(),
            })
            .collect()
    }

    /// 路径的文件名是否与 Tomcat 自带的 servlet / jasper / jsp jar 相同
    pub fn is_runtime_jar(&self, path: &str) -> bool {
        let Some(file_name) = Path::new(path).file_name() else {
            return false;
        };
        self.runtime_jars()
            .iter()
            .any(|jar| Path::new(jar.path()).file_name() == Some(file_name))
    }

    /// 实例目录下的 lib/
    pub fn lib_dir(&self) -> PathBuf {
        self.tomcat_base.join("lib")
    }
}

// ============================================================================
// 工厂函数
// ============================================================================

/// 根据偏好设置构建对应版本的启动配置
pub fn get_server_config(prefs: &Preferences) -> AppResult<ServerConfig> {
    let version = ServerVersion::parse(&prefs.tomcat_version)?;

    if prefs.tomcat_dir.trim().is_empty() {
        return Err(AppError::ValidationError("Tomcat 安装目录未配置".to_string()));
    }

    let config_file = prefs
        .config_file
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(PathBuf::from);

    Ok(ServerConfig {
        version,
        tomcat_dir: Path::new(prefs.tomcat_dir.trim()).to_path_buf(),
        tomcat_base: Path::new(prefs.effective_base().trim()).to_path_buf(),
        config_file,
    })
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs(version: &str) -> Preferences {
        Preferences {
            tomcat_version: version.to_string(),
            tomcat_dir: "/opt/tomcat".to_string(),
            ..Preferences::default()
        }
    }

    #[test]
    fn test_parse_all_supported_versions() {
        for id in SUPPORTED_VERSIONS {
            let version = ServerVersion::parse(id).unwrap();
            assert_eq!(version.id(), id);
        }
        assert_eq!(ServerVersion::parse(" Tomcat9 ").unwrap(), ServerVersion::Tomcat9);
    }

    #[test]
    fn test_unsupported_version() {
        let err = get_server_config(&prefs("jetty")).unwrap_err();
        assert!(err.to_string().contains("不支持的 Tomcat 版本"));
    }

    #[test]
    fn test_missing_tomcat_dir_is_rejected() {
        let mut p = prefs("tomcat9");
        p.tomcat_dir = "  ".to_string();
        assert!(get_server_config(&p).is_err());
    }

    #[test]
    fn test_classpath_and_vm_args() {
        let config = get_server_config(&prefs("tomcat9")).unwrap();
        assert_eq!(
            config.classpath(),
            vec![
                "/opt/tomcat/bin/bootstrap.jar".to_string(),
                "/opt/tomcat/bin/tomcat-juli.jar".to_string()
            ]
        );
        let vm_args = config.vm_args();
        assert!(vm_args.contains(&"-Dcatalina.home=/opt/tomcat".to_string()));
        assert!(vm_args.contains(&"-Dcatalina.base=/opt/tomcat".to_string()));
        assert!(!vm_args.iter().any(|a| a.starts_with("-Djava.endorsed.dirs")));
        assert_eq!(config.main_class(), BOOTSTRAP_MAIN_CLASS);
        assert_eq!(config.label(), "Tomcat 9.x");
    }

    #[test]
    fn test_tomcat6_uses_endorsed_dirs() {
        let config = get_server_config(&prefs("tomcat6")).unwrap();
        assert!(config
            .vm_args()
            .contains(&"-Djava.endorsed.dirs=/opt/tomcat/endorsed".to_string()));
    }

    #[test]
    fn test_prg_args_with_config_file() {
        let mut p = prefs("tomcat8");
        p.config_file = Some("/etc/tomcat/server.xml".to_string());
        let config = get_server_config(&p).unwrap();
        assert_eq!(
            config.prg_args("start"),
            vec!["-config".to_string(), "/etc/tomcat/server.xml".to_string(), "start".to_string()]
        );
        assert_eq!(config.prg_args(config.stop_command()), vec![
            "-config".to_string(),
            "/etc/tomcat/server.xml".to_string(),
            "stop".to_string()
        ]);
    }

    #[test]
    fn test_runtime_jars_rooted_at_tomcat_dir() {
        let config = get_server_config(&prefs("tomcat10")).unwrap();
        let jars: Vec<String> = config.runtime_jars().iter().map(|e| e.path().to_string()).collect();
        assert_eq!(
            jars,
            vec![
                "/opt/tomcat/lib/servlet-api.jar".to_string(),
                "/opt/tomcat/lib/jasper.jar".to_string(),
                "/opt/tomcat/lib/jsp-api.jar".to_string()
            ]
        );
    }

    #[test]
    fn test_lib_dir_uses_base() {
        let mut p = prefs("tomcat9");
        p.tomcat_base = "/srv/base".to_string();
        let config = get_server_config(&p).unwrap();
        assert_eq!(config.lib_dir(), PathBuf::from("/srv/base/lib"));
    }

    #[test]
    fn test_is_runtime_jar_matches_file_name() {
        let config = get_server_config(&prefs("tomcat9")).unwrap();
        assert!(config.is_runtime_jar("/m2/legacy/jasper.jar"));
        assert!(config.is_runtime_jar("/opt/tomcat/lib/servlet-api.jar"));
        assert!(!config.is_runtime_jar("/m2/jasper-runtime-5.5.jar"));
        assert!(!config.is_runtime_jar(""));
    }
}
