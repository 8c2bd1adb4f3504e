// ============================================================================
// 工作区模型：项目模型协作者 trait 及基于 workspace.json 清单的实现
// ============================================================================
//
// walker、filter、编排器只通过 ProjectModel 读取项目信息，
// IDE 集成可以提供自己的实现；命令行工具使用 JsonWorkspace。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::dtos::{DependencyEntry, ProjectNode, TomcatSettings};
use crate::services::normalizer::SelectionSet;
use crate::utils::error::{AppError, AppResult};

// ============================================================================
// ProjectModel Trait 定义
// ============================================================================

/// 项目模型协作者
pub trait ProjectModel {
    /// 工作区中所有项目（含已关闭的项目）
    fn projects(&self) -> Vec<&ProjectNode>;

    /// 按名称查找项目
    fn project(&self, name: &str) -> Option<&ProjectNode>;

    /// 读取项目按顺序声明的原始依赖条目
    fn raw_entries(&self, name: &str) -> AppResult<Vec<DependencyEntry>>;

    /// 项目输出目录的工作区路径
    fn output_location(&self, name: &str) -> AppResult<String>;

    /// 把 container 解析为成员条目
    fn resolve_container(&self, container: &str, project: &str) -> AppResult<Vec<DependencyEntry>>;

    /// 工作区资源的实际位置；资源不存在时返回 None
    fn find_member(&self, path: &str) -> Option<PathBuf>;

    /// 写 webapp classpath 文件的目录（配置了 web 根目录时使用 web 根目录）
    fn webapp_root(&self, name: &str) -> AppResult<PathBuf>;

    fn set_war_location(&mut self, name: &str, war_location: &str) -> AppResult<()>;

    fn set_export_source(&mut self, name: &str, export_source: bool) -> AppResult<()>;

    /// 持久化通过 setter 修改的项目属性
    fn save_properties(&self) -> AppResult<()>;

    /// 用户勾选的 webapp classpath 条目；项目没有 Tomcat 设置或从未配置时返回 None
    fn web_classpath_selection(&self, name: &str) -> Option<SelectionSet> {
        let entries = self.project(name)?.tomcat.as_ref()?.web_classpath_entries.as_ref()?;
        Some(SelectionSet::from_paths(entries))
    }

    /// 项目是否启用了 Maven 依赖收集
    fn managed_classpath_enabled(&self, name: &str) -> bool {
        self.project(name)
            .and_then(|p| p.tomcat.as_ref())
            .map(|t| t.managed_classpath)
            .unwrap_or(false)
    }
}

// ============================================================================
// workspace.json 清单
// ============================================================================

/// container 定义；`project` 为空表示对所有项目生效
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ContainerDef {
    pub path: String,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub entries: Vec<DependencyEntry>,
}

/// workspace.json 的顶层结构
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkspaceManifest {
    #[serde(default)]
    pub projects: Vec<ProjectNode>,
    #[serde(default)]
    pub containers: Vec<ContainerDef>,
}

/// 基于清单文件的项目模型
#[derive(Debug, Clone)]
pub struct JsonWorkspace {
    manifest: WorkspaceManifest,
    /// 清单文件路径；内存构造的工作区为 None，save_properties 不落盘
    manifest_path: Option<PathBuf>,
}

impl JsonWorkspace {
    pub fn from_manifest(manifest: WorkspaceManifest) -> Self {
        Self {
            manifest,
            manifest_path: None,
        }
    }

    /// 从 workspace.json 加载工作区
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!("无法读取工作区清单 {}: {}", path.display(), e))
        })?;
        let manifest: WorkspaceManifest = serde_json::from_str(&content).map_err(|e| {
            AppError::ConfigError(format!("工作区清单格式错误 {}: {}", path.display(), e))
        })?;

        for project in &manifest.projects {
            if project.name.trim().is_empty() {
                return Err(AppError::ValidationError("项目名不能为空".to_string()));
            }
        }

        log::debug!(
            "已加载工作区清单 {}：{} 个项目，{} 个 container",
            path.display(),
            manifest.projects.len(),
            manifest.containers.len()
        );

        Ok(Self {
            manifest,
            manifest_path: Some(path.to_path_buf()),
        })
    }

    pub fn manifest(&self) -> &WorkspaceManifest {
        &self.manifest
    }

    fn project_mut(&mut self, name: &str) -> AppResult<&mut ProjectNode> {
        self.manifest
            .projects
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| AppError::ProjectNotFound(name.to_string()))
    }

    fn tomcat_settings_mut(&mut self, name: &str) -> AppResult<&mut TomcatSettings> {
        let project = self.project_mut(name)?;
        project
            .tomcat
            .as_mut()
            .ok_or_else(|| AppError::ValidationError(format!("项目 {} 不是 Tomcat 项目", name)))
    }
}

/// 拆分工作区路径为（项目名, 剩余相对路径）
fn split_workspace_path(path: &str) -> Option<(&str, &str)> {
    let trimmed = path.trim_start_matches(['/', '\\']);
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.find(['/', '\\']) {
        Some(idx) => Some((&trimmed[..idx], &trimmed[idx + 1..])),
        None => Some((trimmed, "")),
    }
}

impl ProjectModel for JsonWorkspace {
    fn projects(&self) -> Vec<&ProjectNode> {
        self.manifest.projects.iter().collect()
    }

    fn project(&self, name: &str) -> Option<&ProjectNode> {
        self.manifest.projects.iter().find(|p| p.name == name)
    }

    fn raw_entries(&self, name: &str) -> AppResult<Vec<DependencyEntry>> {
        let project = self
            .project(name)
            .ok_or_else(|| AppError::ConfigError(format!("无法读取项目 {} 的 classpath：项目不存在", name)))?;
        if !project.java_nature {
            return Err(AppError::ConfigError(format!(
                "无法读取项目 {} 的 classpath：不是 Java 项目",
                name
            )));
        }
        Ok(project.entries.clone())
    }

    fn output_location(&self, name: &str) -> AppResult<String> {
        self.project(name)
            .map(|p| p.output_location.clone())
            .ok_or_else(|| AppError::ConfigError(format!("无法读取项目 {} 的输出目录：项目不存在", name)))
    }

    fn resolve_container(&self, container: &str, project: &str) -> AppResult<Vec<DependencyEntry>> {
        let scoped = self
            .manifest
            .containers
            .iter()
            .find(|c| c.path == container && c.project.as_deref() == Some(project));
        let global = || {
            self.manifest
                .containers
                .iter()
                .find(|c| c.path == container && c.project.is_none())
        };

        scoped
            .or_else(global)
            .map(|c| c.entries.clone())
            .ok_or_else(|| {
                AppError::ConfigError(format!("无法解析项目 {} 的 container {}", project, container))
            })
    }

    fn find_member(&self, path: &str) -> Option<PathBuf> {
        let (project_name, rest) = split_workspace_path(path)?;
        let project = self.project(project_name)?;
        let location = if rest.is_empty() {
            PathBuf::from(&project.location)
        } else {
            Path::new(&project.location).join(rest)
        };
        location.exists().then_some(location)
    }

    fn webapp_root(&self, name: &str) -> AppResult<PathBuf> {
        let project = self
            .project(name)
            .ok_or_else(|| AppError::ProjectNotFound(name.to_string()))?;
        let root_dir = project
            .tomcat
            .as_ref()
            .and_then(|t| t.root_dir.as_deref())
            .map(|d| d.trim_matches(['/', '\\']))
            .filter(|d| !d.is_empty());

        Ok(match root_dir {
            Some(dir) => Path::new(&project.location).join(dir),
            None => PathBuf::from(&project.location),
        })
    }

    fn set_war_location(&mut self, name: &str, war_location: &str) -> AppResult<()> {
        self.tomcat_settings_mut(name)?.war_location = war_location.trim().to_string();
        Ok(())
    }

    fn set_export_source(&mut self, name: &str, export_source: bool) -> AppResult<()> {
        self.tomcat_settings_mut(name)?.export_source = export_source;
        Ok(())
    }

    fn save_properties(&self) -> AppResult<()> {
        let Some(path) = &self.manifest_path else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(&self.manifest)
            .map_err(|e| AppError::ConfigError(format!("序列化工作区清单失败: {}", e)))?;
        std::fs::write(path, content)?;
        log::info!("项目属性已保存到 {}", path.display());
        Ok(())
    }
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample_manifest(root: &Path) -> WorkspaceManifest {
        WorkspaceManifest {
            projects: vec![ProjectNode {
                name: "web".to_string(),
                location: root.join("web").to_string_lossy().to_string(),
                output_location: "/web/bin".to_string(),
                entries: vec![DependencyEntry::Container {
                    path: "org.eclipse.m2e.MAVEN2_CLASSPATH_CONTAINER".to_string(),
                }],
                open: true,
                java_nature: true,
                tomcat: Some(TomcatSettings {
                    root_dir: Some("/webapp".to_string()),
                    ..TomcatSettings::default()
                }),
            }],
            containers: vec![
                ContainerDef {
                    path: "org.eclipse.m2e.MAVEN2_CLASSPATH_CONTAINER".to_string(),
                    project: None,
                    entries: vec![DependencyEntry::Library { path: "/m2/global.jar".to_string() }],
                },
                ContainerDef {
                    path: "org.eclipse.m2e.MAVEN2_CLASSPATH_CONTAINER".to_string(),
                    project: Some("web".to_string()),
                    entries: vec![DependencyEntry::Library { path: "/m2/web.jar".to_string() }],
                },
            ],
        }
    }

    #[test]
    fn test_find_member_requires_existing_resource() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("web").join("bin")).unwrap();
        let ws = JsonWorkspace::from_manifest(sample_manifest(dir.path()));

        let found = ws.find_member("/web/bin").unwrap();
        assert_eq!(found, dir.path().join("web").join("bin"));
        assert!(ws.find_member("/web/missing").is_none());
        assert!(ws.find_member("/opt/lib/x.jar").is_none());
        assert!(ws.find_member("").is_none());
    }

    #[test]
    fn test_resolve_container_prefers_project_scoped_definition() {
        let dir = TempDir::new().unwrap();
        let ws = JsonWorkspace::from_manifest(sample_manifest(dir.path()));

        let members = ws
            .resolve_container("org.eclipse.m2e.MAVEN2_CLASSPATH_CONTAINER", "web")
            .unwrap();
        assert_eq!(members[0].path(), "/m2/web.jar");

        let other = ws
            .resolve_container("org.eclipse.m2e.MAVEN2_CLASSPATH_CONTAINER", "core")
            .unwrap();
        assert_eq!(other[0].path(), "/m2/global.jar");

        assert!(ws.resolve_container("unknown", "web").is_err());
    }

    #[test]
    fn test_raw_entries_missing_project_is_config_error() {
        let ws = JsonWorkspace::from_manifest(WorkspaceManifest::default());
        let err = ws.raw_entries("ghost").unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn test_webapp_root_uses_root_dir() {
        let dir = TempDir::new().unwrap();
        let ws = JsonWorkspace::from_manifest(sample_manifest(dir.path()));
        assert_eq!(ws.webapp_root("web").unwrap(), dir.path().join("web").join("webapp"));
    }

    #[test]
    fn test_setters_and_save_properties_round_trip() {
        let dir = TempDir::new().unwrap();
        let manifest_path = dir.path().join("workspace.json");
        fs::write(
            &manifest_path,
            serde_json::to_string(&sample_manifest(dir.path())).unwrap(),
        )
        .unwrap();

        let mut ws = JsonWorkspace::load(&manifest_path).unwrap();
        ws.set_war_location("web", " /out/web.war ").unwrap();
        ws.set_export_source("web", true).unwrap();
        ws.save_properties().unwrap();

        let reloaded = JsonWorkspace::load(&manifest_path).unwrap();
        let settings = reloaded.project("web").unwrap().tomcat.clone().unwrap();
        assert_eq!(settings.war_location, "/out/web.war");
        assert!(settings.export_source);
    }

    #[test]
    fn test_setters_reject_non_tomcat_project() {
        let mut manifest = sample_manifest(Path::new("/ws"));
        manifest.projects[0].tomcat = None;
        let mut ws = JsonWorkspace::from_manifest(manifest);
        assert!(ws.set_export_source("web", true).is_err());
        assert!(matches!(
            ws.set_war_location("nope", "x").unwrap_err(),
            AppError::ProjectNotFound(_)
        ));
    }

    #[test]
    fn test_load_rejects_malformed_manifest() {
        let dir = TempDir::new().unwrap();
        let manifest_path = dir.path().join("workspace.json");
        fs::write(&manifest_path, "{ not json").unwrap();
        assert!(JsonWorkspace::load(&manifest_path).is_err());
    }
}
