// ============================================================================
// Maven 依赖收集：只提取 Maven container 提供的条目，剔除 Tomcat 自带的 jar
// ============================================================================

use std::sync::OnceLock;

use regex::Regex;

use crate::models::dtos::DependencyEntry;
use crate::services::classpath_walker::VisitedSet;
use crate::services::normalizer::{resolve_location, ClasspathAccumulator};
use crate::services::workspace::ProjectModel;
use crate::services::{MANAGED_CONTAINER_SUFFIX, MANAGED_JAR_DENYLIST};
use crate::utils::error::{AppError, AppResult};

/// jar 文件名黑名单
#[derive(Debug, Clone)]
pub struct ManagedJarFilter {
    patterns: Vec<Regex>,
}

impl ManagedJarFilter {
    /// 使用自定义模式构建黑名单
    pub fn new(patterns: &[&str]) -> AppResult<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    AppError::ValidationError(format!("jar 黑名单模式无效 {}: {}", p, e))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// 内置黑名单（`MANAGED_JAR_DENYLIST`）
    pub fn standard() -> &'static ManagedJarFilter {
        static STANDARD: OnceLock<ManagedJarFilter> = OnceLock::new();
        STANDARD.get_or_init(|| {
            let patterns = MANAGED_JAR_DENYLIST
                .iter()
                .filter_map(|p| match Regex::new(p) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        log::error!("内置 jar 黑名单模式无效 {}: {}", p, e);
                        None
                    }
                })
                .collect();
            ManagedJarFilter { patterns }
        })
    }

    /// 文件名是否命中黑名单
    pub fn is_denied(&self, file_name: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(file_name))
    }
}

/// 路径的最后一段
fn last_segment(path: &str) -> &str {
    path.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
}

/// 收集项目及其引用项目的 Maven 依赖，使用内置黑名单
///
/// 项目自身的输出目录总是最先加入。
pub fn collect_managed(
    model: &dyn ProjectModel,
    project: &str,
    visited: &mut VisitedSet,
    acc: &mut ClasspathAccumulator,
) {
    collect_managed_with(model, ManagedJarFilter::standard(), project, visited, acc);
}

/// 同 `collect_managed`，可指定黑名单
pub fn collect_managed_with(
    model: &dyn ProjectModel,
    filter: &ManagedJarFilter,
    project: &str,
    visited: &mut VisitedSet,
    acc: &mut ClasspathAccumulator,
) {
    match model.output_location(project) {
        Ok(output) => {
            acc.add_path(&resolve_location(model, &output));
        }
        Err(e) => log::warn!("读取项目 {} 的输出目录失败: {}", project, e),
    }

    let entries = match model.raw_entries(project) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("读取项目 {} 的 classpath 失败，按空处理: {}", project, e);
            return;
        }
    };

    for entry in &entries {
        let DependencyEntry::Container { path } = entry else {
            continue;
        };
        if !path.ends_with(MANAGED_CONTAINER_SUFFIX) {
            continue;
        }

        let members = match model.resolve_container(path, project) {
            Ok(members) => members,
            Err(e) => {
                log::warn!("解析 Maven container {} 失败: {}", path, e);
                continue;
            }
        };

        for member in &members {
            match member {
                DependencyEntry::Library { path } => {
                    let file_name = last_segment(path);
                    if filter.is_denied(file_name) {
                        log::debug!("跳过 Tomcat 自带的 jar: {}", file_name);
                        continue;
                    }
                    acc.add_path(&resolve_location(model, path));
                }
                DependencyEntry::Project { .. } => {
                    let Some(name) = member.project_name() else {
                        continue;
                    };
                    match model.output_location(name) {
                        Ok(output) => {
                            acc.add_path(&resolve_location(model, &output));
                        }
                        Err(e) => {
                            log::warn!("读取引用项目 {} 的输出目录失败: {}", name, e);
                            continue;
                        }
                    }
                    if visited.insert(name) {
                        collect_managed_with(model, filter, name, visited, acc);
                    }
                }
                other => {
                    log::warn!(">>> 未识别的 Maven 条目 [{}] {}", other.kind_name(), other.path());
                    if !other.path().trim().is_empty() {
                        acc.add(other.path());
                    }
                }
            }
        }
    }
}

// ============================================================================
// 单元测试
// ============================================================================
