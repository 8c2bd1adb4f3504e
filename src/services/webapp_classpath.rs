// ============================================================================
// Webapp classpath 文件：启动前为每个 Tomcat 项目写出 `.#webclasspath`
// 写入失败只记录日志，不影响启动
// ============================================================================

use std::fs;
use std::path::PathBuf;

use crate::services::classpath_walker::{resolve_webapp_classpath, VisitedSet};
use crate::services::managed_filter::collect_managed;
use crate::services::workspace::ProjectModel;
use crate::services::WEBAPP_CLASSPATH_FILENAME;
use crate::utils::error::AppResult;

/// 项目的 webapp classpath：勾选的条目，启用 Maven 收集时再追加 Maven 依赖
///
/// 从未配置过勾选条目的项目返回空列表，Maven 依赖也不收集。
pub fn webapp_classpath_entries(model: &dyn ProjectModel, project: &str) -> Vec<String> {
    let Some(selection) = model.web_classpath_selection(project) else {
        return Vec::new();
    };
    let mut acc = resolve_webapp_classpath(model, project, &selection);

    if model.managed_classpath_enabled(project) {
        let mut visited = VisitedSet::new();
        visited.insert(project);
        collect_managed(model, project, &mut visited, &mut acc);
    }

    acc.into_vec()
}

/// 删除并重建单个项目的 classpath 文件
///
/// 条目为空时只删除旧文件，返回 `Ok(None)`。
pub fn write_webapp_classpath(model: &dyn ProjectModel, project: &str) -> AppResult<Option<PathBuf>> {
    let root = model.webapp_root(project)?;
    let file = root.join(WEBAPP_CLASSPATH_FILENAME);

    if file.exists() {
        fs::remove_file(&file)?;
    }

    let entries = webapp_classpath_entries(model, project);
    if entries.is_empty() {
        log::debug!("项目 {} 的 webapp classpath 为空，跳过写入", project);
        return Ok(None);
    }

    let mut content = entries.join("\n");
    content.push('\n');

    // 写入中途失败时删除半截文件，下次启动重新生成
    let guard = scopeguard::guard(file.clone(), |partial| {
        let _ = fs::remove_file(partial);
    });
    fs::write(&file, content)?;
    let file = scopeguard::ScopeGuard::into_inner(guard);

    log::debug!("已写入 {}（{} 条）", file.display(), entries.len());
    Ok(Some(file))
}

/// 为工作区中所有打开的 Tomcat Java 项目写出 classpath 文件，返回写入的文件
pub fn prepare_webapp_classpaths(model: &dyn ProjectModel) -> Vec<PathBuf> {
    let names: Vec<String> = model
        .projects()
        .into_iter()
        .filter(|p| p.open && p.java_nature && p.tomcat.is_some())
        .map(|p| p.name.clone())
        .collect();

    let mut written = Vec::new();
    for name in &names {
        match write_webapp_classpath(model, name) {
            Ok(Some(file)) => written.push(file),
            Ok(None) => {}
            Err(e) => log::error!("写入项目 {} 的 {} 失败: {}", name, WEBAPP_CLASSPATH_FILENAME, e),
        }
    }
    written
}

// ============================================================================
// 单元测试
// ============================================================================
