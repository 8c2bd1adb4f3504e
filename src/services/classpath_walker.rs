// ============================================================================
// Classpath 图遍历：把项目声明的依赖条目递归展开为有序、去重的绝对路径列表
// ✅ 只能做：读取 ProjectModel、向 ClasspathAccumulator 追加路径
// ⛔ 禁止：写文件、启动进程
// ============================================================================
//
// 遍历规则：
// - PROJECT 条目不受选择集过滤，每个项目在一次顶层调用中最多遍历一次
// - 未勾选的 container（JRE 除外）仍会展开，成员逐个与选择集比较
// - 勾选的 SOURCE 条目只在输出目录不同于项目自身输出目录时加入
// - 读取失败只记录日志，视为该项目没有条目

use std::collections::HashSet;

use crate::models::dtos::DependencyEntry;
use crate::services::normalizer::{
    resolve_location, same_location, ClasspathAccumulator, SelectionSet,
};
use crate::services::workspace::ProjectModel;
use crate::services::JRE_CONTAINER;

/// 一次顶层遍历中已访问的项目名
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    names: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 标记为已访问，返回此前是否未访问
    pub fn insert(&mut self, name: &str) -> bool {
        self.names.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// 单个项目条目的过滤方式
#[derive(Clone, Copy)]
enum EntryFilter<'a> {
    Selection(&'a SelectionSet),
    /// 所有条目视为已勾选（JRE container 除外）
    Everything,
}

impl EntryFilter<'_> {
    fn includes(&self, key: &str) -> bool {
        match self {
            EntryFilter::Selection(selection) => selection.contains(key),
            EntryFilter::Everything => true,
        }
    }
}

/// 条目与选择集比较时使用的路径；SOURCE 使用输出目录，没有输出目录时返回 None
fn entry_key(entry: &DependencyEntry) -> Option<&str> {
    match entry {
        DependencyEntry::Source { output_location, .. } => output_location.as_deref(),
        other => Some(other.path()),
    }
}

struct Walker<'a> {
    model: &'a dyn ProjectModel,
    /// None 表示计算默认运行时 classpath
    selection: Option<&'a SelectionSet>,
}

impl Walker<'_> {
    fn walk_project(
        &self,
        name: &str,
        referenced: bool,
        visited: &mut VisitedSet,
        acc: &mut ClasspathAccumulator,
    ) {
        let output = match self.model.output_location(name) {
            Ok(output) => Some(output),
            Err(e) => {
                log::warn!("读取项目 {} 的输出目录失败: {}", name, e);
                None
            }
        };

        if let Some(output) = &output {
            let selected = self.selection.map_or(true, |s| s.contains(output));
            if selected {
                acc.add_resource(self.model.find_member(output));
            }
        }

        let entries = match self.model.raw_entries(name) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("读取项目 {} 的 classpath 失败，按空处理: {}", name, e);
                return;
            }
        };

        let filter = match self.selection {
            None => EntryFilter::Everything,
            Some(selection) => {
                // 被引用的项目如果输出目录和条目（含 container 成员）都没被勾选，
                // 说明用户从未针对它做过选择，整体加入
                let untouched = referenced
                    && !output.as_deref().is_some_and(|o| selection.contains(o))
                    && !self.any_selected(&entries, name, selection, &mut HashSet::new());
                if untouched {
                    log::debug!("被引用项目 {} 没有勾选任何条目，加入全部条目", name);
                    EntryFilter::Everything
                } else {
                    EntryFilter::Selection(selection)
                }
            }
        };

        self.walk_entries(&entries, name, output.as_deref(), filter, visited, acc);
    }

    /// 条目或其 container 成员（JRE 除外，递归）中是否有被勾选的
    fn any_selected(
        &self,
        entries: &[DependencyEntry],
        project: &str,
        selection: &SelectionSet,
        seen_containers: &mut HashSet<String>,
    ) -> bool {
        entries.iter().any(|entry| {
            if entry_key(entry).is_some_and(|key| selection.contains(key)) {
                return true;
            }
            match entry {
                DependencyEntry::Container { path }
                    if path != JRE_CONTAINER && seen_containers.insert(path.clone()) =>
                {
                    match self.model.resolve_container(path, project) {
                        Ok(members) => self.any_selected(&members, project, selection, seen_containers),
                        Err(_) => false,
                    }
                }
                _ => false,
            }
        })
    }

    fn walk_entries(
        &self,
        entries: &[DependencyEntry],
        project: &str,
        output: Option<&str>,
        filter: EntryFilter<'_>,
        visited: &mut VisitedSet,
        acc: &mut ClasspathAccumulator,
    ) {
        for entry in entries {
            if let DependencyEntry::Project { path } = entry {
                match entry.project_name() {
                    Some(name) => {
                        if visited.insert(name) {
                            self.walk_project(name, true, visited, acc);
                        }
                    }
                    None => log::warn!("项目引用 {} 没有项目名，跳过", path),
                }
                continue;
            }

            let Some(key) = entry_key(entry) else {
                continue;
            };

            let is_jre = matches!(entry, DependencyEntry::Container { path } if path == JRE_CONTAINER);

            if !filter.includes(key) {
                // container 本身未勾选时，成员仍可能被单独勾选
                if let DependencyEntry::Container { path } = entry {
                    if !is_jre {
                        match self.model.resolve_container(path, project) {
                            Ok(members) => {
                                self.walk_entries(&members, project, output, filter, visited, acc)
                            }
                            Err(e) => log::warn!("解析 container {} 失败: {}", path, e),
                        }
                    }
                }
                continue;
            }

            if is_jre && matches!(filter, EntryFilter::Everything) {
                continue;
            }

            let members = match entry {
                DependencyEntry::Container { path } => {
                    match self.model.resolve_container(path, project) {
                        Ok(members) => members,
                        Err(e) => {
                            log::warn!("解析 container {} 失败: {}", path, e);
                            continue;
                        }
                    }
                }
                other => vec![other.clone()],
            };

            for member in &members {
                self.add_member(member, output, acc);
            }
        }
    }

    fn add_member(&self, member: &DependencyEntry, output: Option<&str>, acc: &mut ClasspathAccumulator) {
        match member {
            DependencyEntry::Library { path } => {
                acc.add_path(&resolve_location(self.model, path));
            }
            DependencyEntry::Source { output_location, .. } => {
                if let Some(src_output) = output_location {
                    let own_output = output.is_some_and(|o| same_location(o, src_output));
                    if !own_output {
                        acc.add_path(&resolve_location(self.model, src_output));
                    }
                }
            }
            other => {
                log::warn!(">>> 未识别的 classpath 条目 [{}] {}", other.kind_name(), other.path());
                if !other.path().trim().is_empty() {
                    acc.add(other.path());
                }
            }
        }
    }
}

// ============================================================================
// 对外接口
// ============================================================================

/// 按选择集遍历项目，结果追加到 `acc`
///
/// `visited` 在整棵递归调用树中共享；起始项目会先被标记为已访问。
pub fn walk(
    model: &dyn ProjectModel,
    project: &str,
    selection: &SelectionSet,
    visited: &mut VisitedSet,
    acc: &mut ClasspathAccumulator,
) {
    visited.insert(project);
    let walker = Walker {
        model,
        selection: Some(selection),
    };
    walker.walk_project(project, false, visited, acc);
}

/// 计算项目的 webapp classpath（每次调用使用新的访问集合）
pub fn resolve_webapp_classpath(
    model: &dyn ProjectModel,
    project: &str,
    selection: &SelectionSet,
) -> ClasspathAccumulator {
    let mut visited = VisitedSet::new();
    let mut acc = ClasspathAccumulator::new();
    walk(model, project, selection, &mut visited, &mut acc);
    acc
}

/// 项目的默认运行时 classpath：输出目录 + 全部声明条目（不含 JRE）
pub fn default_runtime_classpath(model: &dyn ProjectModel, project: &str) -> ClasspathAccumulator {
    let mut visited = VisitedSet::new();
    let mut acc = ClasspathAccumulator::new();
    visited.insert(project);
    let walker = Walker {
        model,
        selection: None,
    };
    walker.walk_project(project, false, &mut visited, &mut acc);
    acc
}

// ============================================================================
// 单元测试
// ============================================================================
