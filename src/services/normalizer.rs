// ============================================================================
// 路径规范化：把各种位置引用统一为绝对路径字符串，并按绝对路径去重
// ============================================================================

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::services::workspace::ProjectModel;

/// 选择集比较用的键：统一使用正斜杠
pub fn normalize_selection_key(path: &str) -> String {
    path.replace('\\', "/")
}

/// 转换为绝对路径，相对路径挂到根目录下
pub fn to_absolute(path: &Path) -> PathBuf {
    if path.is_absolute() || path.has_root() {
        path.to_path_buf()
    } else {
        Path::new("/").join(path)
    }
}

/// 转换为绝对路径字符串
pub fn to_absolute_string(path: &str) -> String {
    to_absolute(Path::new(path)).to_string_lossy().to_string()
}

/// 解析条目路径：优先使用工作区中实际存在的资源位置，否则使用原始路径的绝对形式
pub fn resolve_location(model: &dyn ProjectModel, path: &str) -> PathBuf {
    model
        .find_member(path)
        .unwrap_or_else(|| to_absolute(Path::new(path)))
}

/// 两个工作区路径是否指向同一位置（忽略分隔符风格和末尾斜杠）
pub fn same_location(a: &str, b: &str) -> bool {
    let a = normalize_selection_key(a);
    let b = normalize_selection_key(b);
    a.trim_end_matches('/') == b.trim_end_matches('/')
}

/// 用户勾选的条目路径集合（有序，按规范化后的键去重）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    keys: Vec<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for path in paths {
            set.insert(path.as_ref());
        }
        set
    }

    pub fn insert(&mut self, path: &str) -> bool {
        let key = normalize_selection_key(path);
        if self.keys.contains(&key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    /// 判断路径是否被勾选（比较前先规范化分隔符）
    pub fn contains(&self, path: &str) -> bool {
        let key = normalize_selection_key(path);
        self.keys.iter().any(|k| *k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

/// 一次解析的结果：只追加、按绝对路径去重、保持插入顺序
#[derive(Debug, Clone, Default)]
pub struct ClasspathAccumulator {
    entries: Vec<String>,
    seen: HashSet<String>,
}

impl ClasspathAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一个路径，返回是否为新条目
    pub fn add(&mut self, path: &str) -> bool {
        self.add_path(Path::new(path))
    }

    pub fn add_path(&mut self, path: &Path) -> bool {
        let absolute = to_absolute(path).to_string_lossy().to_string();
        if self.seen.contains(&absolute) {
            return false;
        }
        self.seen.insert(absolute.clone());
        self.entries.push(absolute);
        true
    }

    /// 加入一个工作区资源的位置；资源不存在时什么都不做
    pub fn add_resource(&mut self, location: Option<PathBuf>) -> bool {
        match location {
            Some(path) => self.add_path(&path),
            None => false,
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.seen.contains(&to_absolute_string(path))
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_selection_key_uses_forward_slashes() {
        assert_eq!(normalize_selection_key(r"\web\bin"), "/web/bin");
        assert_eq!(normalize_selection_key("/web/bin"), "/web/bin");
    }

    #[test]
    fn test_to_absolute_string_roots_relative_paths() {
        assert_eq!(to_absolute_string("web/bin"), "/web/bin");
        assert_eq!(to_absolute_string("/opt/lib/x.jar"), "/opt/lib/x.jar");
    }

    #[test]
    fn test_same_location_ignores_trailing_slash() {
        assert!(same_location("/web/bin/", r"\web\bin"));
        assert!(!same_location("/web/bin", "/web/classes"));
    }

    #[test]
    fn test_resolve_location_falls_back_to_raw_path() {
        use crate::services::workspace::{JsonWorkspace, WorkspaceManifest};

        let ws = JsonWorkspace::from_manifest(WorkspaceManifest::default());
        assert_eq!(resolve_location(&ws, "/opt/lib/x.jar"), PathBuf::from("/opt/lib/x.jar"));
    }

    #[test]
    fn test_selection_contains_ignores_separator_style() {
        let selection = SelectionSet::from_paths([r"\web\bin", "/lib/x.jar"]);
        assert!(selection.contains("/web/bin"));
        assert!(selection.contains(r"\lib\x.jar"));
        assert!(!selection.contains("/lib/y.jar"));
    }

    #[test]
    fn test_selection_deduplicates_and_keeps_order() {
        let selection = SelectionSet::from_paths(["/b", "/a", "/b"]);
        let keys: Vec<&str> = selection.iter().collect();
        assert_eq!(keys, vec!["/b", "/a"]);
    }

    #[test]
    fn test_accumulator_deduplicates_by_absolute_form() {
        let mut acc = ClasspathAccumulator::new();
        assert!(acc.add("/lib/x.jar"));
        assert!(!acc.add("/lib/x.jar"));
        assert!(acc.add("lib/y.jar"));
        assert!(!acc.add("/lib/y.jar"));
        assert_eq!(acc.entries(), &["/lib/x.jar".to_string(), "/lib/y.jar".to_string()]);
    }

    #[test]
    fn test_add_resource_none_is_noop() {
        let mut acc = ClasspathAccumulator::new();
        assert!(!acc.add_resource(None));
        assert!(acc.is_empty());
        assert!(acc.add_resource(Some(PathBuf::from("/ws/web/bin"))));
        assert!(acc.contains("/ws/web/bin"));
    }
}
