// ============================================================================
// Classpath / 参数组装：合并路径列表、展开 jar 目录、切分偏好设置字符串
// 纯函数，不依赖工作区和进程
// ============================================================================

use std::collections::HashSet;
use std::path::Path;

use crate::services::RUNTIME_JAR_MARKERS;

/// 追加 `additions` 中尚未出现的元素（精确字符串匹配），保持两边原有顺序
///
/// `base` 原样保留，只对 `additions` 去重。
pub fn concat_unique(base: &[String], additions: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = base.iter().map(String::as_str).collect();
    let mut result = base.to_vec();

    for item in additions {
        if seen.insert(item.as_str()) {
            result.push(item.clone());
        }
    }

    result
}

/// 无条件追加（用于 JVM 参数等允许重复的列表）
pub fn concat(base: &[String], additions: &[String]) -> Vec<String> {
    let mut result = base.to_vec();
    result.extend_from_slice(additions);
    result
}

/// 追加目录下所有 `.jar` 文件的绝对路径（不递归，顺序取决于文件系统）
///
/// `dir` 不是目录时原样返回 `base`。
pub fn jars_of_directory(base: &[String], dir: &Path) -> Vec<String> {
    if !dir.is_dir() {
        return base.to_vec();
    }

    let jars: Vec<String> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("读取 jar 目录 {} 失败: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".jar"))
        .map(|entry| {
            let path = entry.path();
            std::path::absolute(path)
                .unwrap_or_else(|_| path.to_path_buf())
                .to_string_lossy()
                .to_string()
        })
        .collect();

    concat(base, &jars)
}

/// 按分隔符切分偏好设置字符串，去掉空白和空项
pub fn cut_string(value: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        let trimmed = value.trim();
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        };
    }

    value
        .split(separator)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// 剔除 Tomcat 自带的 API jar（项目可能带有旧版本，放进 Tomcat 系统 classpath 会导致启动失败）
pub fn remove_runtime_jars(classpath: &[String]) -> Vec<String> {
    classpath
        .iter()
        .filter(|entry| !RUNTIME_JAR_MARKERS.iter().any(|marker| entry.contains(marker)))
        .cloned()
        .collect()
}

/// 拼接为启动器使用的参数字符串：每个参数前加一个空格
pub fn join_arguments(args: &[String]) -> String {
    args.iter().map(|arg| format!(" {}", arg)).collect()
}

// ============================================================================
// 单元测试
// ============================================================================
