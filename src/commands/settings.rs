// ============================================================================
// 设置 Commands
// 作为命令行与数据库层之间的薄接口层，仅负责参数校验和调用 Database 方法
// ============================================================================

use crate::database::{Database, LaunchConfig, KEY_TOMCAT_VERSION, PREFERENCE_KEYS};
use crate::models::dtos::Preferences;
use crate::services::server_config::ServerVersion;

/// 保存单个偏好设置项
pub fn set_preference(db: &Database, key: &str, value: &str) -> Result<(), String> {
    if !PREFERENCE_KEYS.contains(&key) {
        return Err(format!(
            "保存设置失败：未知的设置项 {}（可用：{}）",
            key,
            PREFERENCE_KEYS.join(", ")
        ));
    }
    if key == KEY_TOMCAT_VERSION {
        ServerVersion::parse(value)?;
    }
    db.save_setting(key, value.trim())
}

/// 读取当前偏好设置
pub fn get_preferences(db: &Database) -> Result<Preferences, String> {
    db.load_preferences()
}

/// 查询所有已保存的启动配置
pub fn list_launch_configs(db: &Database) -> Result<Vec<LaunchConfig>, String> {
    db.list_launch_configs()
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_preference_rejects_unknown_key() {
        let dir = TempDir::new().unwrap();
        let db = Database::init(dir.path()).unwrap();
        let err = set_preference(&db, "theme", "dark").unwrap_err();
        assert!(err.contains("未知的设置项"));
    }

    #[test]
    fn test_set_preference_validates_version() {
        let dir = TempDir::new().unwrap();
        let db = Database::init(dir.path()).unwrap();
        assert!(set_preference(&db, "tomcat_version", "jboss").is_err());

        set_preference(&db, "tomcat_version", "tomcat7").unwrap();
        set_preference(&db, "jvm_parameters", " -Xmx1g;-ea ").unwrap();
        let prefs = get_preferences(&db).unwrap();
        assert_eq!(prefs.tomcat_version, "tomcat7");
        assert_eq!(prefs.jvm_parameters, "-Xmx1g;-ea");
        assert!(list_launch_configs(&db).unwrap().is_empty());
    }
}
