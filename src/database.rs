// ============================================================================
// 数据库模块：SQLite 持久化层
// 保存偏好设置（键值对）和持久化的启动配置
// 使用 rusqlite 直接操作 SQLite，遵循 KISS 原则，不引入 ORM
// ============================================================================

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::dtos::{LaunchRequest, Preferences};

// ============================================================================
// 数据结构定义
// ============================================================================

/// 持久化的启动配置
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LaunchConfig {
    pub id: i64,
    /// 配置名称（唯一）
    pub name: String,
    pub main_class: String,
    pub classpath: Vec<String>,
    pub boot_classpath: Vec<String>,
    pub vm_args: String,
    pub program_args: String,
    pub debug: bool,
    pub created_at: String,
}

// ============================================================================
// 偏好设置键名
// ============================================================================

pub const KEY_TOMCAT_VERSION: &str = "tomcat_version";
pub const KEY_TOMCAT_DIR: &str = "tomcat_dir";
pub const KEY_TOMCAT_BASE: &str = "tomcat_base";
pub const KEY_CONFIG_FILE: &str = "config_file";
pub const KEY_DEBUG_MODE: &str = "debug_mode";
pub const KEY_JVM_CLASSPATH: &str = "jvm_classpath";
pub const KEY_JVM_BOOTCLASSPATH: &str = "jvm_bootclasspath";
pub const KEY_JVM_PARAMETERS: &str = "jvm_parameters";
pub const KEY_PROJECTS_IN_CP: &str = "projects_in_cp";

/// 允许通过 `set` 命令修改的键
pub const PREFERENCE_KEYS: &[&str] = &[
    KEY_TOMCAT_VERSION,
    KEY_TOMCAT_DIR,
    KEY_TOMCAT_BASE,
    KEY_CONFIG_FILE,
    KEY_DEBUG_MODE,
    KEY_JVM_CLASSPATH,
    KEY_JVM_BOOTCLASSPATH,
    KEY_JVM_PARAMETERS,
    KEY_PROJECTS_IN_CP,
];

// ============================================================================
// 数据库管理器
// ============================================================================

/// 数据库管理器，封装 rusqlite 连接
pub struct Database {
    /// SQLite 数据库连接
    conn: Connection,
}

impl Database {
    /// 初始化数据库：在指定目录创建数据库文件并建表
    ///
    /// # 参数
    /// - `data_dir`: 数据目录路径
    ///
    /// # 返回
    /// - `Ok(Database)`: 初始化成功，返回数据库实例
    /// - `Err(String)`: 初始化失败，返回中文错误描述
    pub fn init(data_dir: &Path) -> Result<Self, String> {
        // 确保数据目录存在
        std::fs::create_dir_all(data_dir).map_err(|e| {
            format!(
                "数据库初始化失败：无法创建数据目录 {}: {}",
                data_dir.display(),
                e
            )
        })?;

        let db_path = data_dir.join("tomcat_launcher.db");
        let conn = Connection::open(&db_path).map_err(|e| {
            format!(
                "数据库初始化失败：无法打开数据库文件 {}: {}",
                db_path.display(),
                e
            )
        })?;

        Self::create_tables(&conn)?;

        Ok(Database { conn })
    }

    /// 创建所有数据库表（如果不存在）
    fn create_tables(conn: &Connection) -> Result<(), String> {
        conn.execute_batch(
            "
            -- 设置表（键值对）
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            -- 启动配置表
            CREATE TABLE IF NOT EXISTS launch_configs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                main_class TEXT NOT NULL,
                classpath TEXT NOT NULL,
                boot_classpath TEXT NOT NULL,
                vm_args TEXT NOT NULL,
                program_args TEXT NOT NULL,
                debug INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            ",
        )
        .map_err(|e| format!("数据库初始化失败：创建表结构时出错: {}", e))?;

        Ok(())
    }

    /// 获取数据库连接的引用
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // ========================================================================
    // 偏好设置
    // ========================================================================

    /// 读取单个设置项，键不存在时返回 None
    pub fn get_setting(&self, key: &str) -> Result<Option<String>, String> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| format!("读取设置失败：{}", e))
    }

    /// 保存单个设置项（键值对）
    ///
    /// 使用 INSERT OR REPLACE 实现 upsert 语义
    pub fn save_setting(&self, key: &str, value: &str) -> Result<(), String> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|e| format!("保存设置失败：{}", e))?;

        Ok(())
    }

    /// 读取偏好设置快照，未设置的项使用默认值
    pub fn load_preferences(&self) -> Result<Preferences, String> {
        let defaults = Preferences::default();
        let text = |key: &str, default: String| -> Result<String, String> {
            Ok(self.get_setting(key)?.unwrap_or(default))
        };

        let debug_mode = match self.get_setting(KEY_DEBUG_MODE)? {
            Some(value) => matches!(value.trim(), "true" | "1" | "yes"),
            None => defaults.debug_mode,
        };

        Ok(Preferences {
            tomcat_version: text(KEY_TOMCAT_VERSION, defaults.tomcat_version)?,
            tomcat_dir: text(KEY_TOMCAT_DIR, defaults.tomcat_dir)?,
            tomcat_base: text(KEY_TOMCAT_BASE, defaults.tomcat_base)?,
            config_file: self
                .get_setting(KEY_CONFIG_FILE)?
                .filter(|v| !v.trim().is_empty()),
            debug_mode,
            jvm_classpath: text(KEY_JVM_CLASSPATH, defaults.jvm_classpath)?,
            jvm_bootclasspath: text(KEY_JVM_BOOTCLASSPATH, defaults.jvm_bootclasspath)?,
            jvm_parameters: text(KEY_JVM_PARAMETERS, defaults.jvm_parameters)?,
            projects_in_cp: text(KEY_PROJECTS_IN_CP, defaults.projects_in_cp)?,
        })
    }

    // ========================================================================
    // 启动配置 CRUD
    // ========================================================================

    /// 保存启动配置，同名配置被覆盖
    pub fn save_launch_config(&self, request: &LaunchRequest) -> Result<LaunchConfig, String> {
        let classpath = serde_json::to_string(&request.classpath)
            .map_err(|e| format!("保存启动配置失败：序列化 classpath 出错: {}", e))?;
        let boot_classpath = serde_json::to_string(&request.boot_classpath)
            .map_err(|e| format!("保存启动配置失败：序列化 boot classpath 出错: {}", e))?;

        self.conn
            .execute(
                "INSERT INTO launch_configs
                    (name, main_class, classpath, boot_classpath, vm_args, program_args, debug)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(name) DO UPDATE SET
                    main_class = excluded.main_class,
                    classpath = excluded.classpath,
                    boot_classpath = excluded.boot_classpath,
                    vm_args = excluded.vm_args,
                    program_args = excluded.program_args,
                    debug = excluded.debug",
                params![
                    request.label,
                    request.main_class,
                    classpath,
                    boot_classpath,
                    request.vm_args,
                    request.program_args,
                    request.debug,
                ],
            )
            .map_err(|e| format!("保存启动配置失败：{}", e))?;

        self.get_launch_config(&request.label)?
            .ok_or_else(|| "保存启动配置失败：无法读取新记录".to_string())
    }

    /// 按名称读取启动配置
    pub fn get_launch_config(&self, name: &str) -> Result<Option<LaunchConfig>, String> {
        self.conn
            .query_row(
                "SELECT id, name, main_class, classpath, boot_classpath, vm_args, program_args, debug, created_at
                 FROM launch_configs WHERE name = ?1",
                params![name],
                row_to_launch_config,
            )
            .optional()
            .map_err(|e| format!("读取启动配置失败：{}", e))
    }

    /// 查询所有启动配置（按 id 升序）
    pub fn list_launch_configs(&self) -> Result<Vec<LaunchConfig>, String> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, main_class, classpath, boot_classpath, vm_args, program_args, debug, created_at
                 FROM launch_configs ORDER BY id",
            )
            .map_err(|e| format!("查询启动配置失败：{}", e))?;

        let configs = stmt
            .query_map([], row_to_launch_config)
            .map_err(|e| format!("查询启动配置失败：{}", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("查询启动配置失败：读取记录时出错: {}", e))?;

        Ok(configs)
    }

    /// 删除启动配置
    pub fn delete_launch_config(&self, name: &str) -> Result<(), String> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM launch_configs WHERE name = ?1", params![name])
            .map_err(|e| format!("删除启动配置失败：{}", e))?;

        if rows_affected == 0 {
            return Err(format!("删除启动配置失败：{} 不存在", name));
        }

        Ok(())
    }
}

/// 把 launch_configs 的一行转换为 LaunchConfig
fn row_to_launch_config(row: &rusqlite::Row<'_>) -> rusqlite::Result<LaunchConfig> {
    let classpath: String = row.get(3)?;
    let boot_classpath: String = row.get(4)?;
    Ok(LaunchConfig {
        id: row.get(0)?,
        name: row.get(1)?,
        main_class: row.get(2)?,
        classpath: parse_json_list(3, &classpath)?,
        boot_classpath: parse_json_list(4, &boot_classpath)?,
        vm_args: row.get(5)?,
        program_args: row.get(6)?,
        debug: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn parse_json_list(column: usize, raw: &str) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn request(label: &str, classpath: &[&str]) -> LaunchRequest {
        LaunchRequest {
            label: label.to_string(),
            main_class: "org.apache.catalina.startup.Bootstrap".to_string(),
            classpath: classpath.iter().map(|s| s.to_string()).collect(),
            boot_classpath: vec![],
            vm_args: " -Dcatalina.home=/opt/tomcat".to_string(),
            program_args: " start".to_string(),
            debug: false,
            show_in_debugger: true,
            persist_config: true,
        }
    }

    /// 测试数据库初始化：创建文件和表
    #[test]
    fn test_database_init_creates_file_and_tables() {
        let dir = TempDir::new().unwrap();
        let db = Database::init(dir.path()).unwrap();

        assert!(dir.path().join("tomcat_launcher.db").exists());

        let table_names: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(table_names, vec!["launch_configs", "settings"]);
    }

    /// 测试重复初始化不会丢失已有设置
    #[test]
    fn test_database_init_is_idempotent() {
        let dir = TempDir::new().unwrap();
        {
            let db = Database::init(dir.path()).unwrap();
            db.save_setting(KEY_TOMCAT_DIR, "/opt/tomcat").unwrap();
        }
        let db = Database::init(dir.path()).unwrap();
        assert_eq!(db.get_setting(KEY_TOMCAT_DIR).unwrap(), Some("/opt/tomcat".to_string()));
    }

    #[test]
    fn test_load_preferences_defaults() {
        let dir = TempDir::new().unwrap();
        let db = Database::init(dir.path()).unwrap();
        assert_eq!(db.load_preferences().unwrap(), Preferences::default());
    }

    #[test]
    fn test_load_preferences_reads_saved_values() {
        let dir = TempDir::new().unwrap();
        let db = Database::init(dir.path()).unwrap();
        db.save_setting(KEY_TOMCAT_VERSION, "tomcat8").unwrap();
        db.save_setting(KEY_DEBUG_MODE, "true").unwrap();
        db.save_setting(KEY_JVM_PARAMETERS, "-Xmx512m;-ea").unwrap();
        db.save_setting(KEY_CONFIG_FILE, "  ").unwrap();

        let prefs = db.load_preferences().unwrap();
        assert_eq!(prefs.tomcat_version, "tomcat8");
        assert!(prefs.debug_mode);
        assert_eq!(prefs.jvm_parameters, "-Xmx512m;-ea");
        assert_eq!(prefs.config_file, None);
    }

    #[test]
    fn test_save_launch_config_overwrites_same_name() {
        let dir = TempDir::new().unwrap();
        let db = Database::init(dir.path()).unwrap();

        let first = db.save_launch_config(&request("Tomcat 9.x", &["/a.jar"])).unwrap();
        let second = db.save_launch_config(&request("Tomcat 9.x", &["/b.jar", "/c.jar"])).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.classpath, vec!["/b.jar".to_string(), "/c.jar".to_string()]);
        assert_eq!(db.list_launch_configs().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_launch_config() {
        let dir = TempDir::new().unwrap();
        let db = Database::init(dir.path()).unwrap();
        db.save_launch_config(&request("Tomcat 9.x", &[])).unwrap();

        db.delete_launch_config("Tomcat 9.x").unwrap();
        assert!(db.get_launch_config("Tomcat 9.x").unwrap().is_none());
        assert!(db.delete_launch_config("Tomcat 9.x").is_err());
    }

    // ========================================================================
    // 属性测试 (Property-Based Tests)
    // ========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// 任意键值保存后读取应得到最后一次写入的值
        #[test]
        fn prop_setting_upsert_round_trip(
            key in "[a-z_]{1,20}",
            first in "[a-zA-Z0-9;/ ._-]{0,40}",
            second in "[a-zA-Z0-9;/ ._-]{0,40}"
        ) {
            let dir = TempDir::new().unwrap();
            let db = Database::init(dir.path()).unwrap();

            db.save_setting(&key, &first).unwrap();
            prop_assert_eq!(db.get_setting(&key).unwrap(), Some(first));

            db.save_setting(&key, &second).unwrap();
            prop_assert_eq!(db.get_setting(&key).unwrap(), Some(second));
        }
    }
}
