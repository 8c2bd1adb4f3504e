// ============================================================================
// 服务器相关 Commands
// 负责：加载工作区和偏好设置、构造编排器、调用 start / stop / restart 等操作
// ⛔ 禁止：包含 classpath 计算逻辑
// ============================================================================

use std::path::Path;

use crate::database::Database;
use crate::services::bootstrap::{BootstrapContext, ServerBootstrap};
use crate::services::launcher::JavaLauncher;
use crate::services::webapp_classpath::webapp_classpath_entries;
use crate::services::workspace::{JsonWorkspace, ProjectModel};

/// 编排器支持的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerAction {
    Start,
    Stop,
    Restart,
    LogConfig,
    AddLaunch,
}

/// 用工作区清单和数据库中的偏好设置构造编排器
pub fn open_bootstrap(workspace: &Path, db: Database) -> Result<ServerBootstrap<JavaLauncher>, String> {
    let prefs = db.load_preferences()?;
    let model = JsonWorkspace::load(workspace)?;
    let ctx = BootstrapContext::new(Box::new(model), prefs)?;
    let launcher = JavaLauncher::from_env().with_database(db);
    Ok(ServerBootstrap::new(ctx, launcher))
}

/// 执行一次编排操作
///
/// `wait` 为 true 时等待启动的进程退出（命令行前台运行）。
pub fn run_server_action(
    workspace: &Path,
    db: Database,
    action: ServerAction,
    wait: bool,
) -> Result<(), String> {
    let mut server = open_bootstrap(workspace, db)?;

    match action {
        ServerAction::Start => server.start()?,
        ServerAction::Stop => server.stop()?,
        ServerAction::Restart => server.restart()?,
        ServerAction::LogConfig => server.log_config()?,
        ServerAction::AddLaunch => server.add_launch()?,
    }

    if wait {
        server.launcher_mut().wait_all()?;
    }
    Ok(())
}

/// 计算单个项目的 webapp classpath（不写文件）
pub fn show_classpath(workspace: &Path, project: &str) -> Result<Vec<String>, String> {
    let model = JsonWorkspace::load(workspace)?;
    if model.project(project).is_none() {
        return Err(format!("项目不存在：{}", project));
    }
    Ok(webapp_classpath_entries(&model, project))
}

/// 修改项目的 WAR 导出设置并写回清单
pub fn update_war_settings(
    workspace: &Path,
    project: &str,
    war_location: Option<&str>,
    export_source: Option<bool>,
) -> Result<(), String> {
    let mut model = JsonWorkspace::load(workspace)?;
    if let Some(location) = war_location {
        model.set_war_location(project, location)?;
    }
    if let Some(export) = export_source {
        model.set_export_source(project, export)?;
    }
    model.save_properties()?;
    Ok(())
}

// ============================================================================
// 单元测试
// ============================================================================
