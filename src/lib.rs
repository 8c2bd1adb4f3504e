// ============================================================================
// [总线] 程序的组装车间
// ✅ 只能做：pub mod 暴露子模块、初始化日志、解析命令行并分发到 commands
// ⛔ 禁止：直接实现 command 函数
// ============================================================================

pub mod cli;
pub mod commands;
pub mod database;
pub mod models;
pub mod services;
pub mod utils;

use clap::Parser;

use cli::{Cli, Commands};
use commands::server::ServerAction;

// ============================================================================
// 应用入口
// ============================================================================

pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = dispatch(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<(), String> {
    let db = database::Database::init(&cli.data_dir)?;

    match cli.command {
        Commands::Start { wait } => {
            commands::server::run_server_action(&cli.workspace, db, ServerAction::Start, wait)
        }
        Commands::Stop => {
            commands::server::run_server_action(&cli.workspace, db, ServerAction::Stop, false)
        }
        Commands::Restart { wait } => {
            commands::server::run_server_action(&cli.workspace, db, ServerAction::Restart, wait)
        }
        Commands::LogConfig => {
            commands::server::run_server_action(&cli.workspace, db, ServerAction::LogConfig, false)
        }
        Commands::AddLaunch => {
            commands::server::run_server_action(&cli.workspace, db, ServerAction::AddLaunch, false)
        }
        Commands::Classpath { project } => {
            for entry in commands::server::show_classpath(&cli.workspace, &project)? {
                println!("{}", entry);
            }
            Ok(())
        }
        Commands::Set { key, value } => commands::settings::set_preference(&db, &key, &value),
        Commands::Prefs => {
            let prefs = commands::settings::get_preferences(&db)?;
            let json = serde_json::to_string_pretty(&prefs)
                .map_err(|e| format!("序列化偏好设置失败：{}", e))?;
            println!("{}", json);
            Ok(())
        }
        Commands::Configs => {
            for config in commands::settings::list_launch_configs(&db)? {
                println!("{}\t{}\t{}", config.name, config.main_class, config.created_at);
            }
            Ok(())
        }
        Commands::War {
            project,
            location,
            export_source,
        } => commands::server::update_war_settings(
            &cli.workspace,
            &project,
            location.as_deref(),
            export_source,
        ),
    }
}
