//! 命令行参数定义

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tomcat 启动器：计算工作区项目的 webapp classpath 并启动 / 停止 Tomcat
#[derive(Debug, Parser)]
#[command(name = "tomcat-launcher", version, about)]
pub struct Cli {
    /// 工作区清单文件
    #[arg(long, short = 'w', global = true, default_value = "workspace.json")]
    pub workspace: PathBuf,

    /// 数据目录（存放 tomcat_launcher.db）
    #[arg(long, global = true, default_value = ".tomcat-launcher")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// 启动 Tomcat
    Start {
        /// 前台运行，等待 Tomcat 进程退出
        #[arg(long)]
        wait: bool,
    },

    /// 停止 Tomcat
    Stop,

    /// 停止后重新启动 Tomcat
    Restart {
        #[arg(long)]
        wait: bool,
    },

    /// 把启动配置写入日志，不启动进程
    LogConfig,

    /// 保存启动配置，不启动进程
    AddLaunch,

    /// 打印项目的 webapp classpath
    Classpath {
        project: String,
    },

    /// 修改偏好设置
    Set {
        key: String,
        value: String,
    },

    /// 显示当前偏好设置
    Prefs,

    /// 列出已保存的启动配置
    Configs,

    /// 修改项目的 WAR 导出设置
    War {
        project: String,

        /// WAR 导出位置
        #[arg(long)]
        location: Option<String>,

        /// 导出时是否包含源码
        #[arg(long)]
        export_source: Option<bool>,
    },
}
