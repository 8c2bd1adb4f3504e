// ============================================================================
// 进程编排：start / stop / restart / log / add-launch
// ============================================================================
//
// 每个操作都先为工作区中的 Tomcat 项目写出 webapp classpath 文件，
// 再组装 classpath 和参数交给 ProcessLauncher。
// 只有启动器返回的 LaunchError 会中断操作，其余错误在下层记录日志后降级。

use std::thread;
use std::time::Duration;

use crate::models::dtos::{LaunchRequest, Preferences};
use crate::services::assembler::{
    concat, concat_unique, cut_string, jars_of_directory, join_arguments, remove_runtime_jars,
};
use crate::services::classpath_walker::default_runtime_classpath;
use crate::services::launcher::{LaunchMode, ProcessLauncher};
use crate::services::server_config::{get_server_config, ServerConfig};
use crate::services::webapp_classpath::prepare_webapp_classpaths;
use crate::services::workspace::ProjectModel;
use crate::services::PREF_LIST_SEPARATOR;
use crate::utils::error::AppResult;

/// stop 与 start 之间的默认等待时间
///
/// 只是等待端口释放的经验值，不保证 Tomcat 已经退出。
pub const DEFAULT_RESTART_DELAY: Duration = Duration::from_secs(5);

/// 服务进程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Idle,
    Starting,
    Running,
    Stopping,
}

/// 编排器的运行上下文，进程启动时构造一次后注入
pub struct BootstrapContext {
    pub workspace: Box<dyn ProjectModel>,
    pub prefs: Preferences,
    pub config: ServerConfig,
}

impl BootstrapContext {
    /// 根据偏好设置选择 Tomcat 版本配置
    pub fn new(workspace: Box<dyn ProjectModel>, prefs: Preferences) -> AppResult<Self> {
        let config = get_server_config(&prefs)?;
        Ok(Self {
            workspace,
            prefs,
            config,
        })
    }
}

/// Tomcat 进程编排器
pub struct ServerBootstrap<L: ProcessLauncher> {
    ctx: BootstrapContext,
    launcher: L,
    state: ServerState,
    restart_delay: Duration,
}

impl<L: ProcessLauncher> ServerBootstrap<L> {
    pub fn new(ctx: BootstrapContext, launcher: L) -> Self {
        Self {
            ctx,
            launcher,
            state: ServerState::Idle,
            restart_delay: DEFAULT_RESTART_DELAY,
        }
    }

    pub fn with_restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    pub fn context(&self) -> &BootstrapContext {
        &self.ctx
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn launcher_mut(&mut self) -> &mut L {
        &mut self.launcher
    }

    // ========================================================================
    // 用户操作
    // ========================================================================

    /// 启动 Tomcat
    pub fn start(&mut self) -> AppResult<()> {
        let previous = self.state;
        self.state = ServerState::Starting;

        let command = self.ctx.config.start_command();
        match self.execute(LaunchMode::Run, command, true, false) {
            Ok(()) => {
                self.state = ServerState::Running;
                log::info!("{} 已启动", self.ctx.config.label());
                Ok(())
            }
            Err(e) => {
                self.state = if previous == ServerState::Running {
                    previous
                } else {
                    ServerState::Idle
                };
                Err(e)
            }
        }
    }

    /// 停止 Tomcat
    pub fn stop(&mut self) -> AppResult<()> {
        let previous = self.state;
        self.state = ServerState::Stopping;

        let command = self.ctx.config.stop_command();
        match self.execute(LaunchMode::Run, command, false, false) {
            Ok(()) => {
                self.state = ServerState::Idle;
                log::info!("{} 已停止", self.ctx.config.label());
                Ok(())
            }
            Err(e) => {
                self.state = previous;
                Err(e)
            }
        }
    }

    /// 停止后等待固定时间再启动
    pub fn restart(&mut self) -> AppResult<()> {
        self.stop()?;
        log::info!("等待 {:?} 后重新启动", self.restart_delay);
        thread::sleep(self.restart_delay);
        self.start()
    }

    /// 只把启动配置写入日志
    pub fn log_config(&mut self) -> AppResult<()> {
        let command = self.ctx.config.start_command();
        self.execute(LaunchMode::Log, command, true, false)
    }

    /// 保存为持久化启动配置，不启动进程
    pub fn add_launch(&mut self) -> AppResult<()> {
        let command = self.ctx.config.start_command();
        self.execute(LaunchMode::CreateConfig, command, true, true)
    }

    fn execute(
        &mut self,
        mode: LaunchMode,
        command: &str,
        show_in_debugger: bool,
        persist_config: bool,
    ) -> AppResult<()> {
        prepare_webapp_classpaths(self.ctx.workspace.as_ref());
        let request = self.build_request(command, show_in_debugger, persist_config);
        self.launcher.launch(mode, &request)
    }

    // ========================================================================
    // 组装
    // ========================================================================

    /// 组装交给启动器的参数
    pub fn build_request(
        &self,
        command: &str,
        show_in_debugger: bool,
        persist_config: bool,
    ) -> LaunchRequest {
        let prefs = &self.ctx.prefs;
        let config = &self.ctx.config;

        let mut classpath = concat_unique(&[], &cut_string(&prefs.jvm_classpath, PREF_LIST_SEPARATOR));
        classpath = self.add_preference_projects(classpath);
        classpath = concat_unique(&classpath, &config.classpath());

        let boot_classpath = cut_string(&prefs.jvm_bootclasspath, PREF_LIST_SEPARATOR);
        let vm_args = concat(
            &config.vm_args(),
            &cut_string(&prefs.jvm_parameters, PREF_LIST_SEPARATOR),
        );

        LaunchRequest {
            label: config.label().to_string(),
            main_class: config.main_class().to_string(),
            classpath,
            boot_classpath,
            vm_args: join_arguments(&vm_args),
            program_args: join_arguments(&config.prg_args(command)),
            debug: prefs.debug_mode,
            show_in_debugger,
            persist_config,
        }
    }

    /// 把偏好设置中列出的项目并入 Tomcat 系统 classpath
    ///
    /// 项目 classpath 排在前面；有项目加入时再追加实例 lib/ 下的 jar，
    /// 因为这些项目的依赖看不到 Tomcat 的 common classpath。
    fn add_preference_projects(&self, previous: Vec<String>) -> Vec<String> {
        let model = self.ctx.workspace.as_ref();
        let mut result = previous;
        let mut added = false;

        for name in cut_string(&self.ctx.prefs.projects_in_cp, PREF_LIST_SEPARATOR) {
            match model.project(&name) {
                Some(project) if project.open => {}
                Some(_) => {
                    log::warn!("项目 {} 已关闭，不加入运行时 classpath", name);
                    continue;
                }
                None => {
                    log::warn!("加入运行时 classpath 失败：项目 {} 不存在", name);
                    continue;
                }
            }

            let project_cp: Vec<String> =
                remove_runtime_jars(&default_runtime_classpath(model, &name).into_vec())
                    .into_iter()
                    .filter(|entry| !self.ctx.config.is_runtime_jar(entry))
                    .collect();
            result = concat_unique(&project_cp, &result);
            added = true;
        }

        if added {
            let libs = jars_of_directory(&[], &self.ctx.config.lib_dir());
            result = concat_unique(&result, &libs);
            log::info!("加入项目后的运行时 classpath: {:?}", result);
        }

        result
    }
}

// ============================================================================
// 单元测试
// ============================================================================
