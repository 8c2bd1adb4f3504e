// ============================================================================
// 进程启动器：把组装好的 LaunchRequest 交给 JVM
// ============================================================================
//
// 三种模式：
// - run：启动 java 进程，保留子进程句柄
// - log：只把启动参数写入日志，不启动进程
// - create_config：保存为持久化启动配置，不启动进程

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::database::Database;
use crate::models::dtos::LaunchRequest;
use crate::utils::error::{AppError, AppResult};

/// 调试模式下追加的 JDWP 代理参数
pub const JDWP_AGENT: &str = "-agentlib:jdwp=transport=dt_socket,server=y,suspend=n,address=8000";

/// 启动模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    Run,
    Log,
    CreateConfig,
}

// ============================================================================
// ProcessLauncher Trait 定义
// ============================================================================

/// 进程启动器协作者
pub trait ProcessLauncher {
    /// 启动进程
    fn run(&mut self, request: &LaunchRequest) -> AppResult<()>;

    /// 只记录启动参数
    fn log(&mut self, request: &LaunchRequest) -> AppResult<()>;

    /// 创建持久化启动配置
    fn create_config(&mut self, request: &LaunchRequest) -> AppResult<()>;

    /// 按模式分发
    fn launch(&mut self, mode: LaunchMode, request: &LaunchRequest) -> AppResult<()> {
        match mode {
            LaunchMode::Run => self.run(request),
            LaunchMode::Log => self.log(request),
            LaunchMode::CreateConfig => self.create_config(request),
        }
    }
}

// ============================================================================
// 命令行组装
// ============================================================================

/// 平台 classpath 分隔符
fn classpath_separator() -> &'static str {
    if cfg!(windows) {
        ";"
    } else {
        ":"
    }
}

/// 拼接 classpath 数组
pub fn join_classpath(paths: &[String]) -> String {
    paths.join(classpath_separator())
}

/// java 可执行文件之后的全部参数
///
/// 顺序：boot classpath、JDWP、JVM 参数、`-cp`、主类、程序参数。
/// 参数字符串按空白切分，路径中不能含空格。
pub fn command_args(request: &LaunchRequest) -> Vec<String> {
    let mut args = Vec::new();

    if !request.boot_classpath.is_empty() {
        args.push(format!(
            "-Xbootclasspath/a:{}",
            join_classpath(&request.boot_classpath)
        ));
    }
    if request.debug {
        args.push(JDWP_AGENT.to_string());
    }
    args.extend(request.vm_args.split_whitespace().map(str::to_string));

    if !request.classpath.is_empty() {
        args.push("-cp".to_string());
        args.push(join_classpath(&request.classpath));
    }

    args.push(request.main_class.clone());
    args.extend(request.program_args.split_whitespace().map(str::to_string));
    args
}

fn timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(&Rfc3339).unwrap_or_else(|_| now.unix_timestamp().to_string())
}

// ============================================================================
// JavaLauncher：启动本机 java 进程
// ============================================================================

/// 通过 `java` 可执行文件启动服务进程
pub struct JavaLauncher {
    java: PathBuf,
    /// 保存启动配置用；未配置时 create_config 返回错误
    db: Option<Database>,
    /// 已启动的子进程（标签, 句柄）
    children: Vec<(String, Child)>,
}

impl JavaLauncher {
    pub fn new(java: impl Into<PathBuf>) -> Self {
        Self {
            java: java.into(),
            db: None,
            children: Vec::new(),
        }
    }

    /// 使用 `JAVA_HOME/bin/java`，未设置 JAVA_HOME 时使用 PATH 中的 java
    pub fn from_env() -> Self {
        let java = std::env::var_os("JAVA_HOME")
            .map(|home| PathBuf::from(home).join("bin").join("java"))
            .unwrap_or_else(|| PathBuf::from("java"));
        Self::new(java)
    }

    pub fn with_database(mut self, db: Database) -> Self {
        self.db = Some(db);
        self
    }

    /// 回收已退出的子进程，返回仍在运行的数量
    pub fn reap_finished(&mut self) -> usize {
        self.children.retain_mut(|(label, child)| match child.try_wait() {
            Ok(Some(status)) => {
                log::info!("{} 进程已退出：{}", label, status);
                false
            }
            Ok(None) => true,
            Err(e) => {
                log::warn!("查询 {} 进程状态失败: {}", label, e);
                true
            }
        });
        self.children.len()
    }

    /// 等待所有子进程结束
    pub fn wait_all(&mut self) -> AppResult<()> {
        for (label, mut child) in self.children.drain(..) {
            let status = child
                .wait()
                .map_err(|e| AppError::LaunchError(format!("等待 {} 进程失败: {}", label, e)))?;
            log::info!("{} 进程已退出：{}", label, status);
        }
        Ok(())
    }
}

impl ProcessLauncher for JavaLauncher {
    fn run(&mut self, request: &LaunchRequest) -> AppResult<()> {
        self.reap_finished();

        let args = command_args(request);
        log::info!(
            "[{}] 启动 {}：{} {}",
            timestamp(),
            request.label,
            self.java.display(),
            args.join(" ")
        );

        let child = Command::new(&self.java)
            .args(&args)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| {
                AppError::LaunchError(format!(
                    "无法启动 {}（{}）: {}",
                    request.label,
                    self.java.display(),
                    e
                ))
            })?;

        log::info!("{} 进程已启动，pid={}", request.label, child.id());
        self.children.push((request.label.clone(), child));
        Ok(())
    }

    fn log(&mut self, request: &LaunchRequest) -> AppResult<()> {
        log::info!("==== {} 启动配置 ({}) ====", request.label, timestamp());
        log::info!("main class: {}", request.main_class);
        log::info!("classpath:");
        for entry in &request.classpath {
            log::info!("  {}", entry);
        }
        log::info!("boot classpath:");
        for entry in &request.boot_classpath {
            log::info!("  {}", entry);
        }
        log::info!("vm args:{}", request.vm_args);
        log::info!("program args:{}", request.program_args);
        log::info!("debug: {}", request.debug);
        Ok(())
    }

    fn create_config(&mut self, request: &LaunchRequest) -> AppResult<()> {
        let db = self
            .db
            .as_ref()
            .ok_or_else(|| AppError::LaunchError("未配置数据库，无法保存启动配置".to_string()))?;
        let saved = db
            .save_launch_config(request)
            .map_err(AppError::LaunchError)?;
        log::info!("已保存启动配置 {} (id={})", saved.name, saved.id);
        Ok(())
    }
}

// ============================================================================
// RecordingLauncher：只记录调用，不启动进程（测试用）
// ============================================================================

#[cfg(test)]
pub(crate) mod recording {
    use std::time::Instant;

    use super::{LaunchMode, ProcessLauncher};
    use crate::models::dtos::LaunchRequest;
    use crate::utils::error::{AppError, AppResult};

    /// 一次启动器调用
    #[derive(Debug, Clone)]
    pub struct RecordedLaunch {
        pub mode: LaunchMode,
        pub request: LaunchRequest,
        pub at: Instant,
    }

    /// 记录所有调用的启动器，可配置为 run 时失败
    #[derive(Debug, Default)]
    pub struct RecordingLauncher {
        pub calls: Vec<RecordedLaunch>,
        pub fail_runs: bool,
    }

    impl RecordingLauncher {
        pub fn new() -> Self {
            Self::default()
        }

        /// run 调用一律返回 LaunchError
        pub fn failing() -> Self {
            Self {
                calls: Vec::new(),
                fail_runs: true,
            }
        }

        fn record(&mut self, mode: LaunchMode, request: &LaunchRequest) {
            self.calls.push(RecordedLaunch {
                mode,
                request: request.clone(),
                at: Instant::now(),
            });
        }
    }

    impl ProcessLauncher for RecordingLauncher {
        fn run(&mut self, request: &LaunchRequest) -> AppResult<()> {
            self.record(LaunchMode::Run, request);
            if self.fail_runs {
                return Err(AppError::LaunchError(format!("{} 无法启动", request.label)));
            }
            Ok(())
        }

        fn log(&mut self, request: &LaunchRequest) -> AppResult<()> {
            self.record(LaunchMode::Log, request);
            Ok(())
        }

        fn create_config(&mut self, request: &LaunchRequest) -> AppResult<()> {
            self.record(LaunchMode::CreateConfig, request);
            Ok(())
        }
    }
}

// ============================================================================
// 单元测试
// ============================================================================
