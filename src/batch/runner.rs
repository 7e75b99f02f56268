//! # 单文件执行器
//!
//! 对单个文件调用外部工具，并在限定时间内等待其退出。
//!
//! ## 功能
//! - 以文件路径作为唯一参数启动外部工具
//! - 丢弃子进程的标准输入/输出/错误
//! - 墙钟超时，超时后强制结束并回收子进程
//! - 将所有结果归类为 `OutcomeStatus`，从不向调用者传播错误
//!
//! ## 依赖关系
//! - 被 `batch/scanner.rs` 调用
//! - 仅使用标准库 `std::process`

use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// 默认单文件超时（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// 等待子进程时的轮询间隔
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 取消时写入 `InvocationError` 的消息
pub const CANCELLED_MESSAGE: &str = "cancelled";

/// 单个文件的处理状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// 工具以 0 退出
    Success,
    /// 工具以非零退出码退出（被信号终止时为 -1）
    ToolFailure(i32),
    /// 超过时间限制，子进程已被强制结束
    Timeout,
    /// 无法启动或等待工具
    InvocationError(String),
}

impl OutcomeStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeStatus::Success)
    }

    /// 简短标签，用于报告
    pub fn label(&self) -> &'static str {
        match self {
            OutcomeStatus::Success => "success",
            OutcomeStatus::ToolFailure(_) => "failed",
            OutcomeStatus::Timeout => "timeout",
            OutcomeStatus::InvocationError(_) => "error",
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            OutcomeStatus::Success => Some(0),
            OutcomeStatus::ToolFailure(code) => Some(*code),
            _ => None,
        }
    }
}

/// 单个文件处理结果
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// 被处理的文件
    pub file_path: PathBuf,
    /// 处理状态
    pub status: OutcomeStatus,
    /// 从启动到返回的耗时
    pub elapsed: Duration,
    /// 强制结束子进程失败时的说明（进程可能仍在运行）
    pub cleanup_error: Option<String>,
}

/// 执行器配置
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// 单文件超时
    pub timeout: Duration,
    /// Windows 下不为子进程创建控制台窗口
    #[cfg_attr(not(windows), allow(dead_code))]
    pub hide_window: bool,
    /// 轮询间隔
    pub poll_interval: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            hide_window: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// 单文件执行器
pub struct ProcessRunner {
    config: RunnerConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl ProcessRunner {
    /// 创建新的执行器
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// 设置取消标志；置位后正在运行的子进程会被结束
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// 对 `file` 运行 `tool`，返回归类后的结果
    pub fn run(&self, tool: &Path, file: &Path) -> FileOutcome {
        let started = Instant::now();
        let mut cleanup_error = None;
        let status = self.run_child(tool, file, &mut cleanup_error);

        FileOutcome {
            file_path: file.to_path_buf(),
            status,
            elapsed: started.elapsed(),
            cleanup_error,
        }
    }

    fn run_child(
        &self,
        tool: &Path,
        file: &Path,
        cleanup_error: &mut Option<String>,
    ) -> OutcomeStatus {
        let mut command = Command::new(tool);
        command
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        self.apply_window_flags(&mut command);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => return OutcomeStatus::InvocationError(e.to_string()),
        };

        // 超时大到无法表示时视为不限时
        let deadline = Instant::now().checked_add(self.config.timeout);

        loop {
            match child.try_wait() {
                Ok(Some(status)) => return classify_exit(status),
                Ok(None) => {}
                Err(e) => {
                    *cleanup_error = terminate(&mut child).err();
                    return OutcomeStatus::InvocationError(format!(
                        "failed to wait for tool: {}",
                        e
                    ));
                }
            }

            if self.is_cancelled() {
                *cleanup_error = terminate(&mut child).err();
                return OutcomeStatus::InvocationError(CANCELLED_MESSAGE.to_string());
            }

            let mut pause = self.config.poll_interval;
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    *cleanup_error = terminate(&mut child).err();
                    return OutcomeStatus::Timeout;
                }
                pause = pause.min(deadline - now);
            }

            thread::sleep(pause);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    #[cfg(windows)]
    fn apply_window_flags(&self, command: &mut Command) {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;

        if self.config.hide_window {
            command.creation_flags(CREATE_NO_WINDOW);
        }
    }

    #[cfg(not(windows))]
    fn apply_window_flags(&self, _command: &mut Command) {}
}

/// 根据退出状态归类
fn classify_exit(status: ExitStatus) -> OutcomeStatus {
    match status.code() {
        Some(0) => OutcomeStatus::Success,
        Some(code) => OutcomeStatus::ToolFailure(code),
        None => OutcomeStatus::ToolFailure(-1),
    }
}

/// 结束并回收子进程
///
/// kill 失败时只有在子进程已经退出的情况下才算成功；否则返回带 pid 的说明，
/// 不会阻塞在一个可能永远不退出的 `wait` 上。
fn terminate(child: &mut Child) -> Result<(), String> {
    match child.kill() {
        Ok(()) => child
            .wait()
            .map(|_| ())
            .map_err(|e| format!("failed to reap process {}: {}", child.id(), e)),
        Err(kill_err) => match child.try_wait() {
            Ok(Some(_)) => Ok(()),
            _ => Err(format!(
                "failed to kill process {}: {} (it may still be running)",
                child.id(),
                kill_err
            )),
        },
    }
}
