//! # scan 子命令 CLI 定义
//!
//! 递归扫描目录，对每个可执行文件运行外部工具
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/scan.rs`

use clap::Args;
use std::path::PathBuf;

/// scan 子命令参数
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Root directory to scan (defaults to the Steam library, then your home directory)
    pub root: Option<PathBuf>,

    /// Path to the external tool invoked as `<tool> <file>`
    #[arg(long, env = "EXESWEEP_TOOL")]
    pub tool: PathBuf,

    /// Seconds to wait for the tool on a single file before killing it
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Target file extension (case-insensitive)
    #[arg(long, default_value = "exe")]
    pub extension: String,

    /// Let the tool open its own console window (Windows only)
    #[arg(long, default_value_t = false)]
    pub show_window: bool,

    /// Write a per-file CSV report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Do not ask for confirmation when scanning a whole Steam library
    #[arg(short, long, default_value_t = false)]
    pub yes: bool,

    /// Only print failures and the final summary
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,
}
