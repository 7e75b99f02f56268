//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `scan`: 递归扫描并对每个可执行文件运行外部工具
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: scan

pub mod scan;

use clap::{Parser, Subcommand};

/// exesweep - 批量对可执行文件运行外部工具
#[derive(Parser)]
#[command(name = "exesweep")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Recursively run an external tool against every executable in a directory tree", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Scan a directory tree and run the tool on every matching file
    Scan(scan::ScanArgs),
}
