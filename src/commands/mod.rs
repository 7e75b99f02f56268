//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `utils/`
//! - 子模块: scan

pub mod scan;

use crate::cli::Commands;
use crate::error::Result;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// 执行命令；`interrupt` 由 Ctrl-C 处理器置位
pub fn run(cmd: Commands, interrupt: Arc<AtomicBool>) -> Result<()> {
    match cmd {
        Commands::Scan(args) => scan::execute(args, interrupt),
    }
}
