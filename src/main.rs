//! # exesweep - 批量可执行文件处理工具
//!
//! 递归扫描目录树，对每个 `.exe` 文件调用外部工具，并汇总结果。
//!
//! ## 子命令
//! - `scan` - 扫描目录并逐个处理可执行文件
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     └── batch/   (遍历、单文件执行、工作线程、报告)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    // Ctrl-C 只置位标志：扫描线程会结束正在运行的工具，再以 Cancelled 收尾
    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupt);
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!(
            "\n{} Received Ctrl+C. Stopping the running tool...",
            "[WARN]".yellow().bold()
        );
        flag.store(true, Ordering::SeqCst);
    }) {
        utils::output::print_warning(&format!("Failed to set Ctrl-C handler: {}", e));
    }

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command, interrupt) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
