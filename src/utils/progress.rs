//! # 进度条工具
//!
//! 封装 `indicatif` 提供统一的 spinner 样式。
//! 扫描是惰性遍历，文件总数事先未知，因此只用 spinner。
//!
//! ## 依赖关系
//! - 被 `commands/scan.rs` 使用
//! - 使用 `indicatif` crate

use indicatif::{ProgressBar, ProgressStyle};

/// 创建扫描 spinner，`{pos}` 为已完成文件数
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let template = "{spinner:.green} {elapsed_precise} [{pos}] {msg}";
    if let Ok(style) = ProgressStyle::with_template(template) {
        pb.set_style(style.tick_strings(&["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// 创建隐藏的 spinner（安静模式或非终端输出）
pub fn create_hidden() -> ProgressBar {
    ProgressBar::hidden()
}
