//! # 默认目录与根目录检查
//!
//! - 默认扫描目录：Steam 公共库存在时使用它，否则使用用户主目录
//! - 识别 Steam 顶层 `common` 库，扫描前需要用户确认
//!
//! ## 依赖关系
//! - 被 `commands/scan.rs` 使用
//! - 使用 `dirs` 获取主目录

use std::path::{Path, PathBuf};

/// 已知的 Steam 顶层公共库
pub const STEAM_LIBRARY_ROOTS: [&str; 2] = [
    r"C:\Program Files (x86)\Steam\steamapps\common",
    r"C:\Program Files\Steam\steamapps\common",
];

/// 默认扫描目录
pub fn default_root() -> PathBuf {
    let steam = Path::new(STEAM_LIBRARY_ROOTS[0]);
    if steam.exists() {
        return steam.to_path_buf();
    }

    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// 是否为 Steam 顶层公共库（不区分大小写，忽略分隔符风格与末尾分隔符）
pub fn is_broad_library_root(path: &Path) -> bool {
    let normalized = normalize(&path.to_string_lossy());
    STEAM_LIBRARY_ROOTS
        .iter()
        .any(|root| normalize(root) == normalized)
}

fn normalize(path: &str) -> String {
    path.replace('/', "\\")
        .trim_end_matches('\\')
        .to_lowercase()
}
