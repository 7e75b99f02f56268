//! # 文件收集器
//!
//! 递归遍历目录，按扩展名（不区分大小写）筛选待处理文件。
//!
//! ## 功能
//! - 惰性遍历，边遍历边产出
//! - 目录以外的所有目录项（普通文件、符号链接含断链、特殊文件）都按文件名匹配
//! - 不进入符号链接目录
//! - 跳过无法读取的目录项
//!
//! ## 依赖关系
//! - 被 `batch/scanner.rs` 调用
//! - 使用 `walkdir` 遍历目录

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// 默认目标扩展名
pub const DEFAULT_EXTENSION: &str = "exe";

/// 文件收集器
pub struct FileCollector {
    /// 根目录
    root: PathBuf,
    /// 小写、带前导点的扩展名，如 ".exe"
    suffix: String,
}

impl FileCollector {
    /// 创建新的文件收集器
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            suffix: normalize_extension(DEFAULT_EXTENSION),
        }
    }

    /// 设置目标扩展名（可带或不带前导点）
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.suffix = normalize_extension(extension);
        self
    }

    /// 检查文件名是否以目标扩展名结尾
    pub fn matches(&self, path: &Path) -> bool {
        match path.file_name() {
            Some(name) => name.to_string_lossy().to_lowercase().ends_with(&self.suffix),
            None => false,
        }
    }

    /// 惰性产出所有匹配的文件
    pub fn iter(&self) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| !is_directory(e))
            .filter(move |entry| self.matches(entry.path()))
            .map(|e| e.into_path())
    }
}

/// 目录或指向目录的符号链接
fn is_directory(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_dir() || (file_type.is_symlink() && entry.path().is_dir())
}

/// "EXE" / ".exe" / "  .Exe " -> ".exe"
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim().trim_start_matches('.');
    format!(".{}", trimmed.to_lowercase())
}
