//! # 统一错误处理模块
//!
//! 定义 exesweep 的所有错误类型，使用 `thiserror` 派生。
//!
//! 单个文件的失败（工具非零退出、超时、启动失败）不是错误，
//! 它们由 `batch::runner::OutcomeStatus` 表示；这里只有会终止整个扫描的情况。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// exesweep 统一错误类型
#[derive(Error, Debug)]
pub enum ExeSweepError {
    // ─────────────────────────────────────────────────────────────
    // 扫描前置条件
    // ─────────────────────────────────────────────────────────────
    #[error("External tool not found at '{path}'. Aborting.")]
    ToolNotFound { path: String },

    #[error("Invalid folder path '{path}'. Aborting.")]
    InvalidRootDirectory { path: String },

    #[error("A scan is already in progress. Please wait for it to finish.")]
    ScanAlreadyRunning,

    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start scan worker thread")]
    WorkerSpawn(#[source] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Aborted(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, ExeSweepError>;
