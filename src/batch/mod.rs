//! # 批量处理模块
//!
//! 遍历目录树并对每个可执行文件调用外部工具。
//!
//! ## 功能
//! - 收集匹配扩展名的文件
//! - 单文件执行与超时控制
//! - 串行扫描、进度事件与汇总
//! - 独立工作线程与单扫描约束
//! - CSV 报告
//!
//! ## 依赖关系
//! - 被 `commands/scan.rs` 使用
//! - 使用 `walkdir` 遍历目录
//! - 使用 `crossbeam-channel` 推送进度事件

pub mod collector;
pub mod report;
pub mod runner;
pub mod scanner;
pub mod worker;

pub use runner::{FileOutcome, OutcomeStatus};
pub use scanner::{ProgressEvent, ScanRequest, ScanSummary};
pub use worker::ScanSlot;
