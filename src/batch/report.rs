//! # CSV 报告
//!
//! 把每个文件的处理结果导出为 CSV。
//!
//! ## 依赖关系
//! - 被 `commands/scan.rs` 调用
//! - 使用 `serde` + `csv`

use super::runner::{FileOutcome, OutcomeStatus};
use crate::error::{ExeSweepError, Result};

use serde::Serialize;
use std::path::Path;

/// 报告行
#[derive(Debug, Serialize)]
struct ReportRow {
    path: String,
    status: &'static str,
    exit_code: Option<i32>,
    elapsed_ms: u64,
    message: String,
}

impl From<&FileOutcome> for ReportRow {
    fn from(outcome: &FileOutcome) -> Self {
        let message = match &outcome.status {
            OutcomeStatus::InvocationError(msg) => msg.clone(),
            _ => outcome.cleanup_error.clone().unwrap_or_default(),
        };

        ReportRow {
            path: outcome.file_path.display().to_string(),
            status: outcome.status.label(),
            exit_code: outcome.status.exit_code(),
            elapsed_ms: outcome.elapsed.as_millis() as u64,
            message,
        }
    }
}

/// 导出处理结果为 CSV
pub fn write_csv(outcomes: &[FileOutcome], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for outcome in outcomes {
        wtr.serialize(ReportRow::from(outcome))?;
    }

    wtr.flush().map_err(|e| ExeSweepError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
