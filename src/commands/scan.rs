//! # scan 命令实现
//!
//! 在工作线程上扫描目录，实时打印每个文件的处理结果。
//!
//! ## 功能
//! - 确定扫描根目录，扫描整个 Steam 库前请求确认
//! - 消费进度事件并打印日志
//! - 汇总表格与可选 CSV 报告
//!
//! ## 依赖关系
//! - 使用 `cli/scan.rs` 定义的参数
//! - 使用 `batch/`
//! - 使用 `utils/output.rs`, `utils/progress.rs`, `utils/library.rs`

use crate::batch::report;
use crate::batch::{FileOutcome, OutcomeStatus, ProgressEvent, ScanRequest, ScanSlot, ScanSummary};
use crate::cli::scan::ScanArgs;
use crate::error::{ExeSweepError, Result};
use crate::utils::{library, output, progress};

use console::Term;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tabled::{Table, Tabled};

/// 汇总表格行
#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Succeeded")]
    succeeded: usize,
    #[tabled(rename = "Failed")]
    failed: usize,
    #[tabled(rename = "Timed out")]
    timed_out: usize,
    #[tabled(rename = "Total")]
    total: usize,
}

/// 执行 scan 命令；`interrupt` 置位时取消扫描
pub fn execute(args: ScanArgs, interrupt: Arc<AtomicBool>) -> Result<()> {
    output::print_header("Batch Tool Run");

    let root = args.root.clone().unwrap_or_else(library::default_root);

    if library::is_broad_library_root(&root) && !args.yes && !confirm_broad_root(&root)? {
        return Err(ExeSweepError::Aborted(
            "Operation cancelled by user (common folder scan).".to_string(),
        ));
    }

    let request = ScanRequest::new(&root, &args.tool)
        .with_extension(&args.extension)
        .with_timeout(Duration::from_secs(args.timeout))
        .with_hide_window(!args.show_window);

    if !args.quiet {
        output::print_info(&format!(
            "Tool: {} (timeout {}s per file)",
            request.tool_path().display(),
            request.timeout().as_secs()
        ));
    }

    let root_display = request.root_directory().display().to_string();
    let slot = ScanSlot::new();
    let handle = slot.start_with_cancel(request, interrupt)?;

    let pb = if args.quiet {
        progress::create_hidden()
    } else {
        progress::create_spinner("Starting...")
    };

    let mut outcomes: Vec<FileOutcome> = Vec::new();
    let mut finished: Option<(ScanSummary, bool)> = None;
    let mut fatal: Option<ExeSweepError> = None;

    let mut announced = false;

    for event in handle.events().iter() {
        if !announced && passed_preconditions(&event) {
            announced = true;
            pb.suspend(|| {
                output::print_info(&format!("Starting to process folder: {}", root_display))
            });
        }

        match event {
            ProgressEvent::Started(path) => {
                let name = display_name(&path);
                pb.set_message(format!("Processing: {}", name));
                if !args.quiet {
                    pb.suspend(|| output::print_info(&format!("Processing: {}...", name)));
                }
            }
            ProgressEvent::Finished(outcome) => {
                pb.inc(1);
                pb.suspend(|| log_outcome(&outcome, args.quiet));
                outcomes.push(outcome);
            }
            ProgressEvent::Fatal(e) => fatal = Some(e),
            ProgressEvent::Cancelled(summary) => finished = Some((summary, false)),
            ProgressEvent::ScanComplete(summary) => finished = Some((summary, true)),
        }
    }

    pb.finish_and_clear();
    handle.join()?;

    if let Some(e) = fatal {
        return Err(e);
    }

    let (summary, completed) = finished.ok_or_else(|| {
        ExeSweepError::Aborted("Scan ended without a summary".to_string())
    })?;

    if !summary.found_any_matching_file {
        output::print_warning(&format!(
            "No '.{}' files found under {}",
            args.extension.trim_start_matches('.'),
            root.display()
        ));
    }

    print_summary(&summary, &outcomes);

    if let Some(report_path) = &args.report {
        report::write_csv(&outcomes, report_path)?;
        output::print_success(&format!("Report written to {}", report_path.display()));
    }

    output::print_done("Processing finished.");

    if !completed {
        return Err(ExeSweepError::Aborted(
            "Scan was cancelled before completion".to_string(),
        ));
    }

    Ok(())
}

/// 除致命前置条件外，任何事件都说明扫描已经开始
fn passed_preconditions(event: &ProgressEvent) -> bool {
    !matches!(event, ProgressEvent::Fatal(_))
}

/// 打印单个文件的结果
fn log_outcome(outcome: &FileOutcome, quiet: bool) {
    let name = display_name(&outcome.file_path);
    let secs = outcome.elapsed.as_secs_f64();

    match &outcome.status {
        OutcomeStatus::Success => {
            if !quiet {
                output::print_success(&format!(
                    "Successfully processed: {} ({:.1}s)",
                    name, secs
                ));
            }
        }
        OutcomeStatus::ToolFailure(code) => output::print_failure(&format!(
            "Failed to process: {} (Error Code: {})",
            name, code
        )),
        OutcomeStatus::Timeout => {
            output::print_timeout(&format!("Timeout processing: {} ({:.0}s)", name, secs))
        }
        OutcomeStatus::InvocationError(msg) => output::print_failure(&format!(
            "Error during processing of {}: {}",
            name, msg
        )),
    }

    if let Some(err) = &outcome.cleanup_error {
        output::print_warning(&format!("{}: {}", outcome.file_path.display(), err));
    }
}

/// 打印汇总表格
fn print_summary(summary: &ScanSummary, outcomes: &[FileOutcome]) {
    let timed_out = outcomes
        .iter()
        .filter(|o| o.status == OutcomeStatus::Timeout)
        .count();

    let rows = vec![SummaryRow {
        succeeded: summary.processed_count,
        failed: summary.failed_count,
        timed_out,
        total: summary.total(),
    }];

    output::print_separator();
    output::print_info(&format!(
        "Processing summary: {} succeeded, {} failed.",
        summary.processed_count, summary.failed_count
    ));
    println!("{}", Table::new(&rows));
}

/// 交互式确认扫描整个 Steam 库
fn confirm_broad_root(root: &Path) -> Result<bool> {
    let term = Term::stderr();
    if !term.is_term() {
        return Err(ExeSweepError::InvalidArgument(format!(
            "'{}' is a whole Steam library; pass --yes to scan it non-interactively",
            root.display()
        )));
    }

    output::print_warning(
        "You are about to scan a main Steam 'common' folder. \
         This could take a very long time and affect many files.",
    );
    term.write_str("Do you wish to proceed? [y/N] ")
        .map_err(|e| ExeSweepError::Aborted(e.to_string()))?;
    let answer = term
        .read_line()
        .map_err(|e| ExeSweepError::Aborted(e.to_string()))?;

    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
