//! # 批量扫描器
//!
//! 遍历目录树，对每个匹配文件依次调用外部工具，并按时间顺序发出进度事件。
//!
//! ## 功能
//! - 扫描前检查工具与根目录（致命前置条件）
//! - 逐个文件串行处理，单个文件失败不会中断扫描
//! - 汇总成功/失败计数，结束时只发出一次汇总
//! - 响应取消标志
//!
//! ## 依赖关系
//! - 被 `batch/worker.rs` 在工作线程中调用
//! - 使用 `batch/collector.rs`, `batch/runner.rs`

use super::collector::{FileCollector, DEFAULT_EXTENSION};
use super::runner::{FileOutcome, OutcomeStatus, ProcessRunner, RunnerConfig};
use crate::error::{ExeSweepError, Result};

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 一次扫描的请求
#[derive(Debug, Clone)]
pub struct ScanRequest {
    root_directory: PathBuf,
    tool_path: PathBuf,
    extension: String,
    runner: RunnerConfig,
}

impl ScanRequest {
    pub fn new(root_directory: impl Into<PathBuf>, tool_path: impl Into<PathBuf>) -> Self {
        Self {
            root_directory: root_directory.into(),
            tool_path: tool_path.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            runner: RunnerConfig::default(),
        }
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.runner.timeout = timeout;
        self
    }

    pub fn with_hide_window(mut self, hide_window: bool) -> Self {
        self.runner.hide_window = hide_window;
        self
    }

    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    pub fn tool_path(&self) -> &Path {
        &self.tool_path
    }

    pub fn timeout(&self) -> Duration {
        self.runner.timeout
    }
}

/// 扫描汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// 成功处理的文件数
    pub processed_count: usize,
    /// 失败（非零退出、超时、启动错误）的文件数
    pub failed_count: usize,
    /// 是否找到过匹配文件
    pub found_any_matching_file: bool,
}

impl ScanSummary {
    fn record(&mut self, status: &OutcomeStatus) {
        self.found_any_matching_file = true;
        if status.is_success() {
            self.processed_count += 1;
        } else {
            self.failed_count += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.processed_count + self.failed_count
    }
}

/// 进度事件
#[derive(Debug)]
pub enum ProgressEvent {
    /// 开始处理某个文件
    Started(PathBuf),
    /// 某个文件处理完毕
    Finished(FileOutcome),
    /// 前置条件不满足，扫描未开始
    Fatal(ExeSweepError),
    /// 扫描被取消
    Cancelled(ScanSummary),
    /// 遍历完成
    ScanComplete(ScanSummary),
}

/// 批量扫描器
pub struct BatchScanner {
    request: ScanRequest,
    cancel: Arc<AtomicBool>,
}

impl BatchScanner {
    /// 创建新的扫描器
    ///
    /// 工具与根目录在这里统一转为绝对路径：前置检查与实际启动看到的是同一个文件，
    /// 裸文件名不会在启动时改为按 PATH 查找。
    pub fn new(mut request: ScanRequest) -> Self {
        request.tool_path = absolute_or_same(&request.tool_path);
        request.root_directory = absolute_or_same(&request.root_directory);

        Self {
            request,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 使用外部的取消标志
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// 检查工具是否存在、根目录是否有效
    pub fn check_preconditions(&self) -> Result<()> {
        if !self.request.tool_path.exists() {
            return Err(ExeSweepError::ToolNotFound {
                path: self.request.tool_path.display().to_string(),
            });
        }

        if !self.request.root_directory.is_dir() {
            return Err(ExeSweepError::InvalidRootDirectory {
                path: self.request.root_directory.display().to_string(),
            });
        }

        Ok(())
    }

    /// 执行扫描，每个事件交给 `emit`；最后一个事件总是终止事件
    pub fn scan<F>(self, mut emit: F)
    where
        F: FnMut(ProgressEvent),
    {
        if let Err(e) = self.check_preconditions() {
            emit(ProgressEvent::Fatal(e));
            return;
        }

        let collector = FileCollector::new(self.request.root_directory.clone())
            .with_extension(&self.request.extension);
        let runner = ProcessRunner::new(self.request.runner.clone())
            .with_cancel_flag(Arc::clone(&self.cancel));

        let mut summary = ScanSummary::default();

        for file in collector.iter() {
            if self.is_cancelled() {
                emit(ProgressEvent::Cancelled(summary));
                return;
            }

            emit(ProgressEvent::Started(file.clone()));
            let outcome = runner.run(&self.request.tool_path, &file);
            summary.record(&outcome.status);
            emit(ProgressEvent::Finished(outcome));
        }

        if self.is_cancelled() {
            emit(ProgressEvent::Cancelled(summary));
        } else {
            emit(ProgressEvent::ScanComplete(summary));
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

/// 转为绝对路径；失败（如空路径）时原样返回，交给前置检查报告
fn absolute_or_same(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::batch::test_support::{build_tree, fake_tool};
    use tempfile::TempDir;

    impl BatchScanner {
        fn scan_to_vec(self) -> Vec<ProgressEvent> {
            let mut events = Vec::new();
            self.scan(|event| events.push(event));
            events
        }
    }

    fn is_terminal(event: &ProgressEvent) -> bool {
        matches!(
            event,
            ProgressEvent::Fatal(_) | ProgressEvent::Cancelled(_) | ProgressEvent::ScanComplete(_)
        )
    }

    fn count_events(events: &[ProgressEvent]) -> (usize, usize) {
        let started = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Started(_)))
            .count();
        let finished = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Finished(_)))
            .count();
        (started, finished)
    }

    fn final_summary(events: &[ProgressEvent]) -> ScanSummary {
        match events.last() {
            Some(ProgressEvent::ScanComplete(summary)) => *summary,
            other => panic!("expected ScanComplete, got {:?}", other),
        }
    }

    #[test]
    fn test_all_success() {
        let tools = TempDir::new().unwrap();
        let tree = TempDir::new().unwrap();
        let tool = fake_tool(tools.path(), "ok", "exit 0");
        let matching = build_tree(tree.path());

        let events = BatchScanner::new(ScanRequest::new(tree.path(), &tool)).scan_to_vec();

        assert_eq!(count_events(&events), (matching, matching));
        let summary = final_summary(&events);
        assert_eq!(summary.processed_count, matching);
        assert_eq!(summary.failed_count, 0);
        assert!(summary.found_any_matching_file);
    }

    #[test]
    fn test_all_failure() {
        let tools = TempDir::new().unwrap();
        let tree = TempDir::new().unwrap();
        let tool = fake_tool(tools.path(), "fail", "exit 1");
        let matching = build_tree(tree.path());

        let events = BatchScanner::new(ScanRequest::new(tree.path(), &tool)).scan_to_vec();

        let summary = final_summary(&events);
        assert_eq!(summary.processed_count, 0);
        assert_eq!(summary.failed_count, matching);
        assert_eq!(summary.total(), matching);

        for event in &events {
            if let ProgressEvent::Finished(outcome) = event {
                assert_eq!(outcome.status, OutcomeStatus::ToolFailure(1));
            }
        }
    }

    #[test]
    fn test_started_precedes_finished_for_each_file() {
        let tools = TempDir::new().unwrap();
        let tree = TempDir::new().unwrap();
        let tool = fake_tool(tools.path(), "ok", "exit 0");
        build_tree(tree.path());

        let events = BatchScanner::new(ScanRequest::new(tree.path(), &tool)).scan_to_vec();

        let mut pending: Option<PathBuf> = None;
        for event in &events {
            match event {
                ProgressEvent::Started(path) => {
                    assert!(pending.is_none());
                    assert!(path.is_absolute());
                    pending = Some(path.clone());
                }
                ProgressEvent::Finished(outcome) => {
                    assert_eq!(pending.take().as_ref(), Some(&outcome.file_path));
                }
                _ => {}
            }
        }
        assert!(pending.is_none());
        assert_eq!(
            events.iter().filter(|e| is_terminal(e)).count(),
            1,
            "exactly one terminal event"
        );
    }

    #[test]
    fn test_mixed_outcomes_by_filename() {
        let tools = TempDir::new().unwrap();
        let tree = TempDir::new().unwrap();
        let tool = fake_tool(
            tools.path(),
            "picky",
            "case \"$1\" in *bad*) exit 2 ;; *) exit 0 ;; esac",
        );
        for name in ["good1.exe", "bad.exe", "sub/good2.EXE", "sub/bad2.exe"] {
            let path = tree.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, b"").unwrap();
        }

        let events = BatchScanner::new(ScanRequest::new(tree.path(), &tool)).scan_to_vec();

        let summary = final_summary(&events);
        assert_eq!(summary.processed_count, 2);
        assert_eq!(summary.failed_count, 2);
    }

    #[test]
    fn test_timeout_does_not_abort_scan() {
        let tools = TempDir::new().unwrap();
        let tree = TempDir::new().unwrap();
        let tool = fake_tool(
            tools.path(),
            "slow",
            "case \"$1\" in *hang*) exec sleep 60 ;; *) exit 0 ;; esac",
        );
        std::fs::write(tree.path().join("hang.exe"), b"").unwrap();
        std::fs::write(tree.path().join("fine.exe"), b"").unwrap();

        let events = BatchScanner::new(
            ScanRequest::new(tree.path(), &tool).with_timeout(Duration::from_secs(1)),
        )
        .scan_to_vec();

        let summary = final_summary(&events);
        assert_eq!(summary.processed_count, 1);
        assert_eq!(summary.failed_count, 1);
        assert!(events.iter().any(|e| matches!(
            e,
            ProgressEvent::Finished(o) if o.status == OutcomeStatus::Timeout
        )));
    }

    #[test]
    fn test_huge_timeout_does_not_abort_scan() {
        let tools = TempDir::new().unwrap();
        let tree = TempDir::new().unwrap();
        let tool = fake_tool(tools.path(), "ok", "exit 0");
        let matching = build_tree(tree.path());

        let events = BatchScanner::new(
            ScanRequest::new(tree.path(), &tool).with_timeout(Duration::from_secs(u64::MAX)),
        )
        .scan_to_vec();

        assert_eq!(final_summary(&events).processed_count, matching);
    }

    #[test]
    fn test_bare_tool_name_resolves_against_current_dir() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let tree = TempDir::new().unwrap();
        std::fs::write(tree.path().join("game.exe"), b"").unwrap();

        let mut file = tempfile::Builder::new()
            .prefix("exesweep-local-tool-")
            .tempfile_in(".")
            .unwrap();
        file.write_all(b"#!/bin/sh\nexit 0\n").unwrap();
        let tool = file.into_temp_path();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        let bare_name = PathBuf::from(tool.file_name().unwrap());

        let scanner = BatchScanner::new(ScanRequest::new(tree.path(), &bare_name));
        assert!(scanner.request.tool_path().is_absolute());

        let events = scanner.scan_to_vec();
        let summary = final_summary(&events);
        assert_eq!(summary.processed_count, 1);
        assert_eq!(summary.failed_count, 0);
    }

    #[test]
    fn test_relative_root_yields_absolute_paths() {
        let tools = TempDir::new().unwrap();
        let tool = fake_tool(tools.path(), "ok", "exit 0");
        let tree = tempfile::Builder::new()
            .prefix("exesweep-local-tree-")
            .tempdir_in(".")
            .unwrap();
        std::fs::write(tree.path().join("game.exe"), b"").unwrap();
        let relative_root = PathBuf::from(tree.path().file_name().unwrap());

        let events = BatchScanner::new(ScanRequest::new(&relative_root, &tool)).scan_to_vec();

        assert!(events.iter().any(
            |e| matches!(e, ProgressEvent::Started(path) if path.is_absolute())
        ));
        assert_eq!(final_summary(&events).processed_count, 1);
    }

    #[test]
    fn test_no_matching_files() {
        let tools = TempDir::new().unwrap();
        let tree = TempDir::new().unwrap();
        let tool = fake_tool(tools.path(), "ok", "exit 0");
        std::fs::create_dir_all(tree.path().join("a/b/c")).unwrap();
        std::fs::write(tree.path().join("a/readme.txt"), b"").unwrap();

        let events = BatchScanner::new(ScanRequest::new(tree.path(), &tool)).scan_to_vec();

        assert_eq!(events.len(), 1);
        assert_eq!(final_summary(&events), ScanSummary::default());
    }

    #[test]
    fn test_missing_root_is_single_fatal_event() {
        let tools = TempDir::new().unwrap();
        let tool = fake_tool(tools.path(), "ok", "exit 0");
        let root = tools.path().join("nope");

        let events = BatchScanner::new(ScanRequest::new(&root, &tool)).scan_to_vec();

        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            ProgressEvent::Fatal(ExeSweepError::InvalidRootDirectory { .. })
        ));
    }

    #[test]
    fn test_root_is_file_is_fatal() {
        let tools = TempDir::new().unwrap();
        let tool = fake_tool(tools.path(), "ok", "exit 0");
        let root = tools.path().join("file.exe");
        std::fs::write(&root, b"").unwrap();

        let events = BatchScanner::new(ScanRequest::new(&root, &tool)).scan_to_vec();

        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            ProgressEvent::Fatal(ExeSweepError::InvalidRootDirectory { .. })
        ));
    }

    #[test]
    fn test_missing_tool_is_single_fatal_event() {
        let tree = TempDir::new().unwrap();
        build_tree(tree.path());

        let events = BatchScanner::new(ScanRequest::new(
            tree.path(),
            tree.path().join("missing-tool"),
        ))
        .scan_to_vec();

        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            ProgressEvent::Fatal(ExeSweepError::ToolNotFound { .. })
        ));
    }

    #[test]
    fn test_cancel_before_start() {
        let tools = TempDir::new().unwrap();
        let tree = TempDir::new().unwrap();
        let tool = fake_tool(tools.path(), "ok", "exit 0");
        build_tree(tree.path());

        let cancel = Arc::new(AtomicBool::new(true));
        let events = BatchScanner::new(ScanRequest::new(tree.path(), &tool))
            .with_cancel_flag(cancel)
            .scan_to_vec();

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ProgressEvent::Cancelled(s) if s.total() == 0));
    }
}
