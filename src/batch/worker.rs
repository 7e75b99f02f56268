//! # 扫描工作线程
//!
//! 在独立线程上运行 `BatchScanner`，通过通道把进度事件推送给调用者，
//! 并保证同一应用实例内同时只有一个扫描在运行。
//!
//! ## 依赖关系
//! - 被 `commands/scan.rs` 调用
//! - 使用 `batch/scanner.rs`
//! - 使用 `crossbeam-channel` 传递事件

use super::scanner::{BatchScanner, ProgressEvent, ScanRequest};
use crate::error::{ExeSweepError, Result};

use crossbeam_channel::{unbounded, Receiver};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// 扫描槽位：同一时间只允许一个活动扫描
#[derive(Debug, Clone, Default)]
pub struct ScanSlot {
    active: Arc<AtomicBool>,
}

/// 工作线程退出时释放槽位
struct SlotGuard {
    active: Arc<AtomicBool>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

impl ScanSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前是否有扫描在运行
    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// 启动扫描；已有扫描在运行时直接拒绝
    #[cfg(test)]
    pub fn start(&self, request: ScanRequest) -> Result<ScanHandle> {
        self.start_with_cancel(request, Arc::new(AtomicBool::new(false)))
    }

    /// 启动扫描，使用调用者提供的取消标志（如 Ctrl-C 处理器置位的标志）
    pub fn start_with_cancel(
        &self,
        request: ScanRequest,
        cancel: Arc<AtomicBool>,
    ) -> Result<ScanHandle> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ExeSweepError::ScanAlreadyRunning);
        }
        let guard = SlotGuard {
            active: Arc::clone(&self.active),
        };

        let (tx, rx) = unbounded();
        let scanner = BatchScanner::new(request).with_cancel_flag(Arc::clone(&cancel));

        // spawn 失败时闭包被丢弃，guard 随之释放槽位
        let worker = thread::Builder::new()
            .name("exesweep-scan".to_string())
            .spawn(move || {
                let _guard = guard;
                scanner.scan(|event| {
                    // 接收端已关闭时继续跑完，保证子进程被正常回收
                    let _ = tx.send(event);
                });
            })
            .map_err(ExeSweepError::WorkerSpawn)?;

        Ok(ScanHandle {
            events: rx,
            cancel,
            worker: Some(worker),
        })
    }
}

/// 正在运行的扫描
///
/// 丢弃句柄会取消扫描并等待工作线程退出，不会留下孤儿子进程。
pub struct ScanHandle {
    events: Receiver<ProgressEvent>,
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ScanHandle {
    /// 事件接收端；工作线程退出后迭代结束
    pub fn events(&self) -> &Receiver<ProgressEvent> {
        &self.events
    }

    /// 请求取消；正在运行的子进程会被结束
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// 等待工作线程退出；返回后槽位已释放
    pub fn join(mut self) -> Result<()> {
        self.join_worker()
    }

    fn join_worker(&mut self) -> Result<()> {
        match self.worker.take() {
            Some(worker) => worker
                .join()
                .map_err(|_| ExeSweepError::Aborted("scan worker panicked".to_string())),
            None => Ok(()),
        }
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.cancel();
            let _ = self.join_worker();
        }
    }
}
