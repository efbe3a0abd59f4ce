use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable view of the run flag. The flag only ever goes from true to
/// false, so relaxed ordering suffices.
#[derive(Clone, Debug)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn request_stop(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn keep_running(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}

impl Default for StopHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScreenshotRequest {
    path: Option<PathBuf>,
}

impl ScreenshotRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.path.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Clears the request, returning the path it targeted.
    pub fn take(&mut self) -> Option<PathBuf> {
        self.path.take()
    }

    /// Like [`take`](Self::take), but leaves the request pending unless
    /// `ready`.
    pub fn take_if(&mut self, ready: bool) -> Option<PathBuf> {
        if ready { self.path.take() } else { None }
    }
}

#[derive(Debug, Default)]
pub struct RuntimeState {
    pub stop: StopHandle,
    pub screenshot: ScreenshotRequest,
}

impl RuntimeState {
    pub fn new(screenshot: ScreenshotRequest) -> Self {
        Self {
            stop: StopHandle::new(),
            screenshot,
        }
    }

    pub fn keep_running(&self) -> bool {
        self.stop.keep_running()
    }
}
