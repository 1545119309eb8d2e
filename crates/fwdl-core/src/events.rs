//! Event system for UI decoupling.
//!
//! Allows CLI/GUI front ends to follow a download (progress bar, log pane)
//! without tight coupling to the core logic.

use std::fmt;

use crate::outcome::Outcome;
use crate::protocol::{Procedure, TransportStatus};
use crate::state::DownloadPhase;

/// Log level for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Events emitted during a firmware download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FwdlEvent {
    /// Open a progress indicator with `total` steps.
    ShowProgress { total: usize },
    /// One step done (a block write was attempted).
    Step { current: usize, total: usize },
    /// Close the progress indicator.
    HideProgress,
    /// Download phase changed.
    PhaseChanged {
        from: DownloadPhase,
        to: DownloadPhase,
    },
    /// Block write attempted.
    BlockWritten {
        index: usize,
        offset: u32,
        len: usize,
        status: TransportStatus,
    },
    /// Procedure call finished.
    Procedure {
        procedure: Procedure,
        outcome: Outcome,
    },
    /// Log message.
    Log { level: LogLevel, message: String },
    /// Attempt finished.
    Complete { outcome: Outcome },
}

/// Observer trait for receiving FWDL events.
///
/// Implement this trait in your UI layer to receive updates.
pub trait FwdlObserver: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: &FwdlEvent);
}

/// No-op observer that discards all events.
pub struct NullObserver;

impl FwdlObserver for NullObserver {
    fn on_event(&self, _event: &FwdlEvent) {}
}

/// Observer that logs events using tracing.
pub struct TracingObserver;

impl FwdlObserver for TracingObserver {
    fn on_event(&self, event: &FwdlEvent) {
        match event {
            FwdlEvent::ShowProgress { total } => {
                tracing::debug!(total = total, "Progress started");
            }
            FwdlEvent::Step { current, total } => {
                let pct = if *total > 0 {
                    (*current * 100) / *total
                } else {
                    0
                };
                tracing::debug!(progress = %format!("{}%", pct), "Progress");
            }
            FwdlEvent::HideProgress => {
                tracing::debug!("Progress finished");
            }
            FwdlEvent::PhaseChanged { from, to } => {
                tracing::info!(from = %from, to = %to, "Phase changed");
            }
            FwdlEvent::BlockWritten {
                index,
                offset,
                len,
                status,
            } => {
                tracing::trace!(block = index, offset = offset, len = len, status = %status, "Block write");
            }
            FwdlEvent::Procedure { procedure, outcome } => {
                tracing::info!(procedure = %procedure, outcome = %outcome, "Procedure finished");
            }
            FwdlEvent::Log { level, message } => match level {
                LogLevel::Trace => tracing::trace!("{}", message),
                LogLevel::Debug => tracing::debug!("{}", message),
                LogLevel::Info => tracing::info!("{}", message),
                LogLevel::Warn => tracing::warn!("{}", message),
                LogLevel::Error => tracing::error!("{}", message),
            },
            FwdlEvent::Complete { outcome } => {
                tracing::info!(outcome = %outcome, "Download attempt complete");
            }
        }
    }
}

/// Keeps a progress indicator open; emits `HideProgress` when dropped.
pub struct ProgressGuard<'a> {
    observer: &'a dyn FwdlObserver,
}

impl<'a> ProgressGuard<'a> {
    pub fn show(observer: &'a dyn FwdlObserver, total: usize) -> Self {
        observer.on_event(&FwdlEvent::ShowProgress { total });
        Self { observer }
    }
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        self.observer.on_event(&FwdlEvent::HideProgress);
    }
}
