//! Firmware download driver.
//!
//! This module is split into submodules by step:
//! - `initiate`: put the device into firmware download mode
//! - `transfer`: write the image into the pending table, block by block
//! - `activate`: activate the pending table

mod activate;
mod initiate;
mod transfer;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::device::DeviceMetadata;
use crate::events::{FwdlEvent, FwdlObserver, LogLevel};
use crate::outcome::Outcome;
use crate::state::{DownloadPhase, TransferCursor};
use crate::transport::ProtocolSession;

pub use activate::{activate, build_activate_params};
pub use initiate::{begin_download, build_init_params};
pub use transfer::{transfer, transfer_range};

/// Where an attempt stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// Reading the firmware file.
    File,
    /// The initiate-firmware-loader-setup procedure.
    Initiate,
    /// Writing block `index` (0-based).
    Block { index: usize },
    /// The requested block range selects no block of the image.
    Range,
    /// The activate-pending-table procedure.
    Activate,
}

impl fmt::Display for FailurePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePoint::File => write!(f, "firmware file read"),
            FailurePoint::Initiate => write!(f, "download initiation"),
            FailurePoint::Block { index } => write!(f, "block {}", index + 1),
            FailurePoint::Range => write!(f, "block range selection"),
            FailurePoint::Activate => write!(f, "pending table activation"),
        }
    }
}

/// Outcome of one engine run plus the cursor to resume from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferResult {
    pub outcome: Outcome,
    pub cursor: TransferCursor,
    pub total_blocks: usize,
    pub failure: Option<FailurePoint>,
}

/// Resources shared by the download steps of one attempt.
pub struct FwdlContext<'a, S: ProtocolSession, D: DeviceMetadata + ?Sized> {
    pub session: &'a S,
    pub device: &'a D,
    pub observer: &'a dyn FwdlObserver,
    /// Checked before every block write.
    pub abort: Option<&'a AtomicBool>,
    phase: DownloadPhase,
}

impl<'a, S: ProtocolSession, D: DeviceMetadata + ?Sized> FwdlContext<'a, S, D> {
    pub fn new(session: &'a S, device: &'a D, observer: &'a dyn FwdlObserver) -> Self {
        Self {
            session,
            device,
            observer,
            abort: None,
            phase: DownloadPhase::NotStarted,
        }
    }

    pub fn with_abort(mut self, abort: &'a AtomicBool) -> Self {
        self.abort = Some(abort);
        self
    }

    pub fn phase(&self) -> DownloadPhase {
        self.phase
    }

    pub(crate) fn emit(&self, event: FwdlEvent) {
        self.observer.on_event(&event);
    }

    pub(crate) fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.emit(FwdlEvent::Log {
            level,
            message: message.into(),
        });
    }

    pub(crate) fn goto(&mut self, next: DownloadPhase) {
        if !self.phase.can_transition_to(next) {
            warn!(from = %self.phase, to = %next, "Unexpected phase transition");
        }
        info!(from = %self.phase, to = %next, "Phase transition");
        self.emit(FwdlEvent::PhaseChanged {
            from: self.phase,
            to: next,
        });
        self.phase = next;
    }

    pub(crate) fn abort_requested(&self) -> bool {
        self.abort.is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::device::{InstalledFirmware, StandardMeter};
    use crate::image::FirmwareVersion;

    pub(crate) fn meter_with(
        block_size: usize,
        installed: Vec<InstalledFirmware>,
    ) -> StandardMeter {
        let mut meter = StandardMeter::new(installed);
        meter.block_size = block_size;
        meter
    }

    #[test]
    fn test_failure_point_display_is_one_based() {
        assert_eq!(FailurePoint::Block { index: 0 }.to_string(), "block 1");
        assert_eq!(FailurePoint::Activate.to_string(), "pending table activation");
        assert_eq!(FailurePoint::Range.to_string(), "block range selection");
    }

    #[test]
    fn test_context_tracks_phase() {
        use crate::events::NullObserver;
        use crate::transport::MockSession;

        let session = MockSession::new();
        let meter = meter_with(
            64,
            vec![InstalledFirmware {
                firmware_type: crate::image::FirmwareType::Register,
                version: FirmwareVersion::new(1, 0, 0),
            }],
        );
        let mut ctx = FwdlContext::new(&session, &meter, &NullObserver);
        assert_eq!(ctx.phase(), DownloadPhase::NotStarted);
        ctx.goto(DownloadPhase::Initiating);
        assert_eq!(ctx.phase(), DownloadPhase::Initiating);
        assert!(!ctx.abort_requested());

        let flag = AtomicBool::new(true);
        let ctx = ctx.with_abort(&flag);
        assert!(ctx.abort_requested());
    }
}
