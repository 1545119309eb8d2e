//! FWDL Session - public download operations against one device.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::device::{DeviceMetadata, PendingEvent};
use crate::error::FwdlError;
use crate::events::{FwdlEvent, FwdlObserver, LogLevel, TracingObserver};
use crate::fwdl::{self, FailurePoint, FwdlContext, TransferResult};
use crate::image::{FirmwareImage, ImageError};
use crate::outcome::Outcome;
use crate::protocol::constants::PENDING_TABLE_FLAG;
use crate::state::TransferCursor;
use crate::transport::ProtocolSession;

/// Configuration for a download run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Path to the firmware image.
    pub image_path: Option<String>,
    /// Turn link failures during block writes into a resumable outcome.
    pub allow_retry: bool,
    /// Activate the pending table once all blocks are written.
    pub activate: bool,
    /// Number of blocks already committed by an earlier attempt.
    pub resume_block: usize,
    /// Activation event recorded in the pending-table header.
    pub activation: PendingEvent,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            image_path: None,
            allow_retry: false,
            activate: true,
            resume_block: 0,
            activation: PendingEvent::immediate(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SessionConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Result of a public download operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadReport {
    pub outcome: Outcome,
    /// Blocks committed so far, i.e. the 1-based number of the last block
    /// the device accepted. Pass it back to resume.
    pub resume_block: usize,
    pub total_blocks: usize,
    /// Where the attempt stopped, when it did not succeed.
    pub failure: Option<FailurePoint>,
}

impl DownloadReport {
    fn file_error() -> Self {
        Self {
            outcome: Outcome::FileError,
            resume_block: 0,
            total_blocks: 0,
            failure: Some(FailurePoint::File),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Whether the caller can pick up from `resume_block`.
    pub fn is_resumable(&self) -> bool {
        matches!(self.failure, Some(FailurePoint::Block { .. }))
    }
}

impl From<TransferResult> for DownloadReport {
    fn from(result: TransferResult) -> Self {
        Self {
            outcome: result.outcome,
            resume_block: result.cursor.block_index,
            total_blocks: result.total_blocks,
            failure: result.failure,
        }
    }
}

/// FWDL Session - drives firmware downloads to one device.
pub struct FwdlSession<S: ProtocolSession, D: DeviceMetadata, O: FwdlObserver> {
    session: S,
    device: D,
    observer: Arc<O>,
    abort: Arc<AtomicBool>,
}

impl<S: ProtocolSession, D: DeviceMetadata> FwdlSession<S, D, TracingObserver> {
    /// Create a new session with default tracing observer.
    pub fn new(session: S, device: D) -> Self {
        Self::with_observer(session, device, Arc::new(TracingObserver))
    }
}

impl<S: ProtocolSession, D: DeviceMetadata, O: FwdlObserver + 'static> FwdlSession<S, D, O> {
    /// Create a new session with a custom observer.
    pub fn with_observer(session: S, device: D, observer: Arc<O>) -> Self {
        Self {
            session,
            device,
            observer,
            abort: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag checked before every block write. Setting it ends the running
    /// attempt with [`FwdlError::Cancelled`]; it stays set until cleared.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    /// Download and activate from scratch; link failures are fatal.
    pub fn download_and_activate<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<DownloadReport, FwdlError> {
        self.download_with_resume(path, 0, false, true)
    }

    /// Download, optionally resuming after `resume_block` committed blocks.
    ///
    /// With `allow_retry` a link failure during block writes is reported as
    /// [`Outcome::WriteError`] with `resume_block` pointing at the failed
    /// block instead of being returned as an error.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn download_with_resume<P: AsRef<Path>>(
        &self,
        path: P,
        resume_block: usize,
        allow_retry: bool,
        activate: bool,
    ) -> Result<DownloadReport, FwdlError> {
        self.run_transfer(
            path.as_ref(),
            resume_block,
            allow_retry,
            activate,
            &PendingEvent::immediate(),
        )
    }

    /// Stage the image in the pending table and leave activation to the
    /// device according to `event`.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn download_no_activate<P: AsRef<Path>>(
        &self,
        path: P,
        event: PendingEvent,
    ) -> Result<DownloadReport, FwdlError> {
        self.run_transfer(path.as_ref(), 0, false, false, &event)
    }

    /// Write only blocks `start_block..=end_block` (1-based, clamped).
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn download_block_range<P: AsRef<Path>>(
        &self,
        path: P,
        start_block: usize,
        end_block: usize,
    ) -> Result<DownloadReport, FwdlError> {
        let Some(image) = self.load_image(path.as_ref())? else {
            return Ok(DownloadReport::file_error());
        };
        let table_id = self.table_id_for(&image)?;
        let block_size = self.device.fwdl_block_size();

        let mut ctx = self.context();
        let result = fwdl::transfer_range(
            &mut ctx,
            &image,
            block_size,
            &PendingEvent::immediate(),
            table_id,
            start_block,
            end_block,
            false,
        )?;
        Ok(result.into())
    }

    /// Run the download described by `config`.
    pub fn run(&self, config: &SessionConfig) -> Result<DownloadReport, FwdlError> {
        let Some(path) = config.image_path.as_deref() else {
            warn!("No firmware image configured");
            return Ok(DownloadReport::file_error());
        };
        self.run_transfer(
            Path::new(path),
            config.resume_block,
            config.allow_retry,
            config.activate,
            &config.activation,
        )
    }

    fn run_transfer(
        &self,
        path: &Path,
        resume_block: usize,
        allow_retry: bool,
        activate: bool,
        event: &PendingEvent,
    ) -> Result<DownloadReport, FwdlError> {
        let Some(image) = self.load_image(path)? else {
            return Ok(DownloadReport::file_error());
        };
        let table_id = self.table_id_for(&image)?;
        // Queried once; fixed for the whole attempt.
        let block_size = self.device.fwdl_block_size();

        info!(
            firmware_type = %image.firmware_type(),
            version = %image.version(),
            table_id = %format!("0x{:04X}", table_id),
            block_size,
            resume_block,
            "Starting firmware download"
        );

        let cursor = TransferCursor::resume_at(table_id, resume_block, allow_retry);
        let mut ctx = self.context();
        let result = fwdl::transfer(&mut ctx, &image, block_size, event, cursor, activate)?;
        Ok(result.into())
    }

    /// Read the image; an unreadable file is reported as `Ok(None)`.
    fn load_image(&self, path: &Path) -> Result<Option<FirmwareImage>, FwdlError> {
        match FirmwareImage::load(path) {
            Ok(image) => Ok(Some(image)),
            Err(e @ ImageError::Io { .. }) => {
                warn!(error = %e, "Cannot read firmware file");
                self.observer.on_event(&FwdlEvent::Log {
                    level: LogLevel::Error,
                    message: e.to_string(),
                });
                Ok(None)
            }
            Err(e) => Err(FwdlError::UnsupportedFirmware(e)),
        }
    }

    fn table_id_for(&self, image: &FirmwareImage) -> Result<u16, FwdlError> {
        let firmware_type = image.firmware_type();
        self.device
            .pending_table_id(firmware_type)
            .map(|id| id | PENDING_TABLE_FLAG)
            .ok_or(FwdlError::NoPendingTable(firmware_type))
    }

    fn context(&self) -> FwdlContext<'_, S, D> {
        FwdlContext::new(&self.session, &self.device, &*self.observer).with_abort(&self.abort)
    }
}
