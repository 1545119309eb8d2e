//! FWDL-Core: meter firmware download over ANSI C12.18/C12.19 tables.
//!
//! This crate drives the block-transfer download of a firmware image into a
//! meter's pending table, with resume after a failed block and activation
//! of the staged image.
//!
//! # Architecture
//!
//! The crate is organized into layers:
//!
//! - **Protocol**: Procedure ids, table numbers, PSEM and procedure result codes
//! - **Image**: Firmware file parsing and block planning
//! - **Device**: Per-family metadata (block size, pending tables, installed firmware)
//! - **Transport**: Table/procedure session abstraction (mock included)
//! - **FWDL**: Initiate, block transfer and activate steps
//! - **Events**: Observer pattern for UI decoupling
//! - **Session**: Public download operations
//!
//! # Example
//!
//! ```no_run
//! use fwdl_core::device::StandardMeter;
//! use fwdl_core::session::FwdlSession;
//! use fwdl_core::transport::MockSession;
//!
//! let session = FwdlSession::new(MockSession::new(), StandardMeter::new(vec![]));
//! let report = session.download_and_activate("register.bin").expect("download failed");
//! println!("{} ({} of {} blocks)", report.outcome, report.resume_block, report.total_blocks);
//! ```

pub mod device;
pub mod error;
pub mod events;
pub mod fwdl;
pub mod image;
pub mod outcome;
pub mod protocol;
pub mod session;
pub mod state;
pub mod transport;

// Re-exports for convenience
pub use device::{DeviceMetadata, DeviceProfile, PendingEvent};
pub use error::FwdlError;
pub use events::{FwdlEvent, FwdlObserver, LogLevel, TracingObserver};
pub use fwdl::FailurePoint;
pub use image::{BlockPlan, FirmwareImage, FirmwareType, FirmwareVersion, ImageError};
pub use outcome::Outcome;
pub use session::{DownloadReport, FwdlSession, SessionConfig};
pub use state::{DownloadPhase, TransferCursor};
pub use transport::{MockSession, ProtocolSession, TransportError};
