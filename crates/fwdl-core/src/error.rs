//! Fatal download errors.
//!
//! Anything the device can answer is an [`crate::Outcome`]; these are the
//! conditions that end an attempt without one.

use thiserror::Error;

use crate::fwdl::FailurePoint;
use crate::image::{FirmwareType, ImageError};
use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum FwdlError {
    #[error("Unsupported firmware file: {0}")]
    UnsupportedFirmware(#[source] ImageError),

    #[error("Device has no pending table for {0} firmware")]
    NoPendingTable(FirmwareType),

    #[error("Invalid FWDL block size: {0}")]
    InvalidBlockSize(usize),

    #[error("Resume point {block_index} is past the last block ({total_blocks})")]
    ResumePastEnd {
        block_index: usize,
        total_blocks: usize,
    },

    #[error("Transport failure during {at}: {source}")]
    Transport {
        at: FailurePoint,
        #[source]
        source: TransportError,
    },

    #[error("Download cancelled before block {}", .block_index + 1)]
    Cancelled { block_index: usize },
}
