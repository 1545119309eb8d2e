//! Initiate firmware loader setup: puts the device into download mode.

use tracing::{debug, info, warn};

use super::{FailurePoint, FwdlContext};
use crate::device::DeviceMetadata;
use crate::error::FwdlError;
use crate::events::{FwdlEvent, LogLevel};
use crate::image::FirmwareImage;
use crate::outcome::{self, Outcome};
use crate::protocol::constants::INIT_PARAMS_LEN;
use crate::protocol::{Procedure, ProcedureResult, TransportStatus};
use crate::transport::{ProcedureReply, ProtocolSession};

/// Build the initiation parameters.
///
/// Layout (23 bytes):
/// - [0..2]   CRC, LSB first
/// - [2..11]  header bytes 5..14, verbatim
/// - [11..15] image length (u32 LE)
/// - [15..19] chunk size (u32 LE)
/// - [19..23] device class, byte-reversed from the header
pub fn build_init_params(image: &FirmwareImage, block_size: u32) -> Vec<u8> {
    let mut params = Vec::with_capacity(INIT_PARAMS_LEN);
    params.extend_from_slice(&image.crc().to_le_bytes());
    params.extend_from_slice(image.init_block());
    params.extend_from_slice(&image.len_u32().to_le_bytes());
    params.extend_from_slice(&block_size.to_le_bytes());
    params.extend(image.device_class_bytes().iter().rev());
    params
}

/// Run the initiate-firmware-loader-setup procedure.
pub fn begin_download<S: ProtocolSession, D: DeviceMetadata + ?Sized>(
    ctx: &FwdlContext<'_, S, D>,
    image: &FirmwareImage,
    block_size: usize,
) -> Result<Outcome, FwdlError> {
    let chunk = u32::try_from(block_size).map_err(|_| FwdlError::InvalidBlockSize(block_size))?;
    let params = build_init_params(image, chunk);

    info!(
        firmware_type = %image.firmware_type(),
        version = %image.version(),
        len = image.len(),
        block_size,
        "Initiating firmware download"
    );
    debug!(params = ?params, "Initiation parameters");

    let procedure = Procedure::InitiateFirmwareLoaderSetup;
    let reply = ctx
        .session
        .execute_procedure(procedure, &params)
        .map_err(|source| FwdlError::Transport {
            at: FailurePoint::Initiate,
            source,
        })?;

    let outcome = match reply {
        ProcedureReply::Executed {
            result: ProcedureResult::InvalidParameter,
            data,
        } => {
            let reason = data.first().copied();
            warn!(reason = ?reason, "Device rejected initiation parameters");
            outcome::from_init_rejection(reason)
        }
        ProcedureReply::Executed { result, .. } => outcome::from_procedure(result),
        ProcedureReply::Refused(TransportStatus::SecurityViolation)
            if is_installed_version(ctx, image) =>
        {
            info!(
                version = %image.version(),
                "Device refused download of the firmware it already runs"
            );
            Outcome::SameVersionRejection
        }
        ProcedureReply::Refused(status) => outcome::from_transport(status),
    };

    ctx.emit(FwdlEvent::Procedure { procedure, outcome });
    if !outcome.is_success() {
        ctx.log(LogLevel::Error, format!("{} failed: {}", procedure, outcome));
    }
    Ok(outcome)
}

fn is_installed_version<S: ProtocolSession, D: DeviceMetadata + ?Sized>(
    ctx: &FwdlContext<'_, S, D>,
    image: &FirmwareImage,
) -> bool {
    ctx.device.installed_version(image.firmware_type()) == Some(image.version())
}
