//! Activate pending table: switch the device over to the downloaded image.

use tracing::info;

use super::{FailurePoint, FwdlContext};
use crate::device::DeviceMetadata;
use crate::error::FwdlError;
use crate::events::{FwdlEvent, LogLevel};
use crate::image::{FirmwareImage, FirmwareType};
use crate::outcome::{self, Outcome};
use crate::protocol::Procedure;
use crate::protocol::constants::ACTIVATE_PARAMS_LEN;
use crate::transport::{ProcedureReply, ProtocolSession};

/// `[table id (u16 LE), firmware type, identity bytes 5..9 of the header]`
pub fn build_activate_params(
    table_id: u16,
    firmware_type: FirmwareType,
    image: &FirmwareImage,
) -> Vec<u8> {
    let mut params = Vec::with_capacity(ACTIVATE_PARAMS_LEN);
    params.extend_from_slice(&table_id.to_le_bytes());
    params.push(firmware_type.tag());
    params.extend_from_slice(&image.activation_identity());
    params
}

/// Run the activate-pending-table procedure.
pub fn activate<S: ProtocolSession, D: DeviceMetadata + ?Sized>(
    ctx: &FwdlContext<'_, S, D>,
    table_id: u16,
    firmware_type: FirmwareType,
    image: &FirmwareImage,
) -> Result<Outcome, FwdlError> {
    let procedure = Procedure::ActivatePendingTable;
    let params = build_activate_params(table_id, firmware_type, image);

    info!(
        table_id = %format!("0x{:04X}", table_id),
        firmware_type = %firmware_type,
        "Activating pending table"
    );

    let reply = ctx
        .session
        .execute_procedure(procedure, &params)
        .map_err(|source| FwdlError::Transport {
            at: FailurePoint::Activate,
            source,
        })?;

    let outcome = match reply {
        ProcedureReply::Executed { result, .. } => outcome::from_procedure(result),
        ProcedureReply::Refused(status) => outcome::from_transport(status),
    };

    ctx.emit(FwdlEvent::Procedure { procedure, outcome });
    if !outcome.is_success() {
        ctx.log(LogLevel::Error, format!("{} failed: {}", procedure, outcome));
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullObserver;
    use crate::fwdl::tests::meter_with;
    use crate::image::FirmwareVersion;
    use crate::image::tests::build_image;
    use crate::protocol::{ProcedureResult, TransportStatus};
    use crate::transport::MockSession;

    fn image() -> FirmwareImage {
        FirmwareImage::from_bytes(build_image(2, FirmwareVersion::new(3, 4, 5), 100)).unwrap()
    }

    #[test]
    fn test_activate_params() {
        let params = build_activate_params(0x1847, FirmwareType::Han, &image());
        assert_eq!(params, vec![0x47, 0x18, 2, 3, 4, 5, 0x5A]);
    }

    #[test]
    fn test_activate_success() {
        let session = MockSession::new();
        let meter = meter_with(64, vec![]);
        let ctx = FwdlContext::new(&session, &meter, &NullObserver);

        let outcome = activate(&ctx, 0x1847, FirmwareType::Han, &image()).unwrap();
        assert_eq!(outcome, Outcome::Success);

        let procedures = session.get_procedures();
        assert_eq!(procedures.len(), 1);
        assert_eq!(procedures[0].0, Procedure::ActivatePendingTable);
    }

    #[test]
    fn test_activate_failures_are_translated() {
        let meter = meter_with(64, vec![]);

        let session = MockSession::new();
        session.queue_reply(ProcedureReply::Executed {
            result: ProcedureResult::NotAuthorized,
            data: vec![],
        });
        let ctx = FwdlContext::new(&session, &meter, &NullObserver);
        assert_eq!(
            activate(&ctx, 1, FirmwareType::Han, &image()).unwrap(),
            Outcome::SecurityError
        );

        let session = MockSession::new();
        session.queue_reply(ProcedureReply::Refused(TransportStatus::Unsupported));
        let ctx = FwdlContext::new(&session, &meter, &NullObserver);
        assert_eq!(
            activate(&ctx, 1, FirmwareType::Han, &image()).unwrap(),
            Outcome::UnsupportedOperation
        );
    }
}
