//! Download outcomes and the translation of device status codes into them.
//!
//! Raw transport and procedure codes never cross the public API; every call
//! site funnels them through [`from_transport`] or [`from_procedure`].

use std::fmt;

use crate::protocol::{ProcedureResult, TransportStatus};
use crate::protocol::constants::*;

/// Result of a firmware download operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    Success,
    SecurityError,
    UnsupportedOperation,
    WriteError,
    InvalidConfig,
    DeviceBusy,
    ImageTooBig,
    HardwareRevisionOutOfRange,
    HardwareVersionOutOfRange,
    FirmwareTypeInvalid,
    RadioFirmwareTypeInvalid,
    SameVersionRejection,
    /// Value before any attempt has produced a result.
    #[default]
    UnknownDriverError,
    FileError,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "Success"),
            Outcome::SecurityError => write!(f, "Security error"),
            Outcome::UnsupportedOperation => write!(f, "Unsupported operation"),
            Outcome::WriteError => write!(f, "Write error"),
            Outcome::InvalidConfig => write!(f, "Invalid configuration"),
            Outcome::DeviceBusy => write!(f, "Device busy"),
            Outcome::ImageTooBig => write!(f, "Image too big"),
            Outcome::HardwareRevisionOutOfRange => write!(f, "Hardware revision out of range"),
            Outcome::HardwareVersionOutOfRange => write!(f, "Hardware version out of range"),
            Outcome::FirmwareTypeInvalid => write!(f, "Firmware type invalid"),
            Outcome::RadioFirmwareTypeInvalid => write!(f, "Radio firmware type invalid"),
            Outcome::SameVersionRejection => {
                write!(f, "Device already runs this firmware version")
            }
            Outcome::UnknownDriverError => write!(f, "Unknown driver error"),
            Outcome::FileError => write!(f, "Firmware file error"),
        }
    }
}

/// Map a transport status onto an outcome.
pub fn from_transport(status: TransportStatus) -> Outcome {
    match status {
        TransportStatus::Ok => Outcome::Success,
        TransportStatus::SecurityViolation => Outcome::SecurityError,
        TransportStatus::Unsupported => Outcome::UnsupportedOperation,
        TransportStatus::Busy
        | TransportStatus::DeviceNotReady
        | TransportStatus::Timeout
        | TransportStatus::Other(_) => Outcome::WriteError,
    }
}

/// Map a procedure result onto an outcome.
pub fn from_procedure(result: ProcedureResult) -> Outcome {
    match result {
        ProcedureResult::Completed => Outcome::Success,
        ProcedureResult::InvalidParameter => Outcome::InvalidConfig,
        ProcedureResult::UnrecognizedProcedure => Outcome::UnsupportedOperation,
        ProcedureResult::TimingConstraintViolation => Outcome::DeviceBusy,
        ProcedureResult::NotAuthorized => Outcome::SecurityError,
        ProcedureResult::NotCompleted
        | ProcedureResult::ConflictWithSetup
        | ProcedureResult::Other(_) => Outcome::WriteError,
    }
}

/// Map the reason byte the device returns when it rejects the initiation
/// parameters.
pub fn from_init_rejection(reason: Option<u8>) -> Outcome {
    match reason {
        Some(INIT_REASON_IMAGE_TOO_BIG) => Outcome::ImageTooBig,
        Some(INIT_REASON_HW_REVISION_OUT_OF_RANGE) => Outcome::HardwareRevisionOutOfRange,
        Some(INIT_REASON_HW_VERSION_OUT_OF_RANGE) => Outcome::HardwareVersionOutOfRange,
        Some(INIT_REASON_FW_TYPE_INVALID) => Outcome::FirmwareTypeInvalid,
        Some(INIT_REASON_RADIO_FW_TYPE_INVALID) => Outcome::RadioFirmwareTypeInvalid,
        _ => Outcome::InvalidConfig,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_mapping() {
        assert_eq!(from_transport(TransportStatus::Ok), Outcome::Success);
        assert_eq!(
            from_transport(TransportStatus::SecurityViolation),
            Outcome::SecurityError
        );
        assert_eq!(
            from_transport(TransportStatus::Unsupported),
            Outcome::UnsupportedOperation
        );
        assert_eq!(from_transport(TransportStatus::Busy), Outcome::WriteError);
        assert_eq!(from_transport(TransportStatus::Timeout), Outcome::WriteError);
        assert_eq!(
            from_transport(TransportStatus::Other(PSEM_ONP)),
            Outcome::WriteError
        );
    }

    #[test]
    fn test_procedure_mapping() {
        assert_eq!(from_procedure(ProcedureResult::Completed), Outcome::Success);
        assert_eq!(
            from_procedure(ProcedureResult::InvalidParameter),
            Outcome::InvalidConfig
        );
        assert_eq!(
            from_procedure(ProcedureResult::UnrecognizedProcedure),
            Outcome::UnsupportedOperation
        );
        assert_eq!(
            from_procedure(ProcedureResult::TimingConstraintViolation),
            Outcome::DeviceBusy
        );
        assert_eq!(
            from_procedure(ProcedureResult::NotAuthorized),
            Outcome::SecurityError
        );
        assert_eq!(
            from_procedure(ProcedureResult::NotCompleted),
            Outcome::WriteError
        );
    }

    #[test]
    fn test_init_rejection_reasons() {
        assert_eq!(from_init_rejection(Some(1)), Outcome::ImageTooBig);
        assert_eq!(
            from_init_rejection(Some(2)),
            Outcome::HardwareRevisionOutOfRange
        );
        assert_eq!(
            from_init_rejection(Some(3)),
            Outcome::HardwareVersionOutOfRange
        );
        assert_eq!(from_init_rejection(Some(10)), Outcome::FirmwareTypeInvalid);
        assert_eq!(
            from_init_rejection(Some(11)),
            Outcome::RadioFirmwareTypeInvalid
        );
        assert_eq!(from_init_rejection(Some(99)), Outcome::InvalidConfig);
        assert_eq!(from_init_rejection(None), Outcome::InvalidConfig);
    }

    #[test]
    fn test_default_is_unknown() {
        assert_eq!(Outcome::default(), Outcome::UnknownDriverError);
    }
}
