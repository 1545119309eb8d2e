//! Transport status and procedure result codes.
//!
//! The transport reports a coarse PSEM response per request; procedures
//! additionally report an ANSI C12.19 result code once they have run.

use std::fmt;

use super::constants::*;

/// Coarse status of one transport request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStatus {
    Ok,
    Busy,
    DeviceNotReady,
    SecurityViolation,
    Unsupported,
    /// No response within the transport's timeout.
    Timeout,
    /// Any other PSEM error response (raw code kept for diagnostics).
    Other(u8),
}

impl TransportStatus {
    /// Decode a PSEM response code.
    pub fn from_code(code: u8) -> Self {
        match code {
            PSEM_OK => TransportStatus::Ok,
            PSEM_SNS => TransportStatus::Unsupported,
            PSEM_ISC => TransportStatus::SecurityViolation,
            PSEM_BSY => TransportStatus::Busy,
            PSEM_DNR => TransportStatus::DeviceNotReady,
            other => TransportStatus::Other(other),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, TransportStatus::Ok)
    }
}

impl fmt::Display for TransportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportStatus::Ok => write!(f, "OK"),
            TransportStatus::Busy => write!(f, "Busy"),
            TransportStatus::DeviceNotReady => write!(f, "Device Not Ready"),
            TransportStatus::SecurityViolation => write!(f, "Security Violation"),
            TransportStatus::Unsupported => write!(f, "Service Not Supported"),
            TransportStatus::Timeout => write!(f, "Timeout"),
            TransportStatus::Other(code) => write!(f, "Error 0x{:02X}", code),
        }
    }
}

/// Result code reported by the device after executing a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureResult {
    Completed,
    NotCompleted,
    InvalidParameter,
    ConflictWithSetup,
    TimingConstraintViolation,
    NotAuthorized,
    UnrecognizedProcedure,
    Other(u8),
}

impl ProcedureResult {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => ProcedureResult::Completed,
            1 => ProcedureResult::NotCompleted,
            2 => ProcedureResult::InvalidParameter,
            3 => ProcedureResult::ConflictWithSetup,
            4 => ProcedureResult::TimingConstraintViolation,
            5 => ProcedureResult::NotAuthorized,
            6 => ProcedureResult::UnrecognizedProcedure,
            other => ProcedureResult::Other(other),
        }
    }
}

impl fmt::Display for ProcedureResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcedureResult::Completed => write!(f, "Completed"),
            ProcedureResult::NotCompleted => write!(f, "Not Completed"),
            ProcedureResult::InvalidParameter => write!(f, "Invalid Parameter"),
            ProcedureResult::ConflictWithSetup => write!(f, "Conflict With Setup"),
            ProcedureResult::TimingConstraintViolation => write!(f, "Timing Constraint"),
            ProcedureResult::NotAuthorized => write!(f, "Not Authorized"),
            ProcedureResult::UnrecognizedProcedure => write!(f, "Unrecognized Procedure"),
            ProcedureResult::Other(code) => write!(f, "Result {}", code),
        }
    }
}

/// Device procedures used by the FWDL driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    InitiateFirmwareLoaderSetup,
    ActivatePendingTable,
}

impl Procedure {
    /// Procedure number on the wire.
    pub fn id(&self) -> u16 {
        match self {
            Procedure::InitiateFirmwareLoaderSetup => PROC_INITIATE_FW_LOADER_SETUP,
            Procedure::ActivatePendingTable => PROC_ACTIVATE_PENDING_TABLE,
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Procedure::InitiateFirmwareLoaderSetup => write!(f, "Initiate FW Loader Setup"),
            Procedure::ActivatePendingTable => write!(f, "Activate Pending Table"),
        }
    }
}
