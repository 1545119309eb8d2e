//! Protocol session abstraction.
//!
//! Defines the `ProtocolSession` trait the FWDL driver talks through,
//! allowing different implementations (optical probe, network, mock).

use thiserror::Error;

use crate::protocol::{Procedure, ProcedureResult, TransportStatus};

/// Link-level failure. Unlike a [`TransportStatus`], these mean the request
/// never got a device response at all.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Device disconnected")]
    Disconnected,

    #[error("Link failure: {0}")]
    LinkFailed(String),
}

/// Reply to a procedure call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcedureReply {
    /// The device ran the procedure and reported a result plus response data.
    Executed {
        result: ProcedureResult,
        data: Vec<u8>,
    },
    /// The request was refused before the procedure ran.
    Refused(TransportStatus),
}

impl ProcedureReply {
    pub fn completed() -> Self {
        ProcedureReply::Executed {
            result: ProcedureResult::Completed,
            data: Vec::new(),
        }
    }
}

/// Request/response session to one device.
///
/// Every call blocks until the device answers or the implementation's
/// timeout expires; a timeout is reported as [`TransportStatus::Timeout`].
pub trait ProtocolSession: Send {
    /// Write `data` into `table_id` starting at byte `offset`.
    fn offset_write(
        &self,
        table_id: u16,
        offset: u32,
        data: &[u8],
    ) -> Result<TransportStatus, TransportError>;

    /// Read `len` bytes from `table_id` starting at byte `offset`.
    fn offset_read(
        &self,
        table_id: u16,
        offset: u32,
        len: usize,
    ) -> Result<(TransportStatus, Vec<u8>), TransportError>;

    /// Execute a device procedure.
    fn execute_procedure(
        &self,
        procedure: Procedure,
        params: &[u8],
    ) -> Result<ProcedureReply, TransportError>;
}

impl<T: ProtocolSession + Sync> ProtocolSession for &T {
    fn offset_write(
        &self,
        table_id: u16,
        offset: u32,
        data: &[u8],
    ) -> Result<TransportStatus, TransportError> {
        (**self).offset_write(table_id, offset, data)
    }

    fn offset_read(
        &self,
        table_id: u16,
        offset: u32,
        len: usize,
    ) -> Result<(TransportStatus, Vec<u8>), TransportError> {
        (**self).offset_read(table_id, offset, len)
    }

    fn execute_procedure(
        &self,
        procedure: Procedure,
        params: &[u8],
    ) -> Result<ProcedureReply, TransportError> {
        (**self).execute_procedure(procedure, params)
    }
}
