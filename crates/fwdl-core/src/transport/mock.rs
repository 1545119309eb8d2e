//! Mock protocol session for testing and dry runs.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use super::traits::{ProcedureReply, ProtocolSession, TransportError};
use crate::protocol::{Procedure, TransportStatus};

/// Captured offset-write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub table_id: u16,
    pub offset: u32,
    pub data: Vec<u8>,
}

/// Scripted failure for a single offset-write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFault {
    /// The device answers with this status.
    Status(TransportStatus),
    /// The link drops; the call returns a [`TransportError`].
    LinkDown,
}

/// In-memory device session.
///
/// Clones share state, so a test can hand one clone to the driver and
/// inspect the other afterwards.
#[derive(Clone, Default)]
pub struct MockSession {
    /// Queued replies for procedure calls; empty queue means "completed".
    procedure_replies: Arc<Mutex<VecDeque<ProcedureReply>>>,
    /// Captured procedure calls.
    procedure_log: Arc<Mutex<Vec<(Procedure, Vec<u8>)>>>,
    /// Captured writes.
    write_log: Arc<Mutex<Vec<WriteRecord>>>,
    /// One-shot write faults keyed by byte offset.
    write_faults: Arc<Mutex<HashMap<u32, WriteFault>>>,
    /// Table contents as written.
    tables: Arc<Mutex<HashMap<u16, Vec<u8>>>>,
    disconnected: Arc<Mutex<bool>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next procedure call.
    pub fn queue_reply(&self, reply: ProcedureReply) {
        self.procedure_replies.lock().unwrap().push_back(reply);
    }

    /// Make the next write at `offset` fail once.
    pub fn fail_write_at(&self, offset: u32, fault: WriteFault) {
        self.write_faults.lock().unwrap().insert(offset, fault);
    }

    /// Get all captured writes.
    pub fn get_writes(&self) -> Vec<WriteRecord> {
        self.write_log.lock().unwrap().clone()
    }

    /// Get all captured procedure calls.
    pub fn get_procedures(&self) -> Vec<(Procedure, Vec<u8>)> {
        self.procedure_log.lock().unwrap().clone()
    }

    /// Clear captured writes and procedure calls.
    pub fn clear_logs(&self) {
        self.write_log.lock().unwrap().clear();
        self.procedure_log.lock().unwrap().clear();
    }

    /// Simulate device disconnect.
    pub fn disconnect(&self) {
        *self.disconnected.lock().unwrap() = true;
    }

    /// Simulate device reconnect.
    pub fn reconnect(&self) {
        *self.disconnected.lock().unwrap() = false;
    }

    fn check_link(&self) -> Result<(), TransportError> {
        if *self.disconnected.lock().unwrap() {
            return Err(TransportError::Disconnected);
        }
        Ok(())
    }
}

impl ProtocolSession for MockSession {
    fn offset_write(
        &self,
        table_id: u16,
        offset: u32,
        data: &[u8],
    ) -> Result<TransportStatus, TransportError> {
        self.check_link()?;
        self.write_log.lock().unwrap().push(WriteRecord {
            table_id,
            offset,
            data: data.to_vec(),
        });

        match self.write_faults.lock().unwrap().remove(&offset) {
            Some(WriteFault::Status(status)) => return Ok(status),
            Some(WriteFault::LinkDown) => {
                return Err(TransportError::LinkFailed(format!(
                    "no response to write at offset {}",
                    offset
                )));
            }
            None => {}
        }

        let mut tables = self.tables.lock().unwrap();
        let table = tables.entry(table_id).or_default();
        let start = offset as usize;
        if table.len() < start + data.len() {
            table.resize(start + data.len(), 0);
        }
        table[start..start + data.len()].copy_from_slice(data);
        Ok(TransportStatus::Ok)
    }

    fn offset_read(
        &self,
        table_id: u16,
        offset: u32,
        len: usize,
    ) -> Result<(TransportStatus, Vec<u8>), TransportError> {
        self.check_link()?;
        let tables = self.tables.lock().unwrap();
        let Some(table) = tables.get(&table_id) else {
            return Ok((TransportStatus::Unsupported, Vec::new()));
        };
        let start = (offset as usize).min(table.len());
        let end = (start + len).min(table.len());
        Ok((TransportStatus::Ok, table[start..end].to_vec()))
    }

    fn execute_procedure(
        &self,
        procedure: Procedure,
        params: &[u8],
    ) -> Result<ProcedureReply, TransportError> {
        self.check_link()?;
        self.procedure_log
            .lock()
            .unwrap()
            .push((procedure, params.to_vec()));
        Ok(self
            .procedure_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(ProcedureReply::completed))
    }
}
