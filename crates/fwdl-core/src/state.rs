//! Download state machine and resumable transfer cursor.

use std::fmt;

/// Phase of one download attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadPhase {
    #[default]
    NotStarted,
    /// Entering firmware download mode on the device.
    Initiating,
    /// Writing blocks to the pending table.
    Transferring,
    /// Activating the pending table.
    Activating,
    Done,
    /// A block write failed; the attempt can be resumed from the cursor.
    FailedResumable,
    /// The attempt cannot be resumed.
    FailedFatal,
}

impl fmt::Display for DownloadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadPhase::NotStarted => write!(f, "Not Started"),
            DownloadPhase::Initiating => write!(f, "Initiating"),
            DownloadPhase::Transferring => write!(f, "Transferring"),
            DownloadPhase::Activating => write!(f, "Activating"),
            DownloadPhase::Done => write!(f, "Done"),
            DownloadPhase::FailedResumable => write!(f, "Failed (resumable)"),
            DownloadPhase::FailedFatal => write!(f, "Failed"),
        }
    }
}

impl DownloadPhase {
    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(&self, next: DownloadPhase) -> bool {
        use DownloadPhase::*;
        matches!(
            (self, next),
            (NotStarted, Initiating)
                | (NotStarted, Transferring)
                | (Initiating, Transferring)
                | (Transferring, Activating)
                | (Transferring, Done)
                | (Activating, Done)
                | (Transferring, FailedResumable)
                | (FailedResumable, Transferring)
                | (Initiating, FailedFatal)
                | (Transferring, FailedFatal)
                | (Activating, FailedFatal)
        )
    }
}

/// Resumable position within a block transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferCursor {
    /// Next block to write (0-based).
    pub block_index: usize,
    /// Pending table id with [`crate::protocol::PENDING_TABLE_FLAG`] set.
    pub table_id: u16,
    /// Whether link failures are turned into a resumable outcome.
    pub retry_allowed: bool,
}

impl TransferCursor {
    pub fn new(table_id: u16, retry_allowed: bool) -> Self {
        Self {
            block_index: 0,
            table_id,
            retry_allowed,
        }
    }

    /// Cursor resuming after `committed` blocks.
    pub fn resume_at(table_id: u16, committed: usize, retry_allowed: bool) -> Self {
        Self {
            block_index: committed,
            table_id,
            retry_allowed,
        }
    }

    /// A fresh attempt starts by entering download mode.
    pub fn needs_initiation(&self) -> bool {
        self.block_index == 0
    }

    /// 1-based number of the next block, for display.
    pub fn block_number(&self) -> usize {
        self.block_index + 1
    }

    pub fn advance(&mut self) {
        self.block_index += 1;
    }
}
