//! Block transfer: writes the image into the pending table.
//!
//! Every block is sent as `pending header ++ payload` at byte offset
//! `index * block_size`. Writes are strictly sequential. On a failed write
//! the cursor stays on the failed block so a retry re-sends it.

use tracing::{debug, error, info, warn};

use super::{FailurePoint, FwdlContext, TransferResult, activate, begin_download};
use crate::device::{DeviceMetadata, PendingEvent};
use crate::error::FwdlError;
use crate::events::{FwdlEvent, LogLevel, ProgressGuard};
use crate::image::{BlockPlan, FirmwareImage};
use crate::outcome::{self, Outcome};
use crate::state::{DownloadPhase, TransferCursor};
use crate::transport::ProtocolSession;

/// How a run of block writes ended.
enum BlockRun {
    Completed,
    Failed { index: usize, outcome: Outcome },
}

/// Blocks `cursor.block_index..end` plus what is needed to report progress.
struct BlockSpan<'a> {
    data: &'a [u8],
    plan: BlockPlan,
    header: &'a [u8],
    end: usize,
    /// Block index that reports as step 1.
    step_base: usize,
    step_total: usize,
}

/// Download `image`, resuming from `cursor`.
///
/// A cursor at block 0 first puts the device into download mode; a later
/// cursor assumes the device is still in download mode with the earlier
/// blocks committed. When every block is written and `activate` is set the
/// pending table is activated.
pub fn transfer<S: ProtocolSession, D: DeviceMetadata + ?Sized>(
    ctx: &mut FwdlContext<'_, S, D>,
    image: &FirmwareImage,
    block_size: usize,
    event: &PendingEvent,
    mut cursor: TransferCursor,
    activate_table: bool,
) -> Result<TransferResult, FwdlError> {
    let plan =
        BlockPlan::new(image.len(), block_size).ok_or(FwdlError::InvalidBlockSize(block_size))?;
    let total_blocks = plan.total_blocks();
    if cursor.block_index > total_blocks {
        return Err(FwdlError::ResumePastEnd {
            block_index: cursor.block_index,
            total_blocks,
        });
    }

    let observer = ctx.observer;
    let _progress = ProgressGuard::show(observer, total_blocks + 1);

    let result = |outcome, cursor, failure| TransferResult {
        outcome,
        cursor,
        total_blocks,
        failure,
    };

    if cursor.needs_initiation() {
        ctx.goto(DownloadPhase::Initiating);
        let outcome = match begin_download(ctx, image, block_size) {
            Ok(outcome) => outcome,
            Err(e) => {
                ctx.goto(DownloadPhase::FailedFatal);
                return Err(e);
            }
        };
        if !outcome.is_success() {
            ctx.goto(DownloadPhase::FailedFatal);
            ctx.emit(FwdlEvent::Complete { outcome });
            return Ok(result(outcome, cursor, Some(FailurePoint::Initiate)));
        }
    } else {
        info!(
            block = cursor.block_number(),
            total = total_blocks,
            "Resuming firmware download"
        );
    }

    ctx.goto(DownloadPhase::Transferring);
    let header = ctx.device.pending_table_header(event);
    let span = BlockSpan {
        data: image.raw_data(),
        plan,
        header: &header,
        end: total_blocks,
        step_base: 0,
        step_total: total_blocks + 1,
    };

    match write_blocks(ctx, &span, &mut cursor) {
        Ok(BlockRun::Completed) => {}
        Ok(BlockRun::Failed { index, outcome }) => {
            ctx.goto(DownloadPhase::FailedResumable);
            ctx.emit(FwdlEvent::Complete { outcome });
            return Ok(result(outcome, cursor, Some(FailurePoint::Block { index })));
        }
        Err(e) => {
            ctx.goto(DownloadPhase::FailedFatal);
            return Err(e);
        }
    }

    info!(blocks = total_blocks, "All blocks written");

    if activate_table {
        ctx.goto(DownloadPhase::Activating);
        let outcome = match activate(ctx, cursor.table_id, image.firmware_type(), image) {
            Ok(outcome) => outcome,
            Err(e) => {
                ctx.goto(DownloadPhase::FailedFatal);
                return Err(e);
            }
        };
        if !outcome.is_success() {
            ctx.goto(DownloadPhase::FailedFatal);
            ctx.emit(FwdlEvent::Complete { outcome });
            return Ok(result(outcome, cursor, Some(FailurePoint::Activate)));
        }
    }

    // Final step past the blocks: activation, or staging when not activating.
    ctx.emit(FwdlEvent::Step {
        current: total_blocks + 1,
        total: total_blocks + 1,
    });
    ctx.goto(DownloadPhase::Done);
    ctx.emit(FwdlEvent::Complete {
        outcome: Outcome::Success,
    });
    Ok(result(Outcome::Success, cursor, None))
}

/// Push blocks `start_block..=end_block` (1-based, clamped to the image)
/// without initiating or activating.
#[allow(clippy::too_many_arguments)]
pub fn transfer_range<S: ProtocolSession, D: DeviceMetadata + ?Sized>(
    ctx: &mut FwdlContext<'_, S, D>,
    image: &FirmwareImage,
    block_size: usize,
    event: &PendingEvent,
    table_id: u16,
    start_block: usize,
    end_block: usize,
    retry_allowed: bool,
) -> Result<TransferResult, FwdlError> {
    let plan =
        BlockPlan::new(image.len(), block_size).ok_or(FwdlError::InvalidBlockSize(block_size))?;
    let total_blocks = plan.total_blocks();

    let Some((start, end)) = plan.clamp_range(start_block, end_block) else {
        warn!(start_block, end_block, total_blocks, "Empty block range");
        ctx.log(
            LogLevel::Warn,
            format!(
                "Block range {}..={} selects nothing in a {}-block image",
                start_block, end_block, total_blocks
            ),
        );
        return Ok(TransferResult {
            outcome: Outcome::InvalidConfig,
            cursor: TransferCursor::new(table_id, retry_allowed),
            total_blocks,
            failure: Some(FailurePoint::Range),
        });
    };

    let mut cursor = TransferCursor::resume_at(table_id, start, retry_allowed);
    let count = end - start;
    let observer = ctx.observer;
    let _progress = ProgressGuard::show(observer, count);

    ctx.goto(DownloadPhase::Transferring);
    let header = ctx.device.pending_table_header(event);
    let span = BlockSpan {
        data: image.raw_data(),
        plan,
        header: &header,
        end,
        step_base: start,
        step_total: count,
    };

    let (outcome, failure) = match write_blocks(ctx, &span, &mut cursor) {
        Ok(BlockRun::Completed) => {
            ctx.goto(DownloadPhase::Done);
            (Outcome::Success, None)
        }
        Ok(BlockRun::Failed { index, outcome }) => {
            ctx.goto(DownloadPhase::FailedResumable);
            (outcome, Some(FailurePoint::Block { index }))
        }
        Err(e) => {
            ctx.goto(DownloadPhase::FailedFatal);
            return Err(e);
        }
    };

    ctx.emit(FwdlEvent::Complete { outcome });
    Ok(TransferResult {
        outcome,
        cursor,
        total_blocks,
        failure,
    })
}

fn write_blocks<S: ProtocolSession, D: DeviceMetadata + ?Sized>(
    ctx: &FwdlContext<'_, S, D>,
    span: &BlockSpan<'_>,
    cursor: &mut TransferCursor,
) -> Result<BlockRun, FwdlError> {
    let mut wire = Vec::with_capacity(span.header.len() + span.plan.block_size());

    while cursor.block_index < span.end {
        let index = cursor.block_index;
        if ctx.abort_requested() {
            warn!(block = index + 1, "Download cancelled");
            ctx.log(
                LogLevel::Warn,
                format!("Download cancelled before block {}", index + 1),
            );
            return Err(FwdlError::Cancelled { block_index: index });
        }

        let payload = span.plan.block(span.data, index);
        wire.clear();
        wire.extend_from_slice(span.header);
        wire.extend_from_slice(payload);

        // Image length fits in u32, so every offset inside it does too.
        let offset = span.plan.block_offset(index) as u32;
        let written = ctx.session.offset_write(cursor.table_id, offset, &wire);

        ctx.emit(FwdlEvent::Step {
            current: index + 1 - span.step_base,
            total: span.step_total,
        });

        match written {
            Ok(status) => {
                ctx.emit(FwdlEvent::BlockWritten {
                    index,
                    offset,
                    len: payload.len(),
                    status,
                });
                if !status.is_ok() {
                    warn!(block = index + 1, status = %status, "Block write failed");
                    ctx.log(
                        LogLevel::Warn,
                        format!("Block {} write failed: {}", index + 1, status),
                    );
                    return Ok(BlockRun::Failed {
                        index,
                        outcome: outcome::from_transport(status),
                    });
                }
                debug!(block = index + 1, offset, len = payload.len(), "Block written");
                cursor.advance();
            }
            Err(source) if cursor.retry_allowed => {
                warn!(block = index + 1, error = %source, "Block write failed, resumable");
                ctx.log(
                    LogLevel::Warn,
                    format!("Block {} write failed: {}", index + 1, source),
                );
                return Ok(BlockRun::Failed {
                    index,
                    outcome: Outcome::WriteError,
                });
            }
            Err(source) => {
                error!(block = index + 1, error = %source, "Block write failed");
                ctx.log(
                    LogLevel::Error,
                    format!("Block {} write failed: {}", index + 1, source),
                );
                return Err(FwdlError::Transport {
                    at: FailurePoint::Block { index },
                    source,
                });
            }
        }
    }

    Ok(BlockRun::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{InstalledFirmware, PENDING_HEADER_LEN};
    use crate::events::tests::RecordingObserver;
    use crate::fwdl::tests::meter_with;
    use crate::image::tests::build_image;
    use crate::image::{FirmwareType, FirmwareVersion};
    use crate::protocol::constants::PENDING_TABLE_FLAG;
    use crate::protocol::{Procedure, ProcedureResult, TransportStatus};
    use crate::transport::{MockSession, ProcedureReply, TransportError, WriteFault};

    const TABLE: u16 = 2110 | PENDING_TABLE_FLAG;

    fn image(len: usize) -> FirmwareImage {
        FirmwareImage::from_bytes(build_image(1, FirmwareVersion::new(2, 0, 7), len)).unwrap()
    }

    fn payload_sizes(session: &MockSession) -> Vec<usize> {
        session
            .get_writes()
            .iter()
            .map(|w| w.data.len() - PENDING_HEADER_LEN)
            .collect()
    }

    fn steps(observer: &RecordingObserver) -> Vec<(usize, usize)> {
        observer
            .events()
            .iter()
            .filter_map(|e| match e {
                FwdlEvent::Step { current, total } => Some((*current, *total)),
                _ => None,
            })
            .collect()
    }

    fn shows_and_hides(observer: &RecordingObserver) -> (usize, usize) {
        (
            observer.count(|e| matches!(e, FwdlEvent::ShowProgress { .. })),
            observer.count(|e| matches!(e, FwdlEvent::HideProgress)),
        )
    }

    #[test]
    fn test_full_transfer_with_remainder() {
        let session = MockSession::new();
        let meter = meter_with(400, vec![]);
        let observer = RecordingObserver::default();
        let mut ctx = FwdlContext::new(&session, &meter, &observer);

        let result = transfer(
            &mut ctx,
            &image(1000),
            400,
            &PendingEvent::immediate(),
            TransferCursor::new(TABLE, false),
            true,
        )
        .unwrap();

        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(result.cursor.block_index, 3);
        assert_eq!(result.total_blocks, 3);
        assert_eq!(payload_sizes(&session), vec![400, 400, 200]);

        let offsets: Vec<_> = session.get_writes().iter().map(|w| w.offset).collect();
        assert_eq!(offsets, vec![0, 400, 800]);
        assert!(session.get_writes().iter().all(|w| w.table_id == TABLE));

        let procedures: Vec<_> = session.get_procedures().iter().map(|p| p.0).collect();
        assert_eq!(
            procedures,
            vec![
                Procedure::InitiateFirmwareLoaderSetup,
                Procedure::ActivatePendingTable
            ]
        );
        assert_eq!(ctx.phase(), DownloadPhase::Done);
        assert_eq!(observer.events()[0], FwdlEvent::ShowProgress { total: 4 });
        assert_eq!(steps(&observer), vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
        assert_eq!(shows_and_hides(&observer), (1, 1));
    }

    #[test]
    fn test_even_split_has_no_empty_block() {
        let session = MockSession::new();
        let meter = meter_with(400, vec![]);
        let observer = RecordingObserver::default();
        let mut ctx = FwdlContext::new(&session, &meter, &observer);

        transfer(
            &mut ctx,
            &image(800),
            400,
            &PendingEvent::immediate(),
            TransferCursor::new(TABLE, false),
            false,
        )
        .unwrap();

        assert_eq!(payload_sizes(&session), vec![400, 400]);
        // Progress still reaches the total without activation
        assert_eq!(steps(&observer).last(), Some(&(3, 3)));
    }

    #[test]
    fn test_written_bytes_reassemble_image() {
        let session = MockSession::new();
        let meter = meter_with(64, vec![]);
        let observer = RecordingObserver::default();
        let mut ctx = FwdlContext::new(&session, &meter, &observer);
        let image = image(1000);

        transfer(
            &mut ctx,
            &image,
            64,
            &PendingEvent::immediate(),
            TransferCursor::new(TABLE, false),
            false,
        )
        .unwrap();

        let header = PendingEvent::immediate().encode();
        let mut rebuilt = Vec::new();
        for write in session.get_writes() {
            assert_eq!(&write.data[..PENDING_HEADER_LEN], header.as_slice());
            rebuilt.extend_from_slice(&write.data[PENDING_HEADER_LEN..]);
        }
        assert_eq!(rebuilt, image.raw_data());
    }

    #[test]
    fn test_status_failure_keeps_cursor_on_failed_block() {
        let session = MockSession::new();
        session.fail_write_at(800, WriteFault::Status(TransportStatus::Busy));
        let meter = meter_with(400, vec![]);
        let observer = RecordingObserver::default();
        let mut ctx = FwdlContext::new(&session, &meter, &observer);

        let result = transfer(
            &mut ctx,
            &image(1500),
            400,
            &PendingEvent::immediate(),
            TransferCursor::new(TABLE, false),
            true,
        )
        .unwrap();

        assert_eq!(result.outcome, Outcome::WriteError);
        assert_eq!(result.cursor.block_index, 2);
        assert_eq!(result.failure, Some(FailurePoint::Block { index: 2 }));
        assert_eq!(ctx.phase(), DownloadPhase::FailedResumable);
        // No activation after a failed block
        assert_eq!(session.get_procedures().len(), 1);
        // A step is reported for the failed write too
        assert_eq!(observer.count(|e| matches!(e, FwdlEvent::Step { .. })), 3);
        assert_eq!(shows_and_hides(&observer), (1, 1));
    }

    #[test]
    fn test_security_violation_on_block() {
        let session = MockSession::new();
        session.fail_write_at(0, WriteFault::Status(TransportStatus::SecurityViolation));
        let meter = meter_with(400, vec![]);
        let observer = RecordingObserver::default();
        let mut ctx = FwdlContext::new(&session, &meter, &observer);

        let result = transfer(
            &mut ctx,
            &image(1000),
            400,
            &PendingEvent::immediate(),
            TransferCursor::new(TABLE, false),
            true,
        )
        .unwrap();

        assert_eq!(result.outcome, Outcome::SecurityError);
        assert_eq!(result.cursor.block_index, 0);
    }

    #[test]
    fn test_resume_skips_initiation_and_committed_blocks() {
        let session = MockSession::new();
        let meter = meter_with(100, vec![]);
        let observer = RecordingObserver::default();
        let mut ctx = FwdlContext::new(&session, &meter, &observer);

        let result = transfer(
            &mut ctx,
            &image(1000),
            100,
            &PendingEvent::immediate(),
            TransferCursor::resume_at(TABLE, 7, false),
            true,
        )
        .unwrap();

        assert_eq!(result.outcome, Outcome::Success);
        let offsets: Vec<_> = session.get_writes().iter().map(|w| w.offset).collect();
        assert_eq!(offsets, vec![700, 800, 900]);
        let procedures: Vec<_> = session.get_procedures().iter().map(|p| p.0).collect();
        assert_eq!(procedures, vec![Procedure::ActivatePendingTable]);
    }

    #[test]
    fn test_retry_after_failure_resends_failed_block() {
        let session = MockSession::new();
        session.fail_write_at(300, WriteFault::LinkDown);
        let meter = meter_with(100, vec![]);
        let observer = RecordingObserver::default();
        let image = image(550);

        let first = {
            let mut ctx = FwdlContext::new(&session, &meter, &observer);
            transfer(
                &mut ctx,
                &image,
                100,
                &PendingEvent::immediate(),
                TransferCursor::new(TABLE, true),
                true,
            )
            .unwrap()
        };
        assert_eq!(first.outcome, Outcome::WriteError);
        assert_eq!(first.cursor.block_index, 3);

        session.clear_logs();
        let second = {
            let mut ctx = FwdlContext::new(&session, &meter, &observer);
            transfer(
                &mut ctx,
                &image,
                100,
                &PendingEvent::immediate(),
                first.cursor,
                true,
            )
            .unwrap()
        };
        assert_eq!(second.outcome, Outcome::Success);
        let offsets: Vec<_> = session.get_writes().iter().map(|w| w.offset).collect();
        assert_eq!(offsets, vec![300, 400, 500]);
        assert_eq!(shows_and_hides(&observer), (2, 2));
    }

    #[test]
    fn test_link_failure_without_retry_is_fatal() {
        let session = MockSession::new();
        session.fail_write_at(100, WriteFault::LinkDown);
        let meter = meter_with(100, vec![]);
        let observer = RecordingObserver::default();
        let mut ctx = FwdlContext::new(&session, &meter, &observer);

        let err = transfer(
            &mut ctx,
            &image(550),
            100,
            &PendingEvent::immediate(),
            TransferCursor::new(TABLE, false),
            true,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            FwdlError::Transport {
                at: FailurePoint::Block { index: 1 },
                source: TransportError::LinkFailed(_)
            }
        ));
        assert_eq!(ctx.phase(), DownloadPhase::FailedFatal);
        assert_eq!(shows_and_hides(&observer), (1, 1));

        // The diagnostic log line comes before the progress is hidden
        let events = observer.events();
        let log_pos = events
            .iter()
            .position(|e| matches!(e, FwdlEvent::Log { level: LogLevel::Error, .. }))
            .unwrap();
        let hide_pos = events
            .iter()
            .position(|e| *e == FwdlEvent::HideProgress)
            .unwrap();
        assert!(log_pos < hide_pos);
    }

    #[test]
    fn test_failed_initiation_touches_no_blocks() {
        let session = MockSession::new();
        session.queue_reply(ProcedureReply::Executed {
            result: ProcedureResult::InvalidParameter,
            data: vec![1],
        });
        let meter = meter_with(100, vec![]);
        let observer = RecordingObserver::default();
        let mut ctx = FwdlContext::new(&session, &meter, &observer);

        let result = transfer(
            &mut ctx,
            &image(550),
            100,
            &PendingEvent::immediate(),
            TransferCursor::new(TABLE, true),
            true,
        )
        .unwrap();

        assert_eq!(result.outcome, Outcome::ImageTooBig);
        assert_eq!(result.failure, Some(FailurePoint::Initiate));
        assert!(session.get_writes().is_empty());
        assert_eq!(shows_and_hides(&observer), (1, 1));
    }

    #[test]
    fn test_same_version_aborts_before_blocks() {
        let version = FirmwareVersion::new(2, 0, 7);
        let session = MockSession::new();
        session.queue_reply(ProcedureReply::Refused(TransportStatus::SecurityViolation));
        let meter = meter_with(
            100,
            vec![InstalledFirmware {
                firmware_type: FirmwareType::RfLan,
                version,
            }],
        );
        let observer = RecordingObserver::default();
        let mut ctx = FwdlContext::new(&session, &meter, &observer);

        let result = transfer(
            &mut ctx,
            &image(550),
            100,
            &PendingEvent::immediate(),
            TransferCursor::new(TABLE, false),
            true,
        )
        .unwrap();

        assert_eq!(result.outcome, Outcome::SameVersionRejection);
        assert!(session.get_writes().is_empty());
    }

    #[test]
    fn test_activation_failure_after_full_transfer() {
        let session = MockSession::new();
        session.queue_reply(ProcedureReply::completed());
        session.queue_reply(ProcedureReply::Executed {
            result: ProcedureResult::TimingConstraintViolation,
            data: vec![],
        });
        let meter = meter_with(100, vec![]);
        let observer = RecordingObserver::default();
        let mut ctx = FwdlContext::new(&session, &meter, &observer);

        let result = transfer(
            &mut ctx,
            &image(550),
            100,
            &PendingEvent::immediate(),
            TransferCursor::new(TABLE, false),
            true,
        )
        .unwrap();

        assert_eq!(result.outcome, Outcome::DeviceBusy);
        assert_eq!(result.failure, Some(FailurePoint::Activate));
        assert_eq!(result.cursor.block_index, 6);
        assert_eq!(session.get_writes().len(), 6);
    }

    #[test]
    fn test_abort_flag_stops_between_blocks() {
        use std::sync::atomic::AtomicBool;

        let session = MockSession::new();
        let meter = meter_with(100, vec![]);
        let observer = RecordingObserver::default();
        let abort = AtomicBool::new(true);
        let mut ctx = FwdlContext::new(&session, &meter, &observer).with_abort(&abort);

        let err = transfer(
            &mut ctx,
            &image(550),
            100,
            &PendingEvent::immediate(),
            TransferCursor::resume_at(TABLE, 2, false),
            true,
        )
        .unwrap_err();

        assert!(matches!(err, FwdlError::Cancelled { block_index: 2 }));
        assert!(session.get_writes().is_empty());
        assert_eq!(shows_and_hides(&observer), (1, 1));
    }

    #[test]
    fn test_resume_past_end_is_rejected() {
        let session = MockSession::new();
        let meter = meter_with(100, vec![]);
        let observer = RecordingObserver::default();
        let mut ctx = FwdlContext::new(&session, &meter, &observer);

        let err = transfer(
            &mut ctx,
            &image(550),
            100,
            &PendingEvent::immediate(),
            TransferCursor::resume_at(TABLE, 7, false),
            true,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            FwdlError::ResumePastEnd {
                block_index: 7,
                total_blocks: 6
            }
        ));
    }

    #[test]
    fn test_range_matches_full_transfer_chunking() {
        let image = image(1234);
        let meter = meter_with(100, vec![]);
        let observer = RecordingObserver::default();

        let full = MockSession::new();
        {
            let mut ctx = FwdlContext::new(&full, &meter, &observer);
            transfer(
                &mut ctx,
                &image,
                100,
                &PendingEvent::immediate(),
                TransferCursor::new(TABLE, false),
                true,
            )
            .unwrap();
        }

        let ranged = MockSession::new();
        let result = {
            let mut ctx = FwdlContext::new(&ranged, &meter, &observer);
            transfer_range(
                &mut ctx,
                &image,
                100,
                &PendingEvent::immediate(),
                TABLE,
                1,
                13,
                false,
            )
            .unwrap()
        };

        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(full.get_writes(), ranged.get_writes());
        assert!(ranged.get_procedures().is_empty());
    }

    #[test]
    fn test_range_is_clamped() {
        let session = MockSession::new();
        let meter = meter_with(100, vec![]);
        let observer = RecordingObserver::default();
        let mut ctx = FwdlContext::new(&session, &meter, &observer);

        let result = transfer_range(
            &mut ctx,
            &image(550),
            100,
            &PendingEvent::immediate(),
            TABLE,
            5,
            99,
            false,
        )
        .unwrap();

        assert_eq!(result.outcome, Outcome::Success);
        let offsets: Vec<_> = session.get_writes().iter().map(|w| w.offset).collect();
        assert_eq!(offsets, vec![400, 500]);
        assert_eq!(observer.events()[0], FwdlEvent::ShowProgress { total: 2 });
        assert_eq!(
            observer.count(|e| matches!(e, FwdlEvent::Step { total: 2, .. })),
            2
        );
    }

    #[test]
    fn test_inverted_range_writes_nothing() {
        let session = MockSession::new();
        let meter = meter_with(100, vec![]);
        let observer = RecordingObserver::default();
        let mut ctx = FwdlContext::new(&session, &meter, &observer);

        let result = transfer_range(
            &mut ctx,
            &image(550),
            100,
            &PendingEvent::immediate(),
            TABLE,
            4,
            2,
            false,
        )
        .unwrap();

        assert_eq!(result.outcome, Outcome::InvalidConfig);
        assert_eq!(result.failure, Some(FailurePoint::Range));
        assert!(session.get_writes().is_empty());
    }
}
