//! Protocol constants for meter firmware download.
//!
//! Table and procedure numbers follow the ANSI C12.19 numbering: standard
//! entities use the low 11 bits, manufacturer entities additionally set
//! [`MFG_FLAG`].

// ============================================================================
// Table / Procedure Numbering
// ============================================================================

/// Manufacturer-defined table/procedure flag (bit 11).
pub const MFG_FLAG: u16 = 0x0800;

/// Pending-table flag OR'd into the table id of every FWDL block write.
pub const PENDING_TABLE_FLAG: u16 = 0x1000;

/// Standard procedure 13: activate specific pending table.
pub const PROC_ACTIVATE_PENDING_TABLE: u16 = 13;

/// Manufacturer procedure 37: initiate firmware loader setup.
pub const PROC_INITIATE_FW_LOADER_SETUP: u16 = MFG_FLAG | 37;

// ============================================================================
// Pending Tables (manufacturer tables holding staged firmware)
// ============================================================================

pub const TABLE_PENDING_REGISTER_FW: u16 = 2109;
pub const TABLE_PENDING_RFLAN_FW: u16 = 2110;
pub const TABLE_PENDING_HAN_FW: u16 = 2111;
pub const TABLE_PENDING_DISPLAY_FW: u16 = 2112;
pub const TABLE_PENDING_HAN_DEVICE_FW: u16 = 2113;
pub const TABLE_PENDING_PLAN_FW: u16 = 2114;
pub const TABLE_PENDING_CELLULAR_FW: u16 = 2115;

/// Gateways stage comm-module firmware in their own table.
pub const TABLE_PENDING_GATEWAY_COMM_FW: u16 = 2180;

// ============================================================================
// Firmware File Header Layout
// ============================================================================

/// CRC (little-endian u16).
pub const HDR_CRC_OFFSET: usize = 0;
/// Start of the block copied verbatim into the initiation parameters.
pub const HDR_INIT_BLOCK_OFFSET: usize = 5;
pub const HDR_INIT_BLOCK_LEN: usize = 9;
pub const HDR_VERSION_OFFSET: usize = 5;
pub const HDR_REVISION_OFFSET: usize = 6;
pub const HDR_BUILD_OFFSET: usize = 7;
/// Four opaque identity bytes passed to the activation procedure.
pub const HDR_IDENTITY_OFFSET: usize = 5;
pub const HDR_IDENTITY_LEN: usize = 4;
pub const HDR_FIRMWARE_TYPE_OFFSET: usize = 9;
pub const HDR_HW_RANGE_LOW_OFFSET: usize = 10;
pub const HDR_HW_RANGE_HIGH_OFFSET: usize = 12;
/// Device class, MSB-first on disk.
pub const HDR_DEVICE_CLASS_OFFSET: usize = 14;
pub const HDR_DEVICE_CLASS_LEN: usize = 4;

/// Minimum file length holding a complete header.
pub const FW_HEADER_LEN: usize = 18;

// ============================================================================
// Procedure Parameter Layouts
// ============================================================================

/// CRC(2) + header block(9) + image length(4) + chunk size(4) + device class(4).
pub const INIT_PARAMS_LEN: usize = 2 + HDR_INIT_BLOCK_LEN + 4 + 4 + HDR_DEVICE_CLASS_LEN;

/// Table id(2) + firmware type(1) + identity(4).
pub const ACTIVATE_PARAMS_LEN: usize = 2 + 1 + HDR_IDENTITY_LEN;

// ============================================================================
// Initiation Rejection Reasons (first response byte on InvalidParameter)
// ============================================================================

pub const INIT_REASON_IMAGE_TOO_BIG: u8 = 1;
pub const INIT_REASON_HW_REVISION_OUT_OF_RANGE: u8 = 2;
pub const INIT_REASON_HW_VERSION_OUT_OF_RANGE: u8 = 3;
pub const INIT_REASON_FW_TYPE_INVALID: u8 = 10;
pub const INIT_REASON_RADIO_FW_TYPE_INVALID: u8 = 11;

// ============================================================================
// PSEM Response Codes
// ============================================================================

pub const PSEM_OK: u8 = 0x00;
/// Service not supported.
pub const PSEM_SNS: u8 = 0x02;
/// Insufficient security clearance.
pub const PSEM_ISC: u8 = 0x03;
/// Operation not possible.
pub const PSEM_ONP: u8 = 0x04;
pub const PSEM_BSY: u8 = 0x06;
/// Data not ready.
pub const PSEM_DNR: u8 = 0x07;
