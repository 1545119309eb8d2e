//! Firmware image loading and block planning.
//!
//! A firmware file is an 18-byte header followed by the payload. The whole
//! file (header included) is what gets pushed to the pending table.
//!
//! Header layout:
//!
//! | Offset | Len | Field |
//! |--------|-----|-------|
//! | 0      | 2   | CRC (little-endian) |
//! | 5      | 3   | version / revision / build |
//! | 5      | 9   | block copied verbatim into the initiation parameters |
//! | 9      | 1   | firmware type tag |
//! | 10     | 2   | lowest supported hardware (version, revision) |
//! | 12     | 2   | highest supported hardware (version, revision) |
//! | 14     | 4   | device class (MSB-first) |

use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::constants::*;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Cannot read firmware file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("File too small: {actual} bytes, minimum {minimum}")]
    TooShort { actual: usize, minimum: usize },
    #[error("File too large: {actual} bytes does not fit a 32-bit length field")]
    TooLarge { actual: usize },
    #[error("Unsupported firmware file: unknown firmware type tag 0x{0:02X}")]
    UnsupportedFirmwareType(u8),
}

/// Firmware type, selected by header byte 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirmwareType {
    /// Metrology register firmware.
    Register,
    /// RF mesh LAN comm module.
    RfLan,
    /// ZigBee HAN comm module.
    Han,
    Display,
    /// Firmware for a device joined to the HAN.
    HanDevice,
    /// Power-line comm module.
    Plan,
    /// Cellular comm module.
    Cellular,
}

impl FirmwareType {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(FirmwareType::Register),
            1 => Some(FirmwareType::RfLan),
            2 => Some(FirmwareType::Han),
            3 => Some(FirmwareType::Display),
            4 => Some(FirmwareType::HanDevice),
            5 => Some(FirmwareType::Plan),
            6 => Some(FirmwareType::Cellular),
            _ => None,
        }
    }

    pub fn tag(&self) -> u8 {
        match self {
            FirmwareType::Register => 0,
            FirmwareType::RfLan => 1,
            FirmwareType::Han => 2,
            FirmwareType::Display => 3,
            FirmwareType::HanDevice => 4,
            FirmwareType::Plan => 5,
            FirmwareType::Cellular => 6,
        }
    }
}

impl fmt::Display for FirmwareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirmwareType::Register => write!(f, "Register"),
            FirmwareType::RfLan => write!(f, "RFLAN Comm Module"),
            FirmwareType::Han => write!(f, "HAN Comm Module"),
            FirmwareType::Display => write!(f, "Display"),
            FirmwareType::HanDevice => write!(f, "HAN Device"),
            FirmwareType::Plan => write!(f, "PLAN Comm Module"),
            FirmwareType::Cellular => write!(f, "Cellular Comm Module"),
        }
    }
}

/// Version / revision / build triplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FirmwareVersion {
    pub version: u8,
    pub revision: u8,
    pub build: u8,
}

impl FirmwareVersion {
    pub const fn new(version: u8, revision: u8, build: u8) -> Self {
        Self {
            version,
            revision,
            build,
        }
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}.{:03}", self.version, self.revision, self.build)
    }
}

/// Hardware (version, revision) bound from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareRevision {
    pub version: u8,
    pub revision: u8,
}

impl fmt::Display for HardwareRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.version, self.revision)
    }
}

/// Firmware file loaded into memory.
#[derive(Debug, Clone)]
pub struct FirmwareImage {
    data: Vec<u8>,
    firmware_type: FirmwareType,
}

impl FirmwareImage {
    /// Read a firmware file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(data)
    }

    /// Parse a firmware image from raw bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ImageError> {
        if data.len() < FW_HEADER_LEN {
            return Err(ImageError::TooShort {
                actual: data.len(),
                minimum: FW_HEADER_LEN,
            });
        }
        if u32::try_from(data.len()).is_err() {
            return Err(ImageError::TooLarge { actual: data.len() });
        }

        let tag = data[HDR_FIRMWARE_TYPE_OFFSET];
        let firmware_type =
            FirmwareType::from_tag(tag).ok_or(ImageError::UnsupportedFirmwareType(tag))?;

        Ok(Self {
            data,
            firmware_type,
        })
    }

    /// Total size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Image length as sent in the 32-bit length field.
    pub fn len_u32(&self) -> u32 {
        // from_bytes rejects anything larger
        self.data.len() as u32
    }

    pub fn raw_data(&self) -> &[u8] {
        &self.data
    }

    pub fn crc(&self) -> u16 {
        let mut cursor = Cursor::new(&self.data[HDR_CRC_OFFSET..HDR_CRC_OFFSET + 2]);
        cursor.read_u16::<LittleEndian>().unwrap_or_default()
    }

    pub fn firmware_type(&self) -> FirmwareType {
        self.firmware_type
    }

    pub fn version(&self) -> FirmwareVersion {
        FirmwareVersion::new(
            self.data[HDR_VERSION_OFFSET],
            self.data[HDR_REVISION_OFFSET],
            self.data[HDR_BUILD_OFFSET],
        )
    }

    pub fn hardware_range_low(&self) -> HardwareRevision {
        HardwareRevision {
            version: self.data[HDR_HW_RANGE_LOW_OFFSET],
            revision: self.data[HDR_HW_RANGE_LOW_OFFSET + 1],
        }
    }

    pub fn hardware_range_high(&self) -> HardwareRevision {
        HardwareRevision {
            version: self.data[HDR_HW_RANGE_HIGH_OFFSET],
            revision: self.data[HDR_HW_RANGE_HIGH_OFFSET + 1],
        }
    }

    /// Device class as stored on disk (MSB-first).
    pub fn device_class(&self) -> u32 {
        let end = HDR_DEVICE_CLASS_OFFSET + HDR_DEVICE_CLASS_LEN;
        let mut cursor = Cursor::new(&self.data[HDR_DEVICE_CLASS_OFFSET..end]);
        cursor.read_u32::<BigEndian>().unwrap_or_default()
    }

    /// Raw device class bytes in file order.
    pub fn device_class_bytes(&self) -> &[u8] {
        &self.data[HDR_DEVICE_CLASS_OFFSET..HDR_DEVICE_CLASS_OFFSET + HDR_DEVICE_CLASS_LEN]
    }

    /// Header bytes 5..14, passed verbatim to the initiation procedure.
    pub fn init_block(&self) -> &[u8] {
        &self.data[HDR_INIT_BLOCK_OFFSET..HDR_INIT_BLOCK_OFFSET + HDR_INIT_BLOCK_LEN]
    }

    /// Opaque identity bytes (header 5..9) passed to the activation procedure.
    pub fn activation_identity(&self) -> [u8; HDR_IDENTITY_LEN] {
        let mut id = [0u8; HDR_IDENTITY_LEN];
        id.copy_from_slice(&self.data[HDR_IDENTITY_OFFSET..HDR_IDENTITY_OFFSET + HDR_IDENTITY_LEN]);
        id
    }
}

/// Fixed-size split of an image into blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPlan {
    image_len: usize,
    block_size: usize,
    total_blocks: usize,
}

impl BlockPlan {
    /// Returns `None` for a zero block size.
    pub fn new(image_len: usize, block_size: usize) -> Option<Self> {
        if block_size == 0 {
            return None;
        }
        Some(Self {
            image_len,
            block_size,
            total_blocks: image_len.div_ceil(block_size),
        })
    }

    pub fn total_blocks(&self) -> usize {
        self.total_blocks
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Payload length of block `index`. The last block carries the
    /// remainder, or a full block when the image divides evenly.
    pub fn block_len(&self, index: usize) -> usize {
        if index >= self.total_blocks {
            return 0;
        }
        if index + 1 == self.total_blocks {
            match self.image_len % self.block_size {
                0 => self.block_size,
                rem => rem,
            }
        } else {
            self.block_size
        }
    }

    /// Byte offset of block `index` within the image.
    pub fn block_offset(&self, index: usize) -> usize {
        index * self.block_size
    }

    /// Payload of block `index`.
    pub fn block<'a>(&self, data: &'a [u8], index: usize) -> &'a [u8] {
        let start = self.block_offset(index).min(data.len());
        let end = (start + self.block_len(index)).min(data.len());
        &data[start..end]
    }

    /// Convert a 1-based inclusive block range into a clamped 0-based
    /// half-open one. `None` when nothing remains after clamping.
    pub fn clamp_range(&self, start_block: usize, end_block: usize) -> Option<(usize, usize)> {
        if self.total_blocks == 0 {
            return None;
        }
        let start = start_block.clamp(1, self.total_blocks);
        let end = end_block.clamp(1, self.total_blocks);
        if start > end {
            return None;
        }
        Some((start - 1, end))
    }
}
