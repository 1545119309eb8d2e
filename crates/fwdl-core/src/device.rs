//! Device metadata capability.
//!
//! The FWDL driver needs a few facts about the target that vary per device
//! family: the negotiated block size, which pending table stages each kind
//! of firmware, the pending-table header and the firmware already installed.
//! Families implement [`DeviceMetadata`]; profiles loaded from TOML pick a
//! family and fill in the rest.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::image::{FirmwareType, FirmwareVersion};
use crate::protocol::constants::*;

/// Block size used by standard meters unless a profile overrides it.
pub const STANDARD_BLOCK_SIZE: usize = 256;
/// Block size used by gateways unless a profile overrides it.
pub const GATEWAY_BLOCK_SIZE: usize = 512;

/// Length of the header prepended to every pending-table block.
pub const PENDING_HEADER_LEN: usize = 6;

const PENDING_TIMED_FLAG: u8 = 0x80;
const PENDING_EVENT_MASK: u8 = 0x0F;

/// When the device should activate a pending table on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ActivationTrigger {
    /// Activated by the activate-pending-table procedure.
    #[default]
    Immediate,
    /// Activated by the device at the given time (seconds since the device epoch).
    Timed { at_seconds: u32 },
}

/// Activation event recorded in each pending-table block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PendingEvent {
    #[serde(default)]
    pub trigger: ActivationTrigger,
    #[serde(default)]
    pub event_number: u8,
}

impl PendingEvent {
    pub fn immediate() -> Self {
        Self::default()
    }

    /// Encode as `[flags | event, time (u32 LE), reserved]`.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(PENDING_HEADER_LEN);
        let (flag, at) = match self.trigger {
            ActivationTrigger::Immediate => (0, 0),
            ActivationTrigger::Timed { at_seconds } => (PENDING_TIMED_FLAG, at_seconds),
        };
        buf.push(flag | (self.event_number & PENDING_EVENT_MASK));
        buf.extend_from_slice(&at.to_le_bytes());
        buf.push(0);
        buf
    }
}

/// Device facts consumed by the FWDL driver.
pub trait DeviceMetadata {
    /// Block size negotiated for firmware download.
    fn fwdl_block_size(&self) -> usize;

    /// Pending table staging `firmware_type`, without the pending flag.
    fn pending_table_id(&self, firmware_type: FirmwareType) -> Option<u16>;

    /// Firmware of this type currently running on the device.
    fn installed_version(&self, firmware_type: FirmwareType) -> Option<FirmwareVersion>;

    /// Header prepended to every block written to the pending table.
    fn pending_table_header(&self, event: &PendingEvent) -> Vec<u8> {
        event.encode()
    }
}

impl<T: DeviceMetadata + ?Sized> DeviceMetadata for Box<T> {
    fn fwdl_block_size(&self) -> usize {
        (**self).fwdl_block_size()
    }

    fn pending_table_id(&self, firmware_type: FirmwareType) -> Option<u16> {
        (**self).pending_table_id(firmware_type)
    }

    fn installed_version(&self, firmware_type: FirmwareType) -> Option<FirmwareVersion> {
        (**self).installed_version(firmware_type)
    }

    fn pending_table_header(&self, event: &PendingEvent) -> Vec<u8> {
        (**self).pending_table_header(event)
    }
}

/// Firmware reported as installed on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledFirmware {
    pub firmware_type: FirmwareType,
    #[serde(flatten)]
    pub version: FirmwareVersion,
}

/// Electricity meter with register and comm-module pending tables.
#[derive(Debug, Clone)]
pub struct StandardMeter {
    pub block_size: usize,
    pub installed: Vec<InstalledFirmware>,
}

impl StandardMeter {
    pub fn new(installed: Vec<InstalledFirmware>) -> Self {
        Self {
            block_size: STANDARD_BLOCK_SIZE,
            installed,
        }
    }
}

impl DeviceMetadata for StandardMeter {
    fn fwdl_block_size(&self) -> usize {
        self.block_size
    }

    fn pending_table_id(&self, firmware_type: FirmwareType) -> Option<u16> {
        Some(match firmware_type {
            FirmwareType::Register => TABLE_PENDING_REGISTER_FW,
            FirmwareType::RfLan => TABLE_PENDING_RFLAN_FW,
            FirmwareType::Han => TABLE_PENDING_HAN_FW,
            FirmwareType::Display => TABLE_PENDING_DISPLAY_FW,
            FirmwareType::HanDevice => TABLE_PENDING_HAN_DEVICE_FW,
            FirmwareType::Plan => TABLE_PENDING_PLAN_FW,
            FirmwareType::Cellular => TABLE_PENDING_CELLULAR_FW,
        })
    }

    fn installed_version(&self, firmware_type: FirmwareType) -> Option<FirmwareVersion> {
        find_installed(&self.installed, firmware_type)
    }
}

/// Collector gateway: comm modules share one pending table and there is no
/// display or HAN device firmware.
#[derive(Debug, Clone)]
pub struct GatewayMeter {
    pub block_size: usize,
    pub installed: Vec<InstalledFirmware>,
}

impl GatewayMeter {
    pub fn new(installed: Vec<InstalledFirmware>) -> Self {
        Self {
            block_size: GATEWAY_BLOCK_SIZE,
            installed,
        }
    }
}

impl DeviceMetadata for GatewayMeter {
    fn fwdl_block_size(&self) -> usize {
        self.block_size
    }

    fn pending_table_id(&self, firmware_type: FirmwareType) -> Option<u16> {
        match firmware_type {
            FirmwareType::Register => Some(TABLE_PENDING_REGISTER_FW),
            FirmwareType::RfLan
            | FirmwareType::Han
            | FirmwareType::Plan
            | FirmwareType::Cellular => Some(TABLE_PENDING_GATEWAY_COMM_FW),
            FirmwareType::Display | FirmwareType::HanDevice => None,
        }
    }

    fn installed_version(&self, firmware_type: FirmwareType) -> Option<FirmwareVersion> {
        find_installed(&self.installed, firmware_type)
    }
}

fn find_installed(
    installed: &[InstalledFirmware],
    firmware_type: FirmwareType,
) -> Option<FirmwareVersion> {
    installed
        .iter()
        .find(|fw| fw.firmware_type == firmware_type)
        .map(|fw| fw.version)
}

/// Device family selecting the table layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceFamily {
    #[default]
    Standard,
    Gateway,
}

/// Device description loaded from TOML.
///
/// ```toml
/// family = "gateway"
/// block_size = 384
///
/// [[installed]]
/// firmware_type = "rf_lan"
/// version = 5
/// revision = 12
/// build = 34
/// ```
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DeviceProfile {
    #[serde(default)]
    pub family: DeviceFamily,
    /// Overrides the family's default block size.
    pub block_size: Option<usize>,
    #[serde(default)]
    pub installed: Vec<InstalledFirmware>,
}

impl DeviceProfile {
    /// Load a profile from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let profile: DeviceProfile = toml::from_str(&content)?;
        Ok(profile)
    }

    /// Build the metadata implementation for this profile.
    pub fn build(&self) -> Box<dyn DeviceMetadata + Send + Sync> {
        let installed = self.installed.clone();
        match self.family {
            DeviceFamily::Standard => {
                let mut meter = StandardMeter::new(installed);
                if let Some(size) = self.block_size {
                    meter.block_size = size;
                }
                Box::new(meter)
            }
            DeviceFamily::Gateway => {
                let mut meter = GatewayMeter::new(installed);
                if let Some(size) = self.block_size {
                    meter.block_size = size;
                }
                Box::new(meter)
            }
        }
    }
}
