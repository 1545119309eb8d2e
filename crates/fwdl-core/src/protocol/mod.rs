//! Protocol module - device-side FWDL definitions.

pub mod constants;
pub mod status;

pub use constants::*;
pub use status::{Procedure, ProcedureResult, TransportStatus};
