//! Transport layer module.

pub mod mock;
pub mod traits;

pub use mock::{MockSession, WriteFault, WriteRecord};
pub use traits::{ProcedureReply, ProtocolSession, TransportError};
