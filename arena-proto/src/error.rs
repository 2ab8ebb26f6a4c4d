use thiserror::Error;

/// Errors surfaced by the wire codec (C1).
///
/// Every variant here is non-fatal to the connection that produced it —
/// callers are expected to drop the offending message and keep the
/// session alive (see the error policy table in the arena server's
/// top-level documentation).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtoError {
    #[error("bad packet: {0}")]
    BadPacket(&'static str),
    #[error("cell ({cx}, {cy}) is outside the {width}x{height} grid")]
    InvalidCell { cx: u16, cy: u16, width: u16, height: u16 },
    #[error("cannot pack {0} records into a u16-counted snapshot")]
    BufferOverflow(usize),
}

pub type ProtoResult<T> = Result<T, ProtoError>;
