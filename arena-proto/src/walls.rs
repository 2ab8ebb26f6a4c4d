use crate::error::{ProtoError, ProtoResult};

/// A single wall mutation as carried in the change buffer (§3, §4.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WallOp {
    Add,
    Remove,
}

impl WallOp {
    fn to_byte(self) -> u8 {
        match self {
            WallOp::Add => 1,
            WallOp::Remove => 2,
        }
    }

    fn from_byte(b: u8) -> ProtoResult<Self> {
        match b {
            1 => Ok(WallOp::Add),
            2 => Ok(WallOp::Remove),
            _ => Err(ProtoError::BadPacket("unknown wall op")),
        }
    }
}

/// One row of a wall delta. Exactly 5 bytes on the wire: `op:u8 | cx:u16 | cy:u16`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallChange {
    pub op: WallOp,
    pub cx: u16,
    pub cy: u16,
}

pub const WALL_CHANGE_LEN: usize = 5;

/// Encode `count:u16 | count * change-record`. Encoding never validates
/// bounds — only `unpack_wall_changes` (the decode side) rejects
/// out-of-bounds cells, per §4.2.
pub fn pack_wall_changes(changes: &[WallChange]) -> ProtoResult<Vec<u8>> {
    if changes.len() > u16::MAX as usize {
        return Err(ProtoError::BufferOverflow(changes.len()));
    }
    let mut out = Vec::with_capacity(2 + changes.len() * WALL_CHANGE_LEN);
    out.extend_from_slice(&(changes.len() as u16).to_be_bytes());
    for c in changes {
        out.push(c.op.to_byte());
        out.extend_from_slice(&c.cx.to_be_bytes());
        out.extend_from_slice(&c.cy.to_be_bytes());
    }
    Ok(out)
}

/// Decode a wall delta against the grid's `(width, height)` in cells,
/// rejecting any change whose cell falls outside the grid.
pub fn unpack_wall_changes(buf: &[u8], width: u16, height: u16) -> ProtoResult<Vec<WallChange>> {
    if buf.len() < 2 {
        return Err(ProtoError::BadPacket("wall delta shorter than header"));
    }
    let count = u16::from_be_bytes(buf[0..2].try_into().unwrap()) as usize;
    let expected = 2 + count * WALL_CHANGE_LEN;
    if buf.len() != expected {
        return Err(ProtoError::BadPacket("wall delta length mismatch"));
    }
    let mut out = Vec::with_capacity(count);
    let mut off = 2;
    for _ in 0..count {
        let op = WallOp::from_byte(buf[off])?;
        let cx = u16::from_be_bytes(buf[off + 1..off + 3].try_into().unwrap());
        let cy = u16::from_be_bytes(buf[off + 3..off + 5].try_into().unwrap());
        if cx >= width || cy >= height {
            return Err(ProtoError::InvalidCell { cx, cy, width, height });
        }
        out.push(WallChange { op, cx, cy });
        off += WALL_CHANGE_LEN;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_mixed_ops() {
        let changes = vec![
            WallChange { op: WallOp::Add, cx: 3, cy: 4 },
            WallChange { op: WallOp::Remove, cx: 3, cy: 4 },
            WallChange { op: WallOp::Add, cx: 3, cy: 5 },
        ];
        let packed = pack_wall_changes(&changes).unwrap();
        assert_eq!(unpack_wall_changes(&packed, 10, 10).unwrap(), changes);
    }

    #[test]
    fn rejects_out_of_bounds_cell_on_decode() {
        let changes = vec![WallChange { op: WallOp::Add, cx: 9, cy: 9 }];
        let packed = pack_wall_changes(&changes).unwrap();
        assert_eq!(
            unpack_wall_changes(&packed, 5, 5),
            Err(ProtoError::InvalidCell { cx: 9, cy: 9, width: 5, height: 5 })
        );
    }

    #[test]
    fn empty_delta_round_trips() {
        let packed = pack_wall_changes(&[]).unwrap();
        assert_eq!(unpack_wall_changes(&packed, 5, 5).unwrap(), vec![]);
    }
}
