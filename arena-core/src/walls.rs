use std::collections::HashSet;

use arena_proto::{pack_wall_changes, unpack_wall_changes, ProtoResult, WallChange, WallOp};

/// Grid of occupied wall cells, plus the append-only change buffer
/// consumed by the wire codec (C2, §4.2).
///
/// The buffer is never coalesced: an `ADD` followed later by a
/// `REMOVE` of the same cell produces two entries, matching the
/// original server's behavior (§9 open question, pinned here).
#[derive(Clone, Debug)]
pub struct Walls {
    cols: u16,
    rows: u16,
    cell: f32,
    set: HashSet<(u16, u16)>,
    buffer: Vec<WallChange>,
}

impl Walls {
    pub fn new(cols: u16, rows: u16, cell: f32) -> Self {
        Self {
            cols,
            rows,
            cell,
            set: HashSet::new(),
            buffer: Vec::new(),
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cell_side(&self) -> f32 {
        self.cell
    }

    pub fn has_wall(&self, cx: u16, cy: u16) -> bool {
        self.set.contains(&(cx, cy))
    }

    /// Pixel → cell is `(⌊x/G⌋, ⌊y/G⌋)`; out-of-bounds pixels never hit a wall.
    pub fn pixel_to_cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let cx = (x / self.cell) as u16;
        let cy = (y / self.cell) as u16;
        if cx < self.cols && cy < self.rows {
            Some((cx, cy))
        } else {
            None
        }
    }

    /// Cell → pixel returns the cell's bottom-left corner.
    pub fn cell_to_pixel(&self, cx: u16, cy: u16) -> (f32, f32) {
        (cx as f32 * self.cell, cy as f32 * self.cell)
    }

    pub fn has_wall_at_pixel(&self, x: f32, y: f32) -> bool {
        match self.pixel_to_cell(x, y) {
            Some((cx, cy)) => self.has_wall(cx, cy),
            None => false,
        }
    }

    fn in_bounds(&self, cx: u16, cy: u16) -> bool {
        cx < self.cols && cy < self.rows
    }

    pub fn add_wall(&mut self, cx: u16, cy: u16, track_change: bool) {
        if !self.in_bounds(cx, cy) {
            return;
        }
        if self.set.insert((cx, cy)) && track_change {
            self.buffer.push(WallChange { op: WallOp::Add, cx, cy });
        }
    }

    pub fn remove_wall(&mut self, cx: u16, cy: u16, track_change: bool) {
        if !self.in_bounds(cx, cy) {
            return;
        }
        if self.set.remove(&(cx, cy)) && track_change {
            self.buffer.push(WallChange { op: WallOp::Remove, cx, cy });
        }
    }

    pub fn add_rect(&mut self, cx0: u16, cy0: u16, cx1: u16, cy1: u16, track_change: bool) {
        for cx in cx0..=cx1 {
            for cy in cy0..=cy1 {
                self.add_wall(cx, cy, track_change);
            }
        }
    }

    pub fn clear_rect(&mut self, cx0: u16, cy0: u16, cx1: u16, cy1: u16, track_change: bool) {
        for cx in cx0..=cx1 {
            for cy in cy0..=cy1 {
                self.remove_wall(cx, cy, track_change);
            }
        }
    }

    pub fn clear(&mut self, track_change: bool) {
        let cells: Vec<(u16, u16)> = self.set.drain().collect();
        if track_change {
            for (cx, cy) in cells {
                self.buffer.push(WallChange { op: WallOp::Remove, cx, cy });
            }
        }
    }

    /// Load a textual map (§6): first line is the topmost row (highest
    /// `cy`), characters are `'0'`/`'1'`, anything else is ignored, and
    /// missing columns on ragged lines are treated as empty.
    pub fn load_from_lines(cols: u16, rows: u16, cell: f32, lines: &[String]) -> Self {
        let mut walls = Walls::new(cols, rows, cell);
        for (i, line) in lines.iter().enumerate() {
            if i as u16 >= rows {
                break;
            }
            let cy = rows - 1 - i as u16;
            for (j, ch) in line.chars().enumerate() {
                if j as u16 >= cols {
                    break;
                }
                if ch == '1' {
                    walls.add_wall(j as u16, cy, false);
                }
            }
        }
        walls
    }

    pub fn save_to_lines(&self) -> Vec<String> {
        (0..self.rows)
            .rev()
            .map(|cy| {
                (0..self.cols)
                    .map(|cx| if self.has_wall(cx, cy) { '1' } else { '0' })
                    .collect()
            })
            .collect()
    }

    pub fn pack_changes(&self) -> ProtoResult<Vec<u8>> {
        pack_wall_changes(&self.buffer)
    }

    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Apply a decoded change list without re-emitting into the local
    /// buffer, returning `(added, removed)` counts by op kind.
    pub fn apply_packed_changes(&mut self, buf: &[u8]) -> ProtoResult<(usize, usize)> {
        let changes = unpack_wall_changes(buf, self.cols, self.rows)?;
        let mut added = 0;
        let mut removed = 0;
        for change in changes {
            match change.op {
                WallOp::Add => {
                    self.set.insert((change.cx, change.cy));
                    added += 1;
                }
                WallOp::Remove => {
                    self.set.remove(&(change.cx, change.cy));
                    removed += 1;
                }
            }
        }
        Ok((added, removed))
    }
}
