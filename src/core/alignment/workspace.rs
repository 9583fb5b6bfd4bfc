//! DP scratch arena for the batched executor
//!
//! The executor carves one fixed-size lane per in-flight work item out of a
//! single caller-provided arena, so a scoring round performs no per-item
//! allocation. A lane holds, in order:
//!
//! - `H` column (pattern_len + 1 cells)
//! - `E` column (pattern_len + 1 cells)
//! - the oriented pattern (pattern_len cells)
//! - the staged text window (text_len cells)
//!
//! The number of lanes bounds how many items are scored per wave.

/// Cells needed by one lane for the given pattern and text bounds.
#[inline]
pub fn lane_len(max_pattern_len: u32, max_text_len: u32) -> usize {
    3 * max_pattern_len as usize + 2 + max_text_len as usize
}

/// Caller-owned DP workspace, reused across scoring rounds.
pub struct DpScratch {
    cells: Vec<i32>,
}

impl DpScratch {
    /// Allocate an arena of `cells` i32 cells
    pub fn with_capacity(cells: usize) -> Self {
        Self {
            cells: vec![0i32; cells],
        }
    }

    /// Capacity in cells
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Number of lanes of `lane_len` cells the arena can hold at once
    pub fn lanes(&self, lane_len: usize) -> usize {
        if lane_len == 0 {
            return 0;
        }
        self.cells.len() / lane_len
    }

    /// First `lanes * lane_len` cells, for splitting into lanes
    pub(crate) fn wave_mut(&mut self, lanes: usize, lane_len: usize) -> &mut [i32] {
        &mut self.cells[..lanes * lane_len]
    }
}

impl Default for DpScratch {
    fn default() -> Self {
        Self::with_capacity(crate::defaults::DP_SCRATCH_CELLS)
    }
}

/// One lane split into its kernel buffers.
pub struct LaneBuffers<'a> {
    pub h: &'a mut [i32],
    pub e: &'a mut [i32],
    pub pattern: &'a mut [i32],
    pub text: &'a mut [i32],
}

impl<'a> LaneBuffers<'a> {
    /// Split a lane of exactly `lane_len(max_pattern_len, max_text_len)` cells
    pub fn split(lane: &'a mut [i32], max_pattern_len: u32, max_text_len: u32) -> Self {
        let p = max_pattern_len as usize;
        let t = max_text_len as usize;
        let (h, rest) = lane.split_at_mut(p + 1);
        let (e, rest) = rest.split_at_mut(p + 1);
        let (pattern, rest) = rest.split_at_mut(p);
        let text = &mut rest[..t];
        LaneBuffers { h, e, pattern, text }
    }
}
