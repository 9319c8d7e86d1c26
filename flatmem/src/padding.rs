//! Alignment arithmetic shared by the layout computation and the finalize passes.
//!
//! Every `align` argument must be at least 1.

use crate::FinishError;

/// Bytes to add to `pos` to reach the next multiple of `align`.
pub const fn compute_padding(pos: usize, align: usize) -> usize {
    (align - (pos % align)) % align
}

pub const fn is_aligned(num_bytes: usize, align: usize) -> bool {
    num_bytes % align == 0
}

/// Unchecked; only for positions known to be small, i.e. header layouts.
pub const fn align_up(pos: usize, align: usize) -> usize {
    pos + compute_padding(pos, align)
}

pub fn checked_align_up(pos: usize, align: usize) -> Result<usize, FinishError> {
    pos.checked_add(compute_padding(pos, align))
        .ok_or(FinishError::Overflow)
}

pub(crate) const fn max(a: usize, b: usize) -> usize {
    if a > b {
        a
    } else {
        b
    }
}
