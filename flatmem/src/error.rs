use std::alloc::LayoutError;
use thiserror::Error;

/// Recoverable failures of [`crate::Builder::finish`].
///
/// On any of these the builder keeps its staged tree, so the caller may shrink it and retry.
#[derive(Debug, Error)]
pub enum FinishError {
    #[error("flat buffer size overflows usize")]
    Overflow,

    #[error("sequence of {len} elements exceeds the u32 element count")]
    SequenceTooLong { len: usize },

    #[error("invalid buffer layout: {0}")]
    InvalidLayout(#[from] LayoutError),

    #[error("failed to allocate {size} bytes aligned to {align}")]
    Allocation { size: usize, align: usize },
}
