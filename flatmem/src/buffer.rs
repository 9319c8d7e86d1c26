use crate::{Flat, FinishError};
use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::slice;

/// One zero-filled, aligned heap block. Its address never changes for the block's lifetime.
pub(crate) struct RawBuffer {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl RawBuffer {
    pub fn zeroed(size: usize, align: usize) -> Result<Self, FinishError> {
        // Every flat type is at least one byte, so `size` is never zero here.
        debug_assert!(size > 0);
        let layout = Layout::from_size_align(size, align)?;

        tracing::trace!(size, align, "allocating flat buffer");
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        match NonNull::new(ptr) {
            Some(ptr) => Ok(Self { ptr, layout }),
            None => {
                tracing::warn!(size, align, "flat buffer allocation failed");
                Err(FinishError::Allocation { size, align })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.layout.size()
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub fn as_slice(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl Drop for RawBuffer {
    fn drop(&mut self) {
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

// The block is uniquely owned and only mutated before it is handed out.
unsafe impl Send for RawBuffer {}
unsafe impl Sync for RawBuffer {}

/// A finalized buffer holding one value of `T`.
///
/// The bytes are immutable. Out-of-line fields hold absolute addresses into this same block,
/// so the bytes are meaningful only while the block is alive; moving the handle is fine,
/// copying the bytes elsewhere is not.
pub struct FlatBuffer<T: Flat> {
    raw: RawBuffer,
    _type: PhantomData<fn() -> T>,
}

impl<T: Flat> FlatBuffer<T> {
    pub(crate) fn new(raw: RawBuffer) -> Self {
        Self {
            raw,
            _type: PhantomData,
        }
    }

    /// The root view. Borrows the buffer, so it cannot outlive it.
    pub fn view(&self) -> T::Ref<'_> {
        unsafe { T::read(self.raw.as_ptr()) }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.raw.as_slice()
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.raw.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Alignment of the block's start address.
    pub fn align(&self) -> usize {
        T::ALIGN
    }
}

impl<T: Flat> fmt::Debug for FlatBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatBuffer")
            .field("type", &std::any::type_name::<T>())
            .field("len", &self.len())
            .field("align", &self.align())
            .finish()
    }
}
