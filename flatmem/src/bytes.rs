//! Raw reads over finalized buffers.
//!
//! This module and [`crate::buffer`] are the only places that turn addresses into references.
//! None of these functions check bounds or liveness.

use bytemuck::Pod;
use std::mem;
use std::slice;

/// Reference slots are always 8 bytes and 8-aligned, independent of the native pointer width.
pub const REF_SLOT_SIZE: usize = mem::size_of::<u64>();
pub const REF_SLOT_ALIGN: usize = 8;

/// Reinterprets the bytes at `ptr` as a `T`.
///
/// # Safety
///
/// `ptr` must be aligned for `T` and point at `size_of::<T>()` initialized bytes
/// that stay alive and unmodified for `'a`.
pub unsafe fn read_value<'a, T: Pod>(ptr: *const u8) -> &'a T {
    debug_assert!(
        ptr as usize % mem::align_of::<T>() == 0,
        "misaligned read of {}",
        std::any::type_name::<T>()
    );
    &*ptr.cast::<T>()
}

/// Reinterprets `len` consecutive `T`s starting at `ptr` as a slice.
///
/// # Safety
///
/// Same as [`read_value`], for `len * size_of::<T>()` bytes.
pub unsafe fn read_slice<'a, T: Pod>(ptr: *const u8, len: usize) -> &'a [T] {
    debug_assert!(ptr as usize % mem::align_of::<T>() == 0);
    slice::from_raw_parts(ptr.cast::<T>(), len)
}

/// Follows the reference slot at `ptr`.
///
/// # Safety
///
/// `ptr` must be 8-aligned and hold an address written by [`pointer_to_u64`]
/// whose target is still alive.
pub unsafe fn read_pointer(ptr: *const u8) -> *const u8 {
    u64_to_pointer(*read_value::<u64>(ptr))
}

pub fn pointer_to_u64<T>(ptr: *const T) -> u64 {
    ptr as usize as u64
}

pub fn u64_to_pointer<T>(address: u64) -> *const T {
    address as usize as *const T
}
