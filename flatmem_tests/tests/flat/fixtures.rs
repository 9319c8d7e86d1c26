//! Shared fixtures for the integration tests.

use bytemuck::{Pod, Zeroable};
use flatmem::{flat_scalar, Builder, Flat, FinishError};

/// A plain struct stored as one scalar slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Pair {
    pub x: u32,
    pub y: u32,
}

#[derive(Clone, Copy, PartialEq, Debug, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

flat_scalar!(Pair, Vec4);

/// Stages with `fill`, finishes, and hands back the finished builder.
pub fn finished<T, F>(fill: F) -> Result<Builder<T>, FinishError>
where
    T: Flat,
    F: FnOnce(&mut T::Builder),
{
    let mut builder = Builder::<T>::new();
    fill(builder.root_mut());
    builder.finish()?;
    Ok(builder)
}
