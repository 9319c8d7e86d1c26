use crate::bytes::{REF_SLOT_ALIGN, REF_SLOT_SIZE};
use crate::padding::{compute_padding, max};
use crate::{FinishError, Writer};

/// A type with a static flat layout.
///
/// Every layout decision is made from these associated items; nothing is inspected at runtime.
///
/// A field or element of type `T` occupies a *slot* in its parent's header: the value itself when
/// `T` is trivial, otherwise an 8-byte reference to an out-of-line region holding `T`'s header.
///
/// # Safety
///
/// The constants must describe exactly the bytes `write` produces and `read` consumes:
/// `write` may only touch `[at, at + header_len)` plus regions it reserves from the [`Writer`],
/// `read` may only look at what `write` wrote, and a trivial type must have no out-of-line data.
pub unsafe trait Flat: 'static {
    /// Start alignment that keeps every transitively contained value aligned.
    const ALIGN: usize;
    /// Size of the header region. For sequences this excludes the element slots.
    const SIZE: usize;
    /// True iff no sequence is reachable from this type.
    const IS_TRIVIAL: bool;
    /// Offset of each field's slot within the header. Empty for non-records.
    const FIELD_OFFSETS: &'static [usize] = &[];

    /// Staging node.
    type Builder;
    /// What a read of this type yields: a reference for scalars, a view handle otherwise.
    type Ref<'a>: Copy;

    fn new_builder() -> Self::Builder;

    /// Length of this node's header once its contents are fixed.
    fn header_len(_builder: &Self::Builder) -> Result<usize, FinishError> {
        Ok(Self::SIZE)
    }

    /// Size pass. `cursor` is the first byte after this node's header;
    /// returns the first byte after all of its out-of-line data.
    fn measure(builder: &Self::Builder, cursor: usize) -> Result<usize, FinishError>;

    /// Write pass. Writes the header at `at` and reserves out-of-line regions from `w`,
    /// in the same order [`Flat::measure`] accounted for them.
    fn write(builder: &Self::Builder, w: &mut Writer<'_>, at: usize) -> Result<(), FinishError>;

    /// # Safety
    ///
    /// `header` must point at a header of this type inside a live finalized buffer
    /// that outlives `'a`.
    unsafe fn read<'a>(header: *const u8) -> Self::Ref<'a>;
}

pub const fn slot_size<T: Flat>() -> usize {
    if T::IS_TRIVIAL {
        T::SIZE
    } else {
        REF_SLOT_SIZE
    }
}

pub const fn slot_align<T: Flat>() -> usize {
    if T::IS_TRIVIAL {
        T::ALIGN
    } else {
        REF_SLOT_ALIGN
    }
}

/// The alignment a parent must guarantee for a field of type `T`, including its out-of-line data.
pub const fn field_align<T: Flat>() -> usize {
    max(slot_align::<T>(), T::ALIGN)
}

/// Max of `field_aligns`, at least 1.
pub const fn record_align(field_aligns: &[usize]) -> usize {
    let mut align = 1;
    let mut i = 0;
    while i < field_aligns.len() {
        align = max(align, field_aligns[i]);
        i += 1;
    }
    align
}

pub const fn record_offsets<const N: usize>(
    slot_aligns: [usize; N],
    slot_sizes: [usize; N],
) -> [usize; N] {
    let mut offsets = [0; N];
    let mut pos = 0;
    let mut i = 0;
    while i < N {
        pos += compute_padding(pos, slot_aligns[i]);
        offsets[i] = pos;
        pos += slot_sizes[i];
        i += 1;
    }
    offsets
}

/// Header size including trailing padding. An empty record still occupies one alignment unit.
pub const fn record_size<const N: usize>(
    slot_aligns: [usize; N],
    slot_sizes: [usize; N],
    final_align: usize,
) -> usize {
    if N == 0 {
        return final_align;
    }
    let offsets = record_offsets(slot_aligns, slot_sizes);
    let end = offsets[N - 1] + slot_sizes[N - 1];
    end + compute_padding(end, final_align)
}

/// Runtime copy of a type's layout descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatLayout {
    pub final_alignment: usize,
    pub fixed_size: usize,
    pub field_offsets: &'static [usize],
    pub is_trivial: bool,
}

impl FlatLayout {
    pub fn of<T: Flat>() -> Self {
        Self {
            final_alignment: T::ALIGN,
            fixed_size: T::SIZE,
            field_offsets: T::FIELD_OFFSETS,
            is_trivial: T::IS_TRIVIAL,
        }
    }
}

/// Registers plain-old-data types as flat scalars: stored inline, read back by reference.
///
/// ```
/// #[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
/// #[repr(C)]
/// struct Point {
///     x: f32,
///     y: f32,
/// }
/// flatmem::flat_scalar!(Point);
/// ```
#[macro_export]
macro_rules! flat_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            unsafe impl $crate::Flat for $ty {
                const ALIGN: usize = ::std::mem::align_of::<$ty>();
                const SIZE: usize = ::std::mem::size_of::<$ty>();
                const IS_TRIVIAL: bool = true;

                type Builder = $ty;
                type Ref<'a> = &'a $ty;

                fn new_builder() -> $ty {
                    $crate::bytemuck::Zeroable::zeroed()
                }

                fn measure(
                    _builder: &$ty,
                    cursor: usize,
                ) -> ::std::result::Result<usize, $crate::FinishError> {
                    Ok(cursor)
                }

                fn write(
                    builder: &$ty,
                    w: &mut $crate::Writer<'_>,
                    at: usize,
                ) -> ::std::result::Result<(), $crate::FinishError> {
                    w.put(at, builder);
                    Ok(())
                }

                unsafe fn read<'a>(header: *const u8) -> &'a $ty {
                    $crate::bytes::read_value::<$ty>(header)
                }
            }
        )*
    };
}

flat_scalar!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
