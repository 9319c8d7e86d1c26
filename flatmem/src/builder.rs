use crate::buffer::{FlatBuffer, RawBuffer};
use crate::bytes;
use crate::padding::{checked_align_up, is_aligned};
use crate::{Flat, FinishError};
use bytemuck::Pod;
use derive_more::Deref;
use std::any;
use std::mem;
use std::ops::{Deref, DerefMut};

/// Total byte length of a finalized buffer, as computed by the size pass.
#[derive(Deref, Clone, Copy, PartialEq, Eq, Debug)]
pub struct Footprint(usize);

/// Write side of the finalize pass: the allocated block plus a cursor marking
/// the end of everything placed so far.
pub struct Writer<'b> {
    bytes: &'b mut [u8],
    cursor: usize,
}

impl<'b> Writer<'b> {
    fn new(bytes: &'b mut [u8], cursor: usize) -> Self {
        Self { bytes, cursor }
    }

    pub fn put<T: Pod>(&mut self, at: usize, value: &T) {
        self.bytes[at..at + mem::size_of::<T>()].copy_from_slice(bytemuck::bytes_of(value));
    }

    /// Stores the absolute address of byte `target` into the reference slot at `slot`.
    pub fn put_ref(&mut self, slot: usize, target: usize) {
        let address = bytes::pointer_to_u64(self.bytes.as_ptr().wrapping_add(target));
        self.put(slot, &address);
    }

    /// Places a region of `len` bytes at the next `align`-ed position and returns its start.
    pub fn reserve(&mut self, align: usize, len: usize) -> Result<usize, FinishError> {
        let at = checked_align_up(self.cursor, align)?;
        self.cursor = at.checked_add(len).ok_or(FinishError::Overflow)?;
        Ok(at)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

/// Size pass for one slot holding an `F`. Trivial values live inside the slot, so only a
/// non-trivial `F` moves the cursor: by its aligned header, then by its own out-of-line data.
pub fn measure_slot<F: Flat>(child: &F::Builder, cursor: usize) -> Result<usize, FinishError> {
    if F::IS_TRIVIAL {
        return Ok(cursor);
    }
    let at = checked_align_up(cursor, F::ALIGN)?;
    let header_end = at
        .checked_add(F::header_len(child)?)
        .ok_or(FinishError::Overflow)?;
    F::measure(child, header_end)
}

/// Write pass for one slot holding an `F`, mirroring [`measure_slot`].
pub fn write_slot<F: Flat>(
    child: &F::Builder,
    w: &mut Writer<'_>,
    slot: usize,
) -> Result<(), FinishError> {
    if F::IS_TRIVIAL {
        return F::write(child, w, slot);
    }
    let at = w.reserve(F::ALIGN, F::header_len(child)?)?;
    w.put_ref(slot, at);
    F::write(child, w, at)
}

fn measure_root<T: Flat>(root: &T::Builder) -> Result<Footprint, FinishError> {
    let end = T::measure(root, T::header_len(root)?)?;
    let total = checked_align_up(end, T::ALIGN)?;
    debug_assert!(is_aligned(total, T::ALIGN));
    Ok(Footprint(total))
}

fn finalize<T: Flat>(root: &T::Builder) -> Result<FlatBuffer<T>, FinishError> {
    let Footprint(total) = measure_root::<T>(root)?;

    let mut raw = RawBuffer::zeroed(total, T::ALIGN)?;
    let mut w = Writer::new(raw.as_mut_slice(), T::header_len(root)?);
    T::write(root, &mut w, 0)?;
    debug_assert_eq!(checked_align_up(w.cursor(), T::ALIGN)?, total);

    Ok(FlatBuffer::new(raw))
}

enum State<T: Flat> {
    Staging(T::Builder),
    Finished(FlatBuffer<T>),
}

/// Root of a staging tree for one value of `T`.
///
/// Mutate the tree through `Deref`/`DerefMut` (or [`Builder::root_mut`]), then call
/// [`Builder::finish`] exactly once. Touching the tree after `finish`, calling `finish` twice,
/// or asking for the bytes before `finish` panics.
pub struct Builder<T: Flat> {
    state: State<T>,
}

impl<T: Flat> Builder<T> {
    pub fn new() -> Self {
        Self {
            state: State::Staging(T::new_builder()),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished(_))
    }

    pub fn root(&self) -> &T::Builder {
        match &self.state {
            State::Staging(root) => root,
            State::Finished(_) => panic!("{} read after finish()", Self::name()),
        }
    }

    pub fn root_mut(&mut self) -> &mut T::Builder {
        match &mut self.state {
            State::Staging(root) => root,
            State::Finished(_) => panic!("{} mutated after finish()", Self::name()),
        }
    }

    /// Runs only the size pass: the buffer length `finish` would allocate right now.
    pub fn footprint(&self) -> Result<Footprint, FinishError> {
        measure_root::<T>(self.root())
    }

    /// Serializes the staged tree into one buffer.
    ///
    /// On error nothing changes: the tree stays staged and no buffer is exposed.
    pub fn finish(&mut self) -> Result<(), FinishError> {
        let root = match &self.state {
            State::Staging(root) => root,
            State::Finished(_) => panic!("finish() called twice on {}", Self::name()),
        };
        let buffer = finalize::<T>(root)?;
        tracing::debug!(
            ty = any::type_name::<T>(),
            size = buffer.len(),
            align = T::ALIGN,
            "finished flat buffer"
        );
        self.state = State::Finished(buffer);
        Ok(())
    }

    pub fn buffer(&self) -> &FlatBuffer<T> {
        match &self.state {
            State::Finished(buffer) => buffer,
            State::Staging(_) => panic!("{} has no buffer before finish()", Self::name()),
        }
    }

    pub fn into_buffer(self) -> FlatBuffer<T> {
        match self.state {
            State::Finished(buffer) => buffer,
            State::Staging(_) => panic!("{} has no buffer before finish()", Self::name()),
        }
    }

    pub fn data(&self) -> &[u8] {
        self.buffer().as_bytes()
    }

    pub fn size(&self) -> usize {
        self.buffer().len()
    }

    pub fn view(&self) -> T::Ref<'_> {
        self.buffer().view()
    }

    fn name() -> String {
        format!("Builder<{}>", any::type_name::<T>())
    }
}

impl<T: Flat> Default for Builder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Flat> Deref for Builder<T> {
    type Target = T::Builder;
    fn deref(&self) -> &T::Builder {
        self.root()
    }
}

impl<T: Flat> DerefMut for Builder<T> {
    fn deref_mut(&mut self) -> &mut T::Builder {
        self.root_mut()
    }
}
