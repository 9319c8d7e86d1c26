use crate::builder::{measure_slot, write_slot};
use crate::bytes::{read_slice, read_value};
use crate::layout::{slot_align, slot_size};
use crate::padding::{align_up, max};
use crate::view::{read_slot, View};
use crate::{Flat, FinishError, Writer};
use bytemuck::Pod;
use derive_more::Deref;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Index, IndexMut};
use std::slice;

/// Variable-length homogeneous sequence.
///
/// ```text
/// struct Vector<E> {
///     element_count:  u32,
///     padding:        [u8; ELEMENTS_OFFSET - 4],
///     slots:          [Slot<E>; element_count],
/// }
/// ```
///
/// A slot is the element itself when `E` is trivial, otherwise the `u64` address of the
/// element's out-of-line header.
pub struct Vector<E>(PhantomData<E>);

impl<E: Flat> Vector<E> {
    pub const COUNT_OFFSET: usize = 0;
    pub const ELEMENTS_OFFSET: usize = align_up(mem::size_of::<u32>(), slot_align::<E>());
    pub const SLOT_SIZE: usize = slot_size::<E>();
}

#[derive(Deref, Clone, Copy, PartialEq, Eq, Debug)]
pub struct ElementCount(u32);
impl ElementCount {
    pub fn from_elements<B>(elements: &[B]) -> Result<Self, FinishError> {
        let len = elements.len();
        let count = u32::try_from(len).map_err(|_| FinishError::SequenceTooLong { len })?;
        Ok(Self(count))
    }
}

unsafe impl<E: Flat> Flat for Vector<E> {
    const ALIGN: usize = max(max(mem::align_of::<u32>(), slot_align::<E>()), E::ALIGN);
    const SIZE: usize = Self::ELEMENTS_OFFSET;
    const IS_TRIVIAL: bool = false;

    type Builder = VectorBuilder<E>;
    type Ref<'a> = VectorView<'a, E>;

    fn new_builder() -> VectorBuilder<E> {
        VectorBuilder {
            elements: Vec::new(),
        }
    }

    fn header_len(builder: &VectorBuilder<E>) -> Result<usize, FinishError> {
        let count = ElementCount::from_elements(&builder.elements)?;
        (*count as usize)
            .checked_mul(Self::SLOT_SIZE)
            .and_then(|slots_len| slots_len.checked_add(Self::ELEMENTS_OFFSET))
            .ok_or(FinishError::Overflow)
    }

    fn measure(builder: &VectorBuilder<E>, cursor: usize) -> Result<usize, FinishError> {
        builder
            .elements
            .iter()
            .try_fold(cursor, |cursor, elem| measure_slot::<E>(elem, cursor))
    }

    fn write(builder: &VectorBuilder<E>, w: &mut Writer<'_>, at: usize) -> Result<(), FinishError> {
        /* element_count */
        let count = ElementCount::from_elements(&builder.elements)?;
        w.put(at + Self::COUNT_OFFSET, &*count);

        /* slots */
        let slots_at = at + Self::ELEMENTS_OFFSET;
        for (i, elem) in builder.elements.iter().enumerate() {
            write_slot::<E>(elem, w, slots_at + i * Self::SLOT_SIZE)?;
        }
        Ok(())
    }

    unsafe fn read<'a>(header: *const u8) -> VectorView<'a, E> {
        VectorView {
            header,
            _buffer: PhantomData,
        }
    }
}

/// Staging node of a sequence: a growable list of element nodes.
pub struct VectorBuilder<E: Flat> {
    elements: Vec<E::Builder>,
}

impl<E: Flat> VectorBuilder<E> {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Grows with default elements (zero for scalars) or truncates.
    pub fn resize(&mut self, len: usize) {
        self.elements.resize_with(len, E::new_builder);
    }

    pub fn push(&mut self, elem: E::Builder) {
        self.elements.push(elem);
    }

    pub fn push_default(&mut self) -> &mut E::Builder {
        let i = self.elements.len();
        self.elements.push(E::new_builder());
        &mut self.elements[i]
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn get(&self, index: usize) -> Option<&E::Builder> {
        self.elements.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut E::Builder> {
        self.elements.get_mut(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, E::Builder> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, E::Builder> {
        self.elements.iter_mut()
    }

    pub fn elements_mut(&mut self) -> &mut Vec<E::Builder> {
        &mut self.elements
    }
}

impl<E: Flat> Index<usize> for VectorBuilder<E> {
    type Output = E::Builder;
    fn index(&self, index: usize) -> &E::Builder {
        &self.elements[index]
    }
}

impl<E: Flat> IndexMut<usize> for VectorBuilder<E> {
    fn index_mut(&mut self, index: usize) -> &mut E::Builder {
        &mut self.elements[index]
    }
}

impl<E: Flat> Extend<E::Builder> for VectorBuilder<E> {
    fn extend<I: IntoIterator<Item = E::Builder>>(&mut self, iter: I) {
        self.elements.extend(iter);
    }
}

impl<E: Flat> Clone for VectorBuilder<E>
where
    E::Builder: Clone,
{
    fn clone(&self) -> Self {
        Self {
            elements: self.elements.clone(),
        }
    }
}

impl<E: Flat> fmt::Debug for VectorBuilder<E>
where
    E::Builder: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.elements.iter()).finish()
    }
}

/// Read handle over a sequence header.
pub struct VectorView<'a, E> {
    header: *const u8,
    _buffer: PhantomData<(&'a [u8], fn() -> E)>,
}

impl<'a, E: Flat> VectorView<'a, E> {
    pub fn len(&self) -> usize {
        let count = unsafe { *read_value::<u32>(self.header.add(Vector::<E>::COUNT_OFFSET)) };
        count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<View<'a, E>> {
        if index < self.len() {
            Some(unsafe { self.get_unchecked(index) })
        } else {
            None
        }
    }

    /// # Safety
    ///
    /// `index` must be less than [`VectorView::len`].
    pub unsafe fn get_unchecked(&self, index: usize) -> View<'a, E> {
        let slot = self
            .header
            .add(Vector::<E>::ELEMENTS_OFFSET + index * Vector::<E>::SLOT_SIZE);
        read_slot::<E>(slot)
    }

    pub fn iter(&self) -> VectorIter<'a, E> {
        VectorIter {
            view: *self,
            front: 0,
            back: self.len(),
        }
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.header
    }
}

impl<'a, E: Flat + Pod> VectorView<'a, E> {
    /// The elements as one borrowed slice; inline scalars are contiguous and aligned.
    pub fn as_slice(&self) -> &'a [E] {
        debug_assert_eq!(Vector::<E>::SLOT_SIZE, mem::size_of::<E>());
        unsafe { read_slice(self.header.add(Vector::<E>::ELEMENTS_OFFSET), self.len()) }
    }
}

impl<E> Clone for VectorView<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<E> Copy for VectorView<'_, E> {}

// Views only read immutable bytes.
unsafe impl<E> Send for VectorView<'_, E> {}
unsafe impl<E> Sync for VectorView<'_, E> {}

impl<'a, E: Flat> IntoIterator for VectorView<'a, E> {
    type Item = View<'a, E>;
    type IntoIter = VectorIter<'a, E>;
    fn into_iter(self) -> VectorIter<'a, E> {
        self.iter()
    }
}

pub struct VectorIter<'a, E> {
    view: VectorView<'a, E>,
    front: usize,
    back: usize,
}

impl<'a, E: Flat> Iterator for VectorIter<'a, E> {
    type Item = View<'a, E>;

    fn next(&mut self) -> Option<View<'a, E>> {
        if self.front == self.back {
            return None;
        }
        let elem = unsafe { self.view.get_unchecked(self.front) };
        self.front += 1;
        Some(elem)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl<'a, E: Flat> DoubleEndedIterator for VectorIter<'a, E> {
    fn next_back(&mut self) -> Option<View<'a, E>> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(unsafe { self.view.get_unchecked(self.back) })
    }
}

impl<E: Flat> ExactSizeIterator for VectorIter<'_, E> {}
impl<E: Flat> FusedIterator for VectorIter<'_, E> {}
