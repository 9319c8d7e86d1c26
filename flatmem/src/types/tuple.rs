use crate::builder::{measure_slot, write_slot};
use crate::layout::{field_align, record_align, record_offsets, record_size, slot_align, slot_size};
use crate::view::{read_slot, View};
use crate::{Flat, FinishError, Writer};
use std::fmt;
use std::marker::PhantomData;

/// Fixed-arity heterogeneous record, e.g. `Tuple<(i16, i32, u16)>`.
///
/// Field slots are laid out in declared order, each aligned to its slot alignment,
/// followed by trailing padding up to the record's alignment.
pub struct Tuple<T>(PhantomData<T>);

/// Field list of a [`Tuple`]. Implemented for Rust tuples of [`Flat`] types up to arity 8.
///
/// # Safety
///
/// Views read field `I` at `OFFSETS[I]` without checking. Implementors must guarantee that
/// `OFFSETS` has `ARITY` entries and that every field slot lies inside the `SIZE`-byte header,
/// aligned for its slot. `ALIGN` must cover every field slot and every out-of-line child, and
/// `IS_TRIVIAL` may only be true when every field is trivial. `write` must fill exactly the
/// regions `measure` accounted for.
pub unsafe trait TupleFields: 'static {
    type Builders;

    const ARITY: usize;
    const ALIGN: usize;
    const SIZE: usize;
    const IS_TRIVIAL: bool;
    const OFFSETS: &'static [usize];

    fn new_builders() -> Self::Builders;
    fn measure(builders: &Self::Builders, cursor: usize) -> Result<usize, FinishError>;
    fn write(builders: &Self::Builders, w: &mut Writer<'_>, at: usize) -> Result<(), FinishError>;
}

/// Static access to field `I`.
///
/// # Safety
///
/// `I` must be less than `ARITY`, and `Type` must be the type whose slot sits at `OFFSETS[I]`.
pub unsafe trait FieldAt<const I: usize>: TupleFields {
    type Type: Flat;

    fn builder(builders: &Self::Builders) -> &<Self::Type as Flat>::Builder;
    fn builder_mut(builders: &mut Self::Builders) -> &mut <Self::Type as Flat>::Builder;
}

pub type FieldType<T, const I: usize> = <T as FieldAt<I>>::Type;

unsafe impl<T: TupleFields> Flat for Tuple<T> {
    const ALIGN: usize = T::ALIGN;
    const SIZE: usize = T::SIZE;
    const IS_TRIVIAL: bool = T::IS_TRIVIAL;
    const FIELD_OFFSETS: &'static [usize] = T::OFFSETS;

    type Builder = TupleBuilder<T>;
    type Ref<'a> = TupleView<'a, T>;

    fn new_builder() -> TupleBuilder<T> {
        TupleBuilder {
            fields: T::new_builders(),
        }
    }

    fn measure(builder: &TupleBuilder<T>, cursor: usize) -> Result<usize, FinishError> {
        T::measure(&builder.fields, cursor)
    }

    fn write(builder: &TupleBuilder<T>, w: &mut Writer<'_>, at: usize) -> Result<(), FinishError> {
        T::write(&builder.fields, w, at)
    }

    unsafe fn read<'a>(header: *const u8) -> TupleView<'a, T> {
        TupleView {
            header,
            _buffer: PhantomData,
        }
    }
}

/// Staging node of a record: one child node per field.
pub struct TupleBuilder<T: TupleFields> {
    fields: T::Builders,
}

impl<T: TupleFields> TupleBuilder<T> {
    pub fn field<const I: usize>(&self) -> &<FieldType<T, I> as Flat>::Builder
    where
        T: FieldAt<I>,
    {
        T::builder(&self.fields)
    }

    pub fn field_mut<const I: usize>(&mut self) -> &mut <FieldType<T, I> as Flat>::Builder
    where
        T: FieldAt<I>,
    {
        T::builder_mut(&mut self.fields)
    }
}

impl<T: TupleFields> Clone for TupleBuilder<T>
where
    T::Builders: Clone,
{
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
        }
    }
}

impl<T: TupleFields> fmt::Debug for TupleBuilder<T>
where
    T::Builders: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TupleBuilder").field(&self.fields).finish()
    }
}

/// Read handle over a record header.
pub struct TupleView<'a, T> {
    header: *const u8,
    _buffer: PhantomData<(&'a [u8], fn() -> T)>,
}

impl<'a, T: TupleFields> TupleView<'a, T> {
    /// Scalars come back by reference, nested records and sequences as views.
    pub fn field<const I: usize>(&self) -> View<'a, FieldType<T, I>>
    where
        T: FieldAt<I>,
    {
        debug_assert!(T::OFFSETS[I] + slot_size::<FieldType<T, I>>() <= T::SIZE);
        unsafe { read_slot::<FieldType<T, I>>(self.header.add(T::OFFSETS[I])) }
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.header
    }
}

impl<T> Clone for TupleView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for TupleView<'_, T> {}

// Views only read immutable bytes.
unsafe impl<T> Send for TupleView<'_, T> {}
unsafe impl<T> Sync for TupleView<'_, T> {}

macro_rules! impl_field_at {
    ([$($all:ident),*]) => {};
    ([$($all:ident),*] $idx:tt $name:ident $(, $rest_idx:tt $rest_name:ident)*) => {
        unsafe impl<$($all: Flat),*> FieldAt<$idx> for ($($all,)*) {
            type Type = $name;

            fn builder(builders: &Self::Builders) -> &$name::Builder {
                &builders.$idx
            }

            fn builder_mut(builders: &mut Self::Builders) -> &mut $name::Builder {
                &mut builders.$idx
            }
        }

        impl_field_at!([$($all),*] $($rest_idx $rest_name),*);
    };
}

macro_rules! impl_tuple_fields {
    ($arity:expr; $($idx:tt : $name:ident),*) => {
        unsafe impl<$($name: Flat),*> TupleFields for ($($name,)*) {
            type Builders = ($($name::Builder,)*);

            const ARITY: usize = $arity;
            const ALIGN: usize = record_align(&[$(field_align::<$name>()),*]);
            const SIZE: usize = record_size(
                [$(slot_align::<$name>()),*],
                [$(slot_size::<$name>()),*],
                Self::ALIGN,
            );
            const IS_TRIVIAL: bool = true $(&& $name::IS_TRIVIAL)*;
            const OFFSETS: &'static [usize] = &record_offsets(
                [$(slot_align::<$name>()),*],
                [$(slot_size::<$name>()),*],
            );

            fn new_builders() -> Self::Builders {
                ($($name::new_builder(),)*)
            }

            #[allow(unused_variables, unused_mut)]
            fn measure(builders: &Self::Builders, cursor: usize) -> Result<usize, FinishError> {
                let mut cursor = cursor;
                $(cursor = measure_slot::<$name>(&builders.$idx, cursor)?;)*
                Ok(cursor)
            }

            #[allow(unused_variables)]
            fn write(
                builders: &Self::Builders,
                w: &mut Writer<'_>,
                at: usize,
            ) -> Result<(), FinishError> {
                $(write_slot::<$name>(&builders.$idx, w, at + Self::OFFSETS[$idx])?;)*
                Ok(())
            }
        }

        impl_field_at!([$($name),*] $($idx $name),*);
    };
}

impl_tuple_fields!(0;);
impl_tuple_fields!(1; 0: A);
impl_tuple_fields!(2; 0: A, 1: B);
impl_tuple_fields!(3; 0: A, 1: B, 2: C);
impl_tuple_fields!(4; 0: A, 1: B, 2: C, 3: D);
impl_tuple_fields!(5; 0: A, 1: B, 2: C, 3: D, 4: E);
impl_tuple_fields!(6; 0: A, 1: B, 2: C, 3: D, 4: E, 5: F);
impl_tuple_fields!(7; 0: A, 1: B, 2: C, 3: D, 4: E, 5: F, 6: G);
impl_tuple_fields!(8; 0: A, 1: B, 2: C, 3: D, 4: E, 5: F, 6: G, 7: H);
