use crate::bytes;
use crate::Flat;

/// Read handle for a `T` inside a finalized buffer.
///
/// For scalars this is a plain reference into the buffer; for records and sequences it is a
/// `Copy` handle holding only an address. Either way it borrows the buffer for `'a`.
pub type View<'a, T> = <T as Flat>::Ref<'a>;

/// Decodes the slot at `slot`: in place for a trivial `F`, through the stored address otherwise.
///
/// # Safety
///
/// `slot` must be a slot for `F` written by the finalize pass, inside a buffer alive for `'a`.
pub unsafe fn read_slot<'a, F: Flat>(slot: *const u8) -> View<'a, F> {
    if F::IS_TRIVIAL {
        F::read(slot)
    } else {
        F::read(bytes::read_pointer(slot))
    }
}
