//! # Flat layout
//!
//! A [`Builder`] stages a value of a [`Flat`] type as a tree of nodes, then [`Builder::finish`]
//! serializes the tree into one contiguous, aligned [`FlatBuffer`]. The buffer is read back in
//! place through views, without parsing or copying.
//!
//! The two composites are [`Tuple`] (fixed-arity record) and [`Vector`] (variable-length
//! sequence). Scalars are plain-old-data types registered with [`flat_scalar!`].
//!
//! A type is *trivial* iff no `Vector` is reachable from it. Trivial values are stored inline
//! in their parent's slot; non-trivial ones are stored out of line and the slot holds their
//! absolute address. Byte order is host-native, so a buffer is only meaningful inside the
//! process that built it.
//!
//! The below pseudocode depicts the buffer for `Tuple<(u16, Vector<Vector<u8>>)>`
//! where the outer vector holds two inner vectors of lengths 1 and 3.
//!
//! ```text
//! struct Buffer {                         // align 8
//!     root: Tuple {
//!         field_0:        u16,            // offset 0
//!         padding:        [u8; 6],
//!         field_1:        u64,            // offset 8, address of `outer`
//!     },
//!     outer: Vector {                     // offset 16
//!         element_count:  u32,            // 2
//!         padding:        [u8; 4],
//!         slots:          [u64; 2],       // addresses of `inner_0`, `inner_1`
//!     },
//!     inner_0: Vector {                   // offset 40
//!         element_count:  u32,            // 1
//!         slots:          [u8; 1],
//!     },
//!     padding:            [u8; 3],
//!     inner_1: Vector {                   // offset 48
//!         element_count:  u32,            // 3
//!         slots:          [u8; 3],
//!     },
//!     padding:            [u8; 1],        // total 56, a multiple of 8
//! }
//! ```
//!
//! Out-of-line regions are placed depth-first in field/element order, each aligned to its own
//! type's alignment. Every padding byte is zero.

#[doc(hidden)]
pub use bytemuck;

mod buffer;
mod builder;
pub mod bytes;
mod error;
mod layout;
pub mod padding;
mod types;
mod view;

pub use buffer::*;
pub use builder::*;
pub use error::*;
pub use layout::*;
pub use types::*;
pub use view::*;
