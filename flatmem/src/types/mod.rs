mod tuple;
mod vector;

pub use tuple::*;
pub use vector::*;
