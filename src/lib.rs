//! A growable, contiguous array over explicitly managed uninitialized storage.
//!
//! Storage, element lifetime and growth are kept in separate modules that
//! share one rule: only the first `len` slots of a block hold live values.

#[macro_use]
mod logging;
#[macro_use]
mod macros;
mod memory;
mod block;
mod lifecycle;
mod growth;
mod error;
mod array;
mod iter;
mod traits;

pub use array::DynArray;
pub use error::{AccessError, AllocError, PushError};
pub use growth::{GROWTH_FACTOR, INITIAL_CAPACITY};
pub use iter::{IntoIter, Iter, IterMut};
pub use traits::CollectDynArray;

#[cfg(test)]
pub mod dropflag;
