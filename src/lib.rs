//! Dynarray: a contiguous growable array with a pluggable allocator.
//!
//! # Overview
//!
//! [`Vector<T, A>`] keeps its values in one block obtained from an
//! [`ElementAllocator`]. It offers checked access, random-access cursors, and
//! positional insertion and removal. Every operation that builds new values
//! rolls back when building one of them panics.
//!
//! # Quick Start
//!
//! ```
//! use dynarray::{Vector, vector};
//!
//! let mut v = vector![1, 2, 3];
//! v.push_back(4);
//!
//! let pos = v.cbegin() + 1;
//! v.insert(pos, 10).unwrap();
//! assert_eq!(v, [1, 10, 2, 3, 4]);
//!
//! assert!(v.at(5).is_err());
//! assert_eq!(v.capacity(), 8);
//! ```
//!
//! # Allocators
//!
//! Anything implementing [`allocator_api2::alloc::Allocator`] + `Clone` is an
//! element allocator, so arenas work out of the box:
//!
//! ```
//! use bumpalo::Bump;
//! use dynarray::Vector;
//!
//! let arena = Bump::new();
//! let mut v = Vector::new_in(&arena);
//! v.push_back("in the arena");
//! assert_eq!(v.len(), 1);
//! ```
//!
//! Custom allocators can also implement [`ElementAllocator`] directly to hook
//! into how each value is constructed and destroyed.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod allocator;
pub mod error;
mod macros;
mod vector;

pub use allocator::ElementAllocator;
pub use allocator_api2::alloc::Global;
pub use dynarray_cursor::{ConstCursor, Cursor};
pub use error::{Error, Result};
pub use vector::{IntoIter, Vector};
