//! Errors reported by [`Vector`](crate::Vector) operations.
//!
//! Element failures (a panicking `Clone`, `Default`, or constructor closure) are
//! not represented here: they unwind through the container, which restores its
//! previous state before letting the panic continue.

use core::alloc::Layout;

use thiserror::Error;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Checked access (`at`, `front`, `back`) with an index at or past the length.
    #[error("index {index} is out of range for length {len}")]
    OutOfRange { index: usize, len: usize },

    /// A cursor passed to `insert`/`emplace` does not point into `[begin, end]`.
    #[error("position {offset} is outside the container bounds [0, {len}]")]
    InvalidPosition { offset: isize, len: usize },

    /// Requested capacity is larger than `max_size()`.
    #[error("requested capacity {requested} exceeds the maximum of {max}")]
    CapacityExceeded { requested: usize, max: usize },

    /// The allocator could not provide the requested block.
    #[error("allocation of {} bytes (align {}) failed", .layout.size(), .layout.align())]
    AllocFailed { layout: Layout },
}

impl Error {
    /// Escalates an allocation error for operations that cannot return one.
    ///
    /// Mirrors `alloc::vec::Vec`: capacity overflow panics, allocator failure
    /// goes through [`handle_alloc_error`](alloc::alloc::handle_alloc_error).
    #[cold]
    #[track_caller]
    pub(crate) fn raise(self) -> ! {
        match self {
            Error::AllocFailed { layout } => alloc::alloc::handle_alloc_error(layout),
            Error::CapacityExceeded { .. } => panic!("capacity overflow"),
            other => panic!("{other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use core::alloc::Layout;

    use super::Error;

    #[test]
    fn display_messages() {
        assert_eq!(
            Error::OutOfRange { index: 3, len: 3 }.to_string(),
            "index 3 is out of range for length 3"
        );
        assert_eq!(
            Error::InvalidPosition { offset: -1, len: 4 }.to_string(),
            "position -1 is outside the container bounds [0, 4]"
        );
        assert_eq!(
            Error::CapacityExceeded { requested: 10, max: 5 }.to_string(),
            "requested capacity 10 exceeds the maximum of 5"
        );
        let layout = Layout::from_size_align(32, 8).unwrap();
        assert_eq!(
            Error::AllocFailed { layout }.to_string(),
            "allocation of 32 bytes (align 8) failed"
        );
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn raise_capacity_overflow() {
        Error::CapacityExceeded { requested: usize::MAX, max: 1 }.raise();
    }
}
