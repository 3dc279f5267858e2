//! Random-access cursors over contiguous storage.
//!
//! A [`Cursor<T>`] (or its read-only twin [`ConstCursor<T>`]) is a raw position
//! inside a buffer of `T`. It behaves like a C pointer used as an iterator:
//!
//! ```text
//! buffer:  [ a | b | c | d | . | . ]
//!            ▲               ▲
//!          begin            end
//! ```
//!
//! - **Pointer sized**: a cursor is exactly one `usize`, and `Copy`.
//! - **Random access**: `inc`/`dec`, `post_inc`/`post_dec`, `+`/`-` by an `isize`,
//!   and `cursor - cursor` for the signed element distance.
//! - **Ordered by address**: `==`, `<`, `>=`, ... compare the positions, never the
//!   values behind them.
//!
//! # Example
//!
//! ```
//! use dynarray_cursor::Cursor;
//!
//! let mut data = [10, 20, 30, 40];
//! let begin = Cursor::new(data.as_mut_ptr());
//! let end = begin + 4;
//!
//! let mut it = begin;
//! let mut sum = 0;
//! while it != end {
//!     sum += unsafe { *it.get() };
//!     it.inc();
//! }
//! assert_eq!(sum, 100);
//! assert_eq!(end - begin, 4);
//! ```
//!
//! # Gotchas
//!
//! - **No ownership, no lifetime**: a cursor does not borrow the buffer. It stays
//!   valid only until the owner reallocates or shifts the elements it points at.
//!   Every dereference is `unsafe` for that reason.
//! - **No bounds checks**: moving a cursor never dereferences and wraps on
//!   overflow, so computing a position outside the buffer is fine. Reading or
//!   writing through it is undefined behaviour.
//! - **Single thread**: cursors are neither `Send` nor `Sync`.
//! - Zero-sized element types are rejected at compile time; they have no
//!   distinct addresses to walk.

#![no_std]

use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    mem::size_of,
    ops::{Add, AddAssign, Sub, SubAssign},
    ptr,
};

/// Mutable random-access position in a contiguous buffer of `T`.
///
/// See [crate-level docs](crate) for the validity rules.
pub struct Cursor<T> {
    ptr: *mut T,
}

/// Read-only random-access position in a contiguous buffer of `T`.
///
/// Every [`Cursor`] converts into a `ConstCursor` pointing at the same slot.
pub struct ConstCursor<T> {
    ptr: *const T,
}

static_assertions::assert_eq_size!(Cursor<u64>, usize);
static_assertions::assert_eq_size!(ConstCursor<[u8; 3]>, usize);
static_assertions::assert_impl_all!(Cursor<u32>: Copy, Ord, Default);
static_assertions::assert_not_impl_any!(Cursor<u32>: Send, Sync);
static_assertions::assert_not_impl_any!(ConstCursor<u32>: Send, Sync);

macro_rules! cursor_common {
    ($name:ident, $raw:ty, $null:path) => {
        impl<T> $name<T> {
            /// Wraps a raw element pointer.
            #[inline(always)]
            pub const fn new(ptr: $raw) -> Self {
                const {
                    assert!(size_of::<T>() != 0, "cursors over zero-sized types are not supported")
                };
                Self { ptr }
            }

            /// The null position, equal only to other null positions.
            #[inline(always)]
            pub const fn null() -> Self {
                Self::new($null())
            }

            #[inline(always)]
            pub const fn as_ptr(self) -> $raw {
                self.ptr
            }

            #[inline(always)]
            pub fn is_null(self) -> bool {
                self.ptr.is_null()
            }

            /// Moves one element forward and returns the moved cursor.
            #[inline(always)]
            pub fn inc(&mut self) -> &mut Self {
                self.ptr = self.ptr.wrapping_add(1);
                self
            }

            /// Moves one element forward and returns the position before the move.
            #[inline(always)]
            pub fn post_inc(&mut self) -> Self {
                let prev = *self;
                self.inc();
                prev
            }

            /// Moves one element backward and returns the moved cursor.
            #[inline(always)]
            pub fn dec(&mut self) -> &mut Self {
                self.ptr = self.ptr.wrapping_sub(1);
                self
            }

            /// Moves one element backward and returns the position before the move.
            #[inline(always)]
            pub fn post_dec(&mut self) -> Self {
                let prev = *self;
                self.dec();
                prev
            }

            /// Signed distance in elements from `origin` to `self`.
            ///
            /// Works on unrelated positions too (it only looks at addresses); the
            /// result is truncated towards zero when the byte distance is not a
            /// whole number of elements.
            #[inline]
            pub fn offset_from(self, origin: Self) -> isize {
                let bytes = (self.ptr.addr() as isize).wrapping_sub(origin.ptr.addr() as isize);
                bytes / size_of::<T>() as isize
            }

            /// Whether `self` sits on an element boundary counted from `origin`.
            #[inline]
            pub fn is_aligned_with(self, origin: Self) -> bool {
                let bytes = (self.ptr.addr() as isize).wrapping_sub(origin.ptr.addr() as isize);
                bytes % size_of::<T>() as isize == 0
            }

            /// Dereferences the cursor.
            ///
            /// # Safety
            ///
            /// The cursor must point at a live element that is not mutably
            /// aliased for the whole of `'a`.
            #[inline(always)]
            pub unsafe fn get<'a>(self) -> &'a T {
                // SAFETY: guaranteed by the caller.
                unsafe { &*self.ptr }
            }

            /// Dereferences the element `n` positions away, like `cursor[n]`.
            ///
            /// # Safety
            ///
            /// Same as [`get`](Self::get), for the slot at `self + n`.
            #[inline(always)]
            pub unsafe fn at<'a>(self, n: isize) -> &'a T {
                // SAFETY: guaranteed by the caller.
                unsafe { &*self.ptr.wrapping_offset(n) }
            }
        }

        impl<T> Clone for $name<T> {
            fn clone(&self) -> Self {
                *self
            }
        }
        impl<T> Copy for $name<T> {}

        impl<T> Default for $name<T> {
            fn default() -> Self {
                Self::null()
            }
        }

        impl<T> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.ptr).finish()
            }
        }

        impl<T> PartialEq for $name<T> {
            fn eq(&self, other: &Self) -> bool {
                self.ptr.addr() == other.ptr.addr()
            }
        }
        impl<T> Eq for $name<T> {}

        impl<T> PartialOrd for $name<T> {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }
        impl<T> Ord for $name<T> {
            fn cmp(&self, other: &Self) -> Ordering {
                self.ptr.addr().cmp(&other.ptr.addr())
            }
        }

        impl<T> Hash for $name<T> {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.ptr.addr().hash(state);
            }
        }

        impl<T> Add<isize> for $name<T> {
            type Output = Self;
            #[inline(always)]
            fn add(self, n: isize) -> Self {
                Self::new(self.ptr.wrapping_offset(n))
            }
        }

        impl<T> Sub<isize> for $name<T> {
            type Output = Self;
            #[inline(always)]
            fn sub(self, n: isize) -> Self {
                Self::new(self.ptr.wrapping_offset(n.wrapping_neg()))
            }
        }

        impl<T> AddAssign<isize> for $name<T> {
            #[inline(always)]
            fn add_assign(&mut self, n: isize) {
                *self = *self + n;
            }
        }

        impl<T> SubAssign<isize> for $name<T> {
            #[inline(always)]
            fn sub_assign(&mut self, n: isize) {
                *self = *self - n;
            }
        }

        impl<T> Sub for $name<T> {
            type Output = isize;
            #[inline(always)]
            fn sub(self, origin: Self) -> isize {
                self.offset_from(origin)
            }
        }
    };
}

cursor_common!(Cursor, *mut T, ptr::null_mut);
cursor_common!(ConstCursor, *const T, ptr::null);

impl<T> Cursor<T> {
    /// Mutably dereferences the cursor.
    ///
    /// # Safety
    ///
    /// The cursor must point at a live element that no other reference
    /// aliases for the whole of `'a`.
    #[inline(always)]
    pub unsafe fn get_mut<'a>(self) -> &'a mut T {
        // SAFETY: guaranteed by the caller.
        unsafe { &mut *self.ptr }
    }

    /// Mutably dereferences the element `n` positions away.
    ///
    /// # Safety
    ///
    /// Same as [`get_mut`](Self::get_mut), for the slot at `self + n`.
    #[inline(always)]
    pub unsafe fn at_mut<'a>(self, n: isize) -> &'a mut T {
        // SAFETY: guaranteed by the caller.
        unsafe { &mut *self.ptr.wrapping_offset(n) }
    }

    #[inline(always)]
    pub const fn as_const(self) -> ConstCursor<T> {
        ConstCursor::new(self.ptr.cast_const())
    }
}

impl<T> From<Cursor<T>> for ConstCursor<T> {
    fn from(cursor: Cursor<T>) -> Self {
        cursor.as_const()
    }
}

impl<T> PartialEq<ConstCursor<T>> for Cursor<T> {
    fn eq(&self, other: &ConstCursor<T>) -> bool {
        self.as_const() == *other
    }
}

impl<T> PartialEq<Cursor<T>> for ConstCursor<T> {
    fn eq(&self, other: &Cursor<T>) -> bool {
        *self == other.as_const()
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    extern crate std;

    use alloc::format;
    use alloc::vec::Vec;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    use super::{ConstCursor, Cursor};

    // ===================
    // Traversal
    // ===================

    #[test]
    fn inc_and_dec_walk_the_buffer() {
        let mut data = [1, 2, 3];
        let begin = Cursor::new(data.as_mut_ptr());
        let mut it = begin;

        assert_eq!(unsafe { *it.get() }, 1);
        it.inc();
        assert_eq!(unsafe { *it.get() }, 2);
        it.inc().inc();
        assert_eq!(it - begin, 3);
        it.dec();
        assert_eq!(unsafe { *it.get() }, 3);
    }

    #[test]
    fn post_inc_returns_previous_position() {
        let data = [7, 8];
        let mut it = ConstCursor::new(data.as_ptr());

        let before = it.post_inc();
        assert_eq!(unsafe { *before.get() }, 7);
        assert_eq!(unsafe { *it.get() }, 8);

        let before = it.post_dec();
        assert_eq!(unsafe { *before.get() }, 8);
        assert_eq!(unsafe { *it.get() }, 7);
    }

    #[test]
    fn collect_between_begin_and_end() {
        let data = [3u8, 1, 4, 1, 5];
        let begin = ConstCursor::new(data.as_ptr());
        let end = begin + data.len() as isize;

        let mut out = Vec::new();
        let mut it = begin;
        while it < end {
            out.push(unsafe { *it.post_inc().get() });
        }
        assert_eq!(out, data);
    }

    // ===================
    // Arithmetic
    // ===================

    #[test]
    fn offset_arithmetic() {
        let data = [0i64, 10, 20, 30, 40];
        let begin = ConstCursor::new(data.as_ptr());

        let mut it = begin + 4;
        assert_eq!(unsafe { *it.get() }, 40);
        it -= 3;
        assert_eq!(unsafe { *it.get() }, 10);
        it += 1;
        assert_eq!(unsafe { *it.get() }, 20);
        assert_eq!(unsafe { *(it - 2).get() }, 0);

        assert_eq!(it - begin, 2);
        assert_eq!(begin - it, -2);
    }

    #[test]
    fn indexed_dereference() {
        let data = [5u16, 6, 7];
        let mid = ConstCursor::new(data.as_ptr()) + 1;
        assert_eq!(unsafe { *mid.at(-1) }, 5);
        assert_eq!(unsafe { *mid.at(0) }, 6);
        assert_eq!(unsafe { *mid.at(1) }, 7);
    }

    #[test]
    fn out_of_range_positions_can_be_computed() {
        let data = [1u32, 2];
        let begin = ConstCursor::new(data.as_ptr());
        let before = begin - 1;
        let past = begin + 100;
        assert!(before < begin);
        assert!(past > begin);
        assert_eq!(past - before, 101);
    }

    #[test]
    fn alignment_with_origin() {
        let data = [0u32; 4];
        let begin = ConstCursor::new(data.as_ptr());
        let skewed = ConstCursor::new(data.as_ptr().cast::<u8>().wrapping_add(2).cast::<u32>());
        assert!((begin + 3).is_aligned_with(begin));
        assert!(!skewed.is_aligned_with(begin));
    }

    // ===================
    // Mutation through Cursor
    // ===================

    #[test]
    fn write_through_cursor() {
        let mut data = [1, 2, 3];
        let begin = Cursor::new(data.as_mut_ptr());
        unsafe {
            *begin.get_mut() = 10;
            *begin.at_mut(2) = 30;
        }
        assert_eq!(data, [10, 2, 30]);
    }

    #[test]
    fn member_access_through_pointer() {
        struct Point {
            x: i32,
            y: i32,
        }
        let points = [Point { x: 1, y: 2 }, Point { x: 3, y: 4 }];
        let it = ConstCursor::new(points.as_ptr()) + 1;
        unsafe {
            assert_eq!((*it.as_ptr()).x, 3);
            assert_eq!((*it.as_ptr()).y, 4);
        }
    }

    // ===================
    // Comparison
    // ===================

    #[test]
    fn ordering_follows_addresses() {
        let data = [0u8; 3];
        let a = ConstCursor::new(data.as_ptr());
        let b = a + 1;

        assert!(a == a);
        assert!(a != b);
        assert!(a < b);
        assert!(b > a);
        assert!(a <= a && a <= b);
        assert!(b >= b && b >= a);
    }

    #[test]
    fn mutable_and_const_cursors_compare() {
        let mut data = [1, 2];
        let it = Cursor::new(data.as_mut_ptr()) + 1;
        let c: ConstCursor<i32> = it.into();
        assert!(it == c);
        assert!(c == it);
        assert!(c != it.as_const() - 1);
    }

    #[test]
    fn default_is_null() {
        let it: Cursor<u8> = Cursor::default();
        assert!(it.is_null());
        assert_eq!(it, Cursor::null());
    }

    #[test]
    fn hash_by_position() {
        let data = [9u8; 4];
        let begin = ConstCursor::new(data.as_ptr());
        let set: HashSet<_> = [begin, begin + 1, begin + 1, begin + 2].into_iter().collect();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn debug_names_the_cursor() {
        let it: ConstCursor<u8> = ConstCursor::null();
        assert!(format!("{:?}", it).starts_with("ConstCursor("));
    }
}
