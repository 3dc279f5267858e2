//! `Vector<T, A>`: a growable array in one contiguous block.
//!
//! The vector owns a block of `capacity()` slots obtained from its
//! [`ElementAllocator`]. The first `len()` slots hold live values, the rest are
//! uninitialized:
//!
//! ```text
//! ptr ──▶ [ v0 | v1 | v2 | v3 | ·· | ·· | ·· | ·· ]
//!           └────── len ──────┘
//!           └────────────── capacity ──────────────┘
//! ```
//!
//! Growth rounds the required length up to the next power of two and always
//! moves to a new block; the old block is released only once the new one is
//! complete. Operations that construct values (clone, default, closures,
//! iterators) stage them first and roll back on panic, so a failing element
//! leaves the vector as it was.
//!
//! # Cursors
//!
//! [`begin`](Vector::begin)/[`end`](Vector::end) and
//! [`cbegin`](Vector::cbegin)/[`cend`](Vector::cend) hand out raw positions.
//! They do not borrow the vector: any reallocation invalidates all of them, and
//! inserting or erasing invalidates those at or after the affected position.
//!
//! # Threads
//!
//! The vector does no synchronization of its own. Sharing it follows the usual
//! borrow rules (one writer or many readers); cursors never cross threads.

mod into_iter;
mod modify;
mod staging;
mod traits;

pub use into_iter::IntoIter;

use core::{
    marker::PhantomData,
    mem::{self, size_of},
    ptr::{self, NonNull},
    slice,
};

use allocator_api2::alloc::Global;
use dynarray_cursor::{ConstCursor, Cursor};

use crate::{
    allocator::{ElementAllocator, max_len},
    error::{Error, Result},
};
use staging::{Block, destroy_span};

/// A contiguous growable array with a pluggable allocator.
///
/// See the [module docs](self) for the storage model.
pub struct Vector<T, A: ElementAllocator<T> = Global> {
    ptr: NonNull<T>,
    len: usize,
    cap: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

static_assertions::assert_eq_size!(Vector<u8>, [usize; 3]);
static_assertions::assert_eq_size!(Vector<u64>, [usize; 3]);

// SAFETY: the vector owns its values and its allocator; no shared state.
unsafe impl<T: Send, A: ElementAllocator<T> + Send> Send for Vector<T, A> {}
// SAFETY: `&Vector` only hands out `&T` and `&A`.
unsafe impl<T: Sync, A: ElementAllocator<T> + Sync> Sync for Vector<T, A> {}

impl<T> Vector<T> {
    /// Creates an empty vector on the global allocator. Does not allocate.
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates a vector holding `count` clones of `value`.
    pub fn from_elem(count: usize, value: &T) -> Self
    where
        T: Clone,
    {
        Self::from_elem_in(count, value, Global)
    }

    /// Creates a vector holding `count` default values.
    pub fn with_len(count: usize) -> Self
    where
        T: Default,
    {
        Self::with_len_in(count, Global)
    }

    /// Creates a vector from an iterator that knows its length up front.
    pub fn from_iter_exact<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T, IntoIter: ExactSizeIterator>,
    {
        Self::from_iter_exact_in(values, Global)
    }

    /// Creates a vector holding clones of `values`.
    pub fn from_slice(values: &[T]) -> Self
    where
        T: Clone,
    {
        Self::from_slice_in(values, Global)
    }
}

impl<T, A: ElementAllocator<T>> Vector<T, A> {
    /// Creates an empty vector on `alloc`. Does not allocate.
    pub const fn new_in(alloc: A) -> Self {
        const { assert!(size_of::<T>() != 0, "Vector does not support zero-sized element types") };
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    pub fn from_elem_in(count: usize, value: &T, alloc: A) -> Self
    where
        T: Clone,
    {
        let mut vector = Self::with_room_in(count, alloc);
        vector.resize_with(count, || value.clone());
        vector
    }

    pub fn with_len_in(count: usize, alloc: A) -> Self
    where
        T: Default,
    {
        let mut vector = Self::with_room_in(count, alloc);
        vector.resize_with(count, T::default);
        vector
    }

    pub fn from_iter_exact_in<I>(values: I, alloc: A) -> Self
    where
        I: IntoIterator<Item = T, IntoIter: ExactSizeIterator>,
    {
        let values = values.into_iter();
        let mut vector = Self::with_room_in(values.len(), alloc);
        for value in values {
            vector.push_back(value);
        }
        vector
    }

    pub fn from_slice_in(values: &[T], alloc: A) -> Self
    where
        T: Clone,
    {
        Self::from_iter_exact_in(values.iter().cloned(), alloc)
    }

    /// Empty vector with room for `count` values under the growth policy.
    fn with_room_in(count: usize, alloc: A) -> Self {
        let mut vector = Self::new_in(alloc);
        if count > 0 {
            let result = Self::grown_capacity(count).and_then(|cap| vector.reallocate(cap));
            if let Err(err) = result {
                err.raise();
            }
        }
        vector
    }

    // ===================
    // Element access
    // ===================

    /// Checked access: [`Error::OutOfRange`] when `index >= len()`.
    pub fn at(&self, index: usize) -> Result<&T> {
        let len = self.len;
        self.as_slice().get(index).ok_or(Error::OutOfRange { index, len })
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;
        self.as_mut_slice().get_mut(index).ok_or(Error::OutOfRange { index, len })
    }

    /// First element, or [`Error::OutOfRange`] when empty.
    pub fn front(&self) -> Result<&T> {
        self.at(0)
    }

    pub fn front_mut(&mut self) -> Result<&mut T> {
        self.at_mut(0)
    }

    /// Last element, or [`Error::OutOfRange`] when empty.
    pub fn back(&self) -> Result<&T> {
        match self.len.checked_sub(1) {
            Some(last) => self.at(last),
            None => Err(Error::OutOfRange { index: 0, len: 0 }),
        }
    }

    pub fn back_mut(&mut self) -> Result<&mut T> {
        match self.len.checked_sub(1) {
            Some(last) => self.at_mut(last),
            None => Err(Error::OutOfRange { index: 0, len: 0 }),
        }
    }

    /// Raw pointer to the buffer, null when nothing is allocated.
    ///
    /// Dangles after the next reallocation.
    pub fn data(&self) -> *const T {
        if self.cap == 0 { ptr::null() } else { self.ptr.as_ptr() }
    }

    pub fn data_mut(&mut self) -> *mut T {
        if self.cap == 0 { ptr::null_mut() } else { self.ptr.as_ptr() }
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are live; `ptr` is dangling but aligned
        // when `len == 0`.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, and `&mut self` makes the borrow unique.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    // ===================
    // Cursors
    // ===================

    pub fn begin(&mut self) -> Cursor<T> {
        self.cursor_at(0)
    }

    pub fn end(&mut self) -> Cursor<T> {
        self.cursor_at(self.len)
    }

    pub fn cbegin(&self) -> ConstCursor<T> {
        ConstCursor::new(self.ptr.as_ptr().cast_const())
    }

    pub fn cend(&self) -> ConstCursor<T> {
        ConstCursor::new(self.ptr.as_ptr().cast_const().wrapping_add(self.len))
    }

    fn cursor_at(&self, offset: usize) -> Cursor<T> {
        Cursor::new(self.ptr.as_ptr().wrapping_add(offset))
    }

    /// Offset of `pos` if it lies on an element boundary within `[begin, end]`.
    fn locate(&self, pos: ConstCursor<T>) -> Option<usize> {
        let begin = self.cbegin();
        let inside = begin <= pos && pos <= self.cend() && pos.is_aligned_with(begin);
        inside.then(|| pos.offset_from(begin) as usize)
    }

    // ===================
    // Capacity
    // ===================

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Upper bound on `len()` for this element type, independent of memory.
    pub fn max_size(&self) -> usize {
        max_len::<T>()
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Makes room for exactly `new_cap` values.
    ///
    /// Does nothing when the capacity is already large enough. Unlike growth
    /// through insertion, the capacity is not rounded up.
    pub fn reserve(&mut self, new_cap: usize) -> Result<()> {
        if new_cap <= self.cap {
            return Ok(());
        }
        let max = self.max_size();
        if new_cap > max {
            return Err(Error::CapacityExceeded { requested: new_cap, max });
        }
        self.reallocate(new_cap)
    }

    /// Moves the values into a block of exactly `len()` slots.
    ///
    /// Best effort: if the allocator refuses the smaller block, the current one
    /// is kept as is.
    pub fn shrink_to_fit(&mut self) {
        if self.cap == self.len {
            return;
        }
        if self.len == 0 {
            self.release();
            return;
        }
        if let Err(err) = self.reallocate(self.len) {
            tracing::debug!(
                %err,
                len = self.len,
                capacity = self.cap,
                "shrink_to_fit kept the current buffer"
            );
        }
    }

    /// Smallest power of two `>= required` (0 for 0), capped at `max_len`.
    fn grown_capacity(required: usize) -> Result<usize> {
        let max = max_len::<T>();
        if required > max {
            return Err(Error::CapacityExceeded { requested: required, max });
        }
        Ok(if required == 0 { 0 } else { required.next_power_of_two().min(max) })
    }

    /// Grows to fit `required` values or escalates the failure.
    #[cold]
    fn grow_to(&mut self, required: usize) {
        let result = Self::grown_capacity(required).and_then(|cap| self.reallocate(cap));
        if let Err(err) = result {
            err.raise();
        }
    }

    /// Moves the live values into a fresh block of `new_cap` slots.
    fn reallocate(&mut self, new_cap: usize) -> Result<()> {
        debug_assert!(new_cap > 0 && new_cap >= self.len);
        let new_ptr = self.alloc.allocate(new_cap)?;
        // SAFETY: both blocks hold at least `len` slots and cannot overlap.
        unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), self.len) };
        self.replace_storage(new_ptr, new_cap);
        Ok(())
    }

    /// Adopts `ptr` as storage, releasing the old block without destroying
    /// anything in it (its values must have been moved out already).
    fn replace_storage(&mut self, ptr: NonNull<T>, cap: usize) {
        tracing::trace!(from = self.cap, to = cap, len = self.len, "moved to a new buffer");
        if self.cap != 0 {
            // SAFETY: the old block came from `allocate(self.cap)`.
            unsafe { self.alloc.deallocate(self.ptr, self.cap) };
        }
        self.ptr = ptr;
        self.cap = cap;
    }

    /// Releases the (already emptied) block.
    fn release(&mut self) {
        debug_assert_eq!(self.len, 0);
        if self.cap != 0 {
            tracing::trace!(capacity = self.cap, "released buffer");
            // SAFETY: the block came from `allocate(self.cap)`.
            unsafe { self.alloc.deallocate(self.ptr, self.cap) };
        }
        self.ptr = NonNull::dangling();
        self.cap = 0;
    }

    /// Destroys the values past `new_len`.
    ///
    /// The length drops first. If a destructor panics, the remaining values
    /// are still destroyed while unwinding and the block stays owned.
    fn truncate_to(&mut self, new_len: usize) {
        let old_len = self.len;
        if new_len >= old_len {
            return;
        }
        self.len = new_len;
        // SAFETY: `[new_len, old_len)` were live and are no longer counted.
        unsafe { destroy_span(&self.alloc, self.slot(new_len), old_len - new_len) };
    }

    #[inline(always)]
    fn slot(&self, index: usize) -> NonNull<T> {
        debug_assert!(index <= self.cap);
        // SAFETY: `index` is within (or one past) the block.
        unsafe { self.ptr.add(index) }
    }

    // ===================
    // Ownership
    // ===================

    /// Moves the contents out, leaving `self` empty with no storage.
    ///
    /// The returned vector owns the block; `self` keeps a clone of the
    /// allocator and can be dropped or reused safely.
    pub fn take(&mut self) -> Self {
        let empty = Self::new_in(self.alloc.clone());
        mem::replace(self, empty)
    }

    /// Exchanges contents, capacities and allocators with `other`.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

impl<T, A: ElementAllocator<T>> Drop for Vector<T, A> {
    fn drop(&mut self) {
        let len = mem::replace(&mut self.len, 0);
        let _block = Block::new(&self.alloc, self.ptr, self.cap);
        // SAFETY: the first `len` slots are live and the vector is going away.
        unsafe { destroy_span(&self.alloc, self.ptr, len) };
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn new_does_not_allocate() {
        let vector: Vector<u32> = Vector::new();
        assert_eq!(vector.len(), 0);
        assert_eq!(vector.capacity(), 0);
        assert!(vector.data().is_null());
    }

    #[test]
    fn grown_capacity_rounds_to_powers_of_two() {
        let caps: Vec<usize> = [0, 1, 2, 3, 5, 8, 9, 1000]
            .iter()
            .map(|&n| Vector::<u8>::grown_capacity(n).unwrap())
            .collect();
        assert_eq!(caps, [0, 1, 2, 4, 8, 8, 16, 1024]);
    }

    #[test]
    fn grown_capacity_caps_at_max_len() {
        let max = max_len::<u64>();
        assert_eq!(Vector::<u64>::grown_capacity(max - 1).unwrap(), max);
        assert_eq!(
            Vector::<u64>::grown_capacity(max + 1),
            Err(Error::CapacityExceeded { requested: max + 1, max })
        );
    }

    #[test]
    fn locate_accepts_begin_through_end() {
        let vector = Vector::from_slice(&[1, 2, 3]);
        let begin = vector.cbegin();
        assert_eq!(vector.locate(begin), Some(0));
        assert_eq!(vector.locate(begin + 3), Some(3));
        assert_eq!(vector.locate(begin + 4), None);
        assert_eq!(vector.locate(begin - 1), None);
    }

    #[test]
    fn locate_rejects_misaligned_positions() {
        let vector = Vector::from_slice(&[1u32, 2, 3]);
        let skewed = ConstCursor::new(vector.data().cast::<u8>().wrapping_add(1).cast::<u32>());
        assert_eq!(vector.locate(skewed), None);
    }

    #[test]
    fn locate_on_empty_vector() {
        let vector: Vector<i32> = Vector::new();
        assert_eq!(vector.locate(vector.cbegin()), Some(0));
        assert_eq!(vector.locate(vector.cend()), Some(0));
    }

    #[test]
    fn shrink_to_fit_moves_to_exact_block() {
        crate::test_utils::init_test_logging();

        let mut vector = Vector::from_slice(&[1, 2, 3]);
        vector.reserve(32).unwrap();
        vector.shrink_to_fit();
        assert_eq!(vector.capacity(), 3);
        assert_eq!(vector.as_slice(), &[1, 2, 3]);

        vector.truncate_to(0);
        vector.shrink_to_fit();
        assert_eq!(vector.capacity(), 0);
        assert!(vector.data().is_null());
    }

    #[test]
    fn take_leaves_source_empty() {
        let mut source = Vector::from_slice(&[1, 2, 3]);
        let moved = source.take();
        assert_eq!(moved.as_slice(), &[1, 2, 3]);
        assert_eq!(source.len(), 0);
        assert_eq!(source.capacity(), 0);
        assert!(source.data().is_null());
    }
}
