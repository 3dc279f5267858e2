use core::ptr;

use dynarray_cursor::{ConstCursor, Cursor};

use super::{Vector, staging::Staging};
use crate::{
    allocator::{ElementAllocator, max_len},
    error::{Error, Result},
};

impl<T, A: ElementAllocator<T>> Vector<T, A> {
    /// Destroys every value and releases the storage.
    ///
    /// Unlike `alloc::vec::Vec::clear`, the capacity drops to zero.
    pub fn clear(&mut self) {
        self.truncate_to(0);
        self.release();
    }

    /// Appends `value`, growing to the next power of two when full.
    pub fn push_back(&mut self, value: T) {
        if self.len == self.cap {
            self.grow_to(self.len + 1);
        }
        // SAFETY: `len < cap`, so the slot is allocated and spare.
        unsafe { self.alloc.construct(self.slot(self.len), value) };
        self.len += 1;
    }

    /// Appends the value built by `make` and returns a reference to it.
    ///
    /// `make` runs before any growth, so a panic in it leaves the vector
    /// untouched. The reference points into the vector's own storage.
    pub fn emplace_back(&mut self, make: impl FnOnce() -> T) -> &mut T {
        self.push_back(make());
        let last = self.len - 1;
        // SAFETY: `last` was just constructed; the borrow is tied to `&mut self`.
        unsafe { &mut *self.slot(last).as_ptr() }
    }

    /// Destroys the last value. Does nothing when empty.
    pub fn pop_back(&mut self) {
        if let Some(last) = self.len.checked_sub(1) {
            self.truncate_to(last);
        }
    }

    /// Inserts `value` before `pos` and returns a cursor to it.
    ///
    /// `pos` must lie within `[begin, end]`, otherwise
    /// [`Error::InvalidPosition`]. Cursors taken before the call are invalid
    /// afterwards; use the returned one.
    ///
    /// On any error the vector is unchanged and `value` is dropped.
    pub fn insert(&mut self, pos: impl Into<ConstCursor<T>>, value: T) -> Result<Cursor<T>> {
        let mut value = Some(value);
        self.insert_from(pos.into(), 1, move || value.take())
    }

    /// Inserts `count` clones of `value` before `pos`.
    pub fn insert_n(
        &mut self,
        pos: impl Into<ConstCursor<T>>,
        count: usize,
        value: &T,
    ) -> Result<Cursor<T>>
    where
        T: Clone,
    {
        self.insert_from(pos.into(), count, || Some(value.clone()))
    }

    /// Inserts the values of an exact-size iterator before `pos`.
    ///
    /// At most `len()` items (as reported up front) are taken; an iterator
    /// that ends early inserts what it produced. Room for the reported length
    /// is secured first, so a short iterator may still have moved the vector
    /// to a larger block, unless it produced nothing at all.
    pub fn insert_iter<I>(&mut self, pos: impl Into<ConstCursor<T>>, values: I) -> Result<Cursor<T>>
    where
        I: IntoIterator<Item = T, IntoIter: ExactSizeIterator>,
    {
        let mut values = values.into_iter();
        let count = values.len();
        self.insert_from(pos.into(), count, move || values.next())
    }

    /// Inserts clones of `values` before `pos`.
    pub fn insert_slice(
        &mut self,
        pos: impl Into<ConstCursor<T>>,
        values: &[T],
    ) -> Result<Cursor<T>>
    where
        T: Clone,
    {
        let mut values = values.iter();
        let count = values.len();
        self.insert_from(pos.into(), count, move || values.next().cloned())
    }

    /// Builds a value with `make` straight into its slot before `pos`.
    ///
    /// `make` is only called once the position is validated and room is
    /// secured; on an error it is dropped without being called.
    pub fn emplace(
        &mut self,
        pos: impl Into<ConstCursor<T>>,
        make: impl FnOnce() -> T,
    ) -> Result<Cursor<T>> {
        let mut make = Some(make);
        self.insert_from(pos.into(), 1, move || make.take().map(|make| make()))
    }

    fn insert_from(
        &mut self,
        pos: ConstCursor<T>,
        count: usize,
        next: impl FnMut() -> Option<T>,
    ) -> Result<Cursor<T>> {
        let Some(offset) = self.locate(pos) else {
            return Err(Error::InvalidPosition {
                offset: pos.offset_from(self.cbegin()),
                len: self.len,
            });
        };
        self.splice_in(offset, count, next)?;
        Ok(self.cursor_at(offset))
    }

    /// Removes the value at `pos`.
    ///
    /// Does nothing unless `pos` points at a live value. Capacity is kept.
    pub fn erase(&mut self, pos: impl Into<ConstCursor<T>>) {
        match self.locate(pos.into()) {
            Some(offset) if offset < self.len => self.remove_span(offset, 1),
            _ => {}
        }
    }

    /// Removes the values in `[first, last)`.
    ///
    /// Does nothing unless both ends lie within `[begin, end]` and
    /// `first <= last`. Capacity is kept.
    pub fn erase_range(
        &mut self,
        first: impl Into<ConstCursor<T>>,
        last: impl Into<ConstCursor<T>>,
    ) {
        let (Some(from), Some(to)) = (self.locate(first.into()), self.locate(last.into())) else {
            return;
        };
        if from < to {
            self.remove_span(from, to - from);
        }
    }

    /// Resizes to `count`, filling new slots with `T::default()`.
    pub fn resize(&mut self, count: usize)
    where
        T: Default,
    {
        self.resize_with(count, T::default);
    }

    /// Resizes to `count`, filling new slots with clones of `value`.
    pub fn resize_with_value(&mut self, count: usize, value: &T)
    where
        T: Clone,
    {
        self.resize_with(count, || value.clone());
    }

    /// Resizes to `count`, filling new slots with values from `make`.
    ///
    /// Shrinking destroys the tail and keeps the capacity. Growing past the
    /// capacity moves to a block of the next power of two `>= count`.
    pub fn resize_with(&mut self, count: usize, mut make: impl FnMut() -> T) {
        if count <= self.len {
            self.truncate_to(count);
            return;
        }
        let extra = count - self.len;
        if let Err(err) = self.splice_in(self.len, extra, || Some(make())) {
            err.raise();
        }
    }

    /// Shifts the tail left over `[offset, offset + count)` and destroys the
    /// removed values.
    fn remove_span(&mut self, offset: usize, count: usize) {
        debug_assert!(offset + count <= self.len);
        self.as_mut_slice()[offset..].rotate_left(count);
        self.truncate_to(self.len - count);
    }

    /// Inserts up to `count` values from `next` at `offset`; returns how many.
    ///
    /// New values are staged before anything moves: into the spare tail when
    /// they fit, into a fresh block otherwise. Only after every value exists
    /// are the old ones shifted (or relocated around them) and the old block
    /// released, so a panic from `next` leaves `self` unchanged.
    pub(super) fn splice_in(
        &mut self,
        offset: usize,
        count: usize,
        next: impl FnMut() -> Option<T>,
    ) -> Result<usize> {
        debug_assert!(offset <= self.len);
        if count == 0 {
            return Ok(0);
        }
        let required = self.len.checked_add(count).ok_or(Error::CapacityExceeded {
            requested: usize::MAX,
            max: max_len::<T>(),
        })?;

        if required <= self.cap {
            // SAFETY: `[len, cap)` is spare and nothing else touches it while
            // the values are staged.
            let mut staged = unsafe { Staging::borrow(&self.alloc, self.ptr, self.len) };
            // SAFETY: `len + count <= cap`.
            unsafe { staged.fill(count, next) };
            let (_, written) = staged.commit();
            self.len += written;
            self.as_mut_slice()[offset..].rotate_right(written);
            return Ok(written);
        }

        let new_cap = Self::grown_capacity(required)?;
        let mut staged = Staging::allocate(&self.alloc, new_cap, offset)?;
        // SAFETY: `offset + count <= required <= new_cap`.
        if unsafe { staged.fill(count, next) } == 0 {
            // Nothing arrived; dropping the staging area hands the block back.
            return Ok(0);
        }
        let (new_ptr, written) = staged.commit();
        // SAFETY: the prefix goes before the staged values and the suffix right
        // after them; all within `new_cap`, and the blocks are distinct.
        unsafe {
            let old = self.ptr.as_ptr();
            let new = new_ptr.as_ptr();
            ptr::copy_nonoverlapping(old, new, offset);
            ptr::copy_nonoverlapping(old.add(offset), new.add(offset + written), self.len - offset);
        }
        self.replace_storage(new_ptr, new_cap);
        self.len += written;
        Ok(written)
    }
}
