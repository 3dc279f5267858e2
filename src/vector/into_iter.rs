use core::{
    fmt,
    iter::FusedIterator,
    marker::PhantomData,
    mem::ManuallyDrop,
    ptr::{self, NonNull},
    slice,
};

use allocator_api2::alloc::Global;

use super::{
    Vector,
    staging::{Block, destroy_span},
};
use crate::allocator::ElementAllocator;

/// Owning iterator over the values of a [`Vector`].
///
/// Values not consumed are destroyed through the allocator when the iterator
/// is dropped, and the block is released.
pub struct IntoIter<T, A: ElementAllocator<T> = Global> {
    ptr: NonNull<T>,
    cap: usize,
    // Live values are in `[front, back)`.
    front: usize,
    back: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

// SAFETY: same ownership story as `Vector`.
unsafe impl<T: Send, A: ElementAllocator<T> + Send> Send for IntoIter<T, A> {}
// SAFETY: `&IntoIter` only exposes `&T`.
unsafe impl<T: Sync, A: ElementAllocator<T> + Sync> Sync for IntoIter<T, A> {}

impl<T, A: ElementAllocator<T>> IntoIter<T, A> {
    /// The values not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[front, back)` are live.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr().add(self.front), self.back - self.front) }
    }
}

impl<T, A: ElementAllocator<T>> IntoIterator for Vector<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        let this = ManuallyDrop::new(self);
        IntoIter {
            ptr: this.ptr,
            cap: this.cap,
            front: 0,
            back: this.len,
            // SAFETY: `this` is never dropped, so the allocator moves exactly once.
            alloc: unsafe { ptr::read(&this.alloc) },
            _marker: PhantomData,
        }
    }
}

impl<T, A: ElementAllocator<T>> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        // SAFETY: `front` is live and stops being counted right away.
        let value = unsafe { ptr::read(self.ptr.as_ptr().add(self.front)) };
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl<T, A: ElementAllocator<T>> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: `back` was live and is no longer counted.
        Some(unsafe { ptr::read(self.ptr.as_ptr().add(self.back)) })
    }
}

impl<T, A: ElementAllocator<T>> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: ElementAllocator<T>> FusedIterator for IntoIter<T, A> {}

impl<T: fmt::Debug, A: ElementAllocator<T>> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, A: ElementAllocator<T>> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        let (front, back) = (self.front, self.back);
        self.front = back;
        let _block = Block::new(&self.alloc, self.ptr, self.cap);
        // SAFETY: `[front, back)` were never yielded and are not counted any more.
        unsafe { destroy_span(&self.alloc, self.ptr.add(front), back - front) };
    }
}
