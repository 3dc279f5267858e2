use core::{mem::ManuallyDrop, ptr::NonNull};

use crate::{allocator::ElementAllocator, error::Result};

/// Slots being filled with new values as one transaction.
///
/// Values are constructed left to right from `start`. Until [`commit`] is
/// called, dropping the staging area (normally during a panic) destroys every
/// value it constructed and, for a fresh block, releases the block too. The
/// container it belongs to is never touched, so a failed fill leaves it exactly
/// as it was.
///
/// [`commit`]: Staging::commit
pub(super) struct Staging<'a, T, A: ElementAllocator<T>> {
    alloc: &'a A,
    ptr: NonNull<T>,
    // Zero when the block belongs to someone else.
    owned_cap: usize,
    start: usize,
    end: usize,
}

impl<'a, T, A: ElementAllocator<T>> Staging<'a, T, A> {
    /// Allocates a fresh block of `cap` slots and stages from `start`.
    pub(super) fn allocate(alloc: &'a A, cap: usize, start: usize) -> Result<Self> {
        debug_assert!(cap > 0 && start <= cap);
        let ptr = alloc.allocate(cap)?;
        Ok(Self {
            alloc,
            ptr,
            owned_cap: cap,
            start,
            end: start,
        })
    }

    /// Stages into the spare slots of an existing block, from `start`.
    ///
    /// # Safety
    ///
    /// Slots from `start` on must be uninitialized, and nothing else may touch
    /// them while the staging area is alive.
    pub(super) unsafe fn borrow(alloc: &'a A, ptr: NonNull<T>, start: usize) -> Self {
        Self {
            alloc,
            ptr,
            owned_cap: 0,
            start,
            end: start,
        }
    }

    /// Constructs up to `count` values pulled from `next`, stopping early when
    /// it runs dry. Returns how many values were staged so far.
    ///
    /// # Safety
    ///
    /// The `count` slots after the last staged one must be in bounds.
    pub(super) unsafe fn fill(
        &mut self,
        count: usize,
        mut next: impl FnMut() -> Option<T>,
    ) -> usize {
        let stop = self.end + count;
        while self.end < stop {
            let Some(value) = next() else { break };
            // SAFETY: in bounds per the caller, and not yet constructed.
            unsafe { self.alloc.construct(self.ptr.add(self.end), value) };
            self.end += 1;
        }
        self.end - self.start
    }

    /// Keeps the staged values and hands back the block with their count.
    pub(super) fn commit(self) -> (NonNull<T>, usize) {
        let this = ManuallyDrop::new(self);
        (this.ptr, this.end - this.start)
    }
}

impl<T, A: ElementAllocator<T>> Drop for Staging<'_, T, A> {
    fn drop(&mut self) {
        let _block = Block::new(self.alloc, self.ptr, self.owned_cap);
        // SAFETY: `[start, end)` were constructed here and never handed out.
        unsafe { destroy_span(self.alloc, self.ptr.add(self.start), self.end - self.start) };
    }
}

/// A block that is released when dropped, unwinding included.
///
/// A `cap` of zero means there is nothing to release.
pub(super) struct Block<'a, T, A: ElementAllocator<T>> {
    alloc: &'a A,
    ptr: NonNull<T>,
    cap: usize,
}

impl<'a, T, A: ElementAllocator<T>> Block<'a, T, A> {
    pub(super) fn new(alloc: &'a A, ptr: NonNull<T>, cap: usize) -> Self {
        Self { alloc, ptr, cap }
    }
}

impl<T, A: ElementAllocator<T>> Drop for Block<'_, T, A> {
    fn drop(&mut self) {
        if self.cap != 0 {
            // SAFETY: whoever built the guard handed over a block from `allocate(cap)`.
            unsafe { self.alloc.deallocate(self.ptr, self.cap) };
        }
    }
}

/// Destroys `count` values starting at `ptr`.
///
/// A panicking destructor does not stop the rest from being destroyed: the
/// remaining slots are finished while unwinding, as dropping a slice does.
///
/// # Safety
///
/// The `count` slots from `ptr` must hold live values that nobody uses
/// afterwards.
pub(super) unsafe fn destroy_span<T, A: ElementAllocator<T>>(
    alloc: &A,
    ptr: NonNull<T>,
    count: usize,
) {
    struct Rest<'a, T, A: ElementAllocator<T>> {
        alloc: &'a A,
        ptr: NonNull<T>,
        next: usize,
        count: usize,
    }

    impl<T, A: ElementAllocator<T>> Rest<'_, T, A> {
        fn finish(&mut self) {
            while self.next < self.count {
                // SAFETY: slots from `next` on are still live.
                let slot = unsafe { self.ptr.add(self.next) };
                self.next += 1;
                // SAFETY: `slot` is live and no longer counted.
                unsafe { self.alloc.destroy(slot) };
            }
        }
    }

    impl<T, A: ElementAllocator<T>> Drop for Rest<'_, T, A> {
        fn drop(&mut self) {
            self.finish();
        }
    }

    // If a destructor panics, the guard picks up from the next slot while
    // unwinding.
    let mut rest = Rest { alloc, ptr, next: 0, count };
    rest.finish();
}
