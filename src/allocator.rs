//! The allocation policy a [`Vector`](crate::Vector) routes its storage through.
//!
//! [`ElementAllocator<T>`] is a capability set: raw block allocation and release
//! for `n` values of `T`, plus construction and destruction of single values in
//! that block. Every [`allocator_api2::alloc::Allocator`] that is `Clone`
//! (`Global`, `&bumpalo::Bump`, ...) gets it for free with the default
//! construct/destroy behaviour; implement it by hand to observe or customise
//! object lifetimes.
//!
//! Relocating live elements into a new block is a bitwise move and does not go
//! through `construct`/`destroy`: the value keeps living, only its address
//! changes.

use core::{alloc::Layout, mem::size_of, ptr::NonNull};

use allocator_api2::alloc::Allocator;

use crate::error::{Error, Result};

/// Allocation, deallocation, construction and destruction of `T` values.
///
/// # Safety
///
/// - `allocate(n)` must return a block valid for reads and writes of `n`
///   properly aligned `T`s, which stays valid until it is passed to
///   `deallocate` with the same `n`.
/// - A clone of an allocator must be able to deallocate blocks from the
///   original, since containers clone their allocator along with their data.
/// - `construct` must leave a valid `T` in the slot; `destroy` must leave the
///   slot uninitialized.
pub unsafe trait ElementAllocator<T>: Clone {
    /// Allocates uninitialized room for `n > 0` values.
    fn allocate(&self, n: usize) -> Result<NonNull<T>>;

    /// Releases a block obtained from `allocate(n)`.
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate(n)` on this allocator (or a clone of it)
    /// with the same `n`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize);

    /// Moves `value` into the uninitialized slot `slot`.
    ///
    /// # Safety
    ///
    /// `slot` must be valid for writes and must not hold a live value.
    #[inline]
    unsafe fn construct(&self, slot: NonNull<T>, value: T) {
        // SAFETY: guaranteed by the caller.
        unsafe { slot.write(value) }
    }

    /// Runs the destructor of the value in `slot`, leaving it uninitialized.
    ///
    /// # Safety
    ///
    /// `slot` must hold a live value that is not used afterwards.
    #[inline]
    unsafe fn destroy(&self, slot: NonNull<T>) {
        // SAFETY: guaranteed by the caller.
        unsafe { slot.drop_in_place() }
    }
}

// SAFETY: `Allocator` promises blocks that fit `layout` and stay valid until
// deallocated, and that clones share their allocations.
unsafe impl<T, A> ElementAllocator<T> for A
where
    A: Allocator + Clone,
{
    #[inline]
    fn allocate(&self, n: usize) -> Result<NonNull<T>> {
        let layout = array_layout::<T>(n)?;
        Allocator::allocate(self, layout)
            .map(NonNull::cast)
            .map_err(|_| Error::AllocFailed { layout })
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        // SAFETY: the same layout was computed successfully in `allocate`.
        unsafe {
            let layout = Layout::array::<T>(n).unwrap_unchecked();
            Allocator::deallocate(self, ptr.cast(), layout);
        }
    }
}

/// Largest number of `T`s a single block may hold.
#[inline]
pub const fn max_len<T>() -> usize {
    isize::MAX as usize / size_of::<T>()
}

/// Layout for `n` values of `T`, or [`Error::CapacityExceeded`].
pub fn array_layout<T>(n: usize) -> Result<Layout> {
    if n > max_len::<T>() {
        return Err(Error::CapacityExceeded { requested: n, max: max_len::<T>() });
    }
    Layout::array::<T>(n).map_err(|_| Error::CapacityExceeded { requested: n, max: max_len::<T>() })
}
