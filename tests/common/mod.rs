//! Shared fixtures: instrumented allocators and element types that count
//! their own lifetimes or fail on demand.

#![allow(dead_code)]

use std::{cell::Cell, ptr::NonNull, rc::Rc};

use dynarray::{ElementAllocator, Error, Global, Result, allocator::array_layout};

// ============================================================================
// Allocators
// ============================================================================

/// Everything a [`Tracking`] allocator (and its clones) has been asked to do.
#[derive(Debug, Default)]
pub struct Ledger {
    pub allocations: Cell<usize>,
    pub deallocations: Cell<usize>,
    pub constructs: Cell<usize>,
    pub destroys: Cell<usize>,
    /// Allocations still allowed before `allocate` starts failing.
    pub budget: Cell<Option<usize>>,
}

impl Ledger {
    pub fn live_blocks(&self) -> usize {
        self.allocations.get() - self.deallocations.get()
    }

    pub fn live_values(&self) -> usize {
        self.constructs.get() - self.destroys.get()
    }

    /// Lets `n` more allocations through, then fails every one after.
    pub fn fail_after(&self, n: usize) {
        self.budget.set(Some(n));
    }
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

/// Element allocator on top of [`Global`] that records every call.
#[derive(Debug, Clone, Default)]
pub struct Tracking {
    pub ledger: Rc<Ledger>,
}

impl Tracking {
    pub fn new() -> Self {
        Self::default()
    }
}

// SAFETY: every block comes from `Global`, which all clones share.
unsafe impl<T> ElementAllocator<T> for Tracking {
    fn allocate(&self, n: usize) -> Result<NonNull<T>> {
        if let Some(left) = self.ledger.budget.get() {
            if left == 0 {
                return Err(Error::AllocFailed { layout: array_layout::<T>(n)? });
            }
            self.ledger.budget.set(Some(left - 1));
        }
        let ptr = ElementAllocator::<T>::allocate(&Global, n)?;
        bump(&self.ledger.allocations);
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        bump(&self.ledger.deallocations);
        // SAFETY: `ptr` came from `Global` through `allocate(n)`.
        unsafe { ElementAllocator::<T>::deallocate(&Global, ptr, n) }
    }

    unsafe fn construct(&self, slot: NonNull<T>, value: T) {
        bump(&self.ledger.constructs);
        // SAFETY: the caller hands over an uninitialized slot.
        unsafe { slot.write(value) }
    }

    unsafe fn destroy(&self, slot: NonNull<T>) {
        bump(&self.ledger.destroys);
        // SAFETY: the caller hands over a live value it never uses again.
        unsafe { slot.drop_in_place() }
    }
}

// ============================================================================
// Elements
// ============================================================================

/// Counts live [`Probe`]s and decides when cloning one should panic.
#[derive(Debug, Default)]
pub struct Census {
    live: Cell<usize>,
    clones_left: Cell<Option<usize>>,
}

impl Census {
    pub fn new() -> Rc<Self> {
        Rc::default()
    }

    pub fn probe(self: &Rc<Self>, id: u32) -> Probe {
        self.live.set(self.live.get() + 1);
        Probe { id, census: Rc::clone(self) }
    }

    pub fn probes(self: &Rc<Self>, ids: impl IntoIterator<Item = u32>) -> Vec<Probe> {
        ids.into_iter().map(|id| self.probe(id)).collect()
    }

    pub fn live(&self) -> usize {
        self.live.get()
    }

    /// The next `n` clones succeed; the one after panics.
    pub fn panic_after_clones(&self, n: usize) {
        self.clones_left.set(Some(n));
    }

    pub fn allow_clones(&self) {
        self.clones_left.set(None);
    }
}

/// An element that reports its lifetime to a [`Census`].
#[derive(Debug)]
pub struct Probe {
    pub id: u32,
    census: Rc<Census>,
}

impl Clone for Probe {
    fn clone(&self) -> Self {
        if let Some(left) = self.census.clones_left.get() {
            if left == 0 {
                panic!("clone of probe {} refused", self.id);
            }
            self.census.clones_left.set(Some(left - 1));
        }
        self.census.probe(self.id)
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        self.census.live.set(self.census.live.get() - 1);
    }
}

impl PartialEq for Probe {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl PartialEq<u32> for Probe {
    fn eq(&self, other: &u32) -> bool {
        self.id == *other
    }
}

pub fn ids<'a>(values: impl IntoIterator<Item = &'a Probe>) -> Vec<u32> {
    values.into_iter().map(|probe| probe.id).collect()
}
