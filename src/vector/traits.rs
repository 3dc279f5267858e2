use alloc::vec::Vec;
use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ops::{Deref, DerefMut},
    slice,
};

use allocator_api2::alloc::Global;

use super::Vector;
use crate::allocator::ElementAllocator;

impl<T, A: ElementAllocator<T>> Deref for Vector<T, A> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: ElementAllocator<T>> DerefMut for Vector<T, A> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: ElementAllocator<T>> AsRef<[T]> for Vector<T, A> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, A: ElementAllocator<T>> AsMut<[T]> for Vector<T, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T, A: ElementAllocator<T> + Default> Default for Vector<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

/// Deep copy: same capacity, cloned allocator, cloned values.
///
/// A panicking `T::clone` drops the partial copy; `self` is never involved.
impl<T: Clone, A: ElementAllocator<T>> Clone for Vector<T, A> {
    fn clone(&self) -> Self {
        let mut copy = Self::new_in(self.alloc.clone());
        if self.cap != 0 {
            if let Err(err) = copy.reallocate(self.cap) {
                err.raise();
            }
        }
        let mut source = self.iter();
        if let Err(err) = copy.splice_in(0, self.len, || source.next().cloned()) {
            err.raise();
        }
        copy
    }

    /// Replaces contents, capacity and allocator with a copy of `source`.
    ///
    /// The copy is complete before the old contents are dropped.
    fn clone_from(&mut self, source: &Self) {
        *self = source.clone();
    }
}

impl<T: fmt::Debug, A: ElementAllocator<T>> fmt::Debug for Vector<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, U, A, B> PartialEq<Vector<U, B>> for Vector<T, A>
where
    T: PartialEq<U>,
    A: ElementAllocator<T>,
    B: ElementAllocator<U>,
{
    fn eq(&self, other: &Vector<U, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PartialEq<U>, U, A: ElementAllocator<T>> PartialEq<[U]> for Vector<T, A> {
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq<U>, U, A: ElementAllocator<T>> PartialEq<&[U]> for Vector<T, A> {
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, A, const N: usize> PartialEq<[U; N]> for Vector<T, A>
where
    T: PartialEq<U>,
    A: ElementAllocator<T>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq<U>, U, A: ElementAllocator<T>> PartialEq<Vec<U>> for Vector<T, A> {
    fn eq(&self, other: &Vec<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: ElementAllocator<T>> Eq for Vector<T, A> {}

impl<T: PartialOrd, A: ElementAllocator<T>> PartialOrd for Vector<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord, A: ElementAllocator<T>> Ord for Vector<T, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: Hash, A: ElementAllocator<T>> Hash for Vector<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T, A: ElementAllocator<T>> Extend<T> for Vector<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, values: I) {
        let values = values.into_iter();
        let (lower, _) = values.size_hint();
        let required = self.len.saturating_add(lower);
        if required > self.cap {
            self.grow_to(required);
        }
        for value in values {
            self.push_back(value);
        }
    }
}

impl<'a, T: Copy + 'a, A: ElementAllocator<T>> Extend<&'a T> for Vector<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, values: I) {
        self.extend(values.into_iter().copied());
    }
}

impl<T> FromIterator<T> for Vector<T, Global> {
    fn from_iter<I: IntoIterator<Item = T>>(values: I) -> Self {
        let mut vector = Vector::new();
        vector.extend(values);
        vector
    }
}

impl<T, const N: usize> From<[T; N]> for Vector<T, Global> {
    fn from(values: [T; N]) -> Self {
        Vector::from_iter_exact(values)
    }
}

impl<T: Clone> From<&[T]> for Vector<T, Global> {
    fn from(values: &[T]) -> Self {
        Vector::from_slice(values)
    }
}

impl<'a, T, A: ElementAllocator<T>> IntoIterator for &'a Vector<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: ElementAllocator<T>> IntoIterator for &'a mut Vector<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
