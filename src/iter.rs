//! Cursors over the live prefix of an array.
//!
//! A cursor is the block address plus a front and a back position. The
//! borrow it carries keeps the array from growing, shrinking or clearing
//! while the cursor exists, so it can never observe a stale block.

use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr;

use crate::block::Block;
use crate::lifecycle;
use crate::DynArray;

/// Shared iterator over an array's elements.
pub struct Iter<'a, T> {
    first: *const T,
    front: usize,
    back: usize,
    _borrow: PhantomData<&'a T>,
}

impl<'a, T> Iter<'a, T> {
    /// `first` must point at `len` live values that outlive `'a`.
    #[inline(always)]
    pub(crate) unsafe fn new(first: *const T, len: usize) -> Iter<'a, T> {
        Iter {
            first,
            front: 0,
            back: len,
            _borrow: PhantomData,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        let item = unsafe { &*self.first.add(self.front) };
        self.front += 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(unsafe { &*self.first.add(self.back) })
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> FusedIterator for Iter<'a, T> {}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

/// Mutable iterator over an array's elements.
pub struct IterMut<'a, T> {
    first: *mut T,
    front: usize,
    back: usize,
    _borrow: PhantomData<&'a mut T>,
}

impl<'a, T> IterMut<'a, T> {
    /// `first` must point at `len` live values exclusively borrowed for `'a`.
    #[inline(always)]
    pub(crate) unsafe fn new(first: *mut T, len: usize) -> IterMut<'a, T> {
        IterMut {
            first,
            front: 0,
            back: len,
            _borrow: PhantomData,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<&'a mut T> {
        if self.front == self.back {
            return None;
        }
        let item = unsafe { &mut *self.first.add(self.front) };
        self.front += 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a mut T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(unsafe { &mut *self.first.add(self.back) })
    }
}

impl<'a, T> ExactSizeIterator for IterMut<'a, T> {}

impl<'a, T> FusedIterator for IterMut<'a, T> {}

/// Owning iterator. Values not yielded are destroyed when it is dropped,
/// then the storage is released.
pub struct IntoIter<T> {
    block: Block<T>,
    front: usize,
    back: usize,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        let item = unsafe { ptr::read(self.block.slot(self.front)) };
        self.front += 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(unsafe { ptr::read(self.block.slot(self.back)) })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let remaining = self.back - self.front;
        let front = self.front;
        self.front = self.back;
        unsafe { lifecycle::destroy_range(self.block.slot(front), remaining) };
    }
}

impl<T> IntoIterator for DynArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        let (block, len) = self.into_block();
        IntoIter {
            block,
            front: 0,
            back: len,
        }
    }
}

impl<'a, T> IntoIterator for &'a DynArray<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynArray<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}
