use std::convert::TryFrom;
use std::fmt::Debug;
use std::mem::{self, ManuallyDrop};
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::ptr;
use std::slice;

use crate::block::Block;
use crate::growth;
use crate::lifecycle::{self, Initializer};
use crate::memory;
use crate::{AccessError, AllocError, Iter, IterMut, PushError};

/// A growable, contiguous array that owns one block of heap storage.
///
/// The array keeps two numbers apart: `capacity`, how many slots the block has
/// room for, and `len`, how many of those slots hold live values. Exactly the
/// first `len` slots are live; the rest are raw storage that nothing reads.
///
/// Appending to a full array replaces the block with one twice as large
/// (starting at one slot). The replacement block is allocated before anything
/// else happens, so when the allocator refuses, the array is left exactly as
/// it was and the failure is returned to the caller as an `AllocError`.
/// No operation that grows the array panics on allocation failure; only the
/// `Clone` and `FromIterator` impls, which have no error channel, escalate the
/// way the standard collections do. Use `try_clone` and `try_from_iter` to
/// receive the error instead.
///
/// Moving the array moves ownership of the block. `take` moves the contents
/// out and leaves the empty array behind, which stays fully usable.
///
/// The array can not be shared between threads.
pub struct DynArray<T> {
    block: Block<T>,
    len: usize,
}

impl<T> DynArray<T> {
    /// Creates an empty array. Nothing is allocated until the first element arrives.
    #[inline]
    pub const fn new() -> DynArray<T> {
        DynArray {
            block: Block::empty(),
            len: 0,
        }
    }

    /// Creates an empty array with room for exactly `capacity` elements.
    pub fn try_with_capacity(capacity: usize) -> Result<DynArray<T>, AllocError> {
        Ok(DynArray {
            block: Block::allocate(capacity)?,
            len: 0,
        })
    }

    /// Creates an array holding `count` copies of `value`, with capacity `count`.
    pub fn from_elem(value: T, count: usize) -> Result<DynArray<T>, AllocError> where T: Clone {
        let mut array = DynArray::try_with_capacity(count)?;
        if count == 0 {
            return Ok(array);
        }
        let mut initializer = unsafe { Initializer::new(array.block.as_ptr(), count) };
        for _ in 1..count {
            initializer.push(value.clone());
        }
        initializer.push(value);
        array.len = initializer.finish();
        Ok(array)
    }

    /// Creates an array holding clones of `items`, with capacity `items.len()`.
    pub fn from_slice(items: &[T]) -> Result<DynArray<T>, AllocError> where T: Clone {
        let mut array = DynArray::try_with_capacity(items.len())?;
        unsafe { lifecycle::clone_range_into(items, array.block.as_ptr()) };
        array.len = items.len();
        Ok(array)
    }

    /// Creates an array from a fixed list of values, with capacity `N`.
    pub fn try_from_array<const N: usize>(items: [T; N]) -> Result<DynArray<T>, AllocError> {
        DynArray::try_from_iter(IntoIterator::into_iter(items))
    }

    /// Creates an array holding every item of `items`, in order.
    ///
    /// Storage for the iterator's lower size bound is allocated up front, so
    /// an exact-size iterator produces an array whose capacity equals its length.
    pub fn try_from_iter<I: IntoIterator<Item=T>>(items: I) -> Result<DynArray<T>, AllocError> {
        let mut array = DynArray::new();
        array.try_extend(items)?;
        Ok(array)
    }

    /// Creates an array from at most `count` items of `items`, with capacity `count`.
    ///
    /// A shorter iterator yields a shorter array.
    pub fn try_from_iter_n<I: IntoIterator<Item=T>>(items: I, count: usize) -> Result<DynArray<T>, AllocError> {
        let mut array = DynArray::try_with_capacity(count)?;
        array.try_extend(items.into_iter().take(count))?;
        Ok(array)
    }

    /// Number of live elements.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of elements the current storage holds without reallocating.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.block.capacity()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pointer to the first slot. Dangling but aligned when the capacity is zero.
    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        self.block.as_ptr()
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.block.as_ptr()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.block.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.block.as_ptr(), self.len) }
    }

    /// Returns the element at `index`.
    ///
    /// An empty array reports `AccessError::Empty` for every index; otherwise
    /// an index past the last element reports `AccessError::OutOfRange`.
    pub fn at(&self, index: usize) -> Result<&T, AccessError> {
        self.check_index(index)?;
        Ok(unsafe { self.get_unchecked(index) })
    }

    /// Mutable counterpart of `at`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, AccessError> {
        self.check_index(index)?;
        Ok(unsafe { self.get_unchecked_mut(index) })
    }

    /// Returns the element at `index` without checking bounds.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`.
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len, "unchecked index {} on array of length {}", index, self.len);
        &*self.block.slot(index)
    }

    /// # Safety
    ///
    /// `index` must be less than `len()`.
    #[inline(always)]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len, "unchecked index {} on array of length {}", index, self.len);
        &mut *self.block.slot(index)
    }

    pub fn front(&self) -> Option<&T> {
        if self.len == 0 {
            None
        } else {
            Some(unsafe { self.get_unchecked(0) })
        }
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        if self.len == 0 {
            None
        } else {
            Some(unsafe { self.get_unchecked_mut(0) })
        }
    }

    pub fn back(&self) -> Option<&T> {
        if self.len == 0 {
            None
        } else {
            Some(unsafe { self.get_unchecked(self.len - 1) })
        }
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        if self.len == 0 {
            None
        } else {
            let last = self.len - 1;
            Some(unsafe { self.get_unchecked_mut(last) })
        }
    }

    /// Iterates front to back; also walks back to front through `next_back`.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        unsafe { Iter::new(self.block.as_ptr(), self.len) }
    }

    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        unsafe { IterMut::new(self.block.as_ptr(), self.len) }
    }

    /// Appends `value`, growing the storage first when it is full.
    ///
    /// If the storage can not grow, the array is unchanged and `value` comes
    /// back inside the error.
    pub fn push(&mut self, value: T) -> Result<(), PushError<T>> {
        if let Err(error) = self.grow_if_full() {
            debug!("push abandoned at length {}: {}", self.len, error);
            return Err(PushError { value, error });
        }
        unsafe { lifecycle::construct_at(self.block.slot(self.len), value) };
        self.len += 1;
        Ok(())
    }

    /// Appends the value built by `construct`, which runs only once room for it exists.
    ///
    /// If the storage can not grow, `construct` is never called. When the array
    /// is full the value is built in the new block before the live values move
    /// over, so a panicking `construct` leaves the array exactly as it was.
    pub fn push_with<F: FnOnce() -> T>(&mut self, construct: F) -> Result<(), AllocError> {
        if self.len < self.capacity() {
            unsafe { lifecycle::construct_at(self.block.slot(self.len), construct()) };
            self.len += 1;
            return Ok(());
        }

        let block = match growth::next_capacity(self.capacity()).and_then(Block::allocate) {
            Ok(block) => block,
            Err(error) => {
                debug!("push_with abandoned at length {}: {}", self.len, error);
                return Err(error);
            },
        };
        trace!("push_with stages into {} slots, moving {} values", block.capacity(), self.len);
        unsafe {
            lifecycle::construct_at(block.slot(self.len), construct());
            lifecycle::move_range_into(self.block.as_ptr(), block.as_ptr(), self.len);
        }
        self.block = block;
        self.len += 1;
        Ok(())
    }

    /// Removes the last element and returns it.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(unsafe { ptr::read(self.block.slot(self.len)) })
    }

    /// Destroys the last element in place. No-op on an empty array.
    pub fn remove_last(&mut self) {
        if self.len == 0 {
            return;
        }
        self.len -= 1;
        unsafe { lifecycle::destroy_at(self.block.slot(self.len)) };
    }

    /// Destroys up to `count` elements from the back, newest first, and returns
    /// how many were removed.
    ///
    /// Asking for more than the array holds empties it.
    pub fn remove_last_n(&mut self, count: usize) -> usize {
        let removed = count.min(self.len);
        for _ in 0..removed {
            self.remove_last();
        }
        removed
    }

    /// Destroys every element. The storage is kept for reuse.
    pub fn clear(&mut self) {
        self.remove_last_n(self.len);
    }

    /// Grows the storage to exactly `capacity` slots if it is currently smaller.
    ///
    /// `capacity` is the target total, not an increment.
    pub fn reserve(&mut self, capacity: usize) -> Result<(), AllocError> {
        if capacity > self.capacity() {
            self.reallocate(capacity)?;
        }
        Ok(())
    }

    /// Appends clones of every element of `other`, which is left untouched.
    ///
    /// The storage is always replaced by one block sized exactly for both arrays,
    /// so afterwards `capacity() == len()`. On allocation failure, or if a clone
    /// panics, `self` is unchanged.
    pub fn concatenate(&mut self, other: &DynArray<T>) -> Result<(), AllocError> where T: Clone {
        if other.is_empty() {
            return Ok(());
        }
        let total = growth::exact_capacity(self.len, other.len)?;
        let block = Block::allocate(total)?;
        trace!("concatenate into {} slots ({} + {})", total, self.len, other.len);
        unsafe {
            // clones go first so that a panicking clone leaves `self` untouched
            lifecycle::clone_range_into(other.as_slice(), block.slot(self.len));
            lifecycle::move_range_into(self.block.as_ptr(), block.as_ptr(), self.len);
        }
        self.block = block;
        self.len = total;
        Ok(())
    }

    /// Moves every element of `other` to the back of `self`, leaving `other` empty.
    ///
    /// Grows at most once, to exactly the combined length. On failure both
    /// arrays are unchanged.
    pub fn append(&mut self, other: &mut DynArray<T>) -> Result<(), AllocError> {
        if other.is_empty() {
            return Ok(());
        }
        let total = growth::exact_capacity(self.len, other.len)?;
        if total > self.capacity() {
            self.reallocate(total)?;
        }
        unsafe { lifecycle::move_range_into(other.block.as_ptr(), self.block.slot(self.len), other.len) };
        other.len = 0;
        self.len = total;
        Ok(())
    }

    /// Appends every item of `items`.
    ///
    /// If the storage can not grow, the items appended so far are destroyed
    /// and the error is returned. Items already taken from the iterator are
    /// lost, and any capacity gained before the failure is kept.
    pub fn try_extend<I: IntoIterator<Item=T>>(&mut self, items: I) -> Result<(), AllocError> {
        let items = items.into_iter();
        let start_len = self.len;
        let (lower, _) = items.size_hint();
        self.reserve(growth::exact_capacity(self.len, lower)?)?;
        for item in items {
            if let Err(e) = self.push(item) {
                self.remove_last_n(self.len - start_len);
                return Err(e.error);
            }
        }
        Ok(())
    }

    /// Deep copy with `capacity == len`.
    pub fn try_clone(&self) -> Result<DynArray<T>, AllocError> where T: Clone {
        DynArray::from_slice(self.as_slice())
    }

    /// Replaces the contents of `self` with clones of `source`.
    ///
    /// The copy is fully built before the old contents are destroyed, so on
    /// failure `self` is unchanged.
    pub fn try_clone_from(&mut self, source: &DynArray<T>) -> Result<(), AllocError> where T: Clone {
        let copy = source.try_clone()?;
        *self = copy;
        Ok(())
    }

    /// Moves the contents out, leaving `self` empty with no storage.
    pub fn take(&mut self) -> DynArray<T> {
        mem::replace(self, DynArray::new())
    }

    /// Hands the block and live count to an owning iterator without dropping anything.
    pub(crate) fn into_block(self) -> (Block<T>, usize) {
        let mut this = ManuallyDrop::new(self);
        let len = this.len;
        (mem::replace(&mut this.block, Block::empty()), len)
    }

    fn check_index(&self, index: usize) -> Result<(), AccessError> {
        if self.len == 0 {
            Err(AccessError::Empty)
        } else if index >= self.len {
            Err(AccessError::OutOfRange { index, len: self.len })
        } else {
            Ok(())
        }
    }

    fn grow_if_full(&mut self) -> Result<(), AllocError> {
        if self.len == self.capacity() {
            self.reallocate(growth::next_capacity(self.capacity())?)?;
        }
        Ok(())
    }

    /// Replaces the storage with a block of exactly `capacity` slots.
    ///
    /// The new block is allocated before anything else is touched; the live
    /// values are then relocated in order and the old block is released. A
    /// relocated value is not destroyed in the old block, its slot simply
    /// stops being live.
    fn reallocate(&mut self, capacity: usize) -> Result<(), AllocError> {
        debug_assert!(capacity >= self.len);
        let block = Block::allocate(capacity)?;
        trace!("reallocate {} -> {} slots, moving {} values", self.capacity(), capacity, self.len);
        unsafe { lifecycle::move_range_into(self.block.as_ptr(), block.as_ptr(), self.len) };
        self.block = block;
        Ok(())
    }
}

impl<T> Drop for DynArray<T> {
    fn drop(&mut self) {
        let len = self.len;
        self.len = 0;
        unsafe { lifecycle::destroy_range(self.block.as_ptr(), len) };
        // the block releases its storage when the field is dropped
    }
}

impl<T> Default for DynArray<T> {
    fn default() -> Self {
        DynArray::new()
    }
}

impl<T: Clone> Clone for DynArray<T> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(e) => memory::handle_alloc_failure::<T>(e),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(e) = self.try_clone_from(source) {
            memory::handle_alloc_failure::<T>(e)
        }
    }
}

impl<T> std::iter::FromIterator<T> for DynArray<T> {
    fn from_iter<I: IntoIterator<Item=T>>(items: I) -> Self {
        match DynArray::try_from_iter(items) {
            Ok(array) => array,
            Err(e) => memory::handle_alloc_failure::<T>(e),
        }
    }
}

impl<T, const N: usize> TryFrom<[T; N]> for DynArray<T> {
    type Error = AllocError;

    fn try_from(items: [T; N]) -> Result<Self, Self::Error> {
        DynArray::try_from_array(items)
    }
}

impl<T> Deref for DynArray<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynArray<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> AsRef<[T]> for DynArray<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

/// Panics with the `AccessError` message when `index` is not live.
impl<T> Index<usize> for DynArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.at(index) {
            Ok(item) => item,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<T> IndexMut<usize> for DynArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.at_mut(index) {
            Ok(item) => item,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<T> Debug for DynArray<T> where T: Debug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for DynArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynArray<T> {}

impl<T: PartialEq> PartialEq<[T]> for DynArray<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq, const N: usize> PartialEq<[T; N]> for DynArray<T> {
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == &other[..]
    }
}
