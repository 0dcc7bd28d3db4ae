use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::memory;
use crate::AllocError;

/// Owned, uninitialized storage sized for `capacity` values of `T`.
///
/// A block knows nothing about which of its slots are live. Dropping it
/// releases the storage only, so every live value must be destroyed or moved
/// out first.
pub(crate) struct Block<T> {
    ptr: NonNull<T>,
    capacity: usize,
    _owns: PhantomData<T>,
}

impl<T> Block<T> {
    /// A block without storage.
    #[inline(always)]
    pub const fn empty() -> Block<T> {
        Block {
            ptr: NonNull::dangling(),
            capacity: 0,
            _owns: PhantomData,
        }
    }

    /// Allocates a block for exactly `capacity` values.
    pub fn allocate(capacity: usize) -> Result<Block<T>, AllocError> {
        if capacity == 0 {
            return Ok(Block::empty());
        }
        Ok(Block {
            ptr: memory::allocate::<T>(capacity)?,
            capacity,
            _owns: PhantomData,
        })
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Start of the storage. Dangling but aligned when the block is empty.
    #[inline(always)]
    pub fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Address of slot `index`. `index == capacity` is the one-past-the-end address.
    #[inline(always)]
    pub unsafe fn slot(&self, index: usize) -> *mut T {
        debug_assert!(index <= self.capacity, "slot {} outside block of {}", index, self.capacity);
        self.ptr.as_ptr().add(index)
    }
}

impl<T> Drop for Block<T> {
    fn drop(&mut self) {
        if self.capacity != 0 {
            unsafe { memory::deallocate(self.ptr, self.capacity) };
        }
    }
}
