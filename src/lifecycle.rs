//! Construction and destruction of values inside raw storage.
//!
//! These are the only operations that change which slots hold live values.
//! Every function is `unsafe`: the caller vouches for the state of the slots
//! it names and updates its own live count to match.

use std::mem;
use std::ptr;

/// Writes `value` into the uninitialized `slot`, making it live.
#[inline(always)]
pub(crate) unsafe fn construct_at<T>(slot: *mut T, value: T) {
    ptr::write(slot, value);
}

/// Runs the destructor of the live value at `slot`; the slot becomes raw storage.
#[inline(always)]
pub(crate) unsafe fn destroy_at<T>(slot: *mut T) {
    ptr::drop_in_place(slot);
}

/// Destroys `count` consecutive live values starting at `first`.
#[inline]
pub(crate) unsafe fn destroy_range<T>(first: *mut T, count: usize) {
    if count != 0 {
        ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first, count));
    }
}

/// Relocates `count` live values from `src` into the uninitialized slots at `dst`.
///
/// Afterwards the source slots are raw storage and must not be destroyed.
#[inline]
pub(crate) unsafe fn move_range_into<T>(src: *const T, dst: *mut T, count: usize) {
    ptr::copy_nonoverlapping(src, dst, count);
}

/// Clones every value of `src` into consecutive uninitialized slots at `dst`.
///
/// If a clone panics, the copies already made are destroyed before the panic
/// propagates, so `dst` is raw storage again.
pub(crate) unsafe fn clone_range_into<T: Clone>(src: &[T], dst: *mut T) {
    let mut initializer = Initializer::new(dst, src.len());
    for item in src {
        initializer.push(item.clone());
    }
    initializer.finish();
}

/// Fills a raw region front to back while keeping count of the live prefix.
///
/// Dropping an unfinished initializer destroys exactly that prefix, which is
/// what keeps a panicking constructor from leaking or double-dropping.
pub(crate) struct Initializer<T> {
    first: *mut T,
    capacity: usize,
    initialized_len: usize,
}

impl<T> Initializer<T> {
    /// Starts initializing `capacity` raw slots at `first`.
    #[inline(always)]
    pub unsafe fn new(first: *mut T, capacity: usize) -> Initializer<T> {
        Initializer {
            first,
            capacity,
            initialized_len: 0,
        }
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.initialized_len == self.capacity
    }

    /// Constructs `value` in the next raw slot.
    #[inline]
    pub fn push(&mut self, value: T) {
        assert!(!self.is_full(), "initializer is full");
        unsafe { construct_at(self.first.add(self.initialized_len), value) };
        self.initialized_len += 1;
    }

    /// Keeps the constructed values and returns how many there are.
    #[inline]
    pub fn finish(self) -> usize {
        let len = self.initialized_len;
        mem::forget(self);
        len
    }
}

impl<T> Drop for Initializer<T> {
    fn drop(&mut self) {
        trace!("unwinding initializer, destroying {} values", self.initialized_len);
        unsafe { destroy_range(self.first, self.initialized_len) };
    }
}

#[cfg(test)]
mod lifecycle_tests {
    use super::{clone_range_into, construct_at, destroy_at, destroy_range, move_range_into, Initializer};
    use crate::block::Block;
    use crate::dropflag::{drop_counter, Droppable, FragileClone};
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn construct_then_destroy_runs_drop_once() {
        let drops = drop_counter();
        let block = Block::<Droppable>::allocate(1).unwrap();
        unsafe {
            construct_at(block.slot(0), Droppable::new(1, &drops));
            assert_eq!(0, *drops.borrow());
            destroy_at(block.slot(0));
        }
        assert_eq!(1, *drops.borrow());
    }

    #[test]
    fn destroy_range_drops_every_value() {
        let drops = drop_counter();
        let block = Block::<Droppable>::allocate(4).unwrap();
        unsafe {
            for i in 0..4 {
                construct_at(block.slot(i), Droppable::new(i as i32, &drops));
            }
            destroy_range(block.slot(1), 3);
            assert_eq!(3, *drops.borrow());
            destroy_at(block.slot(0));
        }
        assert_eq!(4, *drops.borrow());
    }

    #[test]
    fn moved_values_are_not_dropped_twice() {
        let drops = drop_counter();
        let from = Block::<Droppable>::allocate(3).unwrap();
        let to = Block::<Droppable>::allocate(3).unwrap();
        unsafe {
            for i in 0..3 {
                construct_at(from.slot(i), Droppable::new(i as i32, &drops));
            }
            move_range_into(from.as_ptr(), to.as_ptr(), 3);
            drop(from);
            assert_eq!(0, *drops.borrow());
            assert_eq!(2, (*to.slot(2)).id);
            destroy_range(to.as_ptr(), 3);
        }
        assert_eq!(3, *drops.borrow());
    }

    #[test]
    fn clone_range_keeps_order() {
        let source = vec![String::from("a"), String::from("b"), String::from("c")];
        let block = Block::<String>::allocate(3).unwrap();
        unsafe {
            clone_range_into(&source, block.as_ptr());
            let copied = std::slice::from_raw_parts(block.as_ptr(), 3);
            assert_eq!(&source[..], copied);
            destroy_range(block.as_ptr(), 3);
        }
    }

    #[test]
    fn panicking_clone_destroys_partial_copies() {
        let drops = drop_counter();
        let source = FragileClone::batch(4, 2, &drops);
        let block = Block::<FragileClone>::allocate(4).unwrap();

        let result = catch_unwind(AssertUnwindSafe(|| unsafe {
            clone_range_into(&source, block.as_ptr());
        }));

        assert!(result.is_err());
        assert_eq!(2, *drops.borrow(), "both completed copies were destroyed");
        drop(source);
        assert_eq!(6, *drops.borrow());
    }

    #[test]
    fn finished_initializer_keeps_values() {
        let drops = drop_counter();
        let block = Block::<Droppable>::allocate(2).unwrap();
        let len = unsafe {
            let mut initializer = Initializer::new(block.as_ptr(), 2);
            initializer.push(Droppable::new(7, &drops));
            initializer.push(Droppable::new(8, &drops));
            assert!(initializer.is_full());
            initializer.finish()
        };
        assert_eq!(2, len);
        assert_eq!(0, *drops.borrow());
        unsafe { destroy_range(block.as_ptr(), len) };
        assert_eq!(2, *drops.borrow());
    }
}
