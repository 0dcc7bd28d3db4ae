//! Raw storage acquisition and release.
//!
//! Nothing in here constructs or drops a `T`. Callers hand back storage only
//! after every value placed in it has been destroyed or moved out.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::AllocError;

#[inline]
pub(crate) fn layout_for<T>(count: usize) -> Result<Layout, AllocError> {
    Layout::array::<T>(count).map_err(|_| AllocError::CapacityOverflow)
}

/// Requests uninitialized storage for `count` values of `T`.
///
/// Zero-sized requests (no elements, or a zero-sized `T`) never reach the
/// allocator and return a dangling, well-aligned pointer.
pub(crate) fn allocate<T>(count: usize) -> Result<NonNull<T>, AllocError> {
    let layout = layout_for::<T>(count)?;
    if layout.size() == 0 {
        return Ok(NonNull::dangling());
    }

    #[cfg(test)]
    {
        if fault::should_fail() {
            debug!("injected allocation failure for {} bytes", layout.size());
            return Err(AllocError::OutOfMemory { bytes: layout.size() });
        }
        fault::record_allocation();
    }

    let raw = unsafe { alloc::alloc(layout) };
    match NonNull::new(raw as *mut T) {
        Some(ptr) => {
            trace!("-- alloc   {} slots, {} bytes at {:?}", count, layout.size(), ptr);
            Ok(ptr)
        },
        None => {
            debug!("allocation of {} bytes failed", layout.size());
            Err(AllocError::OutOfMemory { bytes: layout.size() })
        },
    }
}

/// Releases storage obtained from `allocate::<T>(count)`.
///
/// No-op for zero-sized requests.
pub(crate) unsafe fn deallocate<T>(ptr: NonNull<T>, count: usize) {
    let layout = match layout_for::<T>(count) {
        Ok(layout) => layout,
        // `allocate` would have refused this count, so nothing was ever handed out
        Err(_) => return,
    };
    if layout.size() == 0 {
        return;
    }
    trace!("-- release {} slots, {} bytes at {:?}", count, layout.size(), ptr);
    alloc::dealloc(ptr.as_ptr() as *mut u8, layout);
}

/// Escalates an allocation failure from a call site that has no error channel
/// (`Clone`, `FromIterator`), the same way the standard collections do.
pub(crate) fn handle_alloc_failure<T>(error: AllocError) -> ! {
    match error {
        AllocError::OutOfMemory { bytes } => {
            match Layout::from_size_align(bytes, std::mem::align_of::<T>()) {
                Ok(layout) => alloc::handle_alloc_error(layout),
                Err(_) => panic!("{}", error),
            }
        },
        AllocError::CapacityOverflow => panic!("{}", error),
    }
}

/// Deterministic allocation failures for unit tests.
#[cfg(test)]
pub(crate) mod fault {
    use std::cell::Cell;

    thread_local! {
        static SUCCEED_FIRST: Cell<usize> = Cell::new(0);
        static FAIL_NEXT: Cell<usize> = Cell::new(0);
        static ALLOCATIONS: Cell<usize> = Cell::new(0);
    }

    /// Makes the next `count` non-empty allocations on this thread fail.
    pub fn fail_next_allocations(count: usize) {
        fail_allocations_after(0, count);
    }

    /// Lets `successes` non-empty allocations through, then fails the next `count`.
    pub fn fail_allocations_after(successes: usize, count: usize) {
        SUCCEED_FIRST.with(|c| c.set(successes));
        FAIL_NEXT.with(|c| c.set(count));
    }

    /// Number of non-empty allocations that succeeded on this thread.
    pub fn allocation_count() -> usize {
        ALLOCATIONS.with(|c| c.get())
    }

    pub(super) fn should_fail() -> bool {
        let spared = SUCCEED_FIRST.with(|c| {
            let remaining = c.get();
            if remaining > 0 {
                c.set(remaining - 1);
            }
            remaining > 0
        });
        if spared {
            return false;
        }
        FAIL_NEXT.with(|c| {
            let remaining = c.get();
            if remaining > 0 {
                c.set(remaining - 1);
                true
            } else {
                false
            }
        })
    }

    pub(super) fn record_allocation() {
        ALLOCATIONS.with(|c| c.set(c.get() + 1));
    }
}
