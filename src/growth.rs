use crate::AllocError;

/// Factor applied to a full array's capacity when it must grow by one element.
pub const GROWTH_FACTOR: usize = 2;

/// Capacity of the first block an empty array allocates.
pub const INITIAL_CAPACITY: usize = 1;

/// Capacity to grow to when an array of `capacity` is full.
#[inline]
pub(crate) fn next_capacity(capacity: usize) -> Result<usize, AllocError> {
    if capacity == 0 {
        Ok(INITIAL_CAPACITY)
    } else {
        capacity.checked_mul(GROWTH_FACTOR).ok_or(AllocError::CapacityOverflow)
    }
}

/// Capacity that holds `len + additional` elements, for exact-size requests.
#[inline]
pub(crate) fn exact_capacity(len: usize, additional: usize) -> Result<usize, AllocError> {
    len.checked_add(additional).ok_or(AllocError::CapacityOverflow)
}

#[cfg(test)]
mod growth_tests {
    use super::{exact_capacity, next_capacity};
    use crate::AllocError;

    #[test]
    fn seeds_at_one_then_doubles() {
        let mut capacity = 0;
        let mut seen = Vec::new();
        for _ in 0..6 {
            capacity = next_capacity(capacity).unwrap();
            seen.push(capacity);
        }
        assert_eq!(vec![1, 2, 4, 8, 16, 32], seen);
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(Err(AllocError::CapacityOverflow), next_capacity(usize::MAX / 2 + 1));
        assert_eq!(Err(AllocError::CapacityOverflow), exact_capacity(usize::MAX, 1));
        assert_eq!(Ok(10), exact_capacity(5, 5));
    }
}
