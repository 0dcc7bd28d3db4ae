use std::fmt::{Debug, Display};

/// Storage for the requested number of elements could not be obtained.
///
/// Every operation that returns this error leaves the array exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The requested capacity does not fit in the address space.
    CapacityOverflow,
    /// The allocator refused a request of `bytes` bytes.
    OutOfMemory { bytes: usize },
}

impl Display for AllocError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocError::CapacityOverflow => Display::fmt("Requested capacity overflows the address space", f),
            AllocError::OutOfMemory { bytes } => write!(f, "Could not allocate block of {} bytes", bytes),
        }
    }
}

impl std::error::Error for AllocError {}

/// Checked element access failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// The array holds no elements.
    Empty,
    /// The index is past the last live element.
    OutOfRange { index: usize, len: usize },
}

impl Display for AccessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessError::Empty => Display::fmt("Array has no elements", f),
            AccessError::OutOfRange { index, len } => write!(f, "Index {} is out of range for array of length {}", index, len),
        }
    }
}

impl std::error::Error for AccessError {}

/// A push that could not grow the array. The rejected value is handed back.
pub struct PushError<T> {
    pub value: T,
    pub error: AllocError,
}

impl<T> PushError<T> {
    /// Returns the value that was not appended.
    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T> Debug for PushError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushError")
            .field("error", &self.error)
            .finish()
    }
}

impl<T> Display for PushError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Could not append element - {}", self.error)
    }
}

impl<T> std::error::Error for PushError<T> {}

impl<T> From<PushError<T>> for AllocError {
    fn from(e: PushError<T>) -> Self {
        e.error
    }
}
