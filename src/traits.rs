use crate::{AllocError, DynArray};

/// Implements collect to `DynArray` with allocation failures reported instead of escalated.
pub trait CollectDynArray: Iterator {
    fn try_collect_dyn_array(self) -> Result<DynArray<Self::Item>, AllocError> where Self: Sized;

    fn try_collect_result_dyn_array<I, E>(self) -> Result<DynArray<I>, E>
        where
            Self: Iterator<Item=Result<I, E>> + Sized,
            E: From<AllocError>;
}

impl<Q: Iterator> CollectDynArray for Q {
    fn try_collect_dyn_array(self) -> Result<DynArray<Self::Item>, AllocError> {
        DynArray::try_from_iter(self)
    }

    fn try_collect_result_dyn_array<I, E>(self) -> Result<DynArray<I>, E>
        where
            Self: Iterator<Item=Result<I, E>>,
            E: From<AllocError>
    {
        let (lower, _) = self.size_hint();
        let mut array = DynArray::try_with_capacity(lower)?;
        for mi in self {
            let i = mi?;
            array.push(i).map_err(AllocError::from)?;
        }
        Ok(array)
    }
}
