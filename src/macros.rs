/// Builds a `DynArray` from a list of values, like `vec!`.
///
/// Expands to a `Result<DynArray<_>, AllocError>`, since the storage may not
/// be available. `dyn_array![value; count]` fills `count` clones of `value`.
#[macro_export]
macro_rules! dyn_array {
    () => (
        ::std::result::Result::<_, $crate::AllocError>::Ok($crate::DynArray::new())
    );
    ($elem:expr; $count:expr) => (
        $crate::DynArray::from_elem($elem, $count)
    );
    ($($item:expr),+ $(,)?) => (
        $crate::DynArray::try_from_array([$($item),+])
    );
}
