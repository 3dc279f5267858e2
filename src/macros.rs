/// Creates a [`Vector`](crate::Vector) on the global allocator.
///
/// ```
/// use dynarray::vector;
///
/// let empty: dynarray::Vector<u8> = vector![];
/// let zeros = vector![0u8; 4];
/// let listed = vector![1, 2, 3];
///
/// assert!(empty.is_empty());
/// assert_eq!(zeros, [0, 0, 0, 0]);
/// assert_eq!(listed.len(), 3);
/// ```
#[macro_export]
macro_rules! vector {
    () => {
        $crate::Vector::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::Vector::from_elem($n, &$elem)
    };
    ($($x:expr),+ $(,)?) => {
        $crate::Vector::from([$($x),+])
    };
}
