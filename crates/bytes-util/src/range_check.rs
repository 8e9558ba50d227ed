//! Bounds checks for values decoded from a bitstream.

/// Enforces that a number is within the specified \[LOWER, UPPER\] bounds.
///
/// The brackets indicate that this range is inclusive on both sides. The
/// macro evaluates to an [`std::io::Result<()>`] whose error is
/// [`std::io::ErrorKind::InvalidData`] and names the offending expression.
#[macro_export]
macro_rules! range_check {
    ($n:expr, $lower:expr, $upper:expr) => {{
        let n = $n;

        #[allow(unused_comparisons, clippy::manual_range_contains)]
        if n < $lower || n > $upper {
            ::std::result::Result::Err(::std::io::Error::new(
                ::std::io::ErrorKind::InvalidData,
                format!("{} is out of range [{}, {}]: {}", stringify!($n), $lower, $upper, n),
            ))
        } else {
            ::std::result::Result::Ok(())
        }
    }};
}
