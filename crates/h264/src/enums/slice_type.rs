use std::io;

use bytes_util::range_check;

/// The kind of a slice, `slice_type % 5` in ISO/IEC-14496-10-2022 - 7.4.3 Table 7-6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SliceType {
    /// Predicted
    #[default]
    P,
    /// Bi-predicted
    B,
    /// Intra
    I,
    /// Switching predicted
    SP,
    /// Switching intra
    SI,
}

impl SliceType {
    /// Decodes the `slice_type` syntax element.
    ///
    /// Values 5-9 carry the same kind as 0-4 and additionally state that every
    /// slice of the picture has this kind; that flag is the second value.
    pub fn from_code(code: u64) -> io::Result<(Self, bool)> {
        let slice_type = code;
        range_check!(slice_type, 0, 9)?;

        let kind = match slice_type % 5 {
            0 => SliceType::P,
            1 => SliceType::B,
            2 => SliceType::I,
            3 => SliceType::SP,
            _ => SliceType::SI,
        };

        Ok((kind, slice_type >= 5))
    }

    /// Encodes the kind back into a `slice_type` syntax element.
    pub const fn to_code(self, all_slices_same_type: bool) -> u64 {
        let code = match self {
            SliceType::P => 0,
            SliceType::B => 1,
            SliceType::I => 2,
            SliceType::SP => 3,
            SliceType::SI => 4,
        };

        if all_slices_same_type { code + 5 } else { code }
    }

    /// True for I and SI slices, which carry no reference lists.
    pub const fn is_intra(self) -> bool {
        matches!(self, SliceType::I | SliceType::SI)
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        for code in 0..10 {
            let (kind, same) = SliceType::from_code(code).unwrap();
            assert_eq!(kind.to_code(same), code);
        }

        assert_eq!(SliceType::from_code(7).unwrap(), (SliceType::I, true));
        assert_eq!(SliceType::from_code(3).unwrap(), (SliceType::SP, false));
        assert!(SliceType::from_code(10).is_err());
        assert!(SliceType::SI.is_intra());
        assert!(!SliceType::B.is_intra());
    }

    #[test]
    fn test_out_of_range_code() {
        let err = SliceType::from_code(u64::MAX).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(err.to_string(), "slice_type is out of range [0, 9]: 18446744073709551615");
    }
}
