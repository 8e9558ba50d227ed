/// The `aspect_ratio_idc` of the VUI, ISO/IEC-14496-10-2022 - E.2.1 Table E-1.
///
/// Values 17-254 are reserved; they are kept as is so a parsed VUI can be
/// written back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AspectRatioIdc(pub u8);

impl AspectRatioIdc {
    /// Unspecified
    pub const UNSPECIFIED: Self = Self(0);
    /// 1:1 (square)
    pub const SQUARE: Self = Self(1);
    /// 12:11
    pub const ASPECT_12_11: Self = Self(2);
    /// 10:11
    pub const ASPECT_10_11: Self = Self(3);
    /// 16:11
    pub const ASPECT_16_11: Self = Self(4);
    /// 40:33
    pub const ASPECT_40_33: Self = Self(5);
    /// 24:11
    pub const ASPECT_24_11: Self = Self(6);
    /// 20:11
    pub const ASPECT_20_11: Self = Self(7);
    /// 32:11
    pub const ASPECT_32_11: Self = Self(8);
    /// 80:33
    pub const ASPECT_80_33: Self = Self(9);
    /// 18:11
    pub const ASPECT_18_11: Self = Self(10);
    /// 15:11
    pub const ASPECT_15_11: Self = Self(11);
    /// 64:33
    pub const ASPECT_64_33: Self = Self(12);
    /// 160:99
    pub const ASPECT_160_99: Self = Self(13);
    /// 4:3
    pub const ASPECT_4_3: Self = Self(14);
    /// 3:2
    pub const ASPECT_3_2: Self = Self(15);
    /// 2:1
    pub const ASPECT_2_1: Self = Self(16);
    /// `Extended_SAR`: `sar_width` and `sar_height` follow in the bitstream
    pub const EXTENDED_SAR: Self = Self(255);

    const TABLE: [(u16, u16); 17] = [
        (0, 0),
        (1, 1),
        (12, 11),
        (10, 11),
        (16, 11),
        (40, 33),
        (24, 11),
        (20, 11),
        (32, 11),
        (80, 33),
        (18, 11),
        (15, 11),
        (64, 33),
        (160, 99),
        (4, 3),
        (3, 2),
        (2, 1),
    ];

    /// Returns the sample aspect ratio as `(width, height)` for the table
    /// entries, `None` for unspecified, reserved and extended values.
    pub fn ratio(&self) -> Option<(u16, u16)> {
        match self.0 {
            1..=16 => Some(Self::TABLE[self.0 as usize]),
            _ => None,
        }
    }
}

impl From<u8> for AspectRatioIdc {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_ratio() {
        assert_eq!(AspectRatioIdc::SQUARE.ratio(), Some((1, 1)));
        assert_eq!(AspectRatioIdc::ASPECT_160_99.ratio(), Some((160, 99)));
        assert_eq!(AspectRatioIdc::ASPECT_2_1.ratio(), Some((2, 1)));
        assert_eq!(AspectRatioIdc::UNSPECIFIED.ratio(), None);
        assert_eq!(AspectRatioIdc::from(100).ratio(), None);
        assert_eq!(AspectRatioIdc::EXTENDED_SAR.ratio(), None);
    }
}
