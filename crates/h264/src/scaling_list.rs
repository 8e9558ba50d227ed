use std::io;

use bytes_util::{BitReader, BitWriter, range_check};
use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt};

/// A single `scaling_list()`, ISO/IEC-14496-10-2022 - 7.3.2.1.1.1
///
/// `N` is 16 for 4x4 lists and 64 for 8x8 lists. The values are stored in
/// the order they are coded (zig-zag scan order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalingList<const N: usize> {
    /// The decoded scaling values.
    pub values: [u8; N],

    /// `useDefaultScalingMatrixFlag`: the list was coded as a single delta
    /// that selects the default matrix from Table 7-3 / 7-4.
    pub use_default_scaling_matrix_flag: bool,
}

impl<const N: usize> Default for ScalingList<N> {
    fn default() -> Self {
        Self {
            values: [16; N],
            use_default_scaling_matrix_flag: false,
        }
    }
}

impl<const N: usize> ScalingList<N> {
    /// Parses a scaling list from a bitstream.
    pub fn parse(reader: &mut BitReader) -> io::Result<Self> {
        let mut values = [0u8; N];
        let mut use_default_scaling_matrix_flag = false;
        let mut last_scale: u8 = 8;
        let mut next_scale: u8 = 8;

        for (j, value) in values.iter_mut().enumerate() {
            if next_scale != 0 {
                let delta_scale = reader.read_signed_exp_golomb()?;
                range_check!(delta_scale, -128, 127)?;

                next_scale = (last_scale as i64 + delta_scale).rem_euclid(256) as u8;
                use_default_scaling_matrix_flag = j == 0 && next_scale == 0;
            }

            *value = if next_scale == 0 { last_scale } else { next_scale };
            last_scale = *value;
        }

        Ok(Self {
            values,
            use_default_scaling_matrix_flag,
        })
    }

    /// Builds the scaling list into a bitstream.
    ///
    /// The list is terminated early at the start of its trailing run of equal
    /// values, which is the shortest coding of the same values.
    pub fn build(&self, writer: &mut BitWriter) -> io::Result<()> {
        if self.use_default_scaling_matrix_flag {
            return writer.write_signed_exp_golomb(-8);
        }

        if self.values.contains(&0) {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "scaling list values must be nonzero"));
        }

        let mut stop = N;
        while stop > 1 && self.values[stop - 1] == self.values[stop - 2] {
            stop -= 1;
        }

        let mut last_scale = 8;
        for &value in &self.values[..stop] {
            writer.write_signed_exp_golomb(wrapped_delta(last_scale, value))?;
            last_scale = value;
        }

        if stop < N {
            writer.write_signed_exp_golomb(wrapped_delta(last_scale, 0))?;
        }

        Ok(())
    }
}

fn wrapped_delta(from: u8, to: u8) -> i64 {
    let delta = (to as i64 - from as i64).rem_euclid(256);
    if delta > 127 { delta - 256 } else { delta }
}

/// The scaling lists carried by an SPS or PPS.
///
/// Each slot is `Some` when its `*_scaling_list_present_flag` is set. Only
/// 4:4:4 streams use the 8x8 slots past the second one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScalingMatrix {
    /// The six 4x4 lists (Intra Y, Cb, Cr then Inter Y, Cb, Cr).
    pub lists_4x4: [Option<ScalingList<16>>; 6],

    /// The 8x8 lists (Intra Y, Inter Y, then Cb and Cr for 4:4:4).
    pub lists_8x8: [Option<ScalingList<64>>; 6],
}

impl ScalingMatrix {
    /// Parses `count` list slots (at most 12).
    pub fn parse(reader: &mut BitReader, count: usize) -> io::Result<Self> {
        range_check!(count, 0, 12)?;

        let mut matrix = Self::default();

        for i in 0..count {
            let scaling_list_present_flag = reader.read_bit()?;
            if !scaling_list_present_flag {
                continue;
            }

            if i < 6 {
                matrix.lists_4x4[i] = Some(ScalingList::parse(reader)?);
            } else {
                matrix.lists_8x8[i - 6] = Some(ScalingList::parse(reader)?);
            }
        }

        Ok(matrix)
    }

    /// Builds `count` list slots (at most 12).
    pub fn build(&self, writer: &mut BitWriter, count: usize) -> io::Result<()> {
        range_check!(count, 0, 12)?;

        for i in 0..count {
            if i < 6 {
                write_slot(writer, self.lists_4x4[i].as_ref())?;
            } else {
                write_slot(writer, self.lists_8x8[i - 6].as_ref())?;
            }
        }

        Ok(())
    }
}

fn write_slot<const N: usize>(writer: &mut BitWriter, list: Option<&ScalingList<N>>) -> io::Result<()> {
    writer.write_bit(list.is_some())?;
    if let Some(list) = list {
        list.build(writer)?;
    }

    Ok(())
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    fn round_trip<const N: usize>(list: &ScalingList<N>) -> (ScalingList<N>, u64) {
        let mut buf = [0u8; 256];
        let mut writer = BitWriter::new(&mut buf);
        list.build(&mut writer).unwrap();
        let bits = writer.bit_position();
        let len = writer.finish().unwrap();

        let mut reader = BitReader::new(&buf[..len]);
        (ScalingList::parse(&mut reader).unwrap(), bits)
    }

    #[test]
    fn test_default_flag() {
        // se(-8) = ue(16) = 0000 1000 1
        let data = [0b0000_1000, 0b1000_0000];
        let mut reader = BitReader::new(&data);
        let list = ScalingList::<16>::parse(&mut reader).unwrap();

        assert!(list.use_default_scaling_matrix_flag);
        assert_eq!(list.values, [8; 16]);
        assert_eq!(reader.bit_position(), 9);

        let (parsed, bits) = round_trip(&list);
        assert_eq!(parsed, list);
        assert_eq!(bits, 9);
    }

    #[test]
    fn test_flat_list_terminates_early() {
        let list = ScalingList::<64>::default();
        let (parsed, bits) = round_trip(&list);

        assert_eq!(parsed, list);
        // se(8) + se(-16)
        assert_eq!(bits, 9 + 11);
    }

    #[test]
    fn test_arbitrary_values() {
        let mut values = [0u8; 16];
        for (i, value) in values.iter_mut().enumerate() {
            *value = (6 + i as u8 * 13) % 250 + 1;
        }
        values[15] = 255;

        let list = ScalingList {
            values,
            use_default_scaling_matrix_flag: false,
        };
        assert_eq!(round_trip(&list).0, list);
    }

    #[test]
    fn test_trailing_run() {
        let mut values = [20u8; 16];
        values[0] = 6;
        values[1] = 13;

        let list = ScalingList {
            values,
            use_default_scaling_matrix_flag: false,
        };
        let (parsed, bits) = round_trip(&list);
        assert_eq!(parsed, list);
        // se(-2) + se(7) + se(7) + se(-20)
        assert_eq!(bits, 5 + 7 + 7 + 11);
    }

    #[test]
    fn test_zero_value_is_rejected() {
        let mut list = ScalingList::<16>::default();
        list.values[3] = 0;

        let mut buf = [0u8; 64];
        let mut writer = BitWriter::new(&mut buf);
        assert!(list.build(&mut writer).is_err());
    }

    #[test]
    fn test_matrix() {
        let mut matrix = ScalingMatrix::default();
        matrix.lists_4x4[1] = Some(ScalingList::default());
        matrix.lists_8x8[0] = Some(ScalingList {
            values: [8; 64],
            use_default_scaling_matrix_flag: true,
        });
        matrix.lists_8x8[5] = Some(ScalingList::default());

        let mut buf = [0u8; 64];
        let mut writer = BitWriter::new(&mut buf);
        matrix.build(&mut writer, 12).unwrap();
        let len = writer.finish().unwrap();

        let mut reader = BitReader::new(&buf[..len]);
        assert_eq!(ScalingMatrix::parse(&mut reader, 12).unwrap(), matrix);

        // only the first eight slots are coded for non 4:4:4 streams
        let mut buf = [0u8; 64];
        let mut writer = BitWriter::new(&mut buf);
        matrix.build(&mut writer, 8).unwrap();
        let len = writer.finish().unwrap();

        let mut reader = BitReader::new(&buf[..len]);
        let parsed = ScalingMatrix::parse(&mut reader, 8).unwrap();
        assert_eq!(parsed.lists_8x8[5], None);
        assert_eq!(parsed.lists_4x4, matrix.lists_4x4);
    }
}
