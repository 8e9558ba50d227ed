use std::io;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes_util::{BitReader, BitWriter};

/// `TimingInfo` contains the fields that are set when `timing_info_present_flag == 1`.
///
/// This contains the following fields: `num_units_in_tick`, `time_scale` and `fixed_frame_rate_flag`.
///
/// ISO/IEC-14496-10-2022 - E.2.1
///
/// Refer to the direct fields for more information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimingInfo {
    /// The `num_units_in_tick` is the smallest unit used to measure time.
    ///
    /// It is used alongside `time_scale` to compute the `frame_rate` as follows:
    ///
    /// `frame_rate = time_scale / (2 * num_units_in_tick)`
    ///
    /// Conforming streams never code 0, but a 0 is kept as is so the SPS can be
    /// written back unchanged; [`TimingInfo::frame_rate`] returns `None` for it.
    ///
    /// ISO/IEC-14496-10-2022 - E.2.1
    pub num_units_in_tick: u32,

    /// The `time_scale` is the number of time units that pass in 1 second (hz).
    ///
    /// ISO/IEC-14496-10-2022 - E.2.1
    pub time_scale: u32,

    /// The `fixed_frame_rate_flag` is a single bit.
    ///
    /// 1 means the temporal distance between consecutive pictures in output order is constrained.
    pub fixed_frame_rate_flag: bool,
}

impl TimingInfo {
    /// Parses the fields defined when the `timing_info_present_flag == 1` from a bitstream.
    pub fn parse(reader: &mut BitReader) -> io::Result<Self> {
        let num_units_in_tick = reader.read_u32::<BigEndian>()?;
        let time_scale = reader.read_u32::<BigEndian>()?;
        let fixed_frame_rate_flag = reader.read_bit()?;

        Ok(TimingInfo {
            num_units_in_tick,
            time_scale,
            fixed_frame_rate_flag,
        })
    }

    /// Builds the TimingInfo struct into a bitstream.
    pub fn build(&self, writer: &mut BitWriter) -> io::Result<()> {
        writer.write_u32::<BigEndian>(self.num_units_in_tick)?;
        writer.write_u32::<BigEndian>(self.time_scale)?;
        writer.write_bit(self.fixed_frame_rate_flag)?;
        Ok(())
    }

    /// Returns the total bits of the TimingInfo struct. It is always 65 bits.
    pub const fn bitsize(&self) -> u64 {
        65
    }

    /// Returns the frame rate, `None` when either value is 0.
    pub fn frame_rate(&self) -> Option<f64> {
        if self.num_units_in_tick == 0 || self.time_scale == 0 {
            return None;
        }

        Some(self.time_scale as f64 / (2.0 * self.num_units_in_tick as f64))
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rate() {
        let timing = TimingInfo {
            num_units_in_tick: 1001,
            time_scale: 60000,
            fixed_frame_rate_flag: true,
        };

        let mut buf = [0u8; 9];
        let mut writer = BitWriter::new(&mut buf);
        timing.build(&mut writer).unwrap();
        assert_eq!(writer.bit_position(), timing.bitsize());
        let len = writer.finish().unwrap();

        let parsed = TimingInfo::parse(&mut BitReader::new(&buf[..len])).unwrap();
        assert_eq!(parsed, timing);
        assert!((parsed.frame_rate().unwrap() - 29.97).abs() < 0.001);
    }

    #[test]
    fn test_zero_values() {
        let data = [0u8; 9];
        let parsed = TimingInfo::parse(&mut BitReader::new(&data)).unwrap();
        assert_eq!(parsed.frame_rate(), None);
    }
}
