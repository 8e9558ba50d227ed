use std::io;

use bytes_util::{BitReader, BitWriter, range_check};
use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt};

/// `hrd_parameters()`, ISO/IEC-14496-10-2022 - E.1.2
///
/// The same structure is used for the NAL and the VCL HRD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HrdParameters {
    /// `bit_rate_scale`, 4 bits.
    pub bit_rate_scale: u8,

    /// `cpb_size_scale`, 4 bits.
    pub cpb_size_scale: u8,

    /// One entry per coded picture buffer specification, `cpb_cnt_minus1 + 1`
    /// entries in total (at most 32).
    pub schedules: Vec<CpbSchedule>,

    /// `initial_cpb_removal_delay_length_minus1`, 5 bits.
    pub initial_cpb_removal_delay_length_minus1: u8,

    /// `cpb_removal_delay_length_minus1`, 5 bits.
    pub cpb_removal_delay_length_minus1: u8,

    /// `dpb_output_delay_length_minus1`, 5 bits.
    pub dpb_output_delay_length_minus1: u8,

    /// `time_offset_length`, 5 bits.
    pub time_offset_length: u8,
}

/// The per `SchedSelIdx` values of [`HrdParameters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpbSchedule {
    /// `bit_rate_value_minus1[SchedSelIdx]`
    pub bit_rate_value_minus1: u32,
    /// `cpb_size_value_minus1[SchedSelIdx]`
    pub cpb_size_value_minus1: u32,
    /// `cbr_flag[SchedSelIdx]`
    pub cbr_flag: bool,
}

impl Default for HrdParameters {
    fn default() -> Self {
        Self {
            bit_rate_scale: 0,
            cpb_size_scale: 0,
            schedules: vec![CpbSchedule::default()],
            initial_cpb_removal_delay_length_minus1: 23,
            cpb_removal_delay_length_minus1: 23,
            dpb_output_delay_length_minus1: 23,
            time_offset_length: 24,
        }
    }
}

impl HrdParameters {
    /// Parses the HRD parameters from a bitstream.
    pub fn parse(reader: &mut BitReader) -> io::Result<Self> {
        let cpb_cnt_minus1 = reader.read_exp_golomb()?;
        range_check!(cpb_cnt_minus1, 0, 31)?;

        let bit_rate_scale = reader.read_bits(4)? as u8;
        let cpb_size_scale = reader.read_bits(4)? as u8;

        let mut schedules = Vec::with_capacity(cpb_cnt_minus1 as usize + 1);
        for _ in 0..=cpb_cnt_minus1 {
            let bit_rate_value_minus1 = reader.read_exp_golomb()?;
            range_check!(bit_rate_value_minus1, 0, u32::MAX as u64 - 1)?;
            let cpb_size_value_minus1 = reader.read_exp_golomb()?;
            range_check!(cpb_size_value_minus1, 0, u32::MAX as u64 - 1)?;

            schedules.push(CpbSchedule {
                bit_rate_value_minus1: bit_rate_value_minus1 as u32,
                cpb_size_value_minus1: cpb_size_value_minus1 as u32,
                cbr_flag: reader.read_bit()?,
            });
        }

        Ok(Self {
            bit_rate_scale,
            cpb_size_scale,
            schedules,
            initial_cpb_removal_delay_length_minus1: reader.read_bits(5)? as u8,
            cpb_removal_delay_length_minus1: reader.read_bits(5)? as u8,
            dpb_output_delay_length_minus1: reader.read_bits(5)? as u8,
            time_offset_length: reader.read_bits(5)? as u8,
        })
    }

    /// Builds the HRD parameters into a bitstream.
    pub fn build(&self, writer: &mut BitWriter) -> io::Result<()> {
        range_check!(self.schedules.len(), 1, 32)?;

        writer.write_exp_golomb(self.schedules.len() as u64 - 1)?;
        writer.write_bits(self.bit_rate_scale as u64, 4)?;
        writer.write_bits(self.cpb_size_scale as u64, 4)?;

        for schedule in &self.schedules {
            writer.write_exp_golomb(schedule.bit_rate_value_minus1 as u64)?;
            writer.write_exp_golomb(schedule.cpb_size_value_minus1 as u64)?;
            writer.write_bit(schedule.cbr_flag)?;
        }

        writer.write_bits(self.initial_cpb_removal_delay_length_minus1 as u64, 5)?;
        writer.write_bits(self.cpb_removal_delay_length_minus1 as u64, 5)?;
        writer.write_bits(self.dpb_output_delay_length_minus1 as u64, 5)?;
        writer.write_bits(self.time_offset_length as u64, 5)?;

        Ok(())
    }

    /// `BitRate[SchedSelIdx]` in bits per second, E.2.2
    ///
    /// `None` when the schedule does not exist or `bit_rate_scale` does not fit its 4 bits.
    pub fn bit_rate(&self, sched_sel_idx: usize) -> Option<u64> {
        let schedule = self.schedules.get(sched_sel_idx)?;
        scaled(schedule.bit_rate_value_minus1, 6, self.bit_rate_scale)
    }

    /// `CpbSize[SchedSelIdx]` in bits, E.2.2
    ///
    /// `None` when the schedule does not exist or `cpb_size_scale` does not fit its 4 bits.
    pub fn cpb_size(&self, sched_sel_idx: usize) -> Option<u64> {
        let schedule = self.schedules.get(sched_sel_idx)?;
        scaled(schedule.cpb_size_value_minus1, 4, self.cpb_size_scale)
    }
}

/// `(value_minus1 + 1) * 2^(base + scale)`, scale being a u(4).
fn scaled(value_minus1: u32, base: u32, scale: u8) -> Option<u64> {
    if scale > 0b1111 {
        return None;
    }

    Some((value_minus1 as u64 + 1) << (base + scale as u32))
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let hrd = HrdParameters {
            bit_rate_scale: 2,
            cpb_size_scale: 3,
            schedules: vec![
                CpbSchedule {
                    bit_rate_value_minus1: 15624,
                    cpb_size_value_minus1: 62499,
                    cbr_flag: false,
                },
                CpbSchedule {
                    bit_rate_value_minus1: 31249,
                    cpb_size_value_minus1: 124999,
                    cbr_flag: true,
                },
            ],
            ..Default::default()
        };

        let mut buf = [0u8; 32];
        let mut writer = BitWriter::new(&mut buf);
        hrd.build(&mut writer).unwrap();
        let len = writer.finish().unwrap();

        let parsed = HrdParameters::parse(&mut BitReader::new(&buf[..len])).unwrap();
        assert_eq!(parsed, hrd);
        assert_eq!(parsed.bit_rate(0), Some(15625 << 8));
        assert_eq!(parsed.cpb_size(1), Some(125000 << 7));
        assert_eq!(parsed.bit_rate(2), None);
    }

    #[test]
    fn test_cpb_cnt_out_of_range() {
        let mut buf = [0u8; 4];
        let mut writer = BitWriter::new(&mut buf);
        writer.write_exp_golomb(32).unwrap();
        let len = writer.finish().unwrap();

        let err = HrdParameters::parse(&mut BitReader::new(&buf[..len])).unwrap_err();
        assert_eq!(err.to_string(), "cpb_cnt_minus1 is out of range [0, 31]: 32");
    }

    #[test]
    fn test_scale_wider_than_four_bits() {
        let mut hrd = HrdParameters {
            bit_rate_scale: 15,
            cpb_size_scale: 15,
            schedules: vec![CpbSchedule {
                bit_rate_value_minus1: u32::MAX - 1,
                cpb_size_value_minus1: 0,
                cbr_flag: false,
            }],
            ..Default::default()
        };
        assert_eq!(hrd.bit_rate(0), Some((u32::MAX as u64) << 21));
        assert_eq!(hrd.cpb_size(0), Some(1 << 19));

        hrd.bit_rate_scale = 60;
        hrd.cpb_size_scale = 200;
        assert_eq!(hrd.bit_rate(0), None);
        assert_eq!(hrd.cpb_size(0), None);

        let mut buf = [0u8; 32];
        let mut writer = BitWriter::new(&mut buf);
        assert!(hrd.build(&mut writer).is_err());
    }

    #[test]
    fn test_no_schedules() {
        let hrd = HrdParameters {
            schedules: vec![],
            ..Default::default()
        };

        let mut buf = [0u8; 32];
        let mut writer = BitWriter::new(&mut buf);
        assert!(hrd.build(&mut writer).is_err());
    }
}
