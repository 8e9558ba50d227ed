use std::io;

use bytes_util::{BitReader, BitWriter, range_check};
use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt};

/// The fields set when `bitstream_restriction_flag == 1`, ISO/IEC-14496-10-2022 - E.2.1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitstreamRestriction {
    /// `motion_vectors_over_pic_boundaries_flag`
    pub motion_vectors_over_pic_boundaries_flag: bool,

    /// `max_bytes_per_pic_denom`, in \[0, 16\]. 0 means no limit.
    pub max_bytes_per_pic_denom: u8,

    /// `max_bits_per_mb_denom`, in \[0, 16\]. 0 means no limit.
    pub max_bits_per_mb_denom: u8,

    /// `log2_max_mv_length_horizontal`, in \[0, 15\] for conforming streams.
    pub log2_max_mv_length_horizontal: u8,

    /// `log2_max_mv_length_vertical`, in \[0, 15\] for conforming streams.
    pub log2_max_mv_length_vertical: u8,

    /// `max_num_reorder_frames`: the number of frames that may precede any
    /// frame in decoding order and follow it in output order.
    pub max_num_reorder_frames: u32,

    /// `max_dec_frame_buffering`: the required size of the decoded picture buffer in frames.
    pub max_dec_frame_buffering: u32,
}

impl Default for BitstreamRestriction {
    fn default() -> Self {
        // inferred values when bitstream_restriction_flag is 0, E.2.1
        Self {
            motion_vectors_over_pic_boundaries_flag: true,
            max_bytes_per_pic_denom: 2,
            max_bits_per_mb_denom: 1,
            log2_max_mv_length_horizontal: 15,
            log2_max_mv_length_vertical: 15,
            max_num_reorder_frames: 16,
            max_dec_frame_buffering: 16,
        }
    }
}

impl BitstreamRestriction {
    /// Parses the fields defined when the `bitstream_restriction_flag == 1` from a bitstream.
    pub fn parse(reader: &mut BitReader) -> io::Result<Self> {
        let motion_vectors_over_pic_boundaries_flag = reader.read_bit()?;

        let max_bytes_per_pic_denom = reader.read_exp_golomb()?;
        range_check!(max_bytes_per_pic_denom, 0, 16)?;
        let max_bits_per_mb_denom = reader.read_exp_golomb()?;
        range_check!(max_bits_per_mb_denom, 0, 16)?;

        // 16 is accepted as well, some encoders write it
        let log2_max_mv_length_horizontal = reader.read_exp_golomb()?;
        range_check!(log2_max_mv_length_horizontal, 0, 16)?;
        let log2_max_mv_length_vertical = reader.read_exp_golomb()?;
        range_check!(log2_max_mv_length_vertical, 0, 16)?;

        let max_num_reorder_frames = reader.read_exp_golomb()?;
        range_check!(max_num_reorder_frames, 0, 16)?;
        let max_dec_frame_buffering = reader.read_exp_golomb()?;
        range_check!(max_dec_frame_buffering, 0, 16)?;

        Ok(Self {
            motion_vectors_over_pic_boundaries_flag,
            max_bytes_per_pic_denom: max_bytes_per_pic_denom as u8,
            max_bits_per_mb_denom: max_bits_per_mb_denom as u8,
            log2_max_mv_length_horizontal: log2_max_mv_length_horizontal as u8,
            log2_max_mv_length_vertical: log2_max_mv_length_vertical as u8,
            max_num_reorder_frames: max_num_reorder_frames as u32,
            max_dec_frame_buffering: max_dec_frame_buffering as u32,
        })
    }

    /// Builds the BitstreamRestriction struct into a bitstream.
    pub fn build(&self, writer: &mut BitWriter) -> io::Result<()> {
        writer.write_bit(self.motion_vectors_over_pic_boundaries_flag)?;
        writer.write_exp_golomb(self.max_bytes_per_pic_denom as u64)?;
        writer.write_exp_golomb(self.max_bits_per_mb_denom as u64)?;
        writer.write_exp_golomb(self.log2_max_mv_length_horizontal as u64)?;
        writer.write_exp_golomb(self.log2_max_mv_length_vertical as u64)?;
        writer.write_exp_golomb(self.max_num_reorder_frames as u64)?;
        writer.write_exp_golomb(self.max_dec_frame_buffering as u64)?;
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let restriction = BitstreamRestriction {
            motion_vectors_over_pic_boundaries_flag: true,
            max_bytes_per_pic_denom: 2,
            max_bits_per_mb_denom: 1,
            log2_max_mv_length_horizontal: 16,
            log2_max_mv_length_vertical: 16,
            max_num_reorder_frames: 0,
            max_dec_frame_buffering: 1,
        };

        let mut buf = [0u8; 16];
        let mut writer = BitWriter::new(&mut buf);
        restriction.build(&mut writer).unwrap();
        let len = writer.finish().unwrap();

        let parsed = BitstreamRestriction::parse(&mut BitReader::new(&buf[..len])).unwrap();
        assert_eq!(parsed, restriction);
    }

    #[test]
    fn test_reorder_frames_out_of_range() {
        let mut buf = [0u8; 16];
        let mut writer = BitWriter::new(&mut buf);
        writer.write_bit(true).unwrap();
        for _ in 0..4 {
            writer.write_exp_golomb(0).unwrap();
        }
        writer.write_exp_golomb(17).unwrap();
        let len = writer.finish().unwrap();

        let err = BitstreamRestriction::parse(&mut BitReader::new(&buf[..len])).unwrap_err();
        assert_eq!(err.to_string(), "max_num_reorder_frames is out of range [0, 16]: 17");
    }
}
