use std::io;

use bytes_util::{BitReader, BitWriter};
use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt};

/// `FrameCropInfo` contains the frame cropping info, present when `frame_cropping_flag == 1`.
///
/// The offsets are in units of `CropUnitX` / `CropUnitY`, which depend on
/// the chroma format and on `frame_mbs_only_flag` (ISO/IEC-14496-10-2022 - 7.4.2.1.1).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameCropInfo {
    /// The `frame_crop_left_offset`.
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    pub frame_crop_left_offset: u64,

    /// The `frame_crop_right_offset`.
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    pub frame_crop_right_offset: u64,

    /// The `frame_crop_top_offset`.
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    pub frame_crop_top_offset: u64,

    /// The `frame_crop_bottom_offset`.
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    pub frame_crop_bottom_offset: u64,
}

impl FrameCropInfo {
    /// Parses the fields defined when the `frame_cropping_flag == 1` from a bitstream.
    pub fn parse(reader: &mut BitReader) -> io::Result<Self> {
        let frame_crop_left_offset = reader.read_exp_golomb()?;
        let frame_crop_right_offset = reader.read_exp_golomb()?;
        let frame_crop_top_offset = reader.read_exp_golomb()?;
        let frame_crop_bottom_offset = reader.read_exp_golomb()?;

        Ok(FrameCropInfo {
            frame_crop_left_offset,
            frame_crop_right_offset,
            frame_crop_top_offset,
            frame_crop_bottom_offset,
        })
    }

    /// Builds the FrameCropInfo struct into a bitstream.
    pub fn build(&self, writer: &mut BitWriter) -> io::Result<()> {
        writer.write_exp_golomb(self.frame_crop_left_offset)?;
        writer.write_exp_golomb(self.frame_crop_right_offset)?;
        writer.write_exp_golomb(self.frame_crop_top_offset)?;
        writer.write_exp_golomb(self.frame_crop_bottom_offset)?;
        Ok(())
    }
}
