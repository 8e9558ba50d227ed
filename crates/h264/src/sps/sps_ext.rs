use std::io;

use bytes_util::{BitReader, BitWriter, range_check};
use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt};

use crate::ScalingMatrix;

/// The high profile part of the Sequence Parameter Set.
/// ISO/IEC-14496-10-2022 - 7.3.2.1.1
///
/// Only present when `profile_idc` is one of the values in
/// [`Sps::HIGH_PROFILES`](crate::Sps::HIGH_PROFILES).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpsExtended {
    /// The `chroma_format_idc` as a u8. This is the chroma sampling relative
    /// to the luma sampling specified in subclause 6.2.
    ///
    /// The value of this ranges from \[0, 3\].
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub chroma_format_idc: u8,

    /// The `separate_colour_plane_flag` is a single bit, only coded when
    /// `chroma_format_idc == 3`.
    ///
    /// 0 means the the color components aren't coded separately and `ChromaArrayType` is set to `chroma_format_idc`.
    ///
    /// 1 means the 3 color components of the 4:4:4 chroma format are coded separately and
    /// `ChromaArrayType` is set to 0.
    ///
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub separate_color_plane_flag: bool,

    /// The `bit_depth_luma_minus8` as a u8.
    ///
    /// The value of this ranges from \[0, 6\].
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub bit_depth_luma_minus8: u8,

    /// The `bit_depth_chroma_minus8` as a u8.
    ///
    /// The value of this ranges from \[0, 6\].
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub bit_depth_chroma_minus8: u8,

    /// The `qpprime_y_zero_transform_bypass_flag` is a single bit.
    ///
    /// 1 means that when QP'_Y is 0 then a transform bypass operation for the transform
    /// coefficient decoding and picture construction processes will be applied before
    /// the deblocking filter process from subclause 8.5.
    ///
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub qpprime_y_zero_transform_bypass_flag: bool,

    /// The sequence scaling lists. `Some` when `seq_scaling_matrix_present_flag` is set.
    ///
    /// 8 list slots are coded, 12 when `chroma_format_idc == 3`.
    pub scaling_matrix: Option<ScalingMatrix>,
}

impl Default for SpsExtended {
    fn default() -> Self {
        // default values defined in 7.4.2.1.1
        Self {
            chroma_format_idc: 1,
            separate_color_plane_flag: false,
            bit_depth_luma_minus8: 0,
            bit_depth_chroma_minus8: 0,
            qpprime_y_zero_transform_bypass_flag: false,
            scaling_matrix: None,
        }
    }
}

impl SpsExtended {
    /// Parses an extended SPS from a bitstream.
    pub fn parse(reader: &mut BitReader) -> io::Result<Self> {
        let chroma_format_idc = reader.read_exp_golomb()?;
        range_check!(chroma_format_idc, 0, 3)?;
        let chroma_format_idc = chroma_format_idc as u8;

        // Defaults to false: ISO/IEC-14496-10-2022 - 7.4.2.1.1
        let mut separate_color_plane_flag = false;
        if chroma_format_idc == 3 {
            separate_color_plane_flag = reader.read_bit()?;
        }

        let bit_depth_luma_minus8 = reader.read_exp_golomb()?;
        range_check!(bit_depth_luma_minus8, 0, 6)?;
        let bit_depth_chroma_minus8 = reader.read_exp_golomb()?;
        range_check!(bit_depth_chroma_minus8, 0, 6)?;

        let qpprime_y_zero_transform_bypass_flag = reader.read_bit()?;

        let seq_scaling_matrix_present_flag = reader.read_bit()?;
        let scaling_matrix = if seq_scaling_matrix_present_flag {
            Some(ScalingMatrix::parse(reader, Self::scaling_list_count(chroma_format_idc))?)
        } else {
            None
        };

        Ok(Self {
            chroma_format_idc,
            separate_color_plane_flag,
            bit_depth_luma_minus8: bit_depth_luma_minus8 as u8,
            bit_depth_chroma_minus8: bit_depth_chroma_minus8 as u8,
            qpprime_y_zero_transform_bypass_flag,
            scaling_matrix,
        })
    }

    /// Builds the SpsExtended struct into a bitstream.
    pub fn build(&self, writer: &mut BitWriter) -> io::Result<()> {
        writer.write_exp_golomb(self.chroma_format_idc as u64)?;

        if self.chroma_format_idc == 3 {
            writer.write_bit(self.separate_color_plane_flag)?;
        }

        writer.write_exp_golomb(self.bit_depth_luma_minus8 as u64)?;
        writer.write_exp_golomb(self.bit_depth_chroma_minus8 as u64)?;
        writer.write_bit(self.qpprime_y_zero_transform_bypass_flag)?;

        writer.write_bit(self.scaling_matrix.is_some())?;
        if let Some(matrix) = &self.scaling_matrix {
            matrix.build(writer, Self::scaling_list_count(self.chroma_format_idc))?;
        }

        Ok(())
    }

    const fn scaling_list_count(chroma_format_idc: u8) -> usize {
        if chroma_format_idc != 3 { 8 } else { 12 }
    }
}
