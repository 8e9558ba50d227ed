use std::io;

use byteorder::{ReadBytesExt, WriteBytesExt};
use bytes_util::{BitReader, BitWriter};

use crate::VideoFormat;

/// The video signal type of the VUI, present when `video_signal_type_present_flag == 1`.
/// ISO/IEC-14496-10-2022 - E.2.1
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoSignalType {
    /// The `video_format` is comprised of 3 bits stored as a u8.
    ///
    /// Refer to the `VideoFormat` enum for more info.
    ///
    /// ISO/IEC-14496-10-2022 - E.2.1 Table E-2
    pub video_format: VideoFormat,

    /// The `video_full_range_flag` is a single bit indicating the black level and range of
    /// luma and chroma signals.
    ///
    /// ISO/IEC-14496-10-2022 - E.2.1
    pub video_full_range_flag: bool,

    /// `Some` when `colour_description_present_flag` is set.
    pub color_description: Option<ColorDescription>,
}

/// The three colour description bytes.
///
/// When absent the values are inferred to be 2 (unspecified).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorDescription {
    /// The `colour_primaries` byte. ISO/IEC-14496-10-2022 - E.2.1 Table E-3
    pub color_primaries: u8,

    /// The `transfer_characteristics` byte. ISO/IEC-14496-10-2022 - E.2.1 Table E-4
    pub transfer_characteristics: u8,

    /// The `matrix_coefficients` byte. ISO/IEC-14496-10-2022 - E.2.1 Table E-5
    pub matrix_coefficients: u8,
}

impl Default for ColorDescription {
    fn default() -> Self {
        Self {
            color_primaries: 2,
            transfer_characteristics: 2,
            matrix_coefficients: 2,
        }
    }
}

impl VideoSignalType {
    /// Parses the fields defined when the `video_signal_type_present_flag == 1` from a bitstream.
    pub fn parse(reader: &mut BitReader) -> io::Result<Self> {
        let video_format = VideoFormat::from(reader.read_bits(3)? as u8);
        let video_full_range_flag = reader.read_bit()?;

        let colour_description_present_flag = reader.read_bit()?;
        let color_description = if colour_description_present_flag {
            Some(ColorDescription {
                color_primaries: reader.read_u8()?,
                transfer_characteristics: reader.read_u8()?,
                matrix_coefficients: reader.read_u8()?,
            })
        } else {
            None
        };

        Ok(VideoSignalType {
            video_format,
            video_full_range_flag,
            color_description,
        })
    }

    /// Builds the VideoSignalType struct into a bitstream.
    pub fn build(&self, writer: &mut BitWriter) -> io::Result<()> {
        writer.write_bits(self.video_format as u64, 3)?;
        writer.write_bit(self.video_full_range_flag)?;

        writer.write_bit(self.color_description.is_some())?;
        if let Some(description) = &self.color_description {
            writer.write_u8(description.color_primaries)?;
            writer.write_u8(description.transfer_characteristics)?;
            writer.write_u8(description.matrix_coefficients)?;
        }

        Ok(())
    }

    /// The colour description, or the inferred unspecified values when it is absent.
    pub fn color_description_or_default(&self) -> ColorDescription {
        self.color_description.unwrap_or_default()
    }
}
