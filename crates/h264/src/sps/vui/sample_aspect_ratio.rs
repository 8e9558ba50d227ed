use std::io;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes_util::{BitReader, BitWriter};

use crate::AspectRatioIdc;

/// `SarDimensions` contains the fields that are set when `aspect_ratio_info_present_flag == 1`,
/// and `aspect_ratio_idc == 255`.
///
/// This contains the following fields: `sar_width` and `sar_height`.
///
/// ISO/IEC-14496-10-2022 - E.2.1
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SarDimensions {
    /// The `aspect_ratio_idc` is the sample aspect ratio of the luma samples as a u8.
    ///
    /// This is a full byte, and defaults to 0.
    ///
    /// Refer to the `AspectRatioIdc` type for more info.
    ///
    /// ISO/IEC-14496-10-2022 - E.2.1 Table E-1
    pub aspect_ratio_idc: AspectRatioIdc,

    /// The `sar_width` is the horizontal size of the aspect ratio as a u16.
    ///
    /// Only coded when `aspect_ratio_idc` is `EXTENDED_SAR`.
    ///
    /// ISO/IEC-14496-10-2022 - E.2.1
    pub sar_width: u16,

    /// The `sar_height` is the vertical size of the aspect ratio as a u16.
    ///
    /// Only coded when `aspect_ratio_idc` is `EXTENDED_SAR`.
    ///
    /// ISO/IEC-14496-10-2022 - E.2.1
    pub sar_height: u16,
}

impl SarDimensions {
    /// Parses the fields defined when the `aspect_ratio_info_present_flag == 1` from a bitstream.
    pub fn parse(reader: &mut BitReader) -> io::Result<Self> {
        let mut sar_width = 0; // defaults to 0, E.2.1
        let mut sar_height = 0; // deafults to 0, E.2.1

        let aspect_ratio_idc = AspectRatioIdc(reader.read_u8()?);
        if aspect_ratio_idc == AspectRatioIdc::EXTENDED_SAR {
            sar_width = reader.read_u16::<BigEndian>()?;
            sar_height = reader.read_u16::<BigEndian>()?;
        }

        Ok(SarDimensions {
            aspect_ratio_idc,
            sar_width,
            sar_height,
        })
    }

    /// Builds the SarDimensions struct into a bitstream.
    pub fn build(&self, writer: &mut BitWriter) -> io::Result<()> {
        writer.write_u8(self.aspect_ratio_idc.0)?;

        if self.aspect_ratio_idc == AspectRatioIdc::EXTENDED_SAR {
            writer.write_u16::<BigEndian>(self.sar_width)?;
            writer.write_u16::<BigEndian>(self.sar_height)?;
        }
        Ok(())
    }

    /// The sample aspect ratio as `(width, height)`, resolving table entries
    /// and extended values alike.
    pub fn ratio(&self) -> Option<(u16, u16)> {
        if self.aspect_ratio_idc == AspectRatioIdc::EXTENDED_SAR {
            Some((self.sar_width, self.sar_height)).filter(|(w, h)| *w != 0 && *h != 0)
        } else {
            self.aspect_ratio_idc.ratio()
        }
    }
}
