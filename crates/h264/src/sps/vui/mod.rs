mod bitstream_restriction;
mod chroma_sample_loc;
mod hrd_parameters;
mod sample_aspect_ratio;
mod timing_info;
mod video_signal_type;

use std::io;

use bytes_util::{BitReader, BitWriter};

pub use self::bitstream_restriction::BitstreamRestriction;
pub use self::chroma_sample_loc::ChromaSampleLoc;
pub use self::hrd_parameters::{CpbSchedule, HrdParameters};
pub use self::sample_aspect_ratio::SarDimensions;
pub use self::timing_info::TimingInfo;
pub use self::video_signal_type::{ColorDescription, VideoSignalType};

/// Video Usability Information, `vui_parameters()`.
///
/// ISO/IEC-14496-10-2022 - E.1.1
///
/// Every `Option` field corresponds to a `*_present_flag` in the bitstream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VuiParameters {
    /// `Some` when `aspect_ratio_info_present_flag` is set.
    pub sample_aspect_ratio: Option<SarDimensions>,

    /// The `overscan_appropriate_flag`, `Some` when `overscan_info_present_flag` is set.
    ///
    /// ISO/IEC-14496-10-2022 - E.2.1
    pub overscan_appropriate_flag: Option<bool>,

    /// `Some` when `video_signal_type_present_flag` is set.
    pub video_signal_type: Option<VideoSignalType>,

    /// `Some` when `chroma_loc_info_present_flag` is set.
    pub chroma_sample_loc: Option<ChromaSampleLoc>,

    /// `Some` when `timing_info_present_flag` is set.
    pub timing_info: Option<TimingInfo>,

    /// `Some` when `nal_hrd_parameters_present_flag` is set.
    pub nal_hrd_parameters: Option<HrdParameters>,

    /// `Some` when `vcl_hrd_parameters_present_flag` is set.
    pub vcl_hrd_parameters: Option<HrdParameters>,

    /// The `low_delay_hrd_flag`. It is only coded when one of the HRD
    /// parameter sets is present and is ignored otherwise.
    pub low_delay_hrd_flag: bool,

    /// The `pic_struct_present_flag`.
    pub pic_struct_present_flag: bool,

    /// `Some` when `bitstream_restriction_flag` is set.
    pub bitstream_restriction: Option<BitstreamRestriction>,
}

impl VuiParameters {
    /// Parses the VUI parameters from a bitstream.
    pub fn parse(reader: &mut BitReader) -> io::Result<Self> {
        let mut vui = Self::default();

        let aspect_ratio_info_present_flag = reader.read_bit()?;
        if aspect_ratio_info_present_flag {
            vui.sample_aspect_ratio = Some(SarDimensions::parse(reader)?);
        }

        let overscan_info_present_flag = reader.read_bit()?;
        if overscan_info_present_flag {
            vui.overscan_appropriate_flag = Some(reader.read_bit()?);
        }

        let video_signal_type_present_flag = reader.read_bit()?;
        if video_signal_type_present_flag {
            vui.video_signal_type = Some(VideoSignalType::parse(reader)?);
        }

        let chroma_loc_info_present_flag = reader.read_bit()?;
        if chroma_loc_info_present_flag {
            vui.chroma_sample_loc = Some(ChromaSampleLoc::parse(reader)?);
        }

        let timing_info_present_flag = reader.read_bit()?;
        if timing_info_present_flag {
            vui.timing_info = Some(TimingInfo::parse(reader)?);
        }

        let nal_hrd_parameters_present_flag = reader.read_bit()?;
        if nal_hrd_parameters_present_flag {
            vui.nal_hrd_parameters = Some(HrdParameters::parse(reader)?);
        }

        let vcl_hrd_parameters_present_flag = reader.read_bit()?;
        if vcl_hrd_parameters_present_flag {
            vui.vcl_hrd_parameters = Some(HrdParameters::parse(reader)?);
        }

        if nal_hrd_parameters_present_flag || vcl_hrd_parameters_present_flag {
            vui.low_delay_hrd_flag = reader.read_bit()?;
        }

        vui.pic_struct_present_flag = reader.read_bit()?;

        let bitstream_restriction_flag = reader.read_bit()?;
        if bitstream_restriction_flag {
            vui.bitstream_restriction = Some(BitstreamRestriction::parse(reader)?);
        }

        Ok(vui)
    }

    /// Builds the VUI parameters into a bitstream.
    pub fn build(&self, writer: &mut BitWriter) -> io::Result<()> {
        writer.write_bit(self.sample_aspect_ratio.is_some())?;
        if let Some(sar) = &self.sample_aspect_ratio {
            sar.build(writer)?;
        }

        writer.write_bit(self.overscan_appropriate_flag.is_some())?;
        if let Some(flag) = self.overscan_appropriate_flag {
            writer.write_bit(flag)?;
        }

        writer.write_bit(self.video_signal_type.is_some())?;
        if let Some(signal) = &self.video_signal_type {
            signal.build(writer)?;
        }

        writer.write_bit(self.chroma_sample_loc.is_some())?;
        if let Some(loc) = &self.chroma_sample_loc {
            loc.build(writer)?;
        }

        writer.write_bit(self.timing_info.is_some())?;
        if let Some(timing) = &self.timing_info {
            timing.build(writer)?;
        }

        writer.write_bit(self.nal_hrd_parameters.is_some())?;
        if let Some(hrd) = &self.nal_hrd_parameters {
            hrd.build(writer)?;
        }

        writer.write_bit(self.vcl_hrd_parameters.is_some())?;
        if let Some(hrd) = &self.vcl_hrd_parameters {
            hrd.build(writer)?;
        }

        if self.nal_hrd_parameters.is_some() || self.vcl_hrd_parameters.is_some() {
            writer.write_bit(self.low_delay_hrd_flag)?;
        }

        writer.write_bit(self.pic_struct_present_flag)?;

        writer.write_bit(self.bitstream_restriction.is_some())?;
        if let Some(restriction) = &self.bitstream_restriction {
            restriction.build(writer)?;
        }

        Ok(())
    }
}
