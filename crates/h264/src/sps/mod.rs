mod frame_crop_info;
mod pic_order_count;
mod sps_ext;
mod vui;

use std::io;

use bytes_util::{BitReader, BitWriter, range_check};
use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt};

pub use self::frame_crop_info::FrameCropInfo;
pub use self::pic_order_count::{PicOrderCount, PicOrderCountType1};
pub use self::sps_ext::SpsExtended;
pub use self::vui::{
    BitstreamRestriction, ChromaSampleLoc, ColorDescription, CpbSchedule, HrdParameters, SarDimensions, TimingInfo,
    VideoSignalType, VuiParameters,
};

/// The Sequence Parameter Set.
/// ISO/IEC-14496-10-2022 - 7.3.2.1.1
///
/// The record covers `seq_parameter_set_data()`; the NAL header and the
/// `rbsp_trailing_bits()` are handled by [`H264Stream`](crate::H264Stream).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sps {
    /// The `profile_idc` of the coded video sequence as a u8.
    ///
    /// It is comprised of 8 bits or 1 byte. ISO/IEC-14496-10-2022 - A.2
    pub profile_idc: u8,

    /// `constraint_set0_flag`: 1 if the stream obeys the Baseline profile constraints (A.2.1).
    pub constraint_set0_flag: bool,

    /// `constraint_set1_flag`: 1 if the stream obeys the Main profile constraints (A.2.2).
    pub constraint_set1_flag: bool,

    /// `constraint_set2_flag`: 1 if the stream obeys the Extended profile constraints (A.2.3).
    pub constraint_set2_flag: bool,

    /// `constraint_set3_flag`. Its meaning depends on `profile_idc`, for
    /// Baseline, Main and Extended it signals level 1b.
    ///
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub constraint_set3_flag: bool,

    /// `constraint_set4_flag`. Its meaning depends on `profile_idc`.
    pub constraint_set4_flag: bool,

    /// `constraint_set5_flag`. Its meaning depends on `profile_idc`.
    pub constraint_set5_flag: bool,

    /// The `reserved_zero_2bits`. Conforming streams code 0; the value is kept
    /// so the constraint byte is written back unchanged.
    pub reserved_zero_2bits: u8,

    /// The `level_idc` of the coded video sequence as a u8.
    ///
    /// It is comprised of 8 bits or 1 byte. ISO/IEC-14496-10-2022 - A.3
    pub level_idc: u8,

    /// The `seq_parameter_set_id` is the id of the SPS referred to by the PPS (picture parameter set).
    ///
    /// The value of this ranges from \[0, 31\].
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub seq_parameter_set_id: u8,

    /// An optional `SpsExtended`. Refer to the SpsExtended struct for more info.
    ///
    /// This will be parsed if `profile_idc` is one of [`Sps::HIGH_PROFILES`].
    pub ext: Option<SpsExtended>,

    /// The `log2_max_frame_num_minus4` is the value used when deriving MaxFrameNum from the equation:
    /// `MaxFrameNum` = 2^(`log2_max_frame_num_minus4` + 4)
    ///
    /// The value of this ranges from \[0, 12\].
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub log2_max_frame_num_minus4: u8,

    /// The picture order count parameters, including `pic_order_cnt_type`.
    pub pic_order_count: PicOrderCount,

    /// The `max_num_ref_frames` is the max short-term and long-term reference frames,
    /// complementary reference field pairs, and non-paired reference fields that
    /// can be used by the decoder for inter-prediction of any picture in the
    /// coded video sequence.
    ///
    /// The value of this ranges from \[0, 16\] (`MaxDpbFrames`, A.3.1).
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub max_num_ref_frames: u8,

    /// The `gaps_in_frame_num_value_allowed_flag` is a single bit.
    ///
    /// The value specifies the allowed values of `frame_num` from subclause 7.4.3
    /// and the decoding process if there is an inferred gap between the values of `frame_num`
    /// from subclause 8.2.5.2.
    pub gaps_in_frame_num_value_allowed_flag: bool,

    /// The `pic_width_in_mbs_minus1` is the width of each decoded picture in macroblocks.
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub pic_width_in_mbs_minus1: u64,

    /// The `pic_height_in_map_units_minus1` is the height of each decoded frame in slice group map units.
    ///
    /// This is a variable number of bits as it is encoded by an exp golomb (unsigned).
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub pic_height_in_map_units_minus1: u64,

    /// The `frame_mbs_only_flag` is a single bit.
    ///
    /// 1 means every coded picture is a coded frame containing only frame macroblocks.
    ///
    /// 0 means coded pictures may be coded fields or frames, and map units are
    /// pairs of macroblocks.
    pub frame_mbs_only_flag: bool,

    /// The `mb_adaptive_frame_field_flag` is a single bit, only coded when
    /// `frame_mbs_only_flag` is 0.
    ///
    /// 1 means frames may switch between frame and field macroblocks.
    pub mb_adaptive_frame_field_flag: bool,

    /// The `direct_8x8_inference_flag` specifies the method used for the derivation
    /// process for luma motion vectors for B_Skip, B_Direct_8x8 and B_Direct_16x16 from subclause 8.4.1.2.
    ///
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub direct_8x8_inference_flag: bool,

    /// An optional `frame_crop_info` struct. `Some` when `frame_cropping_flag` is set.
    pub frame_crop_info: Option<FrameCropInfo>,

    /// An optional `vui_parameters()` struct. `Some` when `vui_parameters_present_flag` is set.
    pub vui: Option<VuiParameters>,
}

impl Default for Sps {
    fn default() -> Self {
        Self {
            profile_idc: 66,
            constraint_set0_flag: false,
            constraint_set1_flag: false,
            constraint_set2_flag: false,
            constraint_set3_flag: false,
            constraint_set4_flag: false,
            constraint_set5_flag: false,
            reserved_zero_2bits: 0,
            level_idc: 0,
            seq_parameter_set_id: 0,
            ext: None,
            log2_max_frame_num_minus4: 0,
            pic_order_count: PicOrderCount::default(),
            max_num_ref_frames: 0,
            gaps_in_frame_num_value_allowed_flag: false,
            pic_width_in_mbs_minus1: 0,
            pic_height_in_map_units_minus1: 0,
            frame_mbs_only_flag: true,
            mb_adaptive_frame_field_flag: false,
            direct_8x8_inference_flag: false,
            frame_crop_info: None,
            vui: None,
        }
    }
}

impl Sps {
    /// The `profile_idc` values that carry the [`SpsExtended`] fields.
    ///
    /// ISO/IEC-14496-10-2022 - 7.3.2.1.1
    pub const HIGH_PROFILES: [u8; 13] = [100, 110, 122, 244, 44, 83, 86, 118, 128, 138, 139, 134, 135];

    /// Returns true if `profile_idc` codes the high profile fields.
    pub fn is_high_profile(profile_idc: u8) -> bool {
        Self::HIGH_PROFILES.contains(&profile_idc)
    }

    /// Parses `seq_parameter_set_data()` from a bitstream positioned right after the NAL header.
    pub fn parse(reader: &mut BitReader) -> io::Result<Self> {
        let profile_idc = reader.read_bits(8)? as u8;
        let constraint_set0_flag = reader.read_bit()?;
        let constraint_set1_flag = reader.read_bit()?;
        let constraint_set2_flag = reader.read_bit()?;
        let constraint_set3_flag = reader.read_bit()?;
        let constraint_set4_flag = reader.read_bit()?;
        let constraint_set5_flag = reader.read_bit()?;
        let reserved_zero_2bits = reader.read_bits(2)? as u8;
        let level_idc = reader.read_bits(8)? as u8;

        let seq_parameter_set_id = reader.read_exp_golomb()?;
        range_check!(seq_parameter_set_id, 0, 31)?;

        let ext = if Self::is_high_profile(profile_idc) {
            Some(SpsExtended::parse(reader)?)
        } else {
            None
        };

        let log2_max_frame_num_minus4 = reader.read_exp_golomb()?;
        range_check!(log2_max_frame_num_minus4, 0, 12)?;

        let pic_order_count = PicOrderCount::parse(reader)?;

        let max_num_ref_frames = reader.read_exp_golomb()?;
        range_check!(max_num_ref_frames, 0, 16)?;

        let gaps_in_frame_num_value_allowed_flag = reader.read_bit()?;
        let pic_width_in_mbs_minus1 = reader.read_exp_golomb()?;
        let pic_height_in_map_units_minus1 = reader.read_exp_golomb()?;

        let frame_mbs_only_flag = reader.read_bit()?;
        let mut mb_adaptive_frame_field_flag = false;
        if !frame_mbs_only_flag {
            mb_adaptive_frame_field_flag = reader.read_bit()?;
        }

        let direct_8x8_inference_flag = reader.read_bit()?;

        let frame_cropping_flag = reader.read_bit()?;
        let frame_crop_info = if frame_cropping_flag {
            Some(FrameCropInfo::parse(reader)?)
        } else {
            None
        };

        let vui_parameters_present_flag = reader.read_bit()?;
        let vui = if vui_parameters_present_flag {
            Some(VuiParameters::parse(reader)?)
        } else {
            None
        };

        Ok(Sps {
            profile_idc,
            constraint_set0_flag,
            constraint_set1_flag,
            constraint_set2_flag,
            constraint_set3_flag,
            constraint_set4_flag,
            constraint_set5_flag,
            reserved_zero_2bits,
            level_idc,
            seq_parameter_set_id: seq_parameter_set_id as u8,
            ext,
            log2_max_frame_num_minus4: log2_max_frame_num_minus4 as u8,
            pic_order_count,
            max_num_ref_frames: max_num_ref_frames as u8,
            gaps_in_frame_num_value_allowed_flag,
            pic_width_in_mbs_minus1,
            pic_height_in_map_units_minus1,
            frame_mbs_only_flag,
            mb_adaptive_frame_field_flag,
            direct_8x8_inference_flag,
            frame_crop_info,
            vui,
        })
    }

    /// Builds `seq_parameter_set_data()` into a bitstream.
    ///
    /// The high profile fields are written whenever `profile_idc` requires
    /// them, using [`SpsExtended::default`] when `ext` is `None`.
    pub fn build(&self, writer: &mut BitWriter) -> io::Result<()> {
        range_check!(self.seq_parameter_set_id, 0, 31)?;

        writer.write_bits(self.profile_idc as u64, 8)?;
        writer.write_bit(self.constraint_set0_flag)?;
        writer.write_bit(self.constraint_set1_flag)?;
        writer.write_bit(self.constraint_set2_flag)?;
        writer.write_bit(self.constraint_set3_flag)?;
        writer.write_bit(self.constraint_set4_flag)?;
        writer.write_bit(self.constraint_set5_flag)?;
        writer.write_bits(self.reserved_zero_2bits as u64 & 0b11, 2)?;
        writer.write_bits(self.level_idc as u64, 8)?;
        writer.write_exp_golomb(self.seq_parameter_set_id as u64)?;

        if Self::is_high_profile(self.profile_idc) {
            match &self.ext {
                Some(ext) => ext.build(writer)?,
                None => SpsExtended::default().build(writer)?,
            }
        }

        writer.write_exp_golomb(self.log2_max_frame_num_minus4 as u64)?;
        self.pic_order_count.build(writer)?;
        writer.write_exp_golomb(self.max_num_ref_frames as u64)?;
        writer.write_bit(self.gaps_in_frame_num_value_allowed_flag)?;
        writer.write_exp_golomb(self.pic_width_in_mbs_minus1)?;
        writer.write_exp_golomb(self.pic_height_in_map_units_minus1)?;

        writer.write_bit(self.frame_mbs_only_flag)?;
        if !self.frame_mbs_only_flag {
            writer.write_bit(self.mb_adaptive_frame_field_flag)?;
        }

        writer.write_bit(self.direct_8x8_inference_flag)?;

        writer.write_bit(self.frame_crop_info.is_some())?;
        if let Some(frame_crop_info) = &self.frame_crop_info {
            frame_crop_info.build(writer)?;
        }

        writer.write_bit(self.vui.is_some())?;
        if let Some(vui) = &self.vui {
            vui.build(writer)?;
        }

        Ok(())
    }

    /// The `chroma_format_idc`, 1 (4:2:0) when the SPS has no high profile fields.
    pub fn chroma_format_idc(&self) -> u8 {
        self.ext.as_ref().map_or(1, |ext| ext.chroma_format_idc)
    }

    /// `separate_colour_plane_flag`, false when the SPS has no high profile fields.
    pub fn separate_color_plane_flag(&self) -> bool {
        self.ext.as_ref().is_some_and(|ext| ext.separate_color_plane_flag)
    }

    /// `ChromaArrayType`: 0 when colour planes are coded separately, `chroma_format_idc` otherwise.
    ///
    /// ISO/IEC-14496-10-2022 - 7.4.2.1.1
    pub fn chroma_array_type(&self) -> u8 {
        if self.separate_color_plane_flag() {
            0
        } else {
            self.chroma_format_idc()
        }
    }

    /// `MaxFrameNum = 2^(log2_max_frame_num_minus4 + 4)`
    pub fn max_frame_num(&self) -> u32 {
        1 << (self.log2_max_frame_num_minus4 as u32 + 4)
    }

    /// `PicSizeInMapUnits = PicWidthInMbs * PicHeightInMapUnits`
    pub fn pic_size_in_map_units(&self) -> u64 {
        (self.pic_width_in_mbs_minus1 + 1).saturating_mul(self.pic_height_in_map_units_minus1 + 1)
    }

    /// `FrameHeightInMbs = (2 - frame_mbs_only_flag) * PicHeightInMapUnits`
    pub fn frame_height_in_mbs(&self) -> u64 {
        (2 - self.frame_mbs_only_flag as u64).saturating_mul(self.pic_height_in_map_units_minus1 + 1)
    }

    /// `(CropUnitX, CropUnitY)`, ISO/IEC-14496-10-2022 - 7.4.2.1.1
    fn crop_units(&self) -> (u64, u64) {
        let field_factor = 2 - self.frame_mbs_only_flag as u64;

        // (SubWidthC, SubHeightC), Table 6-1
        let (sub_width_c, sub_height_c) = match self.chroma_array_type() {
            0 => return (1, field_factor),
            1 => (2, 2),
            2 => (2, 1),
            _ => (1, 1),
        };

        (sub_width_c, sub_height_c * field_factor)
    }

    /// The height as a u64. This is computed from other fields, and isn't directly set.
    ///
    /// `height = FrameHeightInMbs * 16 - CropUnitY * (frame_crop_top_offset + frame_crop_bottom_offset)`
    pub fn height(&self) -> u64 {
        let base_height = self.frame_height_in_mbs().saturating_mul(16);
        let (_, crop_unit_y) = self.crop_units();

        self.frame_crop_info.as_ref().map_or(base_height, |crop| {
            let crop = crop.frame_crop_top_offset.saturating_add(crop.frame_crop_bottom_offset);
            base_height.saturating_sub(crop.saturating_mul(crop_unit_y))
        })
    }

    /// The width as a u64. This is computed from other fields, and isn't directly set.
    ///
    /// `width = PicWidthInMbs * 16 - CropUnitX * (frame_crop_left_offset + frame_crop_right_offset)`
    pub fn width(&self) -> u64 {
        let base_width = (self.pic_width_in_mbs_minus1 + 1).saturating_mul(16);
        let (crop_unit_x, _) = self.crop_units();

        self.frame_crop_info.as_ref().map_or(base_width, |crop| {
            let crop = crop.frame_crop_left_offset.saturating_add(crop.frame_crop_right_offset);
            base_width.saturating_sub(crop.saturating_mul(crop_unit_x))
        })
    }

    /// Returns the frame rate as a f64.
    ///
    /// If the VUI carries timing info with nonzero values, then the framerate will be:
    /// `frame_rate = time_scale as f64 / (2.0 * num_units_in_tick as f64)`
    pub fn frame_rate(&self) -> Option<f64> {
        self.vui.as_ref()?.timing_info.as_ref()?.frame_rate()
    }
}
