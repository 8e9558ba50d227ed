mod slice_groups;

use std::io;

use bytes_util::{BitReader, BitWriter, range_check};
use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt};

pub use self::slice_groups::{SliceGroupMap, SliceGroups};
use crate::rbsp::more_rbsp_data;
use crate::{ParameterSets, ScalingMatrix};

/// The Picture Parameter Set, `pic_parameter_set_rbsp()` without the trailing bits.
///
/// ISO/IEC-14496-10-2022 - 7.3.2.2
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pps {
    /// `pic_parameter_set_id`, in \[0, 255\].
    pub pic_parameter_set_id: u8,

    /// `seq_parameter_set_id` of the SPS this PPS refers to, in \[0, 31\].
    pub seq_parameter_set_id: u8,

    /// `entropy_coding_mode_flag`: 0 selects CAVLC, 1 selects CABAC.
    pub entropy_coding_mode_flag: bool,

    /// `bottom_field_pic_order_in_frame_present_flag`: slice headers carry
    /// `delta_pic_order_cnt_bottom` / `delta_pic_order_cnt[1]`.
    pub bottom_field_pic_order_in_frame_present_flag: bool,

    /// `Some` when `num_slice_groups_minus1 > 0`.
    pub slice_groups: Option<SliceGroups>,

    /// `num_ref_idx_l0_default_active_minus1`, in \[0, 31\].
    pub num_ref_idx_l0_default_active_minus1: u8,

    /// `num_ref_idx_l1_default_active_minus1`, in \[0, 31\].
    pub num_ref_idx_l1_default_active_minus1: u8,

    /// `weighted_pred_flag`: P and SP slices carry a prediction weight table.
    pub weighted_pred_flag: bool,

    /// `weighted_bipred_idc`, 2 bits. 1 means B slices carry a prediction weight table.
    pub weighted_bipred_idc: u8,

    /// `pic_init_qp_minus26`
    pub pic_init_qp_minus26: i32,

    /// `pic_init_qs_minus26`
    pub pic_init_qs_minus26: i32,

    /// `chroma_qp_index_offset`, in \[-12, 12\].
    pub chroma_qp_index_offset: i32,

    /// `deblocking_filter_control_present_flag`
    pub deblocking_filter_control_present_flag: bool,

    /// `constrained_intra_pred_flag`
    pub constrained_intra_pred_flag: bool,

    /// `redundant_pic_cnt_present_flag`
    pub redundant_pic_cnt_present_flag: bool,

    /// The optional trailing fields of the PPS, present when more RBSP data
    /// follows `redundant_pic_cnt_present_flag`.
    pub ext: Option<PpsExtension>,
}

/// The fields that follow `redundant_pic_cnt_present_flag` when `more_rbsp_data()` is true.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PpsExtension {
    /// `transform_8x8_mode_flag`
    pub transform_8x8_mode_flag: bool,

    /// The picture scaling lists, `Some` when `pic_scaling_matrix_present_flag` is set.
    pub scaling_matrix: Option<ScalingMatrix>,

    /// `second_chroma_qp_index_offset`, in \[-12, 12\].
    pub second_chroma_qp_index_offset: i32,
}

impl PpsExtension {
    fn scaling_list_count(&self, chroma_format_idc: u8) -> usize {
        let lists_8x8 = if chroma_format_idc == 3 { 6 } else { 2 };
        6 + lists_8x8 * self.transform_8x8_mode_flag as usize
    }
}

impl Pps {
    /// Parses a PPS from a bitstream positioned right after the NAL header.
    ///
    /// The scaling list count of the optional extension depends on the
    /// `chroma_format_idc` of the referenced SPS, which is looked up in
    /// `parameter_sets` (4:2:0 is assumed when it is not there).
    pub fn parse(reader: &mut BitReader, parameter_sets: &ParameterSets) -> io::Result<Self> {
        let pic_parameter_set_id = reader.read_exp_golomb()?;
        range_check!(pic_parameter_set_id, 0, 255)?;
        let seq_parameter_set_id = reader.read_exp_golomb()?;
        range_check!(seq_parameter_set_id, 0, 31)?;

        let entropy_coding_mode_flag = reader.read_bit()?;
        let bottom_field_pic_order_in_frame_present_flag = reader.read_bit()?;

        let num_slice_groups_minus1 = reader.read_exp_golomb()?;
        range_check!(num_slice_groups_minus1, 0, 7)?;
        let slice_groups = if num_slice_groups_minus1 > 0 {
            Some(SliceGroups::parse(reader, num_slice_groups_minus1 as u8)?)
        } else {
            None
        };

        let num_ref_idx_l0_default_active_minus1 = reader.read_exp_golomb()?;
        range_check!(num_ref_idx_l0_default_active_minus1, 0, 31)?;
        let num_ref_idx_l1_default_active_minus1 = reader.read_exp_golomb()?;
        range_check!(num_ref_idx_l1_default_active_minus1, 0, 31)?;

        let weighted_pred_flag = reader.read_bit()?;
        let weighted_bipred_idc = reader.read_bits(2)? as u8;

        let pic_init_qp_minus26 = reader.read_signed_exp_golomb()?;
        range_check!(pic_init_qp_minus26, -(26 + 6 * 6), 25)?;
        let pic_init_qs_minus26 = reader.read_signed_exp_golomb()?;
        range_check!(pic_init_qs_minus26, -26, 25)?;
        let chroma_qp_index_offset = reader.read_signed_exp_golomb()?;
        range_check!(chroma_qp_index_offset, -12, 12)?;

        let deblocking_filter_control_present_flag = reader.read_bit()?;
        let constrained_intra_pred_flag = reader.read_bit()?;
        let redundant_pic_cnt_present_flag = reader.read_bit()?;

        let ext = if more_rbsp_data(reader) {
            let seq_parameter_set_id = seq_parameter_set_id as u8;
            let chroma_format_idc = parameter_sets
                .sps(seq_parameter_set_id)
                .map_or(1, |sps| sps.chroma_format_idc());

            let mut ext = PpsExtension {
                transform_8x8_mode_flag: reader.read_bit()?,
                ..Default::default()
            };

            let pic_scaling_matrix_present_flag = reader.read_bit()?;
            if pic_scaling_matrix_present_flag {
                let count = ext.scaling_list_count(chroma_format_idc);
                ext.scaling_matrix = Some(ScalingMatrix::parse(reader, count)?);
            }

            let second_chroma_qp_index_offset = reader.read_signed_exp_golomb()?;
            range_check!(second_chroma_qp_index_offset, -12, 12)?;
            ext.second_chroma_qp_index_offset = second_chroma_qp_index_offset as i32;

            Some(ext)
        } else {
            None
        };

        Ok(Self {
            pic_parameter_set_id: pic_parameter_set_id as u8,
            seq_parameter_set_id: seq_parameter_set_id as u8,
            entropy_coding_mode_flag,
            bottom_field_pic_order_in_frame_present_flag,
            slice_groups,
            num_ref_idx_l0_default_active_minus1: num_ref_idx_l0_default_active_minus1 as u8,
            num_ref_idx_l1_default_active_minus1: num_ref_idx_l1_default_active_minus1 as u8,
            weighted_pred_flag,
            weighted_bipred_idc,
            pic_init_qp_minus26: pic_init_qp_minus26 as i32,
            pic_init_qs_minus26: pic_init_qs_minus26 as i32,
            chroma_qp_index_offset: chroma_qp_index_offset as i32,
            deblocking_filter_control_present_flag,
            constrained_intra_pred_flag,
            redundant_pic_cnt_present_flag,
            ext,
        })
    }

    /// Builds the PPS into a bitstream. The extension is written when `ext` is `Some`.
    pub fn build(&self, writer: &mut BitWriter, parameter_sets: &ParameterSets) -> io::Result<()> {
        range_check!(self.seq_parameter_set_id, 0, 31)?;
        range_check!(self.num_ref_idx_l0_default_active_minus1, 0, 31)?;
        range_check!(self.num_ref_idx_l1_default_active_minus1, 0, 31)?;

        writer.write_exp_golomb(self.pic_parameter_set_id as u64)?;
        writer.write_exp_golomb(self.seq_parameter_set_id as u64)?;
        writer.write_bit(self.entropy_coding_mode_flag)?;
        writer.write_bit(self.bottom_field_pic_order_in_frame_present_flag)?;

        match &self.slice_groups {
            Some(slice_groups) => {
                range_check!(slice_groups.num_slice_groups_minus1, 1, 7)?;
                writer.write_exp_golomb(slice_groups.num_slice_groups_minus1 as u64)?;
                slice_groups.build(writer)?;
            }
            None => writer.write_exp_golomb(0)?,
        }

        writer.write_exp_golomb(self.num_ref_idx_l0_default_active_minus1 as u64)?;
        writer.write_exp_golomb(self.num_ref_idx_l1_default_active_minus1 as u64)?;
        writer.write_bit(self.weighted_pred_flag)?;
        writer.write_bits(self.weighted_bipred_idc as u64, 2)?;
        writer.write_signed_exp_golomb(self.pic_init_qp_minus26 as i64)?;
        writer.write_signed_exp_golomb(self.pic_init_qs_minus26 as i64)?;
        writer.write_signed_exp_golomb(self.chroma_qp_index_offset as i64)?;
        writer.write_bit(self.deblocking_filter_control_present_flag)?;
        writer.write_bit(self.constrained_intra_pred_flag)?;
        writer.write_bit(self.redundant_pic_cnt_present_flag)?;

        if let Some(ext) = &self.ext {
            writer.write_bit(ext.transform_8x8_mode_flag)?;

            writer.write_bit(ext.scaling_matrix.is_some())?;
            if let Some(matrix) = &ext.scaling_matrix {
                let chroma_format_idc = parameter_sets
                    .sps(self.seq_parameter_set_id)
                    .map_or(1, |sps| sps.chroma_format_idc());
                matrix.build(writer, ext.scaling_list_count(chroma_format_idc))?;
            }

            writer.write_signed_exp_golomb(ext.second_chroma_qp_index_offset as i64)?;
        }

        Ok(())
    }

    /// `SliceGroupChangeRate`, for slice group map types 3 to 5.
    pub fn slice_group_change_rate(&self) -> Option<u32> {
        self.slice_groups.as_ref()?.slice_group_change_rate()
    }

    /// `transform_8x8_mode_flag`, false without the extension.
    pub fn transform_8x8_mode_flag(&self) -> bool {
        self.ext.as_ref().is_some_and(|ext| ext.transform_8x8_mode_flag)
    }
}
