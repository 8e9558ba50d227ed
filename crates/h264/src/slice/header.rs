use std::io;

use bytes_util::{BitReader, BitWriter, range_check};
use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt};

use super::{DecRefPicMarking, PredWeightTable, RefPicListReordering};
use crate::{NalHeader, ParameterSets, PicOrderCount, Pps, Result, SliceType, Sps};

/// The slice header, `slice_header()` in ISO/IEC-14496-10-2022 - 7.3.3
///
/// Most field widths and presence gates depend on the PPS named by
/// `pic_parameter_set_id` and the SPS that PPS refers to, so parsing and
/// building both go through a [`ParameterSets`] cache.
/// Fields that are not coded for a slice keep their default value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SliceHeader {
    /// `first_mb_in_slice`
    pub first_mb_in_slice: u32,

    /// The kind of slice, from `slice_type % 5`.
    pub slice_type: SliceType,

    /// True when `slice_type` was coded as 5-9: every slice of the picture has this kind.
    pub all_slices_same_type: bool,

    /// `pic_parameter_set_id`, in \[0, 255\].
    pub pic_parameter_set_id: u8,

    /// `colour_plane_id`, in \[0, 2\]. Only coded when the colour planes are coded separately.
    pub colour_plane_id: u8,

    /// `frame_num`, `log2_max_frame_num_minus4 + 4` bits.
    pub frame_num: u32,

    /// `field_pic_flag`. Only coded when `frame_mbs_only_flag` is 0.
    pub field_pic_flag: bool,

    /// `bottom_field_flag`. Only coded for field pictures.
    pub bottom_field_flag: bool,

    /// `idr_pic_id`, in \[0, 65535\]. Only coded in IDR slices.
    pub idr_pic_id: u32,

    /// `pic_order_cnt_lsb`, with `pic_order_cnt_type == 0`.
    pub pic_order_cnt_lsb: u32,

    /// `delta_pic_order_cnt_bottom`, with `pic_order_cnt_type == 0`.
    pub delta_pic_order_cnt_bottom: i32,

    /// `delta_pic_order_cnt[0..2]`, with `pic_order_cnt_type == 1`.
    pub delta_pic_order_cnt: [i32; 2],

    /// `redundant_pic_cnt`, in \[0, 127\].
    pub redundant_pic_cnt: u8,

    /// `direct_spatial_mv_pred_flag`, B slices only.
    pub direct_spatial_mv_pred_flag: bool,

    /// `num_ref_idx_active_override_flag`, P, SP and B slices.
    pub num_ref_idx_active_override_flag: bool,

    /// `num_ref_idx_l0_active_minus1`, in \[0, 31\].
    ///
    /// Taken from the PPS default when the slice does not override it.
    pub num_ref_idx_l0_active_minus1: u8,

    /// `num_ref_idx_l1_active_minus1`, in \[0, 31\].
    ///
    /// Taken from the PPS default when the slice does not override it.
    pub num_ref_idx_l1_active_minus1: u8,

    /// `ref_pic_list_modification()`
    pub ref_pic_list_reordering: RefPicListReordering,

    /// `pred_weight_table()`, present for explicitly weighted prediction.
    pub pred_weight_table: Option<PredWeightTable>,

    /// `dec_ref_pic_marking()`, present when `nal_ref_idc != 0`.
    pub dec_ref_pic_marking: Option<DecRefPicMarking>,

    /// `cabac_init_idc`, in \[0, 2\].
    pub cabac_init_idc: u8,

    /// `slice_qp_delta`
    pub slice_qp_delta: i32,

    /// `sp_for_switch_flag`, SP slices only.
    pub sp_for_switch_flag: bool,

    /// `slice_qs_delta`, SP and SI slices.
    pub slice_qs_delta: i32,

    /// `disable_deblocking_filter_idc`, in \[0, 2\].
    pub disable_deblocking_filter_idc: u8,

    /// `slice_alpha_c0_offset_div2`, in \[-6, 6\].
    pub slice_alpha_c0_offset_div2: i8,

    /// `slice_beta_offset_div2`, in \[-6, 6\].
    pub slice_beta_offset_div2: i8,

    /// `slice_group_change_cycle`, for slice group map types 3 to 5.
    pub slice_group_change_cycle: u32,
}

impl SliceHeader {
    /// Parses a slice header from a bitstream positioned right after the NAL header.
    pub fn parse(reader: &mut BitReader, nal: &NalHeader, parameter_sets: &ParameterSets) -> Result<Self> {
        let mut header = Self::default();

        let first_mb_in_slice = reader.read_exp_golomb()?;
        range_check!(first_mb_in_slice, 0, u32::MAX as u64)?;
        header.first_mb_in_slice = first_mb_in_slice as u32;

        (header.slice_type, header.all_slices_same_type) = SliceType::from_code(reader.read_exp_golomb()?)?;

        let pic_parameter_set_id = reader.read_exp_golomb()?;
        range_check!(pic_parameter_set_id, 0, 255)?;
        header.pic_parameter_set_id = pic_parameter_set_id as u8;

        let (pps, sps) = parameter_sets.resolve(header.pic_parameter_set_id)?;

        if sps.separate_color_plane_flag() {
            let colour_plane_id = reader.read_bits(2)? as u8;
            range_check!(colour_plane_id, 0, 2)?;
            header.colour_plane_id = colour_plane_id;
        }

        header.frame_num = reader.read_bits(frame_num_bits(sps)?)? as u32;

        if !sps.frame_mbs_only_flag {
            header.field_pic_flag = reader.read_bit()?;
            if header.field_pic_flag {
                header.bottom_field_flag = reader.read_bit()?;
            }
        }

        if nal.nal_unit_type.is_idr() {
            let idr_pic_id = reader.read_exp_golomb()?;
            range_check!(idr_pic_id, 0, 65535)?;
            header.idr_pic_id = idr_pic_id as u32;
        }

        let bottom_field_delta = pps.bottom_field_pic_order_in_frame_present_flag && !header.field_pic_flag;
        match &sps.pic_order_count {
            PicOrderCount::Type0 {
                log2_max_pic_order_cnt_lsb_minus4,
            } => {
                header.pic_order_cnt_lsb = reader.read_bits(pic_order_cnt_lsb_bits(*log2_max_pic_order_cnt_lsb_minus4)?)? as u32;
                if bottom_field_delta {
                    header.delta_pic_order_cnt_bottom = read_i32(reader)?;
                }
            }
            PicOrderCount::Type1(poc) if !poc.delta_pic_order_always_zero_flag => {
                header.delta_pic_order_cnt[0] = read_i32(reader)?;
                if bottom_field_delta {
                    header.delta_pic_order_cnt[1] = read_i32(reader)?;
                }
            }
            _ => {}
        }

        if pps.redundant_pic_cnt_present_flag {
            let redundant_pic_cnt = reader.read_exp_golomb()?;
            range_check!(redundant_pic_cnt, 0, 127)?;
            header.redundant_pic_cnt = redundant_pic_cnt as u8;
        }

        if header.slice_type == SliceType::B {
            header.direct_spatial_mv_pred_flag = reader.read_bit()?;
        }

        header.num_ref_idx_l0_active_minus1 = pps.num_ref_idx_l0_default_active_minus1;
        header.num_ref_idx_l1_active_minus1 = pps.num_ref_idx_l1_default_active_minus1;
        if matches!(header.slice_type, SliceType::P | SliceType::SP | SliceType::B) {
            header.num_ref_idx_active_override_flag = reader.read_bit()?;
            if header.num_ref_idx_active_override_flag {
                header.num_ref_idx_l0_active_minus1 = read_ref_idx_count(reader)?;
                if header.slice_type == SliceType::B {
                    header.num_ref_idx_l1_active_minus1 = read_ref_idx_count(reader)?;
                }
            }
        }

        header.ref_pic_list_reordering = RefPicListReordering::parse(reader, header.slice_type)?;

        if header.has_pred_weight_table(pps) {
            header.pred_weight_table = Some(PredWeightTable::parse(
                reader,
                sps.chroma_array_type(),
                header.num_ref_idx_l0_active_minus1,
                header.l1_count_for_weights(),
            )?);
        }

        if nal.nal_ref_idc != 0 {
            header.dec_ref_pic_marking = Some(DecRefPicMarking::parse(reader, nal.nal_unit_type.is_idr())?);
        }

        if pps.entropy_coding_mode_flag && !header.slice_type.is_intra() {
            let cabac_init_idc = reader.read_exp_golomb()?;
            range_check!(cabac_init_idc, 0, 2)?;
            header.cabac_init_idc = cabac_init_idc as u8;
        }

        let slice_qp_delta = reader.read_signed_exp_golomb()?;
        let (min_delta, max_delta) = slice_qp_delta_range(sps, pps);
        range_check!(slice_qp_delta, min_delta, max_delta)?;
        header.slice_qp_delta = slice_qp_delta as i32;

        if matches!(header.slice_type, SliceType::SP | SliceType::SI) {
            if header.slice_type == SliceType::SP {
                header.sp_for_switch_flag = reader.read_bit()?;
            }
            let slice_qs_delta = reader.read_signed_exp_golomb()?;
            range_check!(slice_qs_delta, -51, 51)?;
            header.slice_qs_delta = slice_qs_delta as i32;
        }

        if pps.deblocking_filter_control_present_flag {
            let disable_deblocking_filter_idc = reader.read_exp_golomb()?;
            range_check!(disable_deblocking_filter_idc, 0, 2)?;
            header.disable_deblocking_filter_idc = disable_deblocking_filter_idc as u8;

            if header.disable_deblocking_filter_idc != 1 {
                header.slice_alpha_c0_offset_div2 = read_filter_offset(reader)?;
                header.slice_beta_offset_div2 = read_filter_offset(reader)?;
            }
        }

        if let Some(change_rate) = pps.slice_group_change_rate() {
            let bits = slice_group_change_cycle_bits(sps.pic_size_in_map_units(), change_rate);
            header.slice_group_change_cycle = reader.read_bits(bits)? as u32;
        }

        Ok(header)
    }

    /// Builds the slice header. The NAL header decides whether `idr_pic_id` and
    /// the reference picture marking are written.
    pub fn build(&self, writer: &mut BitWriter, nal: &NalHeader, parameter_sets: &ParameterSets) -> Result<()> {
        let (pps, sps) = parameter_sets.resolve(self.pic_parameter_set_id)?;

        writer.write_exp_golomb(self.first_mb_in_slice as u64)?;
        writer.write_exp_golomb(self.slice_type.to_code(self.all_slices_same_type))?;
        writer.write_exp_golomb(self.pic_parameter_set_id as u64)?;

        if sps.separate_color_plane_flag() {
            range_check!(self.colour_plane_id, 0, 2)?;
            writer.write_bits(self.colour_plane_id as u64, 2)?;
        }

        writer.write_bits(self.frame_num as u64, frame_num_bits(sps)?)?;

        if !sps.frame_mbs_only_flag {
            writer.write_bit(self.field_pic_flag)?;
            if self.field_pic_flag {
                writer.write_bit(self.bottom_field_flag)?;
            }
        }

        if nal.nal_unit_type.is_idr() {
            range_check!(self.idr_pic_id, 0, 65535)?;
            writer.write_exp_golomb(self.idr_pic_id as u64)?;
        }

        let field_pic_flag = !sps.frame_mbs_only_flag && self.field_pic_flag;
        let bottom_field_delta = pps.bottom_field_pic_order_in_frame_present_flag && !field_pic_flag;
        match &sps.pic_order_count {
            PicOrderCount::Type0 {
                log2_max_pic_order_cnt_lsb_minus4,
            } => {
                writer.write_bits(
                    self.pic_order_cnt_lsb as u64,
                    pic_order_cnt_lsb_bits(*log2_max_pic_order_cnt_lsb_minus4)?,
                )?;
                if bottom_field_delta {
                    writer.write_signed_exp_golomb(self.delta_pic_order_cnt_bottom as i64)?;
                }
            }
            PicOrderCount::Type1(poc) if !poc.delta_pic_order_always_zero_flag => {
                writer.write_signed_exp_golomb(self.delta_pic_order_cnt[0] as i64)?;
                if bottom_field_delta {
                    writer.write_signed_exp_golomb(self.delta_pic_order_cnt[1] as i64)?;
                }
            }
            _ => {}
        }

        if pps.redundant_pic_cnt_present_flag {
            range_check!(self.redundant_pic_cnt, 0, 127)?;
            writer.write_exp_golomb(self.redundant_pic_cnt as u64)?;
        }

        if self.slice_type == SliceType::B {
            writer.write_bit(self.direct_spatial_mv_pred_flag)?;
        }

        if matches!(self.slice_type, SliceType::P | SliceType::SP | SliceType::B) {
            writer.write_bit(self.num_ref_idx_active_override_flag)?;
            if self.num_ref_idx_active_override_flag {
                range_check!(self.num_ref_idx_l0_active_minus1, 0, 31)?;
                writer.write_exp_golomb(self.num_ref_idx_l0_active_minus1 as u64)?;
                if self.slice_type == SliceType::B {
                    range_check!(self.num_ref_idx_l1_active_minus1, 0, 31)?;
                    writer.write_exp_golomb(self.num_ref_idx_l1_active_minus1 as u64)?;
                }
            }
        }

        self.ref_pic_list_reordering.build(writer, self.slice_type)?;

        if self.has_pred_weight_table(pps) {
            let (l0, l1) = self.effective_ref_idx_counts(pps);
            let l1 = (self.slice_type == SliceType::B).then_some(l1);
            match &self.pred_weight_table {
                Some(table) => table.build(writer, sps.chroma_array_type(), l0, l1)?,
                None => PredWeightTable::default().build(writer, sps.chroma_array_type(), l0, l1)?,
            }
        }

        if nal.nal_ref_idc != 0 {
            let idr = nal.nal_unit_type.is_idr();
            match &self.dec_ref_pic_marking {
                Some(marking) => marking.build(writer, idr)?,
                None => DecRefPicMarking::default_for(idr).build(writer, idr)?,
            }
        }

        if pps.entropy_coding_mode_flag && !self.slice_type.is_intra() {
            range_check!(self.cabac_init_idc, 0, 2)?;
            writer.write_exp_golomb(self.cabac_init_idc as u64)?;
        }

        writer.write_signed_exp_golomb(self.slice_qp_delta as i64)?;

        if matches!(self.slice_type, SliceType::SP | SliceType::SI) {
            if self.slice_type == SliceType::SP {
                writer.write_bit(self.sp_for_switch_flag)?;
            }
            writer.write_signed_exp_golomb(self.slice_qs_delta as i64)?;
        }

        if pps.deblocking_filter_control_present_flag {
            range_check!(self.disable_deblocking_filter_idc, 0, 2)?;
            writer.write_exp_golomb(self.disable_deblocking_filter_idc as u64)?;

            if self.disable_deblocking_filter_idc != 1 {
                writer.write_signed_exp_golomb(self.slice_alpha_c0_offset_div2 as i64)?;
                writer.write_signed_exp_golomb(self.slice_beta_offset_div2 as i64)?;
            }
        }

        if let Some(change_rate) = pps.slice_group_change_rate() {
            let bits = slice_group_change_cycle_bits(sps.pic_size_in_map_units(), change_rate);
            writer.write_bits(self.slice_group_change_cycle as u64, bits)?;
        }

        Ok(())
    }

    /// True when the slice carries an explicit `pred_weight_table()`.
    pub fn has_pred_weight_table(&self, pps: &Pps) -> bool {
        (pps.weighted_pred_flag && matches!(self.slice_type, SliceType::P | SliceType::SP))
            || (pps.weighted_bipred_idc == 1 && self.slice_type == SliceType::B)
    }

    /// The active reference counts (minus one) of both lists, falling back to
    /// the PPS defaults when the slice does not override them.
    pub fn effective_ref_idx_counts(&self, pps: &Pps) -> (u8, u8) {
        if self.num_ref_idx_active_override_flag {
            let l1 = if self.slice_type == SliceType::B {
                self.num_ref_idx_l1_active_minus1
            } else {
                pps.num_ref_idx_l1_default_active_minus1
            };
            (self.num_ref_idx_l0_active_minus1, l1)
        } else {
            (
                pps.num_ref_idx_l0_default_active_minus1,
                pps.num_ref_idx_l1_default_active_minus1,
            )
        }
    }

    /// True when the slice starts a new picture (`first_mb_in_slice == 0`).
    pub fn is_first_slice(&self) -> bool {
        self.first_mb_in_slice == 0
    }

    fn l1_count_for_weights(&self) -> Option<u8> {
        (self.slice_type == SliceType::B).then_some(self.num_ref_idx_l1_active_minus1)
    }
}

/// Width of `frame_num`, the SPS in the cache may have been edited by the caller.
fn frame_num_bits(sps: &Sps) -> io::Result<u8> {
    let log2_max_frame_num_minus4 = sps.log2_max_frame_num_minus4;
    range_check!(log2_max_frame_num_minus4, 0, 12)?;
    Ok(log2_max_frame_num_minus4 + 4)
}

fn pic_order_cnt_lsb_bits(log2_max_pic_order_cnt_lsb_minus4: u8) -> io::Result<u8> {
    range_check!(log2_max_pic_order_cnt_lsb_minus4, 0, 12)?;
    Ok(log2_max_pic_order_cnt_lsb_minus4 + 4)
}

fn read_i32(reader: &mut BitReader) -> io::Result<i32> {
    let value = reader.read_signed_exp_golomb()?;
    range_check!(value, i32::MIN as i64 + 1, i32::MAX as i64)?;
    Ok(value as i32)
}

fn read_ref_idx_count(reader: &mut BitReader) -> io::Result<u8> {
    let num_ref_idx_active_minus1 = reader.read_exp_golomb()?;
    range_check!(num_ref_idx_active_minus1, 0, 31)?;
    Ok(num_ref_idx_active_minus1 as u8)
}

fn read_filter_offset(reader: &mut BitReader) -> io::Result<i8> {
    let offset_div2 = reader.read_signed_exp_golomb()?;
    range_check!(offset_div2, -6, 6)?;
    Ok(offset_div2 as i8)
}

/// `SliceQPY = 26 + pic_init_qp_minus26 + slice_qp_delta` must lie in \[-QpBdOffsetY, 51\].
fn slice_qp_delta_range(sps: &Sps, pps: &Pps) -> (i64, i64) {
    let qp_bd_offset = 6 * sps.ext.as_ref().map_or(0, |ext| ext.bit_depth_luma_minus8) as i64;
    let pic_init_qp = 26 + pps.pic_init_qp_minus26 as i64;
    (-qp_bd_offset - pic_init_qp, 51 - pic_init_qp)
}

/// `Ceil(Log2(PicSizeInMapUnits ÷ SliceGroupChangeRate + 1))`, ISO/IEC-14496-10-2022 - 7.4.3
///
/// The division is exact, so this is the smallest `n` with
/// `SliceGroupChangeRate * 2^n >= PicSizeInMapUnits + SliceGroupChangeRate`.
fn slice_group_change_cycle_bits(pic_size_in_map_units: u64, slice_group_change_rate: u32) -> u8 {
    let rate = slice_group_change_rate.max(1) as u64;
    let target = pic_size_in_map_units.saturating_add(rate);

    let mut bits = 0;
    while bits < 32 && (rate << bits) < target {
        bits += 1;
    }

    bits
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;
    use crate::slice::{MemoryManagementOp, PredWeight, ReorderOp, WeightOffset};
    use crate::{NALUnitType, PicOrderCountType1, SliceGroupMap, SliceGroups, SpsExtended};

    fn parameter_sets(sps: Sps, pps: Pps) -> ParameterSets {
        let mut parameter_sets = ParameterSets::new();
        parameter_sets.insert_sps(sps).unwrap();
        parameter_sets.insert_pps(pps);
        parameter_sets
    }

    fn round_trip(header: &SliceHeader, nal: &NalHeader, parameter_sets: &ParameterSets) -> (SliceHeader, u64) {
        let mut buf = [0u8; 256];
        let mut writer = BitWriter::new(&mut buf);
        header.build(&mut writer, nal, parameter_sets).unwrap();
        let bits = writer.bit_position();
        let len = writer.finish().unwrap();

        let mut reader = BitReader::new(&buf[..len]);
        let parsed = SliceHeader::parse(&mut reader, nal, parameter_sets).unwrap();
        assert_eq!(reader.bit_position(), bits);

        (parsed, bits)
    }

    #[test]
    fn test_baseline_idr() {
        crate::init_test_tracing!();

        let parameter_sets = parameter_sets(Sps::default(), Pps::default());
        let nal = NalHeader::new(3, NALUnitType::IdrSlice);

        // first_mb 0, slice_type 7, pps 0, frame_num 0000, idr_pic_id 0, poc lsb 0000,
        // no_output_of_prior_pics 0, long_term_reference 0, slice_qp_delta 0
        let data = [0b1000_1000, 0b1000_0100, 0b0000_1000];
        let header = SliceHeader::parse(&mut BitReader::new(&data), &nal, &parameter_sets).unwrap();

        insta::assert_debug_snapshot!((header.slice_type, header.all_slices_same_type, &header.dec_ref_pic_marking), @r"
        (
            I,
            true,
            Some(
                Idr {
                    no_output_of_prior_pics_flag: false,
                    long_term_reference_flag: false,
                },
            ),
        )
        ");

        let (parsed, bits) = round_trip(&header, &nal, &parameter_sets);
        assert_eq!(parsed, header);
        assert_eq!(bits, 21);
        assert!(parsed.is_first_slice());
    }

    #[test]
    fn test_b_slice_with_everything() {
        let sps = Sps {
            profile_idc: 100,
            ext: Some(SpsExtended::default()),
            log2_max_frame_num_minus4: 2,
            frame_mbs_only_flag: false,
            pic_order_count: PicOrderCount::Type1(PicOrderCountType1 {
                delta_pic_order_always_zero_flag: false,
                offset_for_non_ref_pic: -2,
                offset_for_top_to_bottom_field: 1,
                offset_for_ref_frame: vec![2],
            }),
            ..Default::default()
        };
        let pps = Pps {
            pic_parameter_set_id: 3,
            entropy_coding_mode_flag: true,
            bottom_field_pic_order_in_frame_present_flag: true,
            num_ref_idx_l0_default_active_minus1: 2,
            num_ref_idx_l1_default_active_minus1: 1,
            weighted_bipred_idc: 1,
            deblocking_filter_control_present_flag: true,
            redundant_pic_cnt_present_flag: true,
            ..Default::default()
        };
        let parameter_sets = parameter_sets(sps, pps);
        let nal = NalHeader::new(2, NALUnitType::NonIdrSlice);

        let header = SliceHeader {
            first_mb_in_slice: 120,
            slice_type: SliceType::B,
            pic_parameter_set_id: 3,
            frame_num: 37,
            field_pic_flag: false,
            delta_pic_order_cnt: [-4, 3],
            redundant_pic_cnt: 1,
            direct_spatial_mv_pred_flag: true,
            num_ref_idx_active_override_flag: true,
            num_ref_idx_l0_active_minus1: 1,
            num_ref_idx_l1_active_minus1: 0,
            ref_pic_list_reordering: RefPicListReordering {
                l0: Some(vec![ReorderOp::ShortTermSubtract {
                    abs_diff_pic_num_minus1: 1,
                }]),
                l1: None,
            },
            pred_weight_table: Some(PredWeightTable {
                luma_log2_weight_denom: 6,
                chroma_log2_weight_denom: 6,
                l0: vec![
                    PredWeight {
                        luma: Some(WeightOffset { weight: 70, offset: 2 }),
                        chroma: None,
                    },
                    PredWeight::default(),
                ],
                l1: vec![PredWeight {
                    luma: None,
                    chroma: Some([WeightOffset { weight: 60, offset: -1 }, WeightOffset { weight: 64, offset: 0 }]),
                }],
            }),
            dec_ref_pic_marking: Some(DecRefPicMarking::Adaptive(vec![MemoryManagementOp::ShortTermUnused {
                difference_of_pic_nums_minus1: 0,
            }])),
            cabac_init_idc: 2,
            slice_qp_delta: -3,
            disable_deblocking_filter_idc: 2,
            slice_alpha_c0_offset_div2: -2,
            slice_beta_offset_div2: 6,
            ..Default::default()
        };

        let (parsed, _) = round_trip(&header, &nal, &parameter_sets);
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_counts_inferred_from_pps() {
        let pps = Pps {
            num_ref_idx_l0_default_active_minus1: 4,
            weighted_pred_flag: true,
            ..Default::default()
        };
        let parameter_sets = parameter_sets(Sps::default(), pps);
        let nal = NalHeader::new(2, NALUnitType::NonIdrSlice);

        let header = SliceHeader {
            slice_type: SliceType::P,
            num_ref_idx_l0_active_minus1: 4,
            pred_weight_table: Some(PredWeightTable {
                l0: vec![PredWeight::default(); 5],
                ..Default::default()
            }),
            dec_ref_pic_marking: Some(DecRefPicMarking::SlidingWindow),
            ..Default::default()
        };

        let (parsed, _) = round_trip(&header, &nal, &parameter_sets);
        assert_eq!(parsed.num_ref_idx_l0_active_minus1, 4);
        assert_eq!(parsed.pred_weight_table.as_ref().map(|table| table.l0.len()), Some(5));
        assert_eq!(parsed.effective_ref_idx_counts(parameter_sets.pps(0).unwrap()), (4, 0));
    }

    #[test]
    fn test_slice_group_change_cycle() {
        assert_eq!(slice_group_change_cycle_bits(99, 1), 7);
        assert_eq!(slice_group_change_cycle_bits(100, 2), 6);
        assert_eq!(slice_group_change_cycle_bits(396, 4), 7);
        assert_eq!(slice_group_change_cycle_bits(1, 1), 1);

        let sps = Sps {
            pic_width_in_mbs_minus1: 10,
            pic_height_in_map_units_minus1: 8,
            ..Default::default()
        };
        let pps = Pps {
            slice_groups: Some(SliceGroups {
                num_slice_groups_minus1: 1,
                map: SliceGroupMap::Changing {
                    slice_group_map_type: 5,
                    slice_group_change_direction_flag: false,
                    slice_group_change_rate_minus1: 2,
                },
            }),
            ..Default::default()
        };
        let parameter_sets = parameter_sets(sps, pps);
        let nal = NalHeader::new(0, NALUnitType::NonIdrSlice);

        let header = SliceHeader {
            slice_type: SliceType::I,
            slice_group_change_cycle: 33,
            ..Default::default()
        };

        let (parsed, _) = round_trip(&header, &nal, &parameter_sets);
        assert_eq!(parsed.slice_group_change_cycle, 33);
        assert_eq!(parsed.dec_ref_pic_marking, None);
    }

    #[test]
    fn test_missing_parameter_sets() {
        let nal = NalHeader::new(3, NALUnitType::IdrSlice);
        // first_mb 0, slice_type 7, pps 0
        let data = [0b1000_1000, 0b1000_0000];

        let err = SliceHeader::parse(&mut BitReader::new(&data), &nal, &ParameterSets::new()).unwrap_err();
        assert!(matches!(err, crate::Error::MissingPps(0)));

        let mut parameter_sets = ParameterSets::new();
        parameter_sets.insert_pps(Pps {
            seq_parameter_set_id: 4,
            ..Default::default()
        });
        let err = SliceHeader::parse(&mut BitReader::new(&data), &nal, &parameter_sets).unwrap_err();
        assert!(matches!(err, crate::Error::MissingSps(4)));
    }

    #[test]
    fn test_truncated_header() {
        let parameter_sets = parameter_sets(Sps::default(), Pps::default());
        let nal = NalHeader::new(3, NALUnitType::IdrSlice);

        let data = [0b1000_1000];
        let err = SliceHeader::parse(&mut BitReader::new(&data), &nal, &parameter_sets).unwrap_err();
        assert!(matches!(err, crate::Error::Overrun));
    }

    #[test]
    fn test_slice_qp_out_of_range() {
        let parameter_sets = parameter_sets(Sps::default(), Pps::default());
        let nal = NalHeader::new(0, NALUnitType::NonIdrSlice);

        let header = SliceHeader {
            slice_type: SliceType::I,
            slice_qp_delta: 30,
            ..Default::default()
        };

        let mut buf = [0u8; 32];
        let mut writer = BitWriter::new(&mut buf);
        header.build(&mut writer, &nal, &parameter_sets).unwrap();
        let len = writer.finish().unwrap();

        let err = SliceHeader::parse(&mut BitReader::new(&buf[..len]), &nal, &parameter_sets).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidData(_)));
    }

    #[test]
    fn test_edited_sps_widths_out_of_range() {
        let nal = NalHeader::new(3, NALUnitType::IdrSlice);
        let header = SliceHeader {
            slice_type: SliceType::I,
            all_slices_same_type: true,
            ..Default::default()
        };
        // first_mb 0, slice_type 7, pps 0
        let data = [0b1000_1000, 0b1000_0100, 0b0000_1000];

        let frame_num_sets = parameter_sets(
            Sps {
                log2_max_frame_num_minus4: 255,
                ..Default::default()
            },
            Pps::default(),
        );
        let err = SliceHeader::parse(&mut BitReader::new(&data), &nal, &frame_num_sets).unwrap_err();
        assert_eq!(err.to_string(), "invalid data: log2_max_frame_num_minus4 is out of range [0, 12]: 255");

        let mut buf = [0u8; 32];
        let err = header
            .build(&mut BitWriter::new(&mut buf), &nal, &frame_num_sets)
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid data: log2_max_frame_num_minus4 is out of range [0, 12]: 255");

        let poc_sets = parameter_sets(
            Sps {
                pic_order_count: PicOrderCount::Type0 {
                    log2_max_pic_order_cnt_lsb_minus4: 250,
                },
                ..Default::default()
            },
            Pps::default(),
        );
        let err = SliceHeader::parse(&mut BitReader::new(&data), &nal, &poc_sets).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid data: log2_max_pic_order_cnt_lsb_minus4 is out of range [0, 12]: 250"
        );

        let err = header
            .build(&mut BitWriter::new(&mut buf), &nal, &poc_sets)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid data: log2_max_pic_order_cnt_lsb_minus4 is out of range [0, 12]: 250"
        );
    }
}
