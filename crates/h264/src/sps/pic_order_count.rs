use std::io;

use bytes_util::{BitReader, BitWriter, range_check};
use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt};

/// The picture order count parameters of the SPS, selected by `pic_order_cnt_type`.
/// ISO/IEC-14496-10-2022 - 7.3.2.1.1
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PicOrderCount {
    /// `pic_order_cnt_type == 0`: slices code the POC lsb directly.
    Type0 {
        /// The `log2_max_pic_order_cnt_lsb_minus4`, in \[0, 12\].
        ///
        /// `MaxPicOrderCntLsb = 2^(log2_max_pic_order_cnt_lsb_minus4 + 4)`
        log2_max_pic_order_cnt_lsb_minus4: u8,
    },
    /// `pic_order_cnt_type == 1`: POC is derived from a cycle of expected deltas.
    Type1(PicOrderCountType1),
    /// `pic_order_cnt_type == 2`: output order equals decoding order.
    Type2,
}

impl Default for PicOrderCount {
    fn default() -> Self {
        Self::Type0 {
            log2_max_pic_order_cnt_lsb_minus4: 0,
        }
    }
}

impl PicOrderCount {
    /// The `pic_order_cnt_type` that selects this variant.
    pub const fn pic_order_cnt_type(&self) -> u8 {
        match self {
            Self::Type0 { .. } => 0,
            Self::Type1(_) => 1,
            Self::Type2 => 2,
        }
    }

    /// Parses `pic_order_cnt_type` and the fields it gates.
    pub fn parse(reader: &mut BitReader) -> io::Result<Self> {
        let pic_order_cnt_type = reader.read_exp_golomb()?;
        range_check!(pic_order_cnt_type, 0, 2)?;

        Ok(match pic_order_cnt_type {
            0 => {
                let log2_max_pic_order_cnt_lsb_minus4 = reader.read_exp_golomb()?;
                range_check!(log2_max_pic_order_cnt_lsb_minus4, 0, 12)?;
                Self::Type0 {
                    log2_max_pic_order_cnt_lsb_minus4: log2_max_pic_order_cnt_lsb_minus4 as u8,
                }
            }
            1 => Self::Type1(PicOrderCountType1::parse(reader)?),
            _ => Self::Type2,
        })
    }

    /// Builds `pic_order_cnt_type` and the fields it gates.
    pub fn build(&self, writer: &mut BitWriter) -> io::Result<()> {
        writer.write_exp_golomb(self.pic_order_cnt_type() as u64)?;

        match self {
            Self::Type0 {
                log2_max_pic_order_cnt_lsb_minus4,
            } => writer.write_exp_golomb(*log2_max_pic_order_cnt_lsb_minus4 as u64),
            Self::Type1(type1) => type1.build(writer),
            Self::Type2 => Ok(()),
        }
    }
}

/// The fields of `pic_order_cnt_type == 1`.
///
/// ISO/IEC-14496-10-2022 - 7.4.2.1.1
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PicOrderCountType1 {
    /// The `delta_pic_order_always_zero_flag` is a single bit.
    ///
    /// 1 means `delta_pic_order_cnt[0]` and `delta_pic_order_cnt[1]` are not
    /// present in the slice headers and are inferred to be 0.
    pub delta_pic_order_always_zero_flag: bool,

    /// The `offset_for_non_ref_pic`, a signed exp golomb.
    pub offset_for_non_ref_pic: i64,

    /// The `offset_for_top_to_bottom_field`, a signed exp golomb.
    pub offset_for_top_to_bottom_field: i64,

    /// The `offset_for_ref_frame` list. Its length is
    /// `num_ref_frames_in_pic_order_cnt_cycle`, in \[0, 255\].
    pub offset_for_ref_frame: Vec<i64>,
}

impl PicOrderCountType1 {
    /// Parses the fields defined when `pic_order_cnt_type == 1` from a bitstream.
    pub fn parse(reader: &mut BitReader) -> io::Result<Self> {
        let delta_pic_order_always_zero_flag = reader.read_bit()?;
        let offset_for_non_ref_pic = reader.read_signed_exp_golomb()?;
        let offset_for_top_to_bottom_field = reader.read_signed_exp_golomb()?;

        let num_ref_frames_in_pic_order_cnt_cycle = reader.read_exp_golomb()?;
        range_check!(num_ref_frames_in_pic_order_cnt_cycle, 0, 255)?;

        let offset_for_ref_frame = (0..num_ref_frames_in_pic_order_cnt_cycle)
            .map(|_| reader.read_signed_exp_golomb())
            .collect::<io::Result<Vec<_>>>()?;

        Ok(Self {
            delta_pic_order_always_zero_flag,
            offset_for_non_ref_pic,
            offset_for_top_to_bottom_field,
            offset_for_ref_frame,
        })
    }

    /// Builds the PicOrderCountType1 struct into a bitstream.
    pub fn build(&self, writer: &mut BitWriter) -> io::Result<()> {
        range_check!(self.offset_for_ref_frame.len(), 0, 255)?;

        writer.write_bit(self.delta_pic_order_always_zero_flag)?;
        writer.write_signed_exp_golomb(self.offset_for_non_ref_pic)?;
        writer.write_signed_exp_golomb(self.offset_for_top_to_bottom_field)?;
        writer.write_exp_golomb(self.offset_for_ref_frame.len() as u64)?;

        for offset in &self.offset_for_ref_frame {
            writer.write_signed_exp_golomb(*offset)?;
        }

        Ok(())
    }
}
