use std::io;

use bytes_util::{BitReader, BitWriter, range_check};
use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt};

/// A weight and its additive offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeightOffset {
    /// `luma_weight_lX[i]` / `chroma_weight_lX[i][j]`, in \[-128, 127\].
    pub weight: i32,
    /// `luma_offset_lX[i]` / `chroma_offset_lX[i][j]`.
    pub offset: i32,
}

/// The explicit weights of one reference index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PredWeight {
    /// `Some` when `luma_weight_lX_flag` is set.
    pub luma: Option<WeightOffset>,
    /// The Cb and Cr weights, `Some` when `chroma_weight_lX_flag` is set.
    /// Never coded when `ChromaArrayType == 0`.
    pub chroma: Option<[WeightOffset; 2]>,
}

/// `pred_weight_table()`, ISO/IEC-14496-10-2022 - 7.3.3.2
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PredWeightTable {
    /// `luma_log2_weight_denom`, in \[0, 7\].
    pub luma_log2_weight_denom: u8,
    /// `chroma_log2_weight_denom`, in \[0, 7\]. Only coded when `ChromaArrayType != 0`.
    pub chroma_log2_weight_denom: u8,
    /// One entry per active reference index of list 0.
    pub l0: Vec<PredWeight>,
    /// One entry per active reference index of list 1, B slices only.
    pub l1: Vec<PredWeight>,
}

/// The widest offset range of any bit depth (7.4.3.2 with a 14 bit depth).
const MAX_OFFSET: i64 = 1 << 13;

impl PredWeightTable {
    /// Parses the table.
    ///
    /// `num_ref_idx_l1_active_minus1` is `Some` for B slices only.
    pub fn parse(
        reader: &mut BitReader,
        chroma_array_type: u8,
        num_ref_idx_l0_active_minus1: u8,
        num_ref_idx_l1_active_minus1: Option<u8>,
    ) -> io::Result<Self> {
        let luma_log2_weight_denom = reader.read_exp_golomb()?;
        range_check!(luma_log2_weight_denom, 0, 7)?;

        let mut chroma_log2_weight_denom = 0;
        if chroma_array_type != 0 {
            let denom = reader.read_exp_golomb()?;
            range_check!(denom, 0, 7)?;
            chroma_log2_weight_denom = denom as u8;
        }

        let l0 = (0..=num_ref_idx_l0_active_minus1)
            .map(|_| parse_weight(reader, chroma_array_type))
            .collect::<io::Result<Vec<_>>>()?;

        let l1 = match num_ref_idx_l1_active_minus1 {
            Some(count_minus1) => (0..=count_minus1)
                .map(|_| parse_weight(reader, chroma_array_type))
                .collect::<io::Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            luma_log2_weight_denom: luma_log2_weight_denom as u8,
            chroma_log2_weight_denom,
            l0,
            l1,
        })
    }

    /// Builds the table for the given active reference counts.
    ///
    /// Missing entries are written as "no explicit weight". More entries than
    /// active reference indices is an error, as is any list 1 entry outside a
    /// B slice.
    pub fn build(
        &self,
        writer: &mut BitWriter,
        chroma_array_type: u8,
        num_ref_idx_l0_active_minus1: u8,
        num_ref_idx_l1_active_minus1: Option<u8>,
    ) -> io::Result<()> {
        let l0_entries = self.l0.len();
        range_check!(l0_entries, 0, num_ref_idx_l0_active_minus1 as usize + 1)?;
        let l1_entries = self.l1.len();
        range_check!(l1_entries, 0, num_ref_idx_l1_active_minus1.map_or(0, |count| count as usize + 1))?;

        writer.write_exp_golomb(self.luma_log2_weight_denom as u64)?;
        if chroma_array_type != 0 {
            writer.write_exp_golomb(self.chroma_log2_weight_denom as u64)?;
        }

        for i in 0..=num_ref_idx_l0_active_minus1 as usize {
            build_weight(writer, self.l0.get(i).copied().unwrap_or_default(), chroma_array_type)?;
        }

        if let Some(count_minus1) = num_ref_idx_l1_active_minus1 {
            for i in 0..=count_minus1 as usize {
                build_weight(writer, self.l1.get(i).copied().unwrap_or_default(), chroma_array_type)?;
            }
        }

        Ok(())
    }
}

fn parse_weight_offset(reader: &mut BitReader) -> io::Result<WeightOffset> {
    let weight = reader.read_signed_exp_golomb()?;
    range_check!(weight, -128, 127)?;
    let offset = reader.read_signed_exp_golomb()?;
    range_check!(offset, -MAX_OFFSET, MAX_OFFSET - 1)?;

    Ok(WeightOffset {
        weight: weight as i32,
        offset: offset as i32,
    })
}

fn parse_weight(reader: &mut BitReader, chroma_array_type: u8) -> io::Result<PredWeight> {
    let mut weight = PredWeight::default();

    let luma_weight_flag = reader.read_bit()?;
    if luma_weight_flag {
        weight.luma = Some(parse_weight_offset(reader)?);
    }

    if chroma_array_type != 0 {
        let chroma_weight_flag = reader.read_bit()?;
        if chroma_weight_flag {
            weight.chroma = Some([parse_weight_offset(reader)?, parse_weight_offset(reader)?]);
        }
    }

    Ok(weight)
}

fn build_weight_offset(writer: &mut BitWriter, weight_offset: &WeightOffset) -> io::Result<()> {
    writer.write_signed_exp_golomb(weight_offset.weight as i64)?;
    writer.write_signed_exp_golomb(weight_offset.offset as i64)
}

fn build_weight(writer: &mut BitWriter, weight: PredWeight, chroma_array_type: u8) -> io::Result<()> {
    writer.write_bit(weight.luma.is_some())?;
    if let Some(luma) = &weight.luma {
        build_weight_offset(writer, luma)?;
    }

    if chroma_array_type != 0 {
        writer.write_bit(weight.chroma.is_some())?;
        if let Some(chroma) = &weight.chroma {
            for weight_offset in chroma {
                build_weight_offset(writer, weight_offset)?;
            }
        }
    }

    Ok(())
}
