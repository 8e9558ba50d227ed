use std::io;

use bytes_util::{BitReader, BitWriter, range_check};
use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt};

use super::{MAX_LIST_OPERATIONS, unterminated};
use crate::SliceType;

/// One `modification_of_pic_nums_idc` entry and its operand.
///
/// ISO/IEC-14496-10-2022 - 7.4.3.1 Table 7-7
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOp {
    /// `modification_of_pic_nums_idc == 0`: subtract from the picture number prediction.
    ShortTermSubtract {
        /// `abs_diff_pic_num_minus1`
        abs_diff_pic_num_minus1: u32,
    },
    /// `modification_of_pic_nums_idc == 1`: add to the picture number prediction.
    ShortTermAdd {
        /// `abs_diff_pic_num_minus1`
        abs_diff_pic_num_minus1: u32,
    },
    /// `modification_of_pic_nums_idc == 2`: move a long-term picture.
    LongTerm {
        /// `long_term_pic_num`
        long_term_pic_num: u32,
    },
}

/// `ref_pic_list_modification()`, ISO/IEC-14496-10-2022 - 7.3.3.1
///
/// A list is `Some` when its `ref_pic_list_modification_flag_lX` is set. The
/// L0 list is coded for every slice type except I and SI, L1 only for B slices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RefPicListReordering {
    /// Operations on reference picture list 0.
    pub l0: Option<Vec<ReorderOp>>,
    /// Operations on reference picture list 1.
    pub l1: Option<Vec<ReorderOp>>,
}

impl RefPicListReordering {
    /// Parses the lists coded for `slice_type`.
    pub fn parse(reader: &mut BitReader, slice_type: SliceType) -> io::Result<Self> {
        let mut reordering = Self::default();

        if !slice_type.is_intra() {
            reordering.l0 = parse_list(reader)?;
        }

        if slice_type == SliceType::B {
            reordering.l1 = parse_list(reader)?;
        }

        Ok(reordering)
    }

    /// Builds the lists coded for `slice_type`. Lists the slice type does not code are skipped.
    pub fn build(&self, writer: &mut BitWriter, slice_type: SliceType) -> io::Result<()> {
        if !slice_type.is_intra() {
            build_list(writer, self.l0.as_deref())?;
        }

        if slice_type == SliceType::B {
            build_list(writer, self.l1.as_deref())?;
        }

        Ok(())
    }
}

fn parse_list(reader: &mut BitReader) -> io::Result<Option<Vec<ReorderOp>>> {
    let ref_pic_list_modification_flag = reader.read_bit()?;
    if !ref_pic_list_modification_flag {
        return Ok(None);
    }

    let mut ops = Vec::new();
    loop {
        let modification_of_pic_nums_idc = reader
            .read_exp_golomb()
            .map_err(unterminated("ref_pic_list_modification"))?;

        let op = match modification_of_pic_nums_idc {
            0 | 1 => {
                let abs_diff_pic_num_minus1 = read_operand(reader)?;
                if modification_of_pic_nums_idc == 0 {
                    ReorderOp::ShortTermSubtract { abs_diff_pic_num_minus1 }
                } else {
                    ReorderOp::ShortTermAdd { abs_diff_pic_num_minus1 }
                }
            }
            2 => ReorderOp::LongTerm {
                long_term_pic_num: read_operand(reader)?,
            },
            3 => return Ok(Some(ops)),
            idc => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("modification_of_pic_nums_idc is out of range [0, 3]: {idc}"),
                ));
            }
        };

        if ops.len() == MAX_LIST_OPERATIONS {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("ref_pic_list_modification has more than {MAX_LIST_OPERATIONS} operations"),
            ));
        }

        ops.push(op);
    }
}

fn read_operand(reader: &mut BitReader) -> io::Result<u32> {
    let operand = reader
        .read_exp_golomb()
        .map_err(unterminated("ref_pic_list_modification"))?;
    range_check!(operand, 0, u32::MAX as u64)?;
    Ok(operand as u32)
}

fn build_list(writer: &mut BitWriter, ops: Option<&[ReorderOp]>) -> io::Result<()> {
    writer.write_bit(ops.is_some())?;

    let Some(ops) = ops else {
        return Ok(());
    };

    range_check!(ops.len(), 0, MAX_LIST_OPERATIONS)?;

    for op in ops {
        let (modification_of_pic_nums_idc, operand) = match *op {
            ReorderOp::ShortTermSubtract { abs_diff_pic_num_minus1 } => (0, abs_diff_pic_num_minus1),
            ReorderOp::ShortTermAdd { abs_diff_pic_num_minus1 } => (1, abs_diff_pic_num_minus1),
            ReorderOp::LongTerm { long_term_pic_num } => (2, long_term_pic_num),
        };

        writer.write_exp_golomb(modification_of_pic_nums_idc)?;
        writer.write_exp_golomb(operand as u64)?;
    }

    writer.write_exp_golomb(3)
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_b_slice() {
        let reordering = RefPicListReordering {
            l0: Some(vec![
                ReorderOp::ShortTermSubtract {
                    abs_diff_pic_num_minus1: 0,
                },
                ReorderOp::LongTerm { long_term_pic_num: 2 },
            ]),
            l1: Some(vec![ReorderOp::ShortTermAdd {
                abs_diff_pic_num_minus1: 5,
            }]),
        };

        let mut buf = [0u8; 16];
        let mut writer = BitWriter::new(&mut buf);
        reordering.build(&mut writer, SliceType::B).unwrap();
        let len = writer.finish().unwrap();

        let parsed = RefPicListReordering::parse(&mut BitReader::new(&buf[..len]), SliceType::B).unwrap();
        assert_eq!(parsed, reordering);
    }

    #[test]
    fn test_intra_codes_nothing() {
        let reordering = RefPicListReordering {
            l0: Some(vec![]),
            l1: None,
        };

        let mut buf = [0u8; 4];
        let mut writer = BitWriter::new(&mut buf);
        reordering.build(&mut writer, SliceType::I).unwrap();
        assert_eq!(writer.bit_position(), 0);

        // P slices only code L0
        reordering.build(&mut writer, SliceType::P).unwrap();
        // flag + ue(3)
        assert_eq!(writer.bit_position(), 1 + 5);
    }

    #[test]
    fn test_unterminated_list() {
        // flag set, idc 0, abs_diff 0, then the buffer ends
        let data = [0b1111_1111];
        let err = RefPicListReordering::parse(&mut BitReader::new(&data), SliceType::P).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(err.to_string(), "ref_pic_list_modification is not terminated");
    }

    #[test]
    fn test_invalid_idc() {
        // flag set, ue(4) = 00101
        let data = [0b1001_0100];
        let err = RefPicListReordering::parse(&mut BitReader::new(&data), SliceType::P).unwrap_err();
        assert_eq!(err.to_string(), "modification_of_pic_nums_idc is out of range [0, 3]: 4");
    }

    #[test]
    fn test_too_many_operations() {
        let mut buf = [0u8; 64];
        let mut writer = BitWriter::new(&mut buf);
        writer.write_bit(true).unwrap();
        for _ in 0..=MAX_LIST_OPERATIONS {
            // idc 0, abs_diff_pic_num_minus1 0
            writer.write_exp_golomb(0).unwrap();
            writer.write_exp_golomb(0).unwrap();
        }
        writer.write_exp_golomb(3).unwrap();
        let len = writer.finish().unwrap();

        let err = RefPicListReordering::parse(&mut BitReader::new(&buf[..len]), SliceType::P).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
