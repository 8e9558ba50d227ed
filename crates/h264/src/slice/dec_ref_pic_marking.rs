use std::io;

use bytes_util::{BitReader, BitWriter, range_check};
use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt};

use super::{MAX_LIST_OPERATIONS, unterminated};

/// A `memory_management_control_operation` and its operands.
///
/// ISO/IEC-14496-10-2022 - 7.4.3.3 Table 7-9
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryManagementOp {
    /// 1: mark a short-term picture as unused for reference.
    ShortTermUnused {
        /// `difference_of_pic_nums_minus1`
        difference_of_pic_nums_minus1: u32,
    },
    /// 2: mark a long-term picture as unused for reference.
    LongTermUnused {
        /// `long_term_pic_num`
        long_term_pic_num: u32,
    },
    /// 3: turn a short-term picture into a long-term one.
    ShortTermToLongTerm {
        /// `difference_of_pic_nums_minus1`
        difference_of_pic_nums_minus1: u32,
        /// `long_term_frame_idx`
        long_term_frame_idx: u32,
    },
    /// 4: set the maximum long-term frame index.
    MaxLongTermFrameIdx {
        /// `max_long_term_frame_idx_plus1`
        max_long_term_frame_idx_plus1: u32,
    },
    /// 5: mark every reference picture as unused.
    AllUnused,
    /// 6: mark the current picture as long-term.
    CurrentToLongTerm {
        /// `long_term_frame_idx`
        long_term_frame_idx: u32,
    },
}

impl MemoryManagementOp {
    /// The `memory_management_control_operation` value of this operation.
    pub const fn code(&self) -> u64 {
        match self {
            Self::ShortTermUnused { .. } => 1,
            Self::LongTermUnused { .. } => 2,
            Self::ShortTermToLongTerm { .. } => 3,
            Self::MaxLongTermFrameIdx { .. } => 4,
            Self::AllUnused => 5,
            Self::CurrentToLongTerm { .. } => 6,
        }
    }
}

/// `dec_ref_pic_marking()`, ISO/IEC-14496-10-2022 - 7.3.3.3
///
/// Only present in slices with a nonzero `nal_ref_idc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecRefPicMarking {
    /// The marking of an IDR picture.
    Idr {
        /// `no_output_of_prior_pics_flag`
        no_output_of_prior_pics_flag: bool,
        /// `long_term_reference_flag`
        long_term_reference_flag: bool,
    },
    /// `adaptive_ref_pic_marking_mode_flag == 0`
    SlidingWindow,
    /// `adaptive_ref_pic_marking_mode_flag == 1` with its operations, excluding the terminating 0.
    Adaptive(Vec<MemoryManagementOp>),
}

impl DecRefPicMarking {
    /// The marking written for a reference slice that does not carry one.
    pub const fn default_for(idr: bool) -> Self {
        if idr {
            Self::Idr {
                no_output_of_prior_pics_flag: false,
                long_term_reference_flag: false,
            }
        } else {
            Self::SlidingWindow
        }
    }

    /// Parses the marking of an IDR or a non-IDR slice.
    pub fn parse(reader: &mut BitReader, idr: bool) -> io::Result<Self> {
        if idr {
            return Ok(Self::Idr {
                no_output_of_prior_pics_flag: reader.read_bit()?,
                long_term_reference_flag: reader.read_bit()?,
            });
        }

        let adaptive_ref_pic_marking_mode_flag = reader.read_bit()?;
        if !adaptive_ref_pic_marking_mode_flag {
            return Ok(Self::SlidingWindow);
        }

        let mut ops = Vec::new();
        loop {
            let memory_management_control_operation = reader
                .read_exp_golomb()
                .map_err(unterminated("dec_ref_pic_marking"))?;

            let op = match memory_management_control_operation {
                0 => return Ok(Self::Adaptive(ops)),
                1 => MemoryManagementOp::ShortTermUnused {
                    difference_of_pic_nums_minus1: read_operand(reader)?,
                },
                2 => MemoryManagementOp::LongTermUnused {
                    long_term_pic_num: read_operand(reader)?,
                },
                3 => MemoryManagementOp::ShortTermToLongTerm {
                    difference_of_pic_nums_minus1: read_operand(reader)?,
                    long_term_frame_idx: read_operand(reader)?,
                },
                4 => MemoryManagementOp::MaxLongTermFrameIdx {
                    max_long_term_frame_idx_plus1: read_operand(reader)?,
                },
                5 => MemoryManagementOp::AllUnused,
                6 => MemoryManagementOp::CurrentToLongTerm {
                    long_term_frame_idx: read_operand(reader)?,
                },
                op => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("memory_management_control_operation is out of range [0, 6]: {op}"),
                    ));
                }
            };

            if ops.len() == MAX_LIST_OPERATIONS {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("dec_ref_pic_marking has more than {MAX_LIST_OPERATIONS} operations"),
                ));
            }

            ops.push(op);
        }
    }

    /// Builds the marking. The variant must match the kind of slice.
    pub fn build(&self, writer: &mut BitWriter, idr: bool) -> io::Result<()> {
        match (self, idr) {
            (
                Self::Idr {
                    no_output_of_prior_pics_flag,
                    long_term_reference_flag,
                },
                true,
            ) => {
                writer.write_bit(*no_output_of_prior_pics_flag)?;
                writer.write_bit(*long_term_reference_flag)?;
            }
            (Self::SlidingWindow, false) => writer.write_bit(false)?,
            (Self::Adaptive(ops), false) => {
                range_check!(ops.len(), 0, MAX_LIST_OPERATIONS)?;

                writer.write_bit(true)?;
                for op in ops {
                    writer.write_exp_golomb(op.code())?;
                    match *op {
                        MemoryManagementOp::ShortTermUnused {
                            difference_of_pic_nums_minus1,
                        } => writer.write_exp_golomb(difference_of_pic_nums_minus1 as u64)?,
                        MemoryManagementOp::LongTermUnused { long_term_pic_num } => {
                            writer.write_exp_golomb(long_term_pic_num as u64)?
                        }
                        MemoryManagementOp::ShortTermToLongTerm {
                            difference_of_pic_nums_minus1,
                            long_term_frame_idx,
                        } => {
                            writer.write_exp_golomb(difference_of_pic_nums_minus1 as u64)?;
                            writer.write_exp_golomb(long_term_frame_idx as u64)?;
                        }
                        MemoryManagementOp::MaxLongTermFrameIdx {
                            max_long_term_frame_idx_plus1,
                        } => writer.write_exp_golomb(max_long_term_frame_idx_plus1 as u64)?,
                        MemoryManagementOp::AllUnused => {}
                        MemoryManagementOp::CurrentToLongTerm { long_term_frame_idx } => {
                            writer.write_exp_golomb(long_term_frame_idx as u64)?
                        }
                    }
                }
                writer.write_exp_golomb(0)?;
            }
            (_, idr) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("dec_ref_pic_marking does not match the slice (idr: {idr})"),
                ));
            }
        }

        Ok(())
    }
}

fn read_operand(reader: &mut BitReader) -> io::Result<u32> {
    let operand = reader.read_exp_golomb().map_err(unterminated("dec_ref_pic_marking"))?;
    range_check!(operand, 0, u32::MAX as u64)?;
    Ok(operand as u32)
}
