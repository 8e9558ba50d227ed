mod dec_ref_pic_marking;
mod header;
mod pred_weight_table;
mod ref_pic_list_reordering;

use std::io::{self, Write};

use bytes::Bytes;
use bytes_util::{BitReader, BitWriter};

pub use self::dec_ref_pic_marking::{DecRefPicMarking, MemoryManagementOp};
pub use self::header::SliceHeader;
pub use self::pred_weight_table::{PredWeight, PredWeightTable, WeightOffset};
pub use self::ref_pic_list_reordering::{RefPicListReordering, ReorderOp};
use crate::rbsp::{more_rbsp_data, read_rbsp_slice_trailing_bits, write_rbsp_slice_trailing_bits};
use crate::{Error, NalHeader, ParameterSets, Result};

/// Upper bound on the operations of a reordering or marking list.
pub(crate) const MAX_LIST_OPERATIONS: usize = 64;

/// Turns running out of bits inside a terminated list into a syntax error.
fn unterminated(name: &'static str) -> impl Fn(io::Error) -> io::Error {
    move |err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            io::Error::new(io::ErrorKind::InvalidData, format!("{name} is not terminated"))
        } else {
            err
        }
    }
}

/// The undecoded macroblock layer of a slice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SliceData {
    /// The bits between the end of the slice header and the next byte boundary, right aligned.
    pub alignment_bits: u8,
    /// How many bits `alignment_bits` holds, in \[0, 7\].
    pub alignment_bit_count: u8,
    /// Everything from the first byte boundary after the header to the end of the RBSP,
    /// including the trailing bits.
    pub data: Bytes,
}

/// `slice_layer_without_partitioning_rbsp()`, ISO/IEC-14496-10-2022 - 7.3.2.8
///
/// The slice data is not decoded, it is kept as an opaque blob so the slice
/// can be written back after its header was changed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SliceLayer {
    /// The slice header.
    pub header: SliceHeader,
    /// `None` when the RBSP ends right after the header.
    pub data: Option<SliceData>,
}

impl SliceLayer {
    /// Parses a slice from a bitstream positioned right after the NAL header,
    /// consuming the rest of the RBSP.
    pub fn parse(
        reader: &mut BitReader,
        nal: &NalHeader,
        parameter_sets: &ParameterSets,
        strict_trailing_bits: bool,
    ) -> Result<Self> {
        let header = SliceHeader::parse(reader, nal, parameter_sets)?;
        let (pps, _) = parameter_sets.resolve(header.pic_parameter_set_id)?;

        if !more_rbsp_data(reader) {
            read_rbsp_slice_trailing_bits(reader, pps.entropy_coding_mode_flag, strict_trailing_bits)?;
            return Ok(Self { header, data: None });
        }

        let alignment_bit_count = if reader.is_aligned() { 0 } else { reader.bits_left() };
        let alignment_bits = reader.read_bits(alignment_bit_count)? as u8;

        let data = Bytes::copy_from_slice(reader.remaining_aligned());
        reader.skip_bits(reader.remaining_bits())?;

        Ok(Self {
            header,
            data: Some(SliceData {
                alignment_bits,
                alignment_bit_count,
                data,
            }),
        })
    }

    /// Builds the slice, writing the stored slice data after the header.
    ///
    /// When the header no longer ends at the bit offset it was parsed at, a
    /// CABAC slice is re-aligned with `cabac_alignment_one_bit`s. A CAVLC slice
    /// cannot be moved and fails with [`Error::InvalidData`].
    pub fn build(&self, writer: &mut BitWriter, nal: &NalHeader, parameter_sets: &ParameterSets) -> Result<()> {
        self.header.build(writer, nal, parameter_sets)?;

        let Some(data) = &self.data else {
            write_rbsp_slice_trailing_bits(writer)?;
            return Ok(());
        };

        let alignment_bit_count = if writer.is_aligned() { 0 } else { 8 - writer.bit_pos() };
        if alignment_bit_count == data.alignment_bit_count {
            writer.write_bits(data.alignment_bits as u64, alignment_bit_count)?;
        } else {
            let (pps, _) = parameter_sets.resolve(self.header.pic_parameter_set_id)?;
            if !pps.entropy_coding_mode_flag {
                return Err(Error::InvalidData(format!(
                    "CAVLC slice data cannot be moved from bit offset {} to {}",
                    (8 - data.alignment_bit_count) % 8,
                    writer.bit_pos()
                )));
            }

            // cabac_alignment_one_bit
            while !writer.is_aligned() {
                writer.write_bit(true)?;
            }
        }

        writer.write_all(&data.data)?;

        Ok(())
    }
}
