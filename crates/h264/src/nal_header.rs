use bytes_util::{BitReader, BitWriter, range_check};

use crate::{Error, NALUnitType, Result};

/// The one byte NAL unit header.
///
/// - ISO/IEC-14496-10-2022 - 7.3.1
/// - ISO/IEC-14496-10-2022 - 7.4.1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NalHeader {
    /// The `nal_ref_idc` is comprised of 2 bits.
    ///
    /// A nonzero value means the NAL unit contains a sequence or picture
    /// parameter set or a slice of a reference picture. It must be nonzero for
    /// IDR slices and zero for SEI, access unit delimiters, end of sequence,
    /// end of stream and filler data.
    pub nal_ref_idc: u8,

    /// The `nal_unit_type` is comprised of 5 bits.
    pub nal_unit_type: NALUnitType,
}

impl NalHeader {
    /// `nal_ref_idc` values used by encoders for the different priorities.
    pub const REF_IDC_DISPOSABLE: u8 = 0;
    /// Lowest reference priority.
    pub const REF_IDC_LOW: u8 = 1;
    /// Used for reference slices.
    pub const REF_IDC_HIGH: u8 = 2;
    /// Used for parameter sets and IDR slices.
    pub const REF_IDC_HIGHEST: u8 = 3;

    /// Creates a new header.
    pub const fn new(nal_ref_idc: u8, nal_unit_type: NALUnitType) -> Self {
        Self {
            nal_ref_idc,
            nal_unit_type,
        }
    }

    /// Parses the header, rejecting a set `forbidden_zero_bit`.
    pub fn parse(reader: &mut BitReader) -> Result<Self> {
        let forbidden_zero_bit = reader.read_bit()?;
        if forbidden_zero_bit {
            return Err(Error::ForbiddenZeroBit);
        }

        let nal_ref_idc = reader.read_bits(2)? as u8;
        let nal_unit_type = NALUnitType::from(reader.read_bits(5)? as u8);

        Ok(Self {
            nal_ref_idc,
            nal_unit_type,
        })
    }

    /// Builds the header into a bitstream.
    pub fn build(&self, writer: &mut BitWriter) -> Result<()> {
        let nal_ref_idc = self.nal_ref_idc;
        range_check!(nal_ref_idc, 0, 3)?;

        writer.write_bit(false)?;
        writer.write_bits(nal_ref_idc as u64, 2)?;
        writer.write_bits(u8::from(self.nal_unit_type) as u64, 5)?;

        Ok(())
    }

    /// Checks the semantic constraints of 7.4.1 that can be verified from the
    /// header alone.
    pub fn validate(&self) -> Result<()> {
        match u8::from(self.nal_unit_type) {
            0 => return Err(Error::InvalidNalHeader("nal_unit_type 0 is unspecified")),
            16..=18 => return Err(Error::InvalidNalHeader("nal_unit_type is reserved")),
            21.. => return Err(Error::InvalidNalHeader("nal_unit_type is reserved or unspecified")),
            _ => {}
        }

        if self.nal_unit_type.is_idr() && self.nal_ref_idc == 0 {
            return Err(Error::InvalidNalHeader("nal_ref_idc must not be 0 for an IDR slice"));
        }

        if self.nal_unit_type.requires_zero_ref_idc() && self.nal_ref_idc != 0 {
            return Err(Error::InvalidNalHeader("nal_ref_idc must be 0 for this nal_unit_type"));
        }

        Ok(())
    }
}

/// Reads and validates only the header of a NAL unit.
pub fn peek_nal_unit(nal: &[u8]) -> Result<NalHeader> {
    let mut reader = BitReader::new(nal);
    let header = NalHeader::parse(&mut reader)?;
    header.validate()?;

    Ok(header)
}
