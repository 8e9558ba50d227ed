use std::io;

use bytes_util::{BitReader, BitWriter};

use crate::PrimaryPicType;

/// `access_unit_delimiter_rbsp()` without the trailing bits.
///
/// ISO/IEC-14496-10-2022 - 7.3.2.4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessUnitDelimiter {
    /// `primary_pic_type`, 3 bits.
    pub primary_pic_type: PrimaryPicType,
}

impl AccessUnitDelimiter {
    /// Parses the delimiter.
    pub fn parse(reader: &mut BitReader) -> io::Result<Self> {
        Ok(Self {
            primary_pic_type: PrimaryPicType::from(reader.read_bits(3)? as u8),
        })
    }

    /// Builds the delimiter.
    pub fn build(&self, writer: &mut BitWriter) -> io::Result<()> {
        writer.write_bits(self.primary_pic_type as u64, 3)
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_aud() {
        // primary_pic_type 7 followed by the stop bit
        let data = [0b1111_0000];
        let aud = AccessUnitDelimiter::parse(&mut BitReader::new(&data)).unwrap();
        assert_eq!(aud.primary_pic_type, PrimaryPicType::ISIPSPB);

        let mut buf = [0u8; 1];
        let mut writer = BitWriter::new(&mut buf);
        AccessUnitDelimiter {
            primary_pic_type: PrimaryPicType::IP,
        }
        .build(&mut writer)
        .unwrap();
        writer.finish().unwrap();
        assert_eq!(buf, [0b0010_0000]);
    }
}
