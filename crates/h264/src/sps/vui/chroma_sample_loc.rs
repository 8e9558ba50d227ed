use std::io;

use bytes_util::{BitReader, BitWriter, range_check};
use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt};

/// `ChromaSampleLoc` contains the fields that are set when `chroma_loc_info_present_flag == 1`,
///
/// This contains the following fields: `chroma_sample_loc_type_top_field` and `chroma_sample_loc_type_bottom_field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChromaSampleLoc {
    /// The `chroma_sample_loc_type_top_field` specifies the location of chroma samples.
    ///
    /// The value of this ranges from \[0, 5\]. By default, this value is set to 0.
    ///
    /// See ISO/IEC-14496-10-2022 - E.2.1 Figure E-1 for more info.
    pub chroma_sample_loc_type_top_field: u8,

    /// The `chroma_sample_loc_type_bottom_field`
    ///
    /// The value of this ranges from \[0, 5\]. By default, this value is set to 0.
    pub chroma_sample_loc_type_bottom_field: u8,
}

impl ChromaSampleLoc {
    /// Parses the fields defined when the `chroma_loc_info_present_flag == 1` from a bitstream.
    pub fn parse(reader: &mut BitReader) -> io::Result<Self> {
        let chroma_sample_loc_type_top_field = reader.read_exp_golomb()?;
        range_check!(chroma_sample_loc_type_top_field, 0, 5)?;
        let chroma_sample_loc_type_bottom_field = reader.read_exp_golomb()?;
        range_check!(chroma_sample_loc_type_bottom_field, 0, 5)?;

        Ok(ChromaSampleLoc {
            chroma_sample_loc_type_top_field: chroma_sample_loc_type_top_field as u8,
            chroma_sample_loc_type_bottom_field: chroma_sample_loc_type_bottom_field as u8,
        })
    }

    /// Builds the ChromaSampleLoc struct into a bitstream.
    pub fn build(&self, writer: &mut BitWriter) -> io::Result<()> {
        writer.write_exp_golomb(self.chroma_sample_loc_type_top_field as u64)?;
        writer.write_exp_golomb(self.chroma_sample_loc_type_bottom_field as u64)?;
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        // ue(1) = 010, ue(5) = 00110
        let data = [0b0100_0110];
        let loc = ChromaSampleLoc::parse(&mut BitReader::new(&data)).unwrap();
        assert_eq!(loc.chroma_sample_loc_type_top_field, 1);
        assert_eq!(loc.chroma_sample_loc_type_bottom_field, 5);

        let mut buf = [0u8; 1];
        let mut writer = BitWriter::new(&mut buf);
        loc.build(&mut writer).unwrap();
        writer.finish().unwrap();
        assert_eq!(buf, data);
    }

    #[test]
    fn test_out_of_range() {
        // ue(6) = 00111
        let data = [0b0011_1000];
        assert!(ChromaSampleLoc::parse(&mut BitReader::new(&data)).is_err());
    }
}
