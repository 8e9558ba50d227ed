//! RBSP level helpers shared by every syntax structure.

use std::io;

use bytes_util::{BitReader, BitWriter};

/// `more_rbsp_data()`, ISO/IEC-14496-10-2022 - 7.2
///
/// Returns true when anything other than the `rbsp_trailing_bits` is left to read.
/// This scans the remainder of the buffer, so trailing cabac_zero_words or
/// padding after the stop bit are handled like a conforming decoder would.
pub fn more_rbsp_data(reader: &BitReader) -> bool {
    if reader.is_eof() {
        return false;
    }

    // A zero here cannot be the stop bit.
    if !reader.peek_bit() {
        return true;
    }

    let mut lookahead = reader.clone();
    if lookahead.skip_bits(1).is_err() {
        return false;
    }

    while !lookahead.is_eof() {
        match lookahead.read_bit() {
            Ok(true) => return true,
            Ok(false) => {}
            Err(_) => return false,
        }
    }

    false
}

/// `rbsp_trailing_bits()`, ISO/IEC-14496-10-2022 - 7.3.2.11
///
/// With `strict` a zero `rbsp_stop_one_bit` is an error, otherwise it is skipped.
pub(crate) fn read_rbsp_trailing_bits(reader: &mut BitReader, strict: bool) -> io::Result<()> {
    let rbsp_stop_one_bit = reader.read_bit()?;
    if strict && !rbsp_stop_one_bit {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "rbsp_stop_one_bit must be 1"));
    }

    // rbsp_alignment_zero_bit
    reader.align()?;

    Ok(())
}

pub(crate) fn write_rbsp_trailing_bits(writer: &mut BitWriter) -> io::Result<()> {
    writer.write_bit(true)?;
    writer.align()?;

    Ok(())
}

/// `rbsp_slice_trailing_bits()`, ISO/IEC-14496-10-2022 - 7.3.2.10
pub(crate) fn read_rbsp_slice_trailing_bits(
    reader: &mut BitReader,
    entropy_coding_mode_flag: bool,
    strict: bool,
) -> io::Result<()> {
    read_rbsp_trailing_bits(reader, strict)?;

    if entropy_coding_mode_flag {
        while reader.remaining_bits() >= 16 {
            let cabac_zero_word = reader.read_bits(16)?;
            if strict && cabac_zero_word != 0 {
                return Err(io::Error::new(io::ErrorKind::InvalidData, "cabac_zero_word must be 0x0000"));
            }
        }
    }

    Ok(())
}

pub(crate) fn write_rbsp_slice_trailing_bits(writer: &mut BitWriter) -> io::Result<()> {
    // No cabac_zero_words are emitted.
    write_rbsp_trailing_bits(writer)
}

/// Reads a number coded as a run of `0xFF` bytes plus a final byte
/// (`payloadType` and `payloadSize` of an SEI message, 7.3.2.3.1).
pub(crate) fn read_ff_coded_number(reader: &mut BitReader) -> io::Result<u32> {
    let mut value: u32 = 0;

    loop {
        let byte = reader.read_bits(8)? as u32;
        value = value
            .checked_add(byte)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "ff coded number overflows u32"))?;

        if byte != 0xFF {
            return Ok(value);
        }
    }
}

pub(crate) fn write_ff_coded_number(writer: &mut BitWriter, mut value: u32) -> io::Result<()> {
    while value >= 0xFF {
        writer.write_bits(0xFF, 8)?;
        value -= 0xFF;
    }

    writer.write_bits(value as u64, 8)
}
