//! A set of helper functions to encode and decode exponential-golomb values.
//!
//! This crate extends upon the [`BitReader`] and [`BitWriter`] from the
//! [`bytes-util`](bytes_util) crate to provide functionality
//! for reading and writing the `ue(v)` and `se(v)` codes used throughout
//! H.264 parameter sets and slice headers.
//!
//! ```rust
//! # fn test() -> std::io::Result<()> {
//! use expgolomb::{BitReaderExpGolombExt, BitWriterExpGolombExt};
//! use bytes_util::{BitReader, BitWriter};
//!
//! let mut buf = [0u8; 4];
//! let mut bit_writer = BitWriter::new(&mut buf);
//! bit_writer.write_exp_golomb(0)?;
//! bit_writer.write_exp_golomb(1)?;
//! bit_writer.write_signed_exp_golomb(-2)?;
//! let len = bit_writer.finish()?;
//!
//! let mut bit_reader = BitReader::new(&buf[..len]);
//! assert_eq!(bit_reader.read_exp_golomb()?, 0);
//! assert_eq!(bit_reader.read_exp_golomb()?, 1);
//! assert_eq!(bit_reader.read_signed_exp_golomb()?, -2);
//! # Ok(())
//! # }
//! # test().expect("failed to run test");
//! ```
//!
//! ## License
//!
//! This project is licensed under the [MIT](./LICENSE.MIT) or
//! [Apache-2.0](./LICENSE.Apache-2.0) license. You can choose between one of
//! them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(unsafe_code)]

use std::io;

use bytes_util::{BitReader, BitWriter};

/// The longest zero prefix accepted when decoding.
///
/// Anything longer cannot come from a conforming encoder and would otherwise
/// let a run of zero bytes consume the rest of the buffer.
pub const MAX_LEADING_ZEROS: u32 = 32;

/// The largest value that can be encoded with [`MAX_LEADING_ZEROS`] zeros.
pub const MAX_EXP_GOLOMB_VALUE: u64 = (1 << (MAX_LEADING_ZEROS + 1)) - 2;

/// Extension trait for reading Exp-Golomb encoded numbers from a bit reader
///
/// See: <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>
///
/// - [`BitReader`]
pub trait BitReaderExpGolombExt {
    /// Reads an Exp-Golomb encoded number
    fn read_exp_golomb(&mut self) -> io::Result<u64>;

    /// Reads a signed Exp-Golomb encoded number
    fn read_signed_exp_golomb(&mut self) -> io::Result<i64> {
        let code = self.read_exp_golomb()?;

        if code % 2 == 0 {
            Ok(-((code / 2) as i64))
        } else {
            Ok((code / 2) as i64 + 1)
        }
    }
}

impl BitReaderExpGolombExt for BitReader<'_> {
    fn read_exp_golomb(&mut self) -> io::Result<u64> {
        let mut leading_zeros = 0;
        while !self.read_bit()? {
            leading_zeros += 1;
            if leading_zeros > MAX_LEADING_ZEROS {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "exp-golomb prefix longer than 32 bits",
                ));
            }
        }

        let suffix = self.read_bits(leading_zeros as u8)?;

        Ok((1 << leading_zeros) - 1 + suffix)
    }
}

/// Extension trait for writing Exp-Golomb encoded numbers to a bit writer
///
/// See: <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>
///
/// - [`BitWriter`]
pub trait BitWriterExpGolombExt {
    /// Writes an Exp-Golomb encoded number
    fn write_exp_golomb(&mut self, input: u64) -> io::Result<()>;

    /// Writes a signed Exp-Golomb encoded number
    fn write_signed_exp_golomb(&mut self, number: i64) -> io::Result<()> {
        self.write_exp_golomb(signed_to_code(number))
    }
}

impl BitWriterExpGolombExt for BitWriter<'_> {
    fn write_exp_golomb(&mut self, input: u64) -> io::Result<()> {
        if input > MAX_EXP_GOLOMB_VALUE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "exp-golomb value too large to write",
            ));
        }

        let leading_zeros = leading_zeros_of(input);

        self.write_bits(0, leading_zeros)?;
        self.write_bits(input + 1, leading_zeros + 1)?;

        Ok(())
    }
}

#[inline(always)]
fn leading_zeros_of(number: u64) -> u8 {
    // Saturating so that u64::MAX still gets a (too long) size instead of overflowing.
    (63 - number.saturating_add(1).leading_zeros()) as u8
}

#[inline(always)]
fn signed_to_code(number: i64) -> u64 {
    if number <= 0 {
        number.unsigned_abs().saturating_mul(2)
    } else {
        number as u64 * 2 - 1
    }
}

/// Returns the number of bits that a signed Exp-Golomb encoded number would take up.
///
/// See: <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>
pub fn size_of_signed_exp_golomb(number: i64) -> u64 {
    size_of_exp_golomb(signed_to_code(number))
}

/// Returns the number of bits that an Exp-Golomb encoded number would take up.
///
/// See: <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>
pub fn size_of_exp_golomb(number: u64) -> u64 {
    leading_zeros_of(number) as u64 * 2 + 1
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use bytes_util::{BitReader, BitWriter};

    use crate::{
        BitReaderExpGolombExt, BitWriterExpGolombExt, MAX_EXP_GOLOMB_VALUE, size_of_exp_golomb,
        size_of_signed_exp_golomb,
    };

    #[test]
    fn test_exp_glob_decode() {
        let mut buf = [0u8; 4];
        let mut bit_writer = BitWriter::new(&mut buf);

        bit_writer.write_bits(0b1, 1).unwrap(); // 0
        bit_writer.write_bits(0b010, 3).unwrap(); // 1
        bit_writer.write_bits(0b011, 3).unwrap(); // 2
        bit_writer.write_bits(0b00100, 5).unwrap(); // 3
        bit_writer.write_bits(0b00101, 5).unwrap(); // 4
        bit_writer.write_bits(0b00110, 5).unwrap(); // 5
        bit_writer.write_bits(0b00111, 5).unwrap(); // 6

        let len = bit_writer.finish().unwrap();
        let mut bit_reader = BitReader::new(&buf[..len]);
        let remaining_bits = bit_reader.remaining_bits();

        for (expected, consumed) in [(0, 1), (1, 4), (2, 7), (3, 12), (4, 17), (5, 22), (6, 27)] {
            assert_eq!(bit_reader.read_exp_golomb().unwrap(), expected);
            assert_eq!(bit_reader.remaining_bits(), remaining_bits - consumed);
        }
    }

    #[test]
    fn test_signed_exp_glob_decode() {
        let mut buf = [0u8; 4];
        let mut bit_writer = BitWriter::new(&mut buf);

        bit_writer.write_bits(0b1, 1).unwrap(); // 0
        bit_writer.write_bits(0b010, 3).unwrap(); // 1
        bit_writer.write_bits(0b011, 3).unwrap(); // -1
        bit_writer.write_bits(0b00100, 5).unwrap(); // 2
        bit_writer.write_bits(0b00101, 5).unwrap(); // -2
        bit_writer.write_bits(0b00110, 5).unwrap(); // 3
        bit_writer.write_bits(0b00111, 5).unwrap(); // -3

        let len = bit_writer.finish().unwrap();
        let mut bit_reader = BitReader::new(&buf[..len]);

        for expected in [0, 1, -1, 2, -2, 3, -3] {
            assert_eq!(bit_reader.read_signed_exp_golomb().unwrap(), expected);
        }
    }

    #[test]
    fn test_unsigned_round_trip() {
        for value in 0..=(1u64 << 20) {
            let mut buf = [0u8; 8];
            let mut bit_writer = BitWriter::new(&mut buf);
            bit_writer.write_exp_golomb(value).unwrap();
            assert_eq!(bit_writer.bit_position(), size_of_exp_golomb(value));
            let len = bit_writer.finish().unwrap();

            let mut bit_reader = BitReader::new(&buf[..len]);
            assert_eq!(bit_reader.read_exp_golomb().unwrap(), value, "value {value}");
        }
    }

    #[test]
    fn test_signed_round_trip() {
        let values = [
            0,
            1,
            -1,
            2,
            -2,
            12,
            -12,
            26,
            -26,
            127,
            -128,
            255,
            -256,
            65535,
            -65536,
            i32::MAX as i64,
            i32::MIN as i64,
        ];

        let mut buf = [0u8; 256];
        let mut bit_writer = BitWriter::new(&mut buf);
        for value in values {
            bit_writer.write_signed_exp_golomb(value).unwrap();
        }
        let len = bit_writer.finish().unwrap();

        let mut bit_reader = BitReader::new(&buf[..len]);
        for value in values {
            assert_eq!(bit_reader.read_signed_exp_golomb().unwrap(), value);
        }
    }

    #[test]
    fn test_largest_value() {
        let mut buf = [0u8; 16];
        let mut bit_writer = BitWriter::new(&mut buf);
        bit_writer.write_exp_golomb(MAX_EXP_GOLOMB_VALUE).unwrap();
        assert_eq!(bit_writer.bit_position(), 65);
        assert!(bit_writer.write_exp_golomb(MAX_EXP_GOLOMB_VALUE + 1).is_err());
        let len = bit_writer.finish().unwrap();

        let mut bit_reader = BitReader::new(&buf[..len]);
        assert_eq!(bit_reader.read_exp_golomb().unwrap(), MAX_EXP_GOLOMB_VALUE);
    }

    #[test]
    fn test_prefix_too_long() {
        let data = [0u8; 8];
        let mut bit_reader = BitReader::new(&data);

        let err = bit_reader.read_exp_golomb().unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        assert!(!bit_reader.overrun());
    }

    #[test]
    fn test_truncated_code() {
        // prefix of 4 zeros then the buffer ends
        let data = [0b0000_1000];
        let mut bit_reader = BitReader::new(&data);

        let err = bit_reader.read_exp_golomb().unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
        assert!(bit_reader.overrun());
    }

    #[test]
    fn test_size_of_exp_golomb() {
        assert_eq!(size_of_exp_golomb(0), 1);
        assert_eq!(size_of_exp_golomb(1), 3);
        assert_eq!(size_of_exp_golomb(2), 3);
        assert_eq!(size_of_exp_golomb(3), 5);
        assert_eq!(size_of_exp_golomb(6), 5);
        assert_eq!(size_of_exp_golomb(7), 7);
        assert_eq!(size_of_exp_golomb(u64::MAX), 127);
    }

    #[test]
    fn test_size_of_signed_exp_golomb() {
        assert_eq!(size_of_signed_exp_golomb(0), 1);
        assert_eq!(size_of_signed_exp_golomb(1), 3);
        assert_eq!(size_of_signed_exp_golomb(-1), 3);
        assert_eq!(size_of_signed_exp_golomb(2), 5);
        assert_eq!(size_of_signed_exp_golomb(-3), 5);
        assert_eq!(size_of_signed_exp_golomb(-4), 7);
    }
}
