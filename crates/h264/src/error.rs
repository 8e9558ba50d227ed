use std::io;

use crate::NALUnitType;

/// Errors produced while locating, parsing or building H.264 NAL units.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller supplied output buffer cannot hold the result.
    #[error("output buffer too small ({available} bytes available)")]
    BufferTooSmall {
        /// Size of the buffer that was supplied.
        available: usize,
    },

    /// A `00 00 00`, `00 00 01`, `00 00 02` sequence or a malformed
    /// `00 00 03` escape was found inside a NAL unit.
    #[error("illegal emulation prevention sequence at offset {offset}")]
    IllegalEmulationPrevention {
        /// Offset of the offending byte within the NAL unit.
        offset: usize,
    },

    /// The buffer ended before the start code terminating the NAL unit.
    #[error("NAL unit starting at offset {start} is not terminated by a start code")]
    NalTruncated {
        /// Offset of the first byte after the start code.
        start: usize,
    },

    /// There is no parser or builder for this kind of NAL unit.
    #[error("unsupported nal_unit_type: {0:?}")]
    UnsupportedNalUnitType(NALUnitType),

    /// The `forbidden_zero_bit` of the NAL header is set.
    #[error("forbidden_zero_bit is set")]
    ForbiddenZeroBit,

    /// The NAL header violates a semantic constraint.
    #[error("invalid NAL unit header: {0}")]
    InvalidNalHeader(&'static str),

    /// A slice refers to a picture parameter set that has not been seen.
    #[error("picture parameter set {0} is not available")]
    MissingPps(u32),

    /// A picture parameter set refers to a sequence parameter set that has not been seen.
    #[error("sequence parameter set {0} is not available")]
    MissingSps(u32),

    /// A read or write crossed the end of its buffer.
    #[error("bitstream overrun")]
    Overrun,

    /// A syntax element has a value the syntax does not allow.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Any other I/O error.
    #[error("io error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof | io::ErrorKind::WriteZero => Error::Overrun,
            io::ErrorKind::InvalidData => Error::InvalidData(err.to_string()),
            _ => Error::Io(err),
        }
    }
}

/// Shorthand for `Result<T, h264_bitstream::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mapping() {
        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "bit reader overrun");
        assert!(matches!(Error::from(eof), Error::Overrun));

        let write_zero = io::Error::new(io::ErrorKind::WriteZero, "bit writer overrun");
        assert!(matches!(Error::from(write_zero), Error::Overrun));

        let invalid = io::Error::new(io::ErrorKind::InvalidData, "cpb_cnt_minus1 is out of range [0, 31]: 40");
        let err = Error::from(invalid);
        assert_eq!(err.to_string(), "invalid data: cpb_cnt_minus1 is out of range [0, 31]: 40");

        let other = io::Error::other("boom");
        assert!(matches!(Error::from(other), Error::Io(_)));
    }
}
