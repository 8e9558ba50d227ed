//! Locating NAL units in an Annex B byte stream (ISO/IEC-14496-10-2022 - B.1).

use memchr::memmem;

use crate::{Error, Result};

/// The 4-byte start code written in front of every NAL unit by [`write_annexb`].
pub const START_CODE: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

const SHORT_START_CODE: [u8; 3] = [0x00, 0x00, 0x01];

/// The location of a NAL unit inside a byte stream, start codes excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NalSpan {
    /// Offset of the first byte after the start code.
    pub start: usize,
    /// Offset one past the last byte of the NAL unit.
    pub end: usize,
}

impl NalSpan {
    /// Length of the NAL unit in bytes.
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// True if the start code is immediately followed by another one.
    pub const fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Returns the NAL unit bytes out of the buffer the span was found in.
    pub fn slice<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.start..self.end]
    }
}

/// Finds the first NAL unit in `buf`.
///
/// The unit starts right after the first `00 00 01` (or `00 00 00 01`) and
/// ends where the next `00 00 00` or `00 00 01` begins.
///
/// - `Ok(None)`: there is no start code, or nothing follows it.
/// - `Err(Error::NalTruncated)`: the buffer ends before a terminating start
///   code. When `buf` is known to hold a complete stream, the unit runs to the
///   end of the buffer; [`AnnexBReader`] applies that policy.
pub fn find_nal_unit(buf: &[u8]) -> Result<Option<NalSpan>> {
    let Some(pos) = memmem::find(buf, &SHORT_START_CODE) else {
        return Ok(None);
    };

    let start = pos + SHORT_START_CODE.len();
    if start >= buf.len() {
        return Ok(None);
    }

    match find_nal_end(&buf[start..]) {
        Some(len) => Ok(Some(NalSpan {
            start,
            end: start + len,
        })),
        None => Err(Error::NalTruncated { start }),
    }
}

fn find_nal_end(data: &[u8]) -> Option<usize> {
    memmem::find_iter(data, &[0x00, 0x00]).find(|&pos| data.get(pos + 2).is_some_and(|&b| b <= 0x01))
}

/// Iterates over the NAL units of a fully buffered Annex B stream.
///
/// The final unit runs to the end of the buffer (minus any `trailing_zero_8bits`);
/// empty units between back-to-back start codes are skipped.
#[derive(Debug, Clone)]
pub struct AnnexBReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> AnnexBReader<'a> {
    /// Creates a new reader over a complete byte stream.
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }
}

impl<'a> Iterator for AnnexBReader<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = &self.data[self.offset..];

            let nal = match find_nal_unit(rest) {
                Ok(Some(span)) => {
                    self.offset += span.end;
                    span.slice(rest)
                }
                Ok(None) => {
                    self.offset = self.data.len();
                    return None;
                }
                Err(_) => {
                    let start = memmem::find(rest, &SHORT_START_CODE)? + SHORT_START_CODE.len();
                    self.offset = self.data.len();

                    let tail = &rest[start..];
                    let len = tail.iter().rposition(|&b| b != 0x00).map_or(0, |last| last + 1);
                    &tail[..len]
                }
            };

            if !nal.is_empty() {
                return Some(nal);
            }

            if self.offset >= self.data.len() {
                return None;
            }
        }
    }
}

/// Joins NAL units into an Annex B byte stream, each prefixed by [`START_CODE`].
pub fn write_annexb<I, B>(nals: I) -> Vec<u8>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut out = Vec::new();
    for nal in nals {
        out.extend_from_slice(&START_CODE);
        out.extend_from_slice(nal.as_ref());
    }
    out
}
