//! Conversion between NAL unit payloads and RBSP (ISO/IEC-14496-10-2022 - 7.4.1).
//!
//! Inside a NAL unit any `00 00 0x` sequence with `x <= 3` is escaped as
//! `00 00 03 0x` so that it cannot be mistaken for a start code.

use crate::{Error, Result};

/// Returns a NAL buffer size that is always large enough to hold the
/// escaped form of an RBSP of `rbsp_len` bytes.
///
/// Typical payloads grow by far less, but a run of zero bytes gains one
/// escape for every two zeros.
pub const fn max_nal_size(rbsp_len: usize) -> usize {
    rbsp_len + rbsp_len.div_ceil(2) + 1
}

/// Removes emulation prevention bytes from `nal`, writing the RBSP into `rbsp`.
///
/// Returns the number of bytes written to `rbsp`. A trailing `03` after a
/// final pair of zero bytes (cabac_zero_word padding) is dropped.
pub fn nal_to_rbsp(nal: &[u8], rbsp: &mut [u8]) -> Result<usize> {
    let available = rbsp.len();
    let mut zero_count = 0;
    let mut written = 0;
    let mut i = 0;

    while i < nal.len() {
        let byte = nal[i];

        if zero_count == 2 {
            match byte {
                0x00..=0x02 => return Err(Error::IllegalEmulationPrevention { offset: i }),
                0x03 => {
                    if i + 1 == nal.len() {
                        break;
                    }

                    // An escape only ever protects 00, 01, 02 or 03.
                    if nal[i + 1] > 0x03 {
                        return Err(Error::IllegalEmulationPrevention { offset: i + 1 });
                    }

                    zero_count = 0;
                    i += 1;
                    continue;
                }
                _ => {}
            }
        }

        let Some(slot) = rbsp.get_mut(written) else {
            return Err(Error::BufferTooSmall { available });
        };
        *slot = byte;
        written += 1;

        if byte == 0x00 {
            zero_count += 1;
        } else {
            zero_count = 0;
        }

        i += 1;
    }

    Ok(written)
}

/// Inserts emulation prevention bytes into `rbsp`, writing the NAL payload into `nal`.
///
/// Returns the number of bytes written to `nal`. A buffer of
/// [`max_nal_size`] bytes is always large enough.
pub fn rbsp_to_nal(rbsp: &[u8], nal: &mut [u8]) -> Result<usize> {
    let available = nal.len();
    let mut zero_count = 0;
    let mut written = 0;

    let mut push = |byte: u8, written: &mut usize| -> Result<()> {
        let Some(slot) = nal.get_mut(*written) else {
            return Err(Error::BufferTooSmall { available });
        };
        *slot = byte;
        *written += 1;
        Ok(())
    };

    for &byte in rbsp {
        if zero_count == 2 && byte <= 0x03 {
            push(0x03, &mut written)?;
            zero_count = 0;
        }

        push(byte, &mut written)?;

        if byte == 0x00 {
            zero_count += 1;
        } else {
            zero_count = 0;
        }
    }

    // 7.4.1: an RBSP that ends in cabac_zero_words is closed with a final 03.
    if zero_count >= 2 {
        push(0x03, &mut written)?;
    }

    Ok(written)
}

/// Removes emulation prevention bytes into a new vector.
pub fn nal_to_rbsp_vec(nal: &[u8]) -> Result<Vec<u8>> {
    let mut rbsp = vec![0; nal.len()];
    let len = nal_to_rbsp(nal, &mut rbsp)?;
    rbsp.truncate(len);
    Ok(rbsp)
}

/// Inserts emulation prevention bytes into a new vector.
pub fn rbsp_to_nal_vec(rbsp: &[u8]) -> Result<Vec<u8>> {
    let mut nal = vec![0; max_nal_size(rbsp.len())];
    let len = rbsp_to_nal(rbsp, &mut nal)?;
    nal.truncate(len);
    Ok(nal)
}
