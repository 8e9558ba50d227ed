use std::io;

/// A writer that writes individual bits into a fixed byte slice.
///
/// Writing past the end of the slice fails with [`io::ErrorKind::WriteZero`]
/// and latches the [`overrun`](BitWriter::overrun) flag.
#[derive(Debug)]
#[must_use]
pub struct BitWriter<'a> {
    data: &'a mut [u8],
    byte_pos: usize,
    bit_pos: u8,
    overrun: bool,
    trace: bool,
}

impl<'a> BitWriter<'a> {
    /// Creates a new BitWriter over a slice
    pub const fn new(data: &'a mut [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            bit_pos: 0,
            overrun: false,
            trace: false,
        }
    }

    /// Emits a `trace` event for every primitive write when enabled
    pub const fn with_tracing(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    fn overrun_error(&mut self) -> io::Error {
        self.overrun = true;
        io::Error::new(io::ErrorKind::WriteZero, "bit writer overrun")
    }

    #[inline(always)]
    fn put_bit(&mut self, bit: bool) {
        let mask = 1 << (7 - self.bit_pos);
        if bit {
            self.data[self.byte_pos] |= mask;
        } else {
            self.data[self.byte_pos] &= !mask;
        }

        self.bit_pos += 1;
        if self.bit_pos == 8 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }
    }

    /// Writes a single bit
    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        self.write_bits(bit as u64, 1)
    }

    /// Writes a number of bits (at most 64), the most significant bit first
    pub fn write_bits(&mut self, bits: u64, count: u8) -> io::Result<()> {
        let count = count.min(64);

        if count != 64 && bits > (1 << count as u64) - 1 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "bits too large to write"));
        }

        if (count as usize) > self.remaining_bits() {
            return Err(self.overrun_error());
        }

        if self.trace {
            tracing::trace!(target: "bytes_util::bits", offset = self.bit_position(), bits = count, value = bits, "write");
        }

        for i in 0..count {
            self.put_bit((bits >> (count - i - 1)) & 1 == 1);
        }

        Ok(())
    }

    /// Aligns the writer to the byte boundary by writing zero bits
    pub fn align(&mut self) -> io::Result<()> {
        if !self.is_aligned() {
            self.write_bits(0, 8 - self.bit_pos)?;
        }

        Ok(())
    }

    /// Aligns the writer and returns the number of bytes written
    pub fn finish(mut self) -> io::Result<usize> {
        self.align()?;
        Ok(self.byte_pos)
    }
}

impl BitWriter<'_> {
    /// Returns the current bit position within the current byte (0-7)
    #[inline(always)]
    #[must_use]
    pub const fn bit_pos(&self) -> u8 {
        self.bit_pos
    }

    /// Checks if the writer is aligned to the byte boundary
    #[inline(always)]
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.bit_pos == 0
    }

    /// Checks if the whole slice has been written
    #[inline(always)]
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.byte_pos >= self.data.len()
    }

    /// Checks if a write has tried to go past the end of the slice
    #[inline(always)]
    #[must_use]
    pub const fn overrun(&self) -> bool {
        self.overrun
    }

    /// Returns the number of whole bytes written so far
    #[inline(always)]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.byte_pos
    }

    /// Returns the current position in bits from the start of the slice
    #[inline(always)]
    #[must_use]
    pub const fn bit_position(&self) -> u64 {
        self.byte_pos as u64 * 8 + self.bit_pos as u64
    }

    /// Returns the number of bits that can still be written
    #[inline(always)]
    #[must_use]
    pub const fn remaining_bits(&self) -> usize {
        if self.byte_pos >= self.data.len() {
            0
        } else {
            (self.data.len() - self.byte_pos) * 8 - self.bit_pos as usize
        }
    }
}

impl io::Write for BitWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let n = buf.len().min(self.remaining_bits() / 8);
        if n == 0 {
            self.overrun = true;
            return Ok(0);
        }

        if self.is_aligned() {
            self.data[self.byte_pos..self.byte_pos + n].copy_from_slice(&buf[..n]);

            if self.trace {
                tracing::trace!(target: "bytes_util::bits", offset = self.bit_position(), bytes = n, "write aligned");
            }

            self.byte_pos += n;
            return Ok(n);
        }

        for byte in &buf[..n] {
            self.write_bits(*byte as u64, 8)?;
        }

        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
