use std::io;

/// A reader that reads individual bits from a byte slice.
///
/// Bits are consumed most significant bit first. Reading past the end of the
/// slice fails with [`io::ErrorKind::UnexpectedEof`] and latches the
/// [`overrun`](BitReader::overrun) flag, which stays set for the rest of the
/// reader's life.
#[derive(Debug, Clone)]
#[must_use]
pub struct BitReader<'a> {
    data: &'a [u8],
    byte_pos: usize,
    bit_pos: u8,
    overrun: bool,
    trace: bool,
}

impl<'a> BitReader<'a> {
    /// Creates a new BitReader over a slice
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            bit_pos: 0,
            overrun: false,
            trace: false,
        }
    }

    /// Emits a `trace` event for every primitive read when enabled
    pub const fn with_tracing(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    fn eof_error(&mut self) -> io::Error {
        self.overrun = true;
        self.byte_pos = self.data.len();
        self.bit_pos = 0;
        io::Error::new(io::ErrorKind::UnexpectedEof, "bit reader overrun")
    }

    #[inline(always)]
    fn next_bit(&mut self) -> u64 {
        let bit = (self.data[self.byte_pos] >> (7 - self.bit_pos)) & 1;

        self.bit_pos += 1;
        if self.bit_pos == 8 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }

        bit as u64
    }

    /// Reads a single bit
    pub fn read_bit(&mut self) -> io::Result<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Reads multiple bits (at most 64), most significant bit first
    pub fn read_bits(&mut self, count: u8) -> io::Result<u64> {
        let count = count.min(64);

        if (count as usize) > self.remaining_bits() {
            return Err(self.eof_error());
        }

        let offset = self.bit_position();

        let mut bits = 0;
        for _ in 0..count {
            bits = (bits << 1) | self.next_bit();
        }

        if self.trace {
            tracing::trace!(target: "bytes_util::bits", offset, bits = count, value = bits, "read");
        }

        Ok(bits)
    }

    /// Returns the next bit without advancing. Past the end this is `false`.
    #[must_use]
    pub fn peek_bit(&self) -> bool {
        self.peek_bits(1) == 1
    }

    /// Returns the next `count` bits without advancing.
    ///
    /// Bits past the end of the slice read as zero.
    #[must_use]
    pub fn peek_bits(&self, count: u8) -> u64 {
        let count = count.min(64);
        let available = self.remaining_bits().min(count as usize) as u8;

        let mut lookahead = Self::new(self.data);
        lookahead.byte_pos = self.byte_pos;
        lookahead.bit_pos = self.bit_pos;

        let mut bits = 0;
        for _ in 0..available {
            bits = (bits << 1) | lookahead.next_bit();
        }

        bits.checked_shl((count - available) as u32).unwrap_or(0)
    }

    /// Skips `count` bits
    pub fn skip_bits(&mut self, count: usize) -> io::Result<()> {
        if count > self.remaining_bits() {
            return Err(self.eof_error());
        }

        let target = self.bit_position() as usize + count;
        self.byte_pos = target / 8;
        self.bit_pos = (target % 8) as u8;

        Ok(())
    }

    /// Aligns the reader to the next byte boundary
    #[inline(always)]
    pub fn align(&mut self) -> io::Result<()> {
        if !self.is_aligned() {
            self.skip_bits(8 - self.bit_pos as usize)?;
        }

        Ok(())
    }

    /// Returns the bytes from the next byte boundary to the end of the slice
    #[must_use]
    pub fn remaining_aligned(&self) -> &'a [u8] {
        let start = if self.is_aligned() {
            self.byte_pos
        } else {
            self.byte_pos + 1
        };

        &self.data[start.min(self.data.len())..]
    }
}

impl BitReader<'_> {
    /// Returns the underlying slice
    #[inline(always)]
    #[must_use]
    pub const fn get_ref(&self) -> &[u8] {
        self.data
    }

    /// Returns the current bit position within the current byte (0-7)
    #[inline(always)]
    #[must_use]
    pub const fn bit_pos(&self) -> u8 {
        self.bit_pos
    }

    /// Returns the number of unread bits left in the current byte (1-8)
    #[inline(always)]
    #[must_use]
    pub const fn bits_left(&self) -> u8 {
        8 - self.bit_pos
    }

    /// Checks if the reader is aligned to the byte boundary
    #[inline(always)]
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.bit_pos == 0
    }

    /// Checks if every byte of the slice has been consumed
    #[inline(always)]
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.byte_pos >= self.data.len()
    }

    /// Checks if a read has tried to go past the end of the slice
    #[inline(always)]
    #[must_use]
    pub const fn overrun(&self) -> bool {
        self.overrun
    }

    /// Returns the number of whole bytes consumed so far
    #[inline(always)]
    #[must_use]
    pub const fn position(&self) -> usize {
        if self.byte_pos > self.data.len() {
            self.data.len()
        } else {
            self.byte_pos
        }
    }

    /// Returns the current position in bits from the start of the slice
    #[inline(always)]
    #[must_use]
    pub const fn bit_position(&self) -> u64 {
        self.byte_pos as u64 * 8 + self.bit_pos as u64
    }

    /// Returns the number of bits that can still be read
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

impl io::Read for BitReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if self.is_eof() {
            self.overrun = true;
            return Ok(0);
        }

        if self.is_aligned() {
            let n = buf.len().min(self.data.len() - self.byte_pos);
            buf[..n].copy_from_slice(&self.data[self.byte_pos..self.byte_pos + n]);
            self.byte_pos += n;

            if self.trace {
                tracing::trace!(target: "bytes_util::bits", offset = self.bit_position() - n as u64 * 8, bytes = n, "read aligned");
            }

            return Ok(n);
        }

        // Unaligned reads shift every output byte across two input bytes, so
        // only as many whole bytes as there are bits left can be produced.
        let n = buf.len().min(self.remaining_bits() / 8);
        for byte in buf.iter_mut().take(n) {
            *byte = self.read_bits(8)? as u8;
        }

        Ok(n)
    }
}
