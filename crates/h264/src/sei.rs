use std::io::{Read, Write};

use bytes::Bytes;
use bytes_util::{BitReader, BitWriter};

use crate::rbsp::{more_rbsp_data, read_ff_coded_number, write_ff_coded_number};
use crate::{Error, Result, SeiPayloadType};

/// One `sei_message()` of an SEI RBSP, ISO/IEC-14496-10-2022 - 7.3.2.3.1
///
/// Only the envelope is decoded; the payload is kept as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeiMessage {
    /// `payloadType`
    pub payload_type: SeiPayloadType,
    /// The `payloadSize` bytes of the payload.
    pub payload: Bytes,
}

impl SeiMessage {
    /// Creates a message.
    pub fn new(payload_type: SeiPayloadType, payload: impl Into<Bytes>) -> Self {
        Self {
            payload_type,
            payload: payload.into(),
        }
    }

    /// Parses a single message.
    ///
    /// A `payloadSize` larger than the rest of the RBSP is an [`Error::Overrun`].
    pub fn parse(reader: &mut BitReader) -> Result<Self> {
        let payload_type = SeiPayloadType(read_ff_coded_number(reader)?);
        let payload_size = read_ff_coded_number(reader)? as usize;

        if payload_size > reader.remaining_bits() / 8 {
            return Err(Error::Overrun);
        }

        let mut payload = vec![0; payload_size];
        reader.read_exact(&mut payload)?;

        Ok(Self {
            payload_type,
            payload: Bytes::from(payload),
        })
    }

    /// Parses messages while `more_rbsp_data()` is true, `sei_rbsp()` without the trailing bits.
    pub fn parse_all(reader: &mut BitReader) -> Result<Vec<Self>> {
        let mut messages = Vec::new();
        while more_rbsp_data(reader) {
            messages.push(Self::parse(reader)?);
        }

        Ok(messages)
    }

    /// Builds the message.
    pub fn build(&self, writer: &mut BitWriter) -> Result<()> {
        let payload_size = u32::try_from(self.payload.len())
            .map_err(|_| Error::InvalidData(format!("SEI payload of {} bytes is too large", self.payload.len())))?;

        write_ff_coded_number(writer, self.payload_type.0)?;
        write_ff_coded_number(writer, payload_size)?;
        writer.write_all(&self.payload)?;

        Ok(())
    }
}
