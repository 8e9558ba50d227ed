use bytes_util::{BitReader, BitWriter};
use tracing::{debug, trace};

use crate::rbsp::{read_rbsp_trailing_bits, write_rbsp_trailing_bits};
use crate::{
    AccessUnitDelimiter, AnnexBReader, Error, NALUnitType, NalHeader, ParameterSets, Pps, Result, SeiMessage,
    SliceGroups, SliceLayer, Sps, SpsFixup, StreamConfig, nal_to_rbsp_vec, rbsp_to_nal, rbsp_to_nal_vec,
};

/// Room for the syntax elements of any record, on top of the opaque payload bytes.
const SYNTAX_CAPACITY: usize = 16 * 1024;

/// The decoded RBSP of a NAL unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NalPayload {
    /// A coded slice of a non-IDR, IDR or auxiliary picture.
    Slice(SliceLayer),
    /// The messages of an SEI NAL unit.
    Sei(Vec<SeiMessage>),
    /// A sequence parameter set.
    Sps(Sps),
    /// A picture parameter set.
    Pps(Pps),
    /// An access unit delimiter.
    Aud(AccessUnitDelimiter),
    /// End of sequence, its RBSP is empty.
    EndOfSequence,
    /// End of stream, its RBSP is empty.
    EndOfStream,
}

impl NalPayload {
    /// True when this payload can be carried by a NAL unit of the given type.
    pub const fn matches(&self, nal_unit_type: NALUnitType) -> bool {
        match self {
            Self::Slice(_) => nal_unit_type.is_slice(),
            Self::Sei(_) => matches!(nal_unit_type, NALUnitType::Sei),
            Self::Sps(_) => matches!(nal_unit_type, NALUnitType::Sps),
            Self::Pps(_) => matches!(nal_unit_type, NALUnitType::Pps),
            Self::Aud(_) => matches!(nal_unit_type, NALUnitType::AccessUnitDelimiter),
            Self::EndOfSequence => matches!(nal_unit_type, NALUnitType::EndOfSequence),
            Self::EndOfStream => matches!(nal_unit_type, NALUnitType::EndOfStream),
        }
    }
}

/// A parsed NAL unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NalUnit {
    /// The NAL unit header.
    pub header: NalHeader,
    /// The record carried by the unit.
    pub payload: NalPayload,
}

/// Reads and writes the NAL units of one H.264 stream.
///
/// Parameter sets are remembered as they are read, so slices can be
/// parsed against the SPS and PPS they refer to.
#[derive(Debug, Clone, Default)]
pub struct H264Stream {
    config: StreamConfig,
    parameter_sets: ParameterSets,
}

impl H264Stream {
    /// Creates a stream with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stream with the given configuration.
    pub fn with_config(config: StreamConfig) -> Self {
        Self {
            config,
            parameter_sets: ParameterSets::new(),
        }
    }

    /// The configuration of this stream.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// The parameter sets seen so far.
    pub fn parameter_sets(&self) -> &ParameterSets {
        &self.parameter_sets
    }

    /// Mutable access to the parameter set cache, e.g. to seed it out of band.
    pub fn parameter_sets_mut(&mut self) -> &mut ParameterSets {
        &mut self.parameter_sets
    }

    /// Parses one NAL unit, start code excluded.
    ///
    /// SPS and PPS units are stored in the parameter set cache once they parsed successfully.
    pub fn read_nal_unit(&mut self, nal: &[u8]) -> Result<NalUnit> {
        let rbsp = nal_to_rbsp_vec(nal)?;
        let mut reader = BitReader::new(&rbsp).with_tracing(self.config.trace_bits);

        let header = NalHeader::parse(&mut reader)?;
        if self.config.strict_nal_header {
            header.validate()?;
        }

        trace!(
            nal_unit_type = ?header.nal_unit_type,
            nal_ref_idc = header.nal_ref_idc,
            nal_len = nal.len(),
            rbsp_len = rbsp.len(),
            "reading nal unit"
        );

        let payload = match header.nal_unit_type {
            nal_unit_type if nal_unit_type.is_slice() => NalPayload::Slice(SliceLayer::parse(
                &mut reader,
                &header,
                &self.parameter_sets,
                self.config.strict_trailing_bits,
            )?),
            NALUnitType::Sei => {
                let messages = SeiMessage::parse_all(&mut reader)?;
                self.read_trailing_bits(&mut reader)?;
                NalPayload::Sei(messages)
            }
            NALUnitType::Sps => {
                let sps = Sps::parse(&mut reader)?;
                self.read_trailing_bits(&mut reader)?;
                NalPayload::Sps(sps)
            }
            NALUnitType::Pps => {
                let pps = Pps::parse(&mut reader, &self.parameter_sets)?;
                self.read_trailing_bits(&mut reader)?;
                NalPayload::Pps(pps)
            }
            NALUnitType::AccessUnitDelimiter => {
                let aud = AccessUnitDelimiter::parse(&mut reader)?;
                self.read_trailing_bits(&mut reader)?;
                NalPayload::Aud(aud)
            }
            NALUnitType::EndOfSequence => NalPayload::EndOfSequence,
            NALUnitType::EndOfStream => NalPayload::EndOfStream,
            nal_unit_type => return Err(Error::UnsupportedNalUnitType(nal_unit_type)),
        };

        if reader.overrun() {
            return Err(Error::Overrun);
        }

        match &payload {
            NalPayload::Sps(sps) => {
                self.parameter_sets.insert_sps(sps.clone())?;
            }
            NalPayload::Pps(pps) => {
                self.parameter_sets.insert_pps(pps.clone());
            }
            _ => {}
        }

        Ok(NalUnit { header, payload })
    }

    /// Parses every NAL unit of a complete Annex B byte stream.
    pub fn read_annexb(&mut self, stream: &[u8]) -> Result<Vec<NalUnit>> {
        let units = AnnexBReader::new(stream)
            .map(|nal| self.read_nal_unit(nal))
            .collect::<Result<Vec<_>>>()?;

        debug!(units = units.len(), bytes = stream.len(), "read annex b stream");
        Ok(units)
    }

    /// Writes a NAL unit into `out`, start code excluded, and returns the written length.
    ///
    /// Slices are written against the SPS and PPS in the cache, as they are read.
    pub fn write_nal_unit(&self, unit: &NalUnit, out: &mut [u8]) -> Result<usize> {
        let rbsp = self.build_rbsp(unit)?;
        rbsp_to_nal(&rbsp, out)
    }

    /// Writes a NAL unit into a new vector, start code excluded.
    pub fn write_nal_unit_to_vec(&self, unit: &NalUnit) -> Result<Vec<u8>> {
        let rbsp = self.build_rbsp(unit)?;
        rbsp_to_nal_vec(&rbsp)
    }

    /// Parses an SPS NAL unit, applies `fixup` and writes it back.
    ///
    /// The fixed SPS replaces the original in the cache.
    pub fn rewrite_sps(&mut self, nal: &[u8], fixup: &SpsFixup) -> Result<Vec<u8>> {
        let unit = self.read_nal_unit(nal)?;
        let NalPayload::Sps(mut sps) = unit.payload else {
            return Err(Error::InvalidData(format!(
                "expected a sequence parameter set, found {:?}",
                unit.header.nal_unit_type
            )));
        };

        fixup.apply(&mut sps);
        debug!(
            sps_id = sps.seq_parameter_set_id,
            profile_idc = sps.profile_idc,
            level_idc = sps.level_idc,
            max_num_ref_frames = sps.max_num_ref_frames,
            "rewriting sps"
        );

        self.parameter_sets.insert_sps(sps.clone())?;
        self.write_nal_unit_to_vec(&NalUnit {
            header: unit.header,
            payload: NalPayload::Sps(sps),
        })
    }

    fn read_trailing_bits(&self, reader: &mut BitReader) -> Result<()> {
        // Some muxers drop the trailing bits of the last NAL unit.
        if reader.is_eof() && !self.config.strict_trailing_bits {
            return Ok(());
        }

        read_rbsp_trailing_bits(reader, self.config.strict_trailing_bits)?;
        Ok(())
    }

    fn build_rbsp(&self, unit: &NalUnit) -> Result<Vec<u8>> {
        if !unit.payload.matches(unit.header.nal_unit_type) {
            return Err(Error::InvalidNalHeader("nal_unit_type does not match the payload"));
        }

        let mut rbsp = vec![0; SYNTAX_CAPACITY + payload_len(&unit.payload)];
        let mut writer = BitWriter::new(&mut rbsp).with_tracing(self.config.trace_bits);

        unit.header.build(&mut writer)?;
        match &unit.payload {
            NalPayload::Slice(slice) => slice.build(&mut writer, &unit.header, &self.parameter_sets)?,
            NalPayload::Sei(messages) => {
                for message in messages {
                    message.build(&mut writer)?;
                }
                write_rbsp_trailing_bits(&mut writer)?;
            }
            NalPayload::Sps(sps) => {
                sps.build(&mut writer)?;
                write_rbsp_trailing_bits(&mut writer)?;
            }
            NalPayload::Pps(pps) => {
                pps.build(&mut writer, &self.parameter_sets)?;
                write_rbsp_trailing_bits(&mut writer)?;
            }
            NalPayload::Aud(aud) => {
                aud.build(&mut writer)?;
                write_rbsp_trailing_bits(&mut writer)?;
            }
            NalPayload::EndOfSequence | NalPayload::EndOfStream => {}
        }

        if writer.overrun() {
            return Err(Error::Overrun);
        }

        let len = writer.finish()?;
        rbsp.truncate(len);

        trace!(nal_unit_type = ?unit.header.nal_unit_type, rbsp_len = len, "wrote nal unit");
        Ok(rbsp)
    }
}

/// The opaque bytes a payload carries besides its syntax elements.
fn payload_len(payload: &NalPayload) -> usize {
    match payload {
        NalPayload::Slice(slice) => slice.data.as_ref().map_or(0, |data| data.data.len()),
        NalPayload::Sei(messages) => messages
            .iter()
            .map(|message| {
                let payload_type_len = message.payload_type.0 as usize / 0xFF + 1;
                let payload_size_len = message.payload.len() / 0xFF + 1;
                payload_type_len + payload_size_len + message.payload.len()
            })
            .sum(),
        NalPayload::Pps(pps) => pps.slice_groups.as_ref().map_or(0, SliceGroups::explicit_map_len),
        _ => 0,
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;
    use crate::{PrimaryPicType, SeiPayloadType, SliceGroupMap, SliceType, write_annexb};

    const SPS_NAL: [u8; 8] = [0x67, 0x42, 0xC0, 0x1E, 0xDA, 0x05, 0x07, 0xE4];
    const PPS_NAL: [u8; 4] = [0x68, 0xCE, 0x38, 0x80];
    // A 17 bit IDR I slice header, seven alignment bits and three bytes of slice data
    const IDR_NAL: [u8; 7] = [0x65, 0x88, 0x84, 0xB5, 0xAB, 0xCD, 0x80];

    #[test]
    fn test_annexb_round_trip() {
        crate::init_test_tracing!();

        let stream = write_annexb([&SPS_NAL[..], &PPS_NAL[..], &IDR_NAL[..]]);

        let mut h264 = H264Stream::new();
        let units = h264.read_annexb(&stream).unwrap();
        assert_eq!(units.len(), 3);
        assert_eq!(h264.parameter_sets().sps_count(), 1);
        assert_eq!(h264.parameter_sets().pps_count(), 1);

        let NalPayload::Sps(sps) = &units[0].payload else {
            panic!("expected an sps, got {:?}", units[0].payload);
        };
        assert_eq!((sps.width(), sps.height()), (320, 240));

        let NalPayload::Slice(slice) = &units[2].payload else {
            panic!("expected a slice, got {:?}", units[2].payload);
        };
        assert_eq!(slice.header.slice_type, SliceType::I);

        let written = units
            .iter()
            .map(|unit| h264.write_nal_unit_to_vec(unit).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(write_annexb(&written), stream);
    }

    #[test]
    fn test_slice_before_parameter_sets() {
        let mut h264 = H264Stream::new();
        assert!(matches!(h264.read_nal_unit(&IDR_NAL), Err(Error::MissingPps(0))));

        h264.read_nal_unit(&PPS_NAL).unwrap();
        assert!(matches!(h264.read_nal_unit(&IDR_NAL), Err(Error::MissingSps(0))));

        h264.read_nal_unit(&SPS_NAL).unwrap();
        h264.read_nal_unit(&IDR_NAL).unwrap();
    }

    #[test]
    fn test_header_errors() {
        let mut h264 = H264Stream::new();
        assert!(matches!(h264.read_nal_unit(&[0xE7, 0x42]), Err(Error::ForbiddenZeroBit)));
        assert!(matches!(
            h264.read_nal_unit(&[0x0C, 0xFF, 0x80]),
            Err(Error::UnsupportedNalUnitType(NALUnitType::FillerData))
        ));

        // SEI with a nonzero nal_ref_idc
        let sei = [0x26, 0x05, 0x01, 0x00, 0x80];
        assert!(matches!(h264.read_nal_unit(&sei), Err(Error::InvalidNalHeader(_))));

        let mut lenient = H264Stream::with_config(StreamConfig::builder().strict_nal_header(false).build());
        let unit = lenient.read_nal_unit(&sei).unwrap();
        assert_eq!(
            unit.payload,
            NalPayload::Sei(vec![SeiMessage::new(SeiPayloadType::USER_DATA_UNREGISTERED, vec![0x00])])
        );
    }

    #[test]
    fn test_emulation_prevention_in_sei() {
        let nal = [0x06, 0x05, 0x03, 0x00, 0x00, 0x03, 0x00, 0x80];

        let mut h264 = H264Stream::new();
        let unit = h264.read_nal_unit(&nal).unwrap();
        assert_eq!(
            unit.payload,
            NalPayload::Sei(vec![SeiMessage::new(SeiPayloadType::USER_DATA_UNREGISTERED, vec![0, 0, 0])])
        );

        assert_eq!(h264.write_nal_unit_to_vec(&unit).unwrap(), nal);
    }

    #[test]
    fn test_delimiters() {
        let mut h264 = H264Stream::new();

        let unit = h264.read_nal_unit(&[0x09, 0xF0]).unwrap();
        assert_eq!(
            unit.payload,
            NalPayload::Aud(AccessUnitDelimiter {
                primary_pic_type: PrimaryPicType::ISIPSPB,
            })
        );
        assert_eq!(h264.write_nal_unit_to_vec(&unit).unwrap(), [0x09, 0xF0]);

        let unit = h264.read_nal_unit(&[0x0A]).unwrap();
        assert_eq!(unit.payload, NalPayload::EndOfSequence);
        assert_eq!(h264.write_nal_unit_to_vec(&unit).unwrap(), [0x0A]);

        let unit = h264.read_nal_unit(&[0x0B]).unwrap();
        assert_eq!(unit.payload, NalPayload::EndOfStream);
    }

    #[test]
    fn test_truncated_sps() {
        let mut h264 = H264Stream::new();
        assert!(matches!(h264.read_nal_unit(&SPS_NAL[..3]), Err(Error::Overrun)));
        assert_eq!(h264.parameter_sets().sps_count(), 0);
    }

    #[test]
    fn test_output_buffer() {
        let mut h264 = H264Stream::new();
        let unit = h264.read_nal_unit(&SPS_NAL).unwrap();

        let mut small = [0u8; 4];
        assert!(matches!(
            h264.write_nal_unit(&unit, &mut small),
            Err(Error::BufferTooSmall { .. })
        ));

        let mut out = [0u8; 16];
        let len = h264.write_nal_unit(&unit, &mut out).unwrap();
        assert_eq!(&out[..len], SPS_NAL);
    }

    #[test]
    fn test_largest_explicit_slice_group_map() {
        let mut h264 = H264Stream::new();
        h264.read_nal_unit(&SPS_NAL).unwrap();
        let mut unit = h264.read_nal_unit(&PPS_NAL).unwrap();

        let NalPayload::Pps(pps) = &mut unit.payload else {
            panic!("expected a pps, got {:?}", unit.payload);
        };
        // 8 slice groups over the largest picture of any level, 3 bits per map unit
        pps.slice_groups = Some(SliceGroups {
            num_slice_groups_minus1: 7,
            map: SliceGroupMap::Explicit {
                slice_group_id: (0..139264).map(|i| (i % 8) as u8).collect(),
            },
        });

        let nal = h264.write_nal_unit_to_vec(&unit).unwrap();
        assert!(nal.len() > 139264 * 3 / 8);
        assert_eq!(h264.read_nal_unit(&nal).unwrap(), unit);
    }

    #[test]
    fn test_payload_mismatch() {
        let h264 = H264Stream::new();
        let unit = NalUnit {
            header: NalHeader::new(3, NALUnitType::Pps),
            payload: NalPayload::EndOfStream,
        };
        assert!(matches!(
            h264.write_nal_unit_to_vec(&unit),
            Err(Error::InvalidNalHeader(_))
        ));
    }

    #[test]
    fn test_strict_trailing_bits() {
        let aud = [0x09, 0x40];

        let mut lenient = H264Stream::new();
        lenient.read_nal_unit(&aud).unwrap();

        let mut strict = H264Stream::with_config(StreamConfig::builder().strict_trailing_bits(true).build());
        assert!(matches!(strict.read_nal_unit(&aud), Err(Error::InvalidData(_))));
    }
}
