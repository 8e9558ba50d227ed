//! Rewriting an SPS so that hardware decoders keep as few frames buffered as possible.

use tracing::debug;

use crate::{
    BitstreamRestriction, Error, H264Stream, NALUnitType, NalPayload, NalUnit, Result, Sps, SpsExtended, VuiParameters,
    peek_nal_unit,
};

/// `profile_idc` of the Baseline profile.
const PROFILE_BASELINE: u8 = 66;
/// `profile_idc` of the High profile.
const PROFILE_HIGH: u8 = 100;

/// What to do with the `bitstream_restriction` of the VUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitstreamRestrictionMode {
    /// Leave it as it is.
    #[default]
    Keep,
    /// Drop it, so decoders fall back to the inferred values.
    Remove,
    /// Make sure it is present and limits the decoded picture buffer to one frame.
    ///
    /// A missing restriction is added with unbounded motion vectors and no
    /// reordering. `max_dec_frame_buffering` is always set to 1, and the
    /// byte and bit denominators to their inferred values.
    LowLatency,
}

/// A set of changes applied to a parsed [`Sps`] before it is written back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpsFixup {
    /// Replaces `level_idc`.
    pub level_idc: Option<u8>,

    /// Replaces `max_num_ref_frames`.
    pub max_num_ref_frames: Option<u8>,

    /// Replaces `profile_idc`. Switching to a profile without the high profile
    /// fields drops them.
    pub profile_idc: Option<u8>,

    /// Drops the video signal type (format, range, colour description) from the VUI.
    pub strip_video_signal_type: bool,

    /// Drops the chroma sample location from the VUI.
    pub strip_chroma_sample_loc: bool,

    /// What to do with the bitstream restriction.
    pub bitstream_restriction: BitstreamRestrictionMode,
}

/// The lowest level that still lets a decoder buffer several frames at 60 fps
/// for the known streaming resolutions.
pub fn level_for_resolution(width: u32, height: u32) -> Option<u8> {
    match (width, height) {
        // up to 5 buffered frames at 1280x720x60
        (1280, 720) => Some(32),
        // up to 4 buffered frames at 1920x1080x60
        (1920, 1080) => Some(42),
        _ => None,
    }
}

impl SpsFixup {
    /// Starts a builder with no changes.
    pub fn builder() -> SpsFixupBuilder {
        SpsFixupBuilder::default()
    }

    /// The changes a low latency streaming client applies: a level matching the
    /// resolution, a single reference frame, no video signal or chroma location
    /// info and a one frame decoded picture buffer.
    pub fn low_latency(width: u32, height: u32) -> Self {
        Self::builder()
            .resolution(width, height)
            .max_num_ref_frames(1)
            .strip_video_signal_type(true)
            .strip_chroma_sample_loc(true)
            .bitstream_restriction(BitstreamRestrictionMode::LowLatency)
            .build()
    }

    /// Applies the changes to `sps`.
    pub fn apply(&self, sps: &mut Sps) {
        if let Some(level_idc) = self.level_idc {
            sps.level_idc = level_idc;
        }

        if let Some(max_num_ref_frames) = self.max_num_ref_frames {
            sps.max_num_ref_frames = max_num_ref_frames;
        }

        if let Some(profile_idc) = self.profile_idc {
            sps.profile_idc = profile_idc;
            if !Sps::is_high_profile(profile_idc) {
                sps.ext = None;
            }
        }

        if let Some(vui) = sps.vui.as_mut() {
            if self.strip_video_signal_type {
                vui.video_signal_type = None;
            }
            if self.strip_chroma_sample_loc {
                vui.chroma_sample_loc = None;
            }
        }

        match self.bitstream_restriction {
            BitstreamRestrictionMode::Keep => {}
            BitstreamRestrictionMode::Remove => {
                if let Some(vui) = sps.vui.as_mut() {
                    vui.bitstream_restriction = None;
                }
            }
            BitstreamRestrictionMode::LowLatency => {
                let vui = sps.vui.get_or_insert_with(VuiParameters::default);
                let restriction = vui.bitstream_restriction.get_or_insert(BitstreamRestriction {
                    motion_vectors_over_pic_boundaries_flag: true,
                    log2_max_mv_length_horizontal: 16,
                    log2_max_mv_length_vertical: 16,
                    max_num_reorder_frames: 0,
                    ..Default::default()
                });

                restriction.max_dec_frame_buffering = 1;
                restriction.max_bytes_per_pic_denom = 2;
                restriction.max_bits_per_mb_denom = 1;
            }
        }
    }
}

/// Builder for [`SpsFixup`].
#[derive(Debug, Clone, Default)]
pub struct SpsFixupBuilder {
    fixup: SpsFixup,
}

impl SpsFixupBuilder {
    /// Sets [`SpsFixup::level_idc`].
    pub fn level_idc(mut self, level_idc: u8) -> Self {
        self.fixup.level_idc = Some(level_idc);
        self
    }

    /// Sets the level from [`level_for_resolution`], unknown resolutions keep their level.
    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        if let Some(level_idc) = level_for_resolution(width, height) {
            self.fixup.level_idc = Some(level_idc);
        }
        self
    }

    /// Sets [`SpsFixup::max_num_ref_frames`].
    pub fn max_num_ref_frames(mut self, max_num_ref_frames: u8) -> Self {
        self.fixup.max_num_ref_frames = Some(max_num_ref_frames);
        self
    }

    /// Sets [`SpsFixup::profile_idc`].
    pub fn profile_idc(mut self, profile_idc: u8) -> Self {
        self.fixup.profile_idc = Some(profile_idc);
        self
    }

    /// Sets [`SpsFixup::strip_video_signal_type`].
    pub fn strip_video_signal_type(mut self, strip: bool) -> Self {
        self.fixup.strip_video_signal_type = strip;
        self
    }

    /// Sets [`SpsFixup::strip_chroma_sample_loc`].
    pub fn strip_chroma_sample_loc(mut self, strip: bool) -> Self {
        self.fixup.strip_chroma_sample_loc = strip;
        self
    }

    /// Sets [`SpsFixup::bitstream_restriction`].
    pub fn bitstream_restriction(mut self, mode: BitstreamRestrictionMode) -> Self {
        self.fixup.bitstream_restriction = mode;
        self
    }

    /// Finishes the fixup.
    pub fn build(self) -> SpsFixup {
        self.fixup
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Replay {
    #[default]
    Waiting,
    Armed,
    Done,
}

/// Runs every NAL unit of a stream through an [`SpsFixup`].
///
/// SPS units are rewritten, everything else is passed through as is.
///
/// With the baseline replay enabled the first SPS goes out as Baseline. Once
/// a PPS has followed it, the next unit is preceded by that same SPS again,
/// this time as High. Decoders that pick their buffers from the first SPS
/// then stay on the cheaper path while still decoding the real stream.
#[derive(Debug, Default)]
pub struct SpsRewriter {
    stream: H264Stream,
    fixup: SpsFixup,
    baseline_replay: bool,
    replay: Replay,
    high_sps: Option<NalUnit>,
}

impl SpsRewriter {
    /// A rewriter applying `fixup`, without the baseline replay.
    pub fn new(fixup: SpsFixup) -> Self {
        Self {
            fixup,
            ..Default::default()
        }
    }

    /// Turns the baseline replay on or off.
    pub fn with_baseline_replay(mut self, enabled: bool) -> Self {
        self.baseline_replay = enabled;
        self
    }

    /// The session holding the rewritten parameter sets.
    pub fn stream(&self) -> &H264Stream {
        &self.stream
    }

    /// Processes one start code stripped NAL unit and returns the units to
    /// send in its place, in order.
    pub fn process(&mut self, nal: &[u8]) -> Result<Vec<Vec<u8>>> {
        let mut out = Vec::with_capacity(2);

        if self.replay == Replay::Armed {
            self.replay = Replay::Done;
            if let Some(unit) = self.high_sps.take() {
                if let NalPayload::Sps(sps) = &unit.payload {
                    debug!(sps_id = sps.seq_parameter_set_id, "replaying sps as high profile");
                    self.stream.parameter_sets_mut().insert_sps(sps.clone())?;
                }
                out.push(self.stream.write_nal_unit_to_vec(&unit)?);
            }
        }

        match peek_nal_unit(nal)?.nal_unit_type {
            NALUnitType::Sps => out.push(self.rewrite_sps(nal)?),
            NALUnitType::Pps => {
                if self.replay == Replay::Waiting && self.high_sps.is_some() {
                    self.replay = Replay::Armed;
                }
                out.push(nal.to_vec());
            }
            _ => out.push(nal.to_vec()),
        }

        Ok(out)
    }

    fn rewrite_sps(&mut self, nal: &[u8]) -> Result<Vec<u8>> {
        if !self.baseline_replay || self.replay != Replay::Waiting {
            return self.stream.rewrite_sps(nal, &self.fixup);
        }

        let unit = self.stream.read_nal_unit(nal)?;
        let NalPayload::Sps(mut sps) = unit.payload else {
            return Err(Error::InvalidData(format!(
                "expected a sequence parameter set, found {:?}",
                unit.header.nal_unit_type
            )));
        };
        self.fixup.apply(&mut sps);

        let mut high = sps.clone();
        high.profile_idc = PROFILE_HIGH;
        high.ext.get_or_insert_with(SpsExtended::default);
        self.high_sps = Some(NalUnit {
            header: unit.header,
            payload: NalPayload::Sps(high),
        });

        sps.profile_idc = PROFILE_BASELINE;
        sps.ext = None;
        debug!(
            sps_id = sps.seq_parameter_set_id,
            level_idc = sps.level_idc,
            "sending sps as baseline profile"
        );

        self.stream.parameter_sets_mut().insert_sps(sps.clone())?;
        self.stream.write_nal_unit_to_vec(&NalUnit {
            header: unit.header,
            payload: NalPayload::Sps(sps),
        })
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;
    use crate::{ChromaSampleLoc, NalHeader, TimingInfo, VideoFormat, VideoSignalType, write_annexb};

    const PPS_NAL: [u8; 4] = [0x68, 0xCE, 0x38, 0x80];
    const IDR_NAL: [u8; 7] = [0x65, 0x88, 0x84, 0xB5, 0xAB, 0xCD, 0x80];

    fn parse_sps(nal: &[u8]) -> Sps {
        match H264Stream::new().read_nal_unit(nal).unwrap().payload {
            NalPayload::Sps(sps) => sps,
            payload => panic!("expected an sps, got {payload:?}"),
        }
    }

    fn vui_sps() -> Sps {
        Sps {
            profile_idc: 100,
            level_idc: 50,
            ext: Some(SpsExtended::default()),
            max_num_ref_frames: 4,
            pic_width_in_mbs_minus1: 119,
            pic_height_in_map_units_minus1: 67,
            vui: Some(VuiParameters {
                video_signal_type: Some(VideoSignalType {
                    video_format: VideoFormat::Unspecified,
                    video_full_range_flag: false,
                    color_description: None,
                }),
                chroma_sample_loc: Some(ChromaSampleLoc::default()),
                timing_info: Some(TimingInfo {
                    num_units_in_tick: 1,
                    time_scale: 120,
                    fixed_frame_rate_flag: true,
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn sps_nal(sps: Sps) -> Vec<u8> {
        H264Stream::new()
            .write_nal_unit_to_vec(&NalUnit {
                header: NalHeader::new(3, NALUnitType::Sps),
                payload: NalPayload::Sps(sps),
            })
            .unwrap()
    }

    #[test]
    fn test_level_for_resolution() {
        assert_eq!(level_for_resolution(1280, 720), Some(32));
        assert_eq!(level_for_resolution(1920, 1080), Some(42));
        assert_eq!(level_for_resolution(3840, 2160), None);
    }

    #[test]
    fn test_inject_bitstream_restriction() {
        crate::init_test_tracing!();

        let mut h264 = H264Stream::new();
        let rewritten = h264
            .rewrite_sps(&sps_nal(vui_sps()), &SpsFixup::low_latency(1920, 1080))
            .unwrap();

        let stream = write_annexb([rewritten]);
        let units = H264Stream::new().read_annexb(&stream).unwrap();
        let [NalUnit {
            payload: NalPayload::Sps(sps),
            ..
        }] = units.as_slice()
        else {
            panic!("expected a single sps, got {units:?}");
        };

        assert_eq!(sps.level_idc, 42);
        assert_eq!(sps.max_num_ref_frames, 1);
        assert_eq!((sps.width(), sps.height()), (1920, 1088));
        assert_eq!(sps.frame_rate(), Some(60.0));

        let vui = sps.vui.as_ref().unwrap();
        assert_eq!(vui.video_signal_type, None);
        assert_eq!(vui.chroma_sample_loc, None);
        insta::assert_debug_snapshot!(vui.bitstream_restriction, @r"
        Some(
            BitstreamRestriction {
                motion_vectors_over_pic_boundaries_flag: true,
                max_bytes_per_pic_denom: 2,
                max_bits_per_mb_denom: 1,
                log2_max_mv_length_horizontal: 16,
                log2_max_mv_length_vertical: 16,
                max_num_reorder_frames: 0,
                max_dec_frame_buffering: 1,
            },
        )
        ");

        // the cache holds the rewritten set
        assert_eq!(h264.parameter_sets().sps(0), Some(sps));
    }

    #[test]
    fn test_existing_restriction() {
        let mut sps = vui_sps();
        if let Some(vui) = sps.vui.as_mut() {
            vui.bitstream_restriction = Some(BitstreamRestriction {
                log2_max_mv_length_horizontal: 11,
                log2_max_mv_length_vertical: 11,
                max_num_reorder_frames: 0,
                max_dec_frame_buffering: 4,
                ..Default::default()
            });
        }

        let mut low_latency = sps.clone();
        SpsFixup::low_latency(1280, 720).apply(&mut low_latency);
        assert_eq!(low_latency.level_idc, 32);
        let restriction = low_latency.vui.as_ref().and_then(|vui| vui.bitstream_restriction).unwrap();
        assert_eq!(restriction.log2_max_mv_length_horizontal, 11);
        assert_eq!(restriction.max_dec_frame_buffering, 1);

        let mut removed = sps.clone();
        SpsFixup::builder()
            .bitstream_restriction(BitstreamRestrictionMode::Remove)
            .build()
            .apply(&mut removed);
        assert_eq!(removed.vui.as_ref().and_then(|vui| vui.bitstream_restriction), None);
        assert_eq!(removed.level_idc, 50);

        let mut kept = sps.clone();
        SpsFixup::default().apply(&mut kept);
        assert_eq!(kept, sps);
    }

    #[test]
    fn test_force_baseline_profile() {
        let mut sps = vui_sps();
        SpsFixup::builder().profile_idc(66).build().apply(&mut sps);
        assert_eq!(sps.profile_idc, 66);
        assert_eq!(sps.ext, None);

        let mut h264 = H264Stream::new();
        let unit = h264.read_nal_unit(&sps_nal(sps.clone())).unwrap();
        assert_eq!(unit.payload, NalPayload::Sps(sps));
    }

    #[test]
    fn test_rewrite_requires_sps() {
        let mut h264 = H264Stream::new();
        let err = h264.rewrite_sps(&[0x09, 0xF0], &SpsFixup::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_baseline_replay() {
        crate::init_test_tracing!();

        let mut rewriter = SpsRewriter::new(SpsFixup::low_latency(1920, 1080)).with_baseline_replay(true);

        let out = rewriter.process(&sps_nal(vui_sps())).unwrap();
        assert_eq!(out.len(), 1);
        let baseline = parse_sps(&out[0]);
        assert_eq!((baseline.profile_idc, baseline.level_idc), (66, 42));
        assert_eq!(baseline.ext, None);
        assert_eq!(baseline.max_num_ref_frames, 1);

        assert_eq!(rewriter.process(&PPS_NAL).unwrap(), vec![PPS_NAL.to_vec()]);

        // the unit after the pps brings the same sps as high profile along
        let out = rewriter.process(&IDR_NAL).unwrap();
        assert_eq!(out.len(), 2);
        let high = parse_sps(&out[0]);
        assert_eq!((high.profile_idc, high.level_idc), (100, 42));
        assert_eq!(high.ext, Some(SpsExtended::default()));
        assert_eq!(high.vui, baseline.vui);
        assert_eq!(out[1], IDR_NAL);
        assert_eq!(rewriter.stream().parameter_sets().sps(0), Some(&high));

        // replayed once only
        assert_eq!(rewriter.process(&IDR_NAL).unwrap(), vec![IDR_NAL.to_vec()]);
        assert_eq!(rewriter.process(&PPS_NAL).unwrap(), vec![PPS_NAL.to_vec()]);
        assert_eq!(rewriter.process(&IDR_NAL).unwrap(), vec![IDR_NAL.to_vec()]);

        let out = rewriter.process(&sps_nal(vui_sps())).unwrap();
        assert_eq!(parse_sps(&out[0]).profile_idc, 100);
    }

    #[test]
    fn test_without_baseline_replay() {
        let mut rewriter = SpsRewriter::new(SpsFixup::low_latency(1280, 720));

        let out = rewriter.process(&sps_nal(vui_sps())).unwrap();
        let sps = parse_sps(&out[0]);
        assert_eq!((sps.profile_idc, sps.level_idc), (100, 32));

        assert_eq!(rewriter.process(&PPS_NAL).unwrap(), vec![PPS_NAL.to_vec()]);
        assert_eq!(rewriter.process(&IDR_NAL).unwrap(), vec![IDR_NAL.to_vec()]);
    }

    #[test]
    fn test_pps_without_sps_does_not_arm() {
        let mut rewriter = SpsRewriter::new(SpsFixup::default()).with_baseline_replay(true);
        assert_eq!(rewriter.process(&PPS_NAL).unwrap(), vec![PPS_NAL.to_vec()]);
        assert_eq!(rewriter.process(&IDR_NAL).unwrap(), vec![IDR_NAL.to_vec()]);

        // the first sps still goes out as baseline
        let out = rewriter.process(&sps_nal(vui_sps())).unwrap();
        assert_eq!(parse_sps(&out[0]).profile_idc, 66);
    }
}
