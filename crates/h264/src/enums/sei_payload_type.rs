/// The `payloadType` of an SEI message, ISO/IEC-14496-10-2022 - D.1.
///
/// Unknown types are kept as their raw number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct SeiPayloadType(pub u32);

impl SeiPayloadType {
    /// buffering_period
    pub const BUFFERING_PERIOD: Self = Self(0);
    /// pic_timing
    pub const PIC_TIMING: Self = Self(1);
    /// pan_scan_rect
    pub const PAN_SCAN_RECT: Self = Self(2);
    /// filler_payload
    pub const FILLER_PAYLOAD: Self = Self(3);
    /// user_data_registered_itu_t_t35
    pub const USER_DATA_REGISTERED_ITU_T_T35: Self = Self(4);
    /// user_data_unregistered
    pub const USER_DATA_UNREGISTERED: Self = Self(5);
    /// recovery_point
    pub const RECOVERY_POINT: Self = Self(6);
    /// dec_ref_pic_marking_repetition
    pub const DEC_REF_PIC_MARKING_REPETITION: Self = Self(7);
    /// spare_pic
    pub const SPARE_PIC: Self = Self(8);
    /// scene_info
    pub const SCENE_INFO: Self = Self(9);
    /// sub_seq_info
    pub const SUB_SEQ_INFO: Self = Self(10);
    /// sub_seq_layer_characteristics
    pub const SUB_SEQ_LAYER_CHARACTERISTICS: Self = Self(11);
    /// sub_seq_characteristics
    pub const SUB_SEQ_CHARACTERISTICS: Self = Self(12);
    /// full_frame_freeze
    pub const FULL_FRAME_FREEZE: Self = Self(13);
    /// full_frame_freeze_release
    pub const FULL_FRAME_FREEZE_RELEASE: Self = Self(14);
    /// full_frame_snapshot
    pub const FULL_FRAME_SNAPSHOT: Self = Self(15);
    /// progressive_refinement_segment_start
    pub const PROGRESSIVE_REFINEMENT_SEGMENT_START: Self = Self(16);
    /// progressive_refinement_segment_end
    pub const PROGRESSIVE_REFINEMENT_SEGMENT_END: Self = Self(17);
    /// motion_constrained_slice_group_set
    pub const MOTION_CONSTRAINED_SLICE_GROUP_SET: Self = Self(18);
    /// film_grain_characteristics
    pub const FILM_GRAIN_CHARACTERISTICS: Self = Self(19);
    /// deblocking_filter_display_preference
    pub const DEBLOCKING_FILTER_DISPLAY_PREFERENCE: Self = Self(20);
    /// stereo_video_info
    pub const STEREO_VIDEO_INFO: Self = Self(21);
}

impl From<u32> for SeiPayloadType {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
