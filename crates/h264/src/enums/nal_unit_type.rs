/// NAL (Network Abstraction Layer) unit types as defined by ISO/IEC 14496-10:2022 (Table 7-1).
///
/// The conversion from the 5-bit `nal_unit_type` field is lossless: reserved
/// and unspecified values keep their raw number.
///
/// ## Decoder Behavior:
/// - Decoders using **Annex A** ignore unit types **14, 15, and 20**.
/// - **Types 0 and 24-31** are application-specific and do not affect decoding.
/// - **Reserved values** should be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NALUnitType {
    /// Unspecified (0 or 24-31), application-defined use
    Unspecified(u8),

    /// Coded slice of a non-IDR picture
    NonIdrSlice,

    /// Coded slice data partition A
    SliceDataPartitionA,

    /// Coded slice data partition B
    SliceDataPartitionB,

    /// Coded slice data partition C
    SliceDataPartitionC,

    /// Coded slice of an IDR picture
    IdrSlice,

    /// Supplemental enhancement information
    Sei,

    /// Sequence parameter set
    Sps,

    /// Picture parameter set
    Pps,

    /// Access unit delimiter
    AccessUnitDelimiter,

    /// End of sequence
    EndOfSequence,

    /// End of stream
    EndOfStream,

    /// Filler data
    FillerData,

    /// Sequence parameter set extension
    SpsExtension,

    /// Prefix NAL unit
    PrefixNalUnit,

    /// Subset sequence parameter set
    SubsetSps,

    /// Coded slice of an auxiliary coded picture without partitioning
    AuxiliarySlice,

    /// Coded slice extension
    SliceExtension,

    /// Reserved (16-18, 21-23)
    Reserved(u8),
}

impl NALUnitType {
    /// Returns true for the coded slice types parsed by this crate
    /// (non-IDR, IDR and auxiliary slices).
    pub const fn is_slice(&self) -> bool {
        matches!(self, Self::NonIdrSlice | Self::IdrSlice | Self::AuxiliarySlice)
    }

    /// `IdrPicFlag`, 7.4.1
    pub const fn is_idr(&self) -> bool {
        matches!(self, Self::IdrSlice)
    }

    /// Returns true for the types whose `nal_ref_idc` must be zero (7.4.1).
    pub const fn requires_zero_ref_idc(&self) -> bool {
        matches!(
            self,
            Self::Sei | Self::AccessUnitDelimiter | Self::EndOfSequence | Self::EndOfStream | Self::FillerData
        )
    }
}

impl From<u8> for NALUnitType {
    /// Converts the low 5 bits of a `u8` value to a `NALUnitType`.
    fn from(value: u8) -> Self {
        match value & 0x1F {
            1 => NALUnitType::NonIdrSlice,
            2 => NALUnitType::SliceDataPartitionA,
            3 => NALUnitType::SliceDataPartitionB,
            4 => NALUnitType::SliceDataPartitionC,
            5 => NALUnitType::IdrSlice,
            6 => NALUnitType::Sei,
            7 => NALUnitType::Sps,
            8 => NALUnitType::Pps,
            9 => NALUnitType::AccessUnitDelimiter,
            10 => NALUnitType::EndOfSequence,
            11 => NALUnitType::EndOfStream,
            12 => NALUnitType::FillerData,
            13 => NALUnitType::SpsExtension,
            14 => NALUnitType::PrefixNalUnit,
            15 => NALUnitType::SubsetSps,
            19 => NALUnitType::AuxiliarySlice,
            20 => NALUnitType::SliceExtension,
            v @ (16..=18 | 21..=23) => NALUnitType::Reserved(v),
            v => NALUnitType::Unspecified(v),
        }
    }
}

impl From<NALUnitType> for u8 {
    fn from(value: NALUnitType) -> Self {
        match value {
            NALUnitType::Unspecified(v) | NALUnitType::Reserved(v) => v,
            NALUnitType::NonIdrSlice => 1,
            NALUnitType::SliceDataPartitionA => 2,
            NALUnitType::SliceDataPartitionB => 3,
            NALUnitType::SliceDataPartitionC => 4,
            NALUnitType::IdrSlice => 5,
            NALUnitType::Sei => 6,
            NALUnitType::Sps => 7,
            NALUnitType::Pps => 8,
            NALUnitType::AccessUnitDelimiter => 9,
            NALUnitType::EndOfSequence => 10,
            NALUnitType::EndOfStream => 11,
            NALUnitType::FillerData => 12,
            NALUnitType::SpsExtension => 13,
            NALUnitType::PrefixNalUnit => 14,
            NALUnitType::SubsetSps => 15,
            NALUnitType::AuxiliarySlice => 19,
            NALUnitType::SliceExtension => 20,
        }
    }
}
