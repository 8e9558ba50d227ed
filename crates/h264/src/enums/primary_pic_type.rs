/// `primary_pic_type` of an access unit delimiter, ISO/IEC-14496-10-2022 - 7.4.2.4 Table 7-5.
///
/// Each value lists the slice types that may appear in the primary coded picture.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimaryPicType {
    /// I
    #[default]
    I = 0,
    /// I, P
    IP = 1,
    /// I, P, B
    IPB = 2,
    /// SI
    SI = 3,
    /// SI, SP
    SISP = 4,
    /// I, SI
    ISI = 5,
    /// I, SI, P, SP
    ISIPSP = 6,
    /// I, SI, P, SP, B
    ISIPSPB = 7,
}

impl From<u8> for PrimaryPicType {
    /// Converts the low 3 bits of a u8 value.
    fn from(value: u8) -> Self {
        match value & 0b111 {
            0 => PrimaryPicType::I,
            1 => PrimaryPicType::IP,
            2 => PrimaryPicType::IPB,
            3 => PrimaryPicType::SI,
            4 => PrimaryPicType::SISP,
            5 => PrimaryPicType::ISI,
            6 => PrimaryPicType::ISIPSP,
            _ => PrimaryPicType::ISIPSPB,
        }
    }
}
