/// The `VideoFormat` is an enum for `video_format` as defined in
/// ISO/IEC-14496-10-2022 - E.2.1 Table E-2.
///
/// Defaults to 5 (unspecified).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoFormat {
    /// The video type is component.
    Component = 0,

    /// The video type is PAL.
    PAL = 1,

    /// The video type is NTSC.
    NTSC = 2,

    /// The video type is SECAM.
    SECAM = 3,

    /// The video type is MAC.
    MAC = 4,

    /// The video type is Unspecified.
    #[default]
    Unspecified = 5,

    /// The video type is Reserved.
    Reserved1 = 6,

    /// The video type is Reserved.
    Reserved2 = 7,
}

impl From<u8> for VideoFormat {
    /// Converts the low 3 bits of a u8 value to a `VideoFormat`.
    fn from(value: u8) -> Self {
        match value & 0b111 {
            0 => VideoFormat::Component,
            1 => VideoFormat::PAL,
            2 => VideoFormat::NTSC,
            3 => VideoFormat::SECAM,
            4 => VideoFormat::MAC,
            5 => VideoFormat::Unspecified,
            6 => VideoFormat::Reserved1,
            _ => VideoFormat::Reserved2,
        }
    }
}
