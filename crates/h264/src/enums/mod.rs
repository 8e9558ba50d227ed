mod aspect_ratio_idc;
mod nal_unit_type;
mod primary_pic_type;
mod sei_payload_type;
mod slice_type;
mod video_format;

pub use aspect_ratio_idc::AspectRatioIdc;
pub use nal_unit_type::NALUnitType;
pub use primary_pic_type::PrimaryPicType;
pub use sei_payload_type::SeiPayloadType;
pub use slice_type::SliceType;
pub use video_format::VideoFormat;
