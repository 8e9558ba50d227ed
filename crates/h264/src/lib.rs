//! A pure Rust parser and builder for the H.264 Annex B syntax layer.
//!
//! This crate reads and writes the headers of an H.264 elementary stream
//! without decoding any pictures: NAL units, sequence and picture parameter
//! sets (including VUI and HRD parameters), slice headers, access unit
//! delimiters and the SEI message envelope. Slice data is carried through
//! as opaque bytes.
//!
//! ## Notable features
//!
//! - Start code scanning and emulation prevention in both directions.
//! - A parameter set cache that slice headers and PPS extensions resolve against.
//! - Every parsed structure builds back to the same bits.
//! - [`SpsFixup`] rewrites an SPS for low latency decoding, [`SpsRewriter`] does so across a stream.
//!
//! ## Examples
//!
//! ### Parsing
//!
//! ```rust
//! use h264_bitstream::{H264Stream, NalPayload};
//!
//! // SPS, PPS and an IDR slice of a 320x240 Baseline stream
//! let stream = [
//!     0x00, 0x00, 0x00, 0x01, 0x67, 0x42, 0xC0, 0x1E, 0xDA, 0x05, 0x07, 0xE4,
//!     0x00, 0x00, 0x00, 0x01, 0x68, 0xCE, 0x38, 0x80,
//!     0x00, 0x00, 0x00, 0x01, 0x65, 0x88, 0x84, 0xB5, 0xAB, 0xCD, 0x80,
//! ];
//!
//! let mut h264 = H264Stream::new();
//! let units = h264.read_annexb(&stream).unwrap();
//!
//! let NalPayload::Sps(sps) = &units[0].payload else { unreachable!() };
//! assert_eq!((sps.width(), sps.height()), (320, 240));
//!
//! let NalPayload::Slice(slice) = &units[2].payload else { unreachable!() };
//! assert!(slice.header.slice_type.is_intra());
//! ```
//!
//! ### Building
//!
//! ```rust
//! use h264_bitstream::{AccessUnitDelimiter, H264Stream, NALUnitType, NalHeader, NalPayload, NalUnit, PrimaryPicType};
//!
//! let unit = NalUnit {
//!     header: NalHeader::new(0, NALUnitType::AccessUnitDelimiter),
//!     payload: NalPayload::Aud(AccessUnitDelimiter {
//!         primary_pic_type: PrimaryPicType::ISIPSPB,
//!     }),
//! };
//!
//! let nal = H264Stream::new().write_nal_unit_to_vec(&unit).unwrap();
//! assert_eq!(nal, [0x09, 0xF0]);
//! ```
//!
//! ## License
//!
//! This project is licensed under the [MIT](./LICENSE.MIT) or [Apache-2.0](./LICENSE.Apache-2.0) license.
//! You can choose between one of them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(unsafe_code)]

mod annexb;
mod aud;
mod config;
mod emulation_prevention;
mod enums;
mod error;
mod fixup;
mod nal_header;
mod parameter_sets;
mod pps;
pub(crate) mod rbsp;
mod scaling_list;
mod sei;
mod slice;
mod sps;
mod stream;

pub use enums::*;
pub use pps::*;
pub use slice::*;
pub use sps::*;

pub use self::annexb::{AnnexBReader, NalSpan, START_CODE, find_nal_unit, write_annexb};
pub use self::aud::AccessUnitDelimiter;
pub use self::config::{StreamConfig, StreamConfigBuilder};
pub use self::emulation_prevention::{max_nal_size, nal_to_rbsp, nal_to_rbsp_vec, rbsp_to_nal, rbsp_to_nal_vec};
pub use self::error::{Error, Result};
pub use self::fixup::{BitstreamRestrictionMode, SpsFixup, SpsFixupBuilder, SpsRewriter, level_for_resolution};
pub use self::nal_header::{NalHeader, peek_nal_unit};
pub use self::parameter_sets::ParameterSets;
pub use self::rbsp::more_rbsp_data;
pub use self::scaling_list::{ScalingList, ScalingMatrix};
pub use self::sei::SeiMessage;
pub use self::stream::{H264Stream, NalPayload, NalUnit};

/// Installs a `tracing` subscriber that prints through the test harness.
#[cfg(test)]
#[macro_export]
macro_rules! init_test_tracing {
    () => {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .try_init();
    };
}
