//! Bit-granular cursors over byte slices.
//!
//! [`BitReader`] and [`BitWriter`] move through a borrowed buffer one bit at a
//! time, most significant bit first, and report when an operation tried to
//! cross the end of that buffer. Both implement [`std::io::Read`] /
//! [`std::io::Write`] so byte oriented helpers (such as `byteorder`) can be
//! used on them directly.
//!
//! ## License
//!
//! This project is licensed under the [MIT](./LICENSE.MIT) or [Apache-2.0](./LICENSE.Apache-2.0) license.
//! You can choose between one of them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(unsafe_code)]

mod bit_read;
mod bit_write;
mod range_check;

pub use bit_read::BitReader;
pub use bit_write::BitWriter;
