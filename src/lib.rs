#![warn(rust_2018_idioms)]

//! # WOFF and WOFF2 web font container codec
//!
//! Woffle converts fonts between the uncompressed SFNT container used by
//! TrueType and OpenType and the two web font wire formats, in both directions:
//!
//! * **Decode** WOFF ([`woff::decode`]) and WOFF2 ([`woff2::decode`]) files into
//!   plain SFNT fonts, undoing the WOFF2 glyf/loca and hmtx table transforms and
//!   recomputing `head.checkSumAdjustment` over the rebuilt file. Multi-font
//!   WOFF2 inputs come back as 'ttcf' collections with shared tables intact.
//! * **Encode** TrueType and CFF flavored SFNT fonts as WOFF
//!   ([`woff::encode`]) and WOFF2 ([`woff2::encode`]), applying the glyph and
//!   metrics transforms and compressing with zlib or Brotli respectively.
//!
//! Each entry point is a pure bytes-in, bytes-out transform; no state survives a
//! call and malformed input fails the whole invocation rather than producing a
//! partial font.
//!
//! ## Example
//!
//! ```no_run
//! use woffle::woff2;
//!
//! # fn main() -> Result<(), woffle::error::ReadWriteError> {
//! let data = std::fs::read("fonts/example.woff2").expect("unable to read font");
//! let sfnt = woff2::decode(&data)?;
//! let packed = woff2::encode(&sfnt, &woff2::Woff2EncodeOptions::default())?;
//! # let _ = packed;
//! # Ok(())
//! # }
//! ```
//!
//! ## Cargo Features
//!
//! | Feature       | Description                    | Default Enabled | Extra Dependencies |
//! |---------------|--------------------------------|:---------------:|--------------------|
//! | `flate2_zlib` | Use the zlib backend to flate2 |        ✅       | `zlib`             |
//! | `flate2_rust` | Use the Rust backend to flate2 |        ❌       | `miniz_oxide`      |
//!
//! **Note:** In our testing the `zlib` `flate2` backend was faster but you may
//! prefer the Rust backend for a pure Rust solution when compiling to WASM or
//! similar.

pub mod assemble;
pub mod binary;
pub mod checksum;
pub mod error;
pub mod size;
pub mod tables;
pub mod tag;
pub mod woff;
pub mod woff2;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(not(any(feature = "flate2_zlib", feature = "flate2_rust")))]
compile_error!("woffle is being built without one of `flate2_zlib` or `flate2_rust` Cargo features enabled. One of these must be enabled");
