//! # qrposter
//!
//! A Rust library for rendering QR code images, either plain with a logo in the
//! middle or composited onto a poster template together with an avatar and a
//! name label.
//!
//! Symbol encoding is done by the `qrcode` crate and decoding by `rqrr`;
//! `qrposter` turns the module grid into pixels, loads the decorative assets
//! (bundled, local or remote), lays them out and encodes the result.
//!
//! ## Features
//!
//! - QR codes of any pixel size with high error correction and a 1 module margin.
//! - Optional logo drawn over the centre at a fixed fraction of the code.
//! - Poster layout: background template, QR code, avatar and name at configurable positions.
//! - Avatars fetched over HTTP with short timeouts, falling back to a bundled placeholder.
//! - JPEG or PNG output as an in-memory byte buffer.
//! - Reading QR codes back from image files.
//!
//! ## Example
//!
//! Generate a QR code and read it back:
//!
//! ```rust
//! use qrposter::helper::{create_qrcode, decode_qrcode_bytes};
//!
//! let jpeg = create_qrcode("http://example.com", 400, None).unwrap();
//! assert_eq!(decode_qrcode_bytes(&jpeg).unwrap(), "http://example.com");
//! ```
//!
//! Generate a poster with the bundled template and placeholder avatar:
//!
//! ```rust
//! use qrposter::config::LayoutConfig;
//! use qrposter::helper::create_qrcode_with_background;
//!
//! let config = LayoutConfig::new("http://example.com").with_realname("Ada");
//! let jpeg = create_qrcode_with_background(&config).unwrap();
//! assert!(!jpeg.is_empty());
//! ```
//!
//! ## Modules
//!
//! - [`helper`]: Public entry points and [`helper::QrcodeGenerator`].
//! - [`matrix`]: Encoding text into a module grid.
//! - [`raster`]: Turning a module grid into pixels.
//! - [`assets`]: Loading the background, logo and avatar images.
//! - [`compose`]: Drawing images and text onto a canvas.
//! - [`bitmap_font`]: Fallback glyphs for characters the label font lacks.
//! - [`output`]: Encoding the final image.
//! - [`decode`]: Reading QR codes from images.

pub mod assets;
pub mod bitmap_font;
pub mod compose;
pub mod config;
pub mod decode;
pub mod error;
pub mod fetch;
pub mod helper;
pub mod matrix;
pub mod output;
pub mod raster;

pub use error::{QrError, QrResult};
