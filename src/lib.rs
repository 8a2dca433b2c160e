//! emfplay - an Enhanced Metafile (EMF) interpreter and rasterizer
//!
//! This library parses the binary record stream of a Windows Enhanced
//! Metafile, plays it against an emulated GDI device context and renders
//! the drawing into an RGBA raster image.
//!
//! # Features
//!
//! - **Record decoding**: strict little-endian parsing of the [MS-EMF]
//!   record stream with exact size accounting
//! - **Device-context emulation**: object table with stock objects,
//!   save/restore stack, window/viewport mapping and world transforms
//! - **Path playback**: move/line/bezier construction, fills and strokes
//!   with both GDI fill rules
//! - **Embedded bitmaps**: 1/8/16/24/32-bit DIB decoding with bottom-up
//!   scan handling
//! - **Pluggable backend**: rendering targets the [`Canvas`] trait; a
//!   `tiny-skia` implementation is included
//!
//! # Example - rendering a file to PNG
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("drawing.emf")?;
//! let png = emfplay::convert_emf_to_png(&data)?;
//! std::fs::write("drawing.png", png)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - working with the parsed file
//!
//! ```no_run
//! use emfplay::EmfFile;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("drawing.emf")?;
//! let file = EmfFile::parse(&data)?;
//! println!("{} records, {}x{} device units",
//!     file.records.len(),
//!     file.header.bounds.width(),
//!     file.header.bounds.height());
//! let image = file.render()?;
//! # Ok(())
//! # }
//! ```

pub mod canvas;
pub mod device_context;
pub mod dib;
pub mod error;
pub mod gdi;
pub mod parser;
pub mod records;
pub mod renderer;

pub use canvas::{Canvas, FillRule, PixmapCanvas};
pub use error::{Error, Result};
pub use parser::{EmfFile, EofRecord, HeaderRecord};

use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// Parse and rasterize a metafile in one step.
pub fn render_emf(data: &[u8]) -> Result<RgbaImage> {
    EmfFile::parse(data)?.render()
}

/// Convert EMF data to PNG-encoded bytes.
pub fn convert_emf_to_png(data: &[u8]) -> Result<Vec<u8>> {
    let image = render_emf(data)?;
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}
