//! Device-independent bitmap decoding.
//!
//! Converts the DIB payloads embedded in raster records into top-down RGBA
//! images. Rows are padded to 4 bytes and stored bottom-up when the header
//! height is positive.

use crate::records::types::{bit_count, compression, BitmapInfoHeader};
use image::{Rgba, RgbaImage};
use log::warn;

/// Bytes per scan line: bits rounded up to a 4-byte boundary.
#[inline]
pub fn row_stride(width: u32, bits_per_pixel: u32) -> usize {
    (((width as usize * bits_per_pixel as usize) + 31) & !31) / 8
}

/// Decode a DIB into a top-down RGBA image.
///
/// Returns `None` for bit depths or compression modes outside the supported
/// set, and for pixel buffers too short for the declared geometry; raster
/// records with such payloads simply draw nothing.
pub fn decode(header: &BitmapInfoHeader, bits: &[u8]) -> Option<RgbaImage> {
    let width = header.width.max(0) as u32;
    // A negative height means the rows are already top-down
    let height = header.height.unsigned_abs();
    let bottom_up = header.height > 0;
    if width == 0 || height == 0 {
        return None;
    }

    let stride = row_stride(width, header.bit_count as u32);
    if bits.len() < stride * height as usize {
        warn!("bitmap pixel data truncated ({} < {})", bits.len(), stride * height as usize);
        return None;
    }

    let src_row = |y: u32| {
        let sy = if bottom_up { height - 1 - y } else { y };
        &bits[sy as usize * stride..sy as usize * stride + stride]
    };

    let mut img = RgbaImage::new(width, height);

    match header.bit_count {
        bit_count::BI_BITCOUNT_1 => {
            // Monochrome: bits unpack MSB first, the color table is ignored
            const MASK: [u8; 8] = [0x80, 0x40, 0x20, 0x10, 0x08, 0x04, 0x02, 0x01];
            for y in 0..height {
                let row = src_row(y);
                for x in 0..width {
                    let v = if row[x as usize / 8] & MASK[x as usize % 8] != 0 {
                        0xFF
                    } else {
                        0x00
                    };
                    img.put_pixel(x, y, Rgba([v, v, v, 0xFF]));
                }
            }
        }
        bit_count::BI_BITCOUNT_3 => {
            // 8 bpp grayscale: the pel value is the gray level
            for y in 0..height {
                let row = src_row(y);
                for x in 0..width {
                    let v = row[x as usize];
                    img.put_pixel(x, y, Rgba([v, v, v, 0xFF]));
                }
            }
        }
        bit_count::BI_BITCOUNT_4 => {
            if header.compression != compression::BI_RGB {
                warn!("unsupported bitmap compression {}", header.compression);
                return None;
            }
            // 5 bits per component, blue in the low bits
            for y in 0..height {
                let row = src_row(y);
                for x in 0..width {
                    let j = x as usize * 2;
                    let c = u16::from_le_bytes([row[j], row[j + 1]]);
                    let r = (((c >> 10) & 0x1F) as u8) * 8;
                    let g = (((c >> 5) & 0x1F) as u8) * 8;
                    let b = ((c & 0x1F) as u8) * 8;
                    img.put_pixel(x, y, Rgba([r, g, b, 0xFF]));
                }
            }
        }
        bit_count::BI_BITCOUNT_5 | bit_count::BI_BITCOUNT_6 => {
            // Stored as BGR(A); any source alpha is discarded
            let bpp = (header.bit_count / 8) as usize;
            for y in 0..height {
                let row = src_row(y);
                for x in 0..width {
                    let j = x as usize * bpp;
                    img.put_pixel(x, y, Rgba([row[j + 2], row[j + 1], row[j], 0xFF]));
                }
            }
        }
        other => {
            warn!("unsupported bitmap bit count {other}");
            return None;
        }
    }

    Some(img)
}
