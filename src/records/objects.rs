//! Decoders for graphics-object records: pens, brushes and fonts, plus the
//! select/delete bookkeeping records that act on the object table.

use super::bitmap::DibSection;
use super::reader::RecordCursor;
use super::types::{pen_style, BitmapInfoHeader, ColorRef, PointL};
use crate::error::Result;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// LOGPEN from EMR_CREATEPEN. Only `width.x` is meaningful; the y component
/// is reserved on the wire.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct LogPen {
    pub style: u32,
    pub width: PointL,
    pub color: ColorRef,
}

/// LOGBRUSHEX from EMR_CREATEBRUSHINDIRECT.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct LogBrushEx {
    pub style: u32,
    pub color: ColorRef,
    pub hatch: u32,
}

/// Extended pen from EMR_EXTCREATEPEN. A user-style pen carries its dash
/// pattern inline; a pattern brush pen may carry a DIB.
#[derive(Debug, Clone)]
pub struct LogPenEx {
    pub style: u32,
    pub width: u32,
    pub brush_style: u32,
    pub color: ColorRef,
    pub hatch: u32,
    pub dash_pattern: Vec<u32>,
    pub dib: Option<DibSection>,
}

/// LOGFONT from EMR_EXTCREATEFONTINDIRECTW (fixed prefix; the facename is
/// decoded separately from its 32 UTF-16 code units).
#[derive(Debug, Clone)]
pub struct LogFont {
    pub height: i32,
    pub width: i32,
    pub escapement: i32,
    pub orientation: i32,
    pub weight: i32,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
    pub charset: u8,
    pub out_precision: u8,
    pub clip_precision: u8,
    pub quality: u8,
    pub pitch_and_family: u8,
    pub facename: String,
}

impl LogFont {
    /// Stock SYSTEM_FONT / DEVICE_DEFAULT_FONT placeholder.
    pub fn stock(height: i32) -> Self {
        Self {
            height,
            width: 0,
            escapement: 0,
            orientation: 0,
            weight: 400,
            italic: false,
            underline: false,
            strikeout: false,
            charset: 1,
            out_precision: 0,
            clip_precision: 0,
            quality: 0,
            pitch_and_family: 0,
            facename: String::new(),
        }
    }
}

#[derive(FromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct RawLogFont {
    height: i32,
    width: i32,
    escapement: i32,
    orientation: i32,
    weight: i32,
    italic: u8,
    underline: u8,
    strikeout: u8,
    charset: u8,
    out_precision: u8,
    clip_precision: u8,
    quality: u8,
    pitch_and_family: u8,
}

/// Minimum record-relative DIB offset in EMR_EXTCREATEPEN: anything smaller
/// would point inside the pen fields themselves, meaning no DIB is present.
const EXTCREATEPEN_MIN_BMI_OFFSET: u32 = 52;

pub fn create_pen(cur: &mut RecordCursor) -> Result<(u32, LogPen)> {
    let handle = cur.read_u32()?;
    let pen = cur.read::<LogPen>()?;
    Ok((handle, pen))
}

pub fn create_brush_indirect(cur: &mut RecordCursor) -> Result<(u32, LogBrushEx)> {
    let handle = cur.read_u32()?;
    let brush = cur.read::<LogBrushEx>()?;
    Ok((handle, brush))
}

pub fn ext_create_pen(cur: &mut RecordCursor) -> Result<(u32, LogPenEx)> {
    let handle = cur.read_u32()?;
    let off_bmi = cur.read_u32()?;
    let cb_bmi = cur.read_u32()?;
    let off_bits = cur.read_u32()?;
    let cb_bits = cur.read_u32()?;

    let style = cur.read_u32()?;
    let width = cur.read_u32()?;
    let brush_style = cur.read_u32()?;
    let color = cur.read::<ColorRef>()?;
    let hatch = cur.read_u32()?;
    let num_style_entries = cur.read_u32()? as usize;

    // The entry array is present whenever the count is nonzero, but only
    // a PS_USERSTYLE pen gives it dash semantics.
    let entries = cur.read_array::<u32>(num_style_entries)?;
    let dash_pattern = if (style & 0xFF) == pen_style::PS_USERSTYLE {
        entries
    } else {
        Vec::new()
    };

    let dib = if off_bmi < EXTCREATEPEN_MIN_BMI_OFFSET || cb_bmi == 0 {
        None
    } else {
        cur.seek_to_record_offset(off_bmi)?;
        let header = cur.read::<BitmapInfoHeader>()?;
        cur.seek_to_record_offset(off_bits)?;
        let bits = cur.read_bytes(cb_bits as usize)?.to_vec();
        Some(DibSection { header, bits })
    };

    Ok((
        handle,
        LogPenEx {
            style,
            width,
            brush_style,
            color,
            hatch,
            dash_pattern,
            dib,
        },
    ))
}

pub fn ext_create_font_indirect_w(cur: &mut RecordCursor) -> Result<(u32, LogFont)> {
    let handle = cur.read_u32()?;
    let raw = cur.read::<RawLogFont>()?;
    let facename = cur.read_utf16(32)?;
    // The record continues with the LOGFONTEX panose block, which the
    // interpreter has no use for; the parser advances past it by size.
    Ok((
        handle,
        LogFont {
            height: raw.height,
            width: raw.width,
            escapement: raw.escapement,
            orientation: raw.orientation,
            weight: raw.weight,
            italic: raw.italic != 0,
            underline: raw.underline != 0,
            strikeout: raw.strikeout != 0,
            charset: raw.charset,
            out_precision: raw.out_precision,
            clip_precision: raw.clip_precision,
            quality: raw.quality,
            pitch_and_family: raw.pitch_and_family,
            facename,
        },
    ))
}

/// EMR_SELECTOBJECT / EMR_DELETEOBJECT: a single object handle.
pub fn object_handle(cur: &mut RecordCursor) -> Result<u32> {
    cur.read_u32()
}
