//! EMF record decoding.
//!
//! Each supported record type decodes into a variant of [`EmfRecord`]; the
//! playback loop drives a single exhaustive `match` over the variants.
//! Record types the interpreter knows about but does not act on are kept as
//! [`EmfRecord::Skipped`], unknown type identifiers as
//! [`EmfRecord::Unknown`].

pub mod bitmap;
pub mod drawing;
pub mod objects;
pub mod reader;
pub mod state;
pub mod text;
pub mod types;

use crate::error::{Error, Result};
use self::reader::RecordCursor;

pub use self::bitmap::{BltRecord, DibSection, StretchDiBitsRecord};
pub use self::drawing::{ArcRecord, Poly16, PolyPoly16};
pub use self::objects::{LogBrushEx, LogFont, LogPen, LogPenEx};
pub use self::text::{EmrText, ExtTextOutW};
pub use self::types::{
    BitmapInfoHeader, ColorRef, PointL, PointS, RecordKind, RectL, SizeL, XForm,
    ENHMETA_SIGNATURE,
};

/// One decoded metafile record.
#[derive(Debug, Clone)]
pub enum EmfRecord {
    SetWindowExtEx(SizeL),
    SetWindowOrgEx(PointL),
    SetViewportExtEx(SizeL),
    SetViewportOrgEx(PointL),
    SetMapMode(u32),
    SetBkMode(u32),
    SetPolyFillMode(u32),
    SetStretchBltMode(u32),
    SetTextAlign(u32),
    SetTextColor(ColorRef),
    SetBkColor(ColorRef),
    SetIcmMode(u32),
    MoveToEx(PointL),
    IntersectClipRect(RectL),
    SaveDc,
    RestoreDc(i32),
    SetWorldTransform(XForm),
    ModifyWorldTransform(state::ModifyWorldTransform),
    SelectObject(u32),
    CreatePen { handle: u32, pen: LogPen },
    CreateBrushIndirect { handle: u32, brush: LogBrushEx },
    DeleteObject(u32),
    Rectangle(RectL),
    Arc(ArcRecord),
    LineTo(PointL),
    BeginPath,
    EndPath,
    CloseFigure,
    FillPath(RectL),
    StrokeAndFillPath(RectL),
    StrokePath(RectL),
    SelectClipPath(u32),
    Comment,
    BitBlt(BltRecord),
    StretchBlt(BltRecord),
    StretchDiBits(StretchDiBitsRecord),
    ExtCreateFontIndirectW { handle: u32, font: LogFont },
    ExtTextOutW(ExtTextOutW),
    PolyBezier16(Poly16),
    Polygon16(Poly16),
    Polyline16(Poly16),
    PolyBezierTo16(Poly16),
    PolyLineTo16(Poly16),
    PolyPolygon16(PolyPoly16),
    ExtCreatePen { handle: u32, pen: LogPenEx },
    /// Known record type without playback semantics here; skipped by size.
    Skipped { kind: u32 },
    /// Type identifier outside the known numbering space; skipped by size.
    Unknown { kind: u32, size: u32 },
}

/// Decode one record body. The caller has already validated the record
/// header and sliced the body to exactly `size - 8` bytes; decoders may
/// leave trailing bytes (reserved fields) unread.
pub fn decode(kind: RecordKind, body: &[u8]) -> Result<EmfRecord> {
    let cur = &mut RecordCursor::new(body);
    let record = match kind {
        // The header and EOF records are structural; the file parser owns them.
        RecordKind::Header | RecordKind::Eof => {
            return Err(Error::Malformed("control record in playback stream".into()));
        }

        RecordKind::SetWindowExtEx => EmfRecord::SetWindowExtEx(state::extent(cur)?),
        RecordKind::SetWindowOrgEx => EmfRecord::SetWindowOrgEx(state::origin(cur)?),
        RecordKind::SetViewportExtEx => EmfRecord::SetViewportExtEx(state::extent(cur)?),
        RecordKind::SetViewportOrgEx => EmfRecord::SetViewportOrgEx(state::origin(cur)?),
        RecordKind::SetMapMode => EmfRecord::SetMapMode(state::mode(cur)?),
        RecordKind::SetBkMode => EmfRecord::SetBkMode(state::mode(cur)?),
        RecordKind::SetPolyFillMode => EmfRecord::SetPolyFillMode(state::mode(cur)?),
        RecordKind::SetStretchBltMode => EmfRecord::SetStretchBltMode(state::mode(cur)?),
        RecordKind::SetTextAlign => EmfRecord::SetTextAlign(state::mode(cur)?),
        RecordKind::SetTextColor => EmfRecord::SetTextColor(state::color(cur)?),
        RecordKind::SetBkColor => EmfRecord::SetBkColor(state::color(cur)?),
        RecordKind::SetIcmMode => EmfRecord::SetIcmMode(state::mode(cur)?),
        RecordKind::MoveToEx => EmfRecord::MoveToEx(drawing::point(cur)?),
        RecordKind::IntersectClipRect => EmfRecord::IntersectClipRect(state::clip_rect(cur)?),
        RecordKind::SaveDc => EmfRecord::SaveDc,
        RecordKind::RestoreDc => EmfRecord::RestoreDc(state::restore_dc(cur)?),
        RecordKind::SetWorldTransform => {
            EmfRecord::SetWorldTransform(state::world_transform(cur)?)
        }
        RecordKind::ModifyWorldTransform => {
            EmfRecord::ModifyWorldTransform(state::modify_world_transform(cur)?)
        }
        RecordKind::SelectObject => EmfRecord::SelectObject(objects::object_handle(cur)?),
        RecordKind::CreatePen => {
            let (handle, pen) = objects::create_pen(cur)?;
            EmfRecord::CreatePen { handle, pen }
        }
        RecordKind::CreateBrushIndirect => {
            let (handle, brush) = objects::create_brush_indirect(cur)?;
            EmfRecord::CreateBrushIndirect { handle, brush }
        }
        RecordKind::DeleteObject => EmfRecord::DeleteObject(objects::object_handle(cur)?),
        RecordKind::Rectangle => EmfRecord::Rectangle(drawing::rect(cur)?),
        RecordKind::Arc => EmfRecord::Arc(drawing::arc(cur)?),
        RecordKind::LineTo => EmfRecord::LineTo(drawing::point(cur)?),
        RecordKind::BeginPath => EmfRecord::BeginPath,
        RecordKind::EndPath => EmfRecord::EndPath,
        RecordKind::CloseFigure => EmfRecord::CloseFigure,
        RecordKind::FillPath => EmfRecord::FillPath(drawing::path_bounds(cur)?),
        RecordKind::StrokeAndFillPath => {
            EmfRecord::StrokeAndFillPath(drawing::path_bounds(cur)?)
        }
        RecordKind::StrokePath => EmfRecord::StrokePath(drawing::path_bounds(cur)?),
        RecordKind::SelectClipPath => EmfRecord::SelectClipPath(state::mode(cur)?),
        RecordKind::Comment => EmfRecord::Comment,
        RecordKind::BitBlt => EmfRecord::BitBlt(bitmap::blt(cur, false)?),
        RecordKind::StretchBlt => EmfRecord::StretchBlt(bitmap::blt(cur, true)?),
        RecordKind::StretchDiBits => EmfRecord::StretchDiBits(bitmap::stretch_di_bits(cur)?),
        RecordKind::ExtCreateFontIndirectW => {
            let (handle, font) = objects::ext_create_font_indirect_w(cur)?;
            EmfRecord::ExtCreateFontIndirectW { handle, font }
        }
        RecordKind::ExtTextOutW => EmfRecord::ExtTextOutW(text::ext_text_out_w(cur)?),
        RecordKind::PolyBezier16 => EmfRecord::PolyBezier16(drawing::poly16(cur)?),
        RecordKind::Polygon16 => EmfRecord::Polygon16(drawing::poly16(cur)?),
        RecordKind::Polyline16 => EmfRecord::Polyline16(drawing::poly16(cur)?),
        RecordKind::PolyBezierTo16 => EmfRecord::PolyBezierTo16(drawing::poly16(cur)?),
        RecordKind::PolyLineTo16 => EmfRecord::PolyLineTo16(drawing::poly16(cur)?),
        RecordKind::PolyPolygon16 => EmfRecord::PolyPolygon16(drawing::poly_poly16(cur)?),
        RecordKind::ExtCreatePen => {
            let (handle, pen) = objects::ext_create_pen(cur)?;
            EmfRecord::ExtCreatePen { handle, pen }
        }
    };
    Ok(record)
}
