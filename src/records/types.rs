//! Wire-level primitives shared by all EMF records.
//!
//! All multi-byte values are little-endian on the wire and records are
//! 4-byte aligned. Fixed-layout structures are read with `zerocopy` so the
//! byte-level layout lives in the type definitions, not in hand-written
//! shifting code.
//!
//! References:
//! - [MS-EMF]: Enhanced Metafile Format Specification
//! - [MS-WMF]: Windows Metafile Format (shared base types)

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// "EMF " tag carried by the header record, little-endian.
pub const ENHMETA_SIGNATURE: u32 = 0x464D_4520;

/// Record types this interpreter decodes. Everything else in the
/// [MS-EMF] numbering space is parsed-and-skipped by size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RecordKind {
    Header = 1,
    SetWindowExtEx = 9,
    SetWindowOrgEx = 10,
    SetViewportExtEx = 11,
    SetViewportOrgEx = 12,
    Eof = 14,
    SetMapMode = 17,
    SetBkMode = 18,
    SetPolyFillMode = 19,
    SetStretchBltMode = 21,
    SetTextAlign = 22,
    SetTextColor = 24,
    SetBkColor = 25,
    MoveToEx = 27,
    IntersectClipRect = 30,
    SaveDc = 33,
    RestoreDc = 34,
    SetWorldTransform = 35,
    ModifyWorldTransform = 36,
    SelectObject = 37,
    CreatePen = 38,
    CreateBrushIndirect = 39,
    DeleteObject = 40,
    Rectangle = 43,
    Arc = 45,
    LineTo = 54,
    BeginPath = 59,
    EndPath = 60,
    CloseFigure = 61,
    FillPath = 62,
    StrokeAndFillPath = 63,
    StrokePath = 64,
    SelectClipPath = 67,
    Comment = 70,
    BitBlt = 76,
    StretchBlt = 77,
    StretchDiBits = 81,
    ExtCreateFontIndirectW = 82,
    ExtTextOutW = 84,
    PolyBezier16 = 85,
    Polygon16 = 86,
    Polyline16 = 87,
    PolyBezierTo16 = 88,
    PolyLineTo16 = 89,
    PolyPolygon16 = 91,
    ExtCreatePen = 95,
    SetIcmMode = 98,
}

impl RecordKind {
    /// Convert from the wire record type, `None` for types without a decoder.
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Header),
            9 => Some(Self::SetWindowExtEx),
            10 => Some(Self::SetWindowOrgEx),
            11 => Some(Self::SetViewportExtEx),
            12 => Some(Self::SetViewportOrgEx),
            14 => Some(Self::Eof),
            17 => Some(Self::SetMapMode),
            18 => Some(Self::SetBkMode),
            19 => Some(Self::SetPolyFillMode),
            21 => Some(Self::SetStretchBltMode),
            22 => Some(Self::SetTextAlign),
            24 => Some(Self::SetTextColor),
            25 => Some(Self::SetBkColor),
            27 => Some(Self::MoveToEx),
            30 => Some(Self::IntersectClipRect),
            33 => Some(Self::SaveDc),
            34 => Some(Self::RestoreDc),
            35 => Some(Self::SetWorldTransform),
            36 => Some(Self::ModifyWorldTransform),
            37 => Some(Self::SelectObject),
            38 => Some(Self::CreatePen),
            39 => Some(Self::CreateBrushIndirect),
            40 => Some(Self::DeleteObject),
            43 => Some(Self::Rectangle),
            45 => Some(Self::Arc),
            54 => Some(Self::LineTo),
            59 => Some(Self::BeginPath),
            60 => Some(Self::EndPath),
            61 => Some(Self::CloseFigure),
            62 => Some(Self::FillPath),
            63 => Some(Self::StrokeAndFillPath),
            64 => Some(Self::StrokePath),
            67 => Some(Self::SelectClipPath),
            70 => Some(Self::Comment),
            76 => Some(Self::BitBlt),
            77 => Some(Self::StretchBlt),
            81 => Some(Self::StretchDiBits),
            82 => Some(Self::ExtCreateFontIndirectW),
            84 => Some(Self::ExtTextOutW),
            85 => Some(Self::PolyBezier16),
            86 => Some(Self::Polygon16),
            87 => Some(Self::Polyline16),
            88 => Some(Self::PolyBezierTo16),
            89 => Some(Self::PolyLineTo16),
            91 => Some(Self::PolyPolygon16),
            95 => Some(Self::ExtCreatePen),
            98 => Some(Self::SetIcmMode),
            _ => None,
        }
    }
}

/// Whether a wire record type exists in the [MS-EMF] numbering space at all.
/// Types 69 and 117 are unassigned; everything outside 1..=122 belongs to
/// extensions this interpreter does not know about.
#[inline]
pub const fn is_known_record_type(value: u32) -> bool {
    matches!(value, 1..=122) && value != 69 && value != 117
}

/// 16-bit signed point (POINTS)
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct PointS {
    pub x: i16,
    pub y: i16,
}

/// 32-bit signed point (POINTL)
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct PointL {
    pub x: i32,
    pub y: i32,
}

/// Extent (SIZEL). [MS-WMF] declares the fields unsigned but real files
/// carry negative extents, so they are treated as signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct SizeL {
    pub cx: i32,
    pub cy: i32,
}

/// Rectangle (RECTL). Bounds are inclusive-inclusive: a rectangle spanning
/// device pixels needs `width() + 1` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct RectL {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl RectL {
    pub const ZERO: RectL = RectL {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    #[inline]
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    #[inline]
    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Color (COLORREF): red, green, blue, reserved. Alpha is always opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ColorRef {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub reserved: u8,
}

impl ColorRef {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            reserved: 0,
        }
    }

    /// Decode to RGBA with forced opaque alpha.
    #[inline]
    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.red, self.green, self.blue, 0xFF])
    }
}

/// World transform (XFORM): single-precision affine on the wire, widened to
/// f64 before composing with the rendering matrix.
#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct XForm {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub dx: f32,
    pub dy: f32,
}

impl XForm {
    /// Widen to the `[a b c d e f]` matrix used internally.
    #[inline]
    pub fn to_matrix(self) -> [f64; 6] {
        [
            self.m11 as f64,
            self.m12 as f64,
            self.m21 as f64,
            self.m22 as f64,
            self.dx as f64,
            self.dy as f64,
        ]
    }
}

/// DIB header (BITMAPINFOHEADER), 40 bytes.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct BitmapInfoHeader {
    pub header_size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_pels_per_meter: i32,
    pub y_pels_per_meter: i32,
    pub color_used: u32,
    pub color_important: u32,
}

/// Bit depths from the [MS-WMF] BitCount enumeration.
pub mod bit_count {
    pub const BI_BITCOUNT_1: u16 = 1; // monochrome
    pub const BI_BITCOUNT_2: u16 = 4;
    pub const BI_BITCOUNT_3: u16 = 8;
    pub const BI_BITCOUNT_4: u16 = 16;
    pub const BI_BITCOUNT_5: u16 = 24;
    pub const BI_BITCOUNT_6: u16 = 32;
}

/// DIB compression modes.
pub mod compression {
    pub const BI_RGB: u32 = 0;
    pub const BI_RLE8: u32 = 1;
    pub const BI_RLE4: u32 = 2;
    pub const BI_BITFIELDS: u32 = 3;
}

/// Mapping modes for EMR_SETMAPMODE.
pub mod map_mode {
    pub const MM_TEXT: u32 = 1;
    pub const MM_LOMETRIC: u32 = 2;
    pub const MM_HIMETRIC: u32 = 3;
    pub const MM_LOENGLISH: u32 = 4;
    pub const MM_HIENGLISH: u32 = 5;
    pub const MM_TWIPS: u32 = 6;
    pub const MM_ISOTROPIC: u32 = 7;
    pub const MM_ANISOTROPIC: u32 = 8;
}

/// Polygon fill modes for EMR_SETPOLYFILLMODE.
pub mod poly_fill_mode {
    pub const ALTERNATE: u32 = 1;
    pub const WINDING: u32 = 2;
}

/// ModifyWorldTransformMode values for EMR_MODIFYWORLDTRANSFORM.
pub mod world_transform_mode {
    pub const MWT_IDENTITY: u32 = 1;
    pub const MWT_LEFTMULTIPLY: u32 = 2;
    pub const MWT_RIGHTMULTIPLY: u32 = 3;
    pub const MWT_SET: u32 = 4;
}

/// Pen style bits for EMR_CREATEPEN / EMR_EXTCREATEPEN.
pub mod pen_style {
    pub const PS_SOLID: u32 = 0;
    pub const PS_DASH: u32 = 1;
    pub const PS_DOT: u32 = 2;
    pub const PS_DASHDOT: u32 = 3;
    pub const PS_DASHDOTDOT: u32 = 4;
    pub const PS_NULL: u32 = 5;
    pub const PS_INSIDEFRAME: u32 = 6;
    pub const PS_USERSTYLE: u32 = 7;
}

/// Brush styles for EMR_CREATEBRUSHINDIRECT.
pub mod brush_style {
    pub const BS_SOLID: u32 = 0;
    pub const BS_NULL: u32 = 1;
    pub const BS_HATCHED: u32 = 2;
}

/// Stock object handles: the high bit marks the handle as predefined
/// rather than file-created.
pub mod stock {
    pub const STOCK_FLAG: u32 = 0x8000_0000;

    pub const WHITE_BRUSH: u32 = 0x8000_0000;
    pub const LTGRAY_BRUSH: u32 = 0x8000_0001;
    pub const GRAY_BRUSH: u32 = 0x8000_0002;
    pub const DKGRAY_BRUSH: u32 = 0x8000_0003;
    pub const BLACK_BRUSH: u32 = 0x8000_0004;
    pub const NULL_BRUSH: u32 = 0x8000_0005;
    pub const WHITE_PEN: u32 = 0x8000_0006;
    pub const BLACK_PEN: u32 = 0x8000_0007;
    pub const NULL_PEN: u32 = 0x8000_0008;
    pub const SYSTEM_FONT: u32 = 0x8000_000D;
    pub const DEVICE_DEFAULT_FONT: u32 = 0x8000_000E;

    /// Check whether a handle refers to a stock object.
    #[inline]
    pub const fn is_stock_handle(value: u32) -> bool {
        (value & STOCK_FLAG) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_bytes() {
        // "EMF " in little-endian
        assert_eq!(ENHMETA_SIGNATURE.to_le_bytes(), [0x20, 0x45, 0x4D, 0x46]);
    }

    #[test]
    fn test_record_kind_roundtrip() {
        assert_eq!(RecordKind::from_u32(1), Some(RecordKind::Header));
        assert_eq!(RecordKind::from_u32(14), Some(RecordKind::Eof));
        assert_eq!(RecordKind::from_u32(91), Some(RecordKind::PolyPolygon16));
        // Known to the format, but parsed-and-skipped here
        assert_eq!(RecordKind::from_u32(42), None);
        assert!(is_known_record_type(42));
        // Outside the numbering space entirely
        assert!(!is_known_record_type(0));
        assert!(!is_known_record_type(69));
        assert!(!is_known_record_type(123));
    }

    #[test]
    fn test_colorref_to_rgba() {
        let c = ColorRef::new(12, 200, 7);
        assert_eq!(c.to_rgba(), image::Rgba([12, 200, 7, 0xFF]));
    }

    #[test]
    fn test_rect_extents() {
        let r = RectL {
            left: 10,
            top: 20,
            right: 110,
            bottom: 40,
        };
        assert_eq!(r.width(), 100);
        assert_eq!(r.height(), 20);
    }

    #[test]
    fn test_stock_handles() {
        assert!(stock::is_stock_handle(stock::WHITE_BRUSH));
        assert!(stock::is_stock_handle(stock::DEVICE_DEFAULT_FONT));
        assert!(!stock::is_stock_handle(1));
    }
}
