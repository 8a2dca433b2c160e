//! GDI object management for metafile playback.
//!
//! Objects are created under file-chosen handles by EMR_CREATE* records,
//! made current with EMR_SELECTOBJECT and destroyed with EMR_DELETEOBJECT.
//! Stock objects live outside the table: their reserved handles resolve
//! directly and can never be created or deleted.

use crate::records::objects::{LogBrushEx, LogFont, LogPen, LogPenEx};
use crate::records::types::{brush_style, pen_style, stock, ColorRef, PointL};
use log::warn;
use std::collections::HashMap;

/// A graphics object held in the object table or resolved from a stock
/// handle. The null variants switch off stroking or filling when selected.
#[derive(Debug, Clone)]
pub enum GdiObject {
    Pen(LogPen),
    PenEx(LogPenEx),
    Brush(LogBrushEx),
    Font(LogFont),
    NullPen,
    NullBrush,
}

fn stock_brush(red: u8, green: u8, blue: u8) -> GdiObject {
    GdiObject::Brush(LogBrushEx {
        style: brush_style::BS_SOLID,
        color: ColorRef::new(red, green, blue),
        hatch: 0,
    })
}

fn stock_pen(red: u8, green: u8, blue: u8) -> GdiObject {
    GdiObject::Pen(LogPen {
        style: pen_style::PS_SOLID,
        width: PointL { x: 1, y: 0 },
        color: ColorRef::new(red, green, blue),
    })
}

/// Resolve a stock handle to its predefined object.
pub fn stock_object(handle: u32) -> Option<GdiObject> {
    match handle {
        stock::WHITE_BRUSH => Some(stock_brush(255, 255, 255)),
        stock::LTGRAY_BRUSH => Some(stock_brush(192, 192, 192)),
        stock::GRAY_BRUSH => Some(stock_brush(128, 128, 128)),
        stock::DKGRAY_BRUSH => Some(stock_brush(64, 64, 64)),
        stock::BLACK_BRUSH => Some(stock_brush(0, 0, 0)),
        stock::NULL_BRUSH => Some(GdiObject::NullBrush),
        stock::WHITE_PEN => Some(stock_pen(255, 255, 255)),
        stock::BLACK_PEN => Some(stock_pen(0, 0, 0)),
        stock::NULL_PEN => Some(GdiObject::NullPen),
        stock::SYSTEM_FONT | stock::DEVICE_DEFAULT_FONT => {
            Some(GdiObject::Font(LogFont::stock(11)))
        }
        _ => None,
    }
}

/// Per-file object table keyed by handle.
#[derive(Debug, Default)]
pub struct ObjectTable {
    objects: HashMap<u32, GdiObject>,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object under a file-defined handle. Handles with the stock
    /// bit set are reserved and refused.
    pub fn insert(&mut self, handle: u32, object: GdiObject) {
        if stock::is_stock_handle(handle) {
            warn!("refusing to create object under stock handle {handle:#x}");
            return;
        }
        self.objects.insert(handle, object);
    }

    /// Resolve a handle: stock objects first, then the table.
    pub fn resolve(&self, handle: u32) -> Option<GdiObject> {
        if let Some(object) = stock_object(handle) {
            return Some(object);
        }
        self.objects.get(&handle).cloned()
    }

    /// Delete a file-defined object. Deleting an absent or stock handle is
    /// a no-op with a diagnostic.
    pub fn delete(&mut self, handle: u32) {
        if stock::is_stock_handle(handle) {
            warn!("ignoring delete of stock handle {handle:#x}");
            return;
        }
        if self.objects.remove(&handle).is_none() {
            warn!("delete of unknown object handle {handle:#x}");
        }
    }

    #[cfg(test)]
    pub fn contains(&self, handle: u32) -> bool {
        self.objects.contains_key(&handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_resolve_delete() {
        let mut table = ObjectTable::new();
        table.insert(
            1,
            GdiObject::Brush(LogBrushEx {
                style: brush_style::BS_SOLID,
                color: ColorRef::new(10, 20, 30),
                hatch: 0,
            }),
        );
        assert!(matches!(table.resolve(1), Some(GdiObject::Brush(_))));
        table.delete(1);
        assert!(table.resolve(1).is_none());
        // second delete is a no-op
        table.delete(1);
    }

    #[test]
    fn test_stock_handles_bypass_table() {
        let table = ObjectTable::new();
        assert!(matches!(
            table.resolve(stock::WHITE_BRUSH),
            Some(GdiObject::Brush(_))
        ));
        assert!(matches!(
            table.resolve(stock::NULL_PEN),
            Some(GdiObject::NullPen)
        ));
        assert!(matches!(
            table.resolve(stock::SYSTEM_FONT),
            Some(GdiObject::Font(_))
        ));
    }

    #[test]
    fn test_stock_handles_never_stored() {
        let mut table = ObjectTable::new();
        table.insert(stock::WHITE_BRUSH, GdiObject::NullBrush);
        assert!(!table.contains(stock::WHITE_BRUSH));
        // and a stock resolve still yields the predefined object
        assert!(matches!(
            table.resolve(stock::WHITE_BRUSH),
            Some(GdiObject::Brush(_))
        ));
    }

    #[test]
    fn test_white_brush_is_white() {
        let Some(GdiObject::Brush(brush)) = stock_object(stock::WHITE_BRUSH) else {
            panic!("white brush must resolve");
        };
        assert_eq!(brush.color, ColorRef::new(255, 255, 255));
    }
}
