//! Decoders for device-context state records.
//!
//! These records carry no drawing of their own; they mutate coordinate
//! mapping, modes, and colors during playback.

use super::reader::RecordCursor;
use super::types::{ColorRef, PointL, RectL, SizeL, XForm};
use crate::error::Result;

/// EMR_MODIFYWORLDTRANSFORM payload.
#[derive(Debug, Clone, Copy)]
pub struct ModifyWorldTransform {
    pub xform: XForm,
    /// ModifyWorldTransformMode: identity / left-multiply / right-multiply / set.
    pub mode: u32,
}

pub fn extent(cur: &mut RecordCursor) -> Result<SizeL> {
    cur.read::<SizeL>()
}

pub fn origin(cur: &mut RecordCursor) -> Result<PointL> {
    cur.read::<PointL>()
}

/// Single-dword records: map mode, background mode, fill mode, stretch mode,
/// text alignment, ICM mode, selected clip-path mode.
pub fn mode(cur: &mut RecordCursor) -> Result<u32> {
    cur.read_u32()
}

pub fn color(cur: &mut RecordCursor) -> Result<ColorRef> {
    cur.read::<ColorRef>()
}

pub fn clip_rect(cur: &mut RecordCursor) -> Result<RectL> {
    cur.read::<RectL>()
}

/// EMR_RESTOREDC: negative values are relative to the top of the stack,
/// positive ones absolute indices.
pub fn restore_dc(cur: &mut RecordCursor) -> Result<i32> {
    cur.read_i32()
}

pub fn world_transform(cur: &mut RecordCursor) -> Result<XForm> {
    cur.read::<XForm>()
}

pub fn modify_world_transform(cur: &mut RecordCursor) -> Result<ModifyWorldTransform> {
    let xform = cur.read::<XForm>()?;
    let mode = cur.read_u32()?;
    Ok(ModifyWorldTransform { xform, mode })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modify_world_transform_decode() {
        let mut body = Vec::new();
        for v in [2.0f32, 0.0, 0.0, 3.0, 10.0, 20.0] {
            body.extend_from_slice(&v.to_le_bytes());
        }
        body.extend_from_slice(&4u32.to_le_bytes());

        let mut cur = RecordCursor::new(&body);
        let rec = modify_world_transform(&mut cur).unwrap();
        assert_eq!(rec.xform.m11, 2.0);
        assert_eq!(rec.xform.m22, 3.0);
        assert_eq!(rec.xform.dy, 20.0);
        assert_eq!(rec.mode, 4);
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn test_extent_decode() {
        let mut body = Vec::new();
        body.extend_from_slice(&(-640i32).to_le_bytes());
        body.extend_from_slice(&480i32.to_le_bytes());
        let mut cur = RecordCursor::new(&body);
        let ext = extent(&mut cur).unwrap();
        // negative extents occur in real files
        assert_eq!((ext.cx, ext.cy), (-640, 480));
    }
}
