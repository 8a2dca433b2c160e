//! Decoder for EMR_EXTTEXTOUTW and its embedded EmrText payload.
//!
//! The string and the inter-character advance array live at record-relative
//! offsets, not inline after the fixed fields.

use super::reader::RecordCursor;
use super::types::{PointL, RectL};
use crate::error::Result;

/// EmrText: the positioned string carried by a text-output record.
#[derive(Debug, Clone)]
pub struct EmrText {
    pub reference: PointL,
    pub chars: u32,
    pub options: u32,
    pub rectangle: RectL,
    pub text: String,
    /// Inter-character advances; empty when the record omits them.
    pub dx: Vec<u32>,
}

/// EMR_EXTTEXTOUTW payload.
#[derive(Debug, Clone)]
pub struct ExtTextOutW {
    pub bounds: RectL,
    pub graphics_mode: u32,
    pub ex_scale: f32,
    pub ey_scale: f32,
    pub text: EmrText,
}

pub fn emr_text(cur: &mut RecordCursor) -> Result<EmrText> {
    let reference = cur.read::<PointL>()?;
    let chars = cur.read_u32()?;
    let off_string = cur.read_u32()?;
    let options = cur.read_u32()?;
    let rectangle = cur.read::<RectL>()?;
    let off_dx = cur.read_u32()?;

    let text = if chars > 0 && off_string > 0 {
        cur.seek_to_record_offset(off_string)?;
        cur.read_utf16(chars as usize)?
    } else {
        String::new()
    };

    // Some writers emit no advance array at all
    let dx = if chars > 0 && off_dx > 0 {
        cur.seek_to_record_offset(off_dx)?;
        cur.read_array::<u32>(chars as usize)?
    } else {
        Vec::new()
    };

    Ok(EmrText {
        reference,
        chars,
        options,
        rectangle,
        text,
        dx,
    })
}

pub fn ext_text_out_w(cur: &mut RecordCursor) -> Result<ExtTextOutW> {
    let bounds = cur.read::<RectL>()?;
    let graphics_mode = cur.read_u32()?;
    let ex_scale = cur.read_f32()?;
    let ey_scale = cur.read_f32()?;
    let text = emr_text(cur)?;
    Ok(ExtTextOutW {
        bounds,
        graphics_mode,
        ex_scale,
        ey_scale,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    /// Assemble an EMR_EXTTEXTOUTW body with the string and dx array at
    /// their declared offsets.
    fn text_body(text: &str, gap: usize) -> Vec<u8> {
        let chars = text.encode_utf16().count() as u32;
        // record-relative: 8 header + 28 fixed + 40 EmrText fields
        let off_string = (8 + 28 + 40 + gap) as u32;
        let off_dx = off_string + chars * 2;

        let mut body = Vec::new();
        for v in [0i32, 0, 50, 20] {
            body.extend_from_slice(&v.to_le_bytes()); // bounds
        }
        body.extend_from_slice(&1u32.to_le_bytes()); // graphics mode
        body.extend_from_slice(&1.0f32.to_le_bytes());
        body.extend_from_slice(&1.0f32.to_le_bytes());
        for v in [5i32, 6] {
            body.extend_from_slice(&v.to_le_bytes()); // reference
        }
        body.extend_from_slice(&chars.to_le_bytes());
        body.extend_from_slice(&off_string.to_le_bytes());
        body.extend_from_slice(&0u32.to_le_bytes()); // options
        for v in [0i32, 0, 0, 0] {
            body.extend_from_slice(&v.to_le_bytes()); // rectangle
        }
        body.extend_from_slice(&off_dx.to_le_bytes());
        body.extend_from_slice(&vec![0u8; gap]);
        for unit in text.encode_utf16() {
            body.extend_from_slice(&unit.to_le_bytes());
        }
        for _ in 0..chars {
            body.extend_from_slice(&7u32.to_le_bytes());
        }
        body
    }

    #[test]
    fn test_exttextoutw_decode() {
        let body = text_body("Hello", 0);
        let mut cur = RecordCursor::new(&body);
        let rec = ext_text_out_w(&mut cur).unwrap();
        assert_eq!(rec.text.text, "Hello");
        assert_eq!(rec.text.reference.x, 5);
        assert_eq!(rec.text.dx, vec![7; 5]);
    }

    #[test]
    fn test_exttextoutw_skips_gap_bytes() {
        let body = text_body("Hi", 12);
        let mut cur = RecordCursor::new(&body);
        let rec = ext_text_out_w(&mut cur).unwrap();
        assert_eq!(rec.text.text, "Hi");
    }

    #[test]
    fn test_backward_string_offset_is_malformed() {
        let mut body = text_body("Hi", 0);
        // Point off_string into the already-consumed fixed fields
        let off_string_pos = 16 + 12 + 8 + 4;
        body[off_string_pos..off_string_pos + 4].copy_from_slice(&12u32.to_le_bytes());
        let mut cur = RecordCursor::new(&body);
        assert!(matches!(ext_text_out_w(&mut cur), Err(Error::Malformed(_))));
    }
}
