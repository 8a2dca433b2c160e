//! Device-context state for metafile playback.
//!
//! The DC carries everything record execution mutates besides pixels: the
//! selected pen/brush/font, colors and modes, the current point, path
//! bracket state, the window/viewport mapping inputs and the object table.
//! EMR_SAVEDC/EMR_RESTOREDC snapshot the graphics state as plain values on
//! a LIFO stack.

use crate::canvas::FillRule;
use crate::gdi::ObjectTable;
use crate::records::objects::LogFont;
use crate::records::types::{map_mode, PointL, SizeL};
use image::Rgba;

/// Path bracket state: EMR_BEGINPATH switches to `Building`, EMR_ENDPATH
/// back to `Inactive` with the path committed for a later fill/stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathState {
    #[default]
    Inactive,
    Building,
}

/// The graphics state captured by EMR_SAVEDC.
#[derive(Debug, Clone)]
pub struct DcState {
    /// Fully transparent when a NULL pen is selected.
    pub stroke_color: Rgba<u8>,
    pub line_width: f64,
    /// Fully transparent when a NULL brush is selected.
    pub fill_color: Rgba<u8>,
    pub fill_rule: FillRule,
    pub text_color: Rgba<u8>,
    pub bk_color: Rgba<u8>,
    pub bk_mode: u32,
    pub text_align: u32,
    pub stretch_blt_mode: u32,
    pub font: Option<LogFont>,
    pub current_point: (f64, f64),
    pub path_state: PathState,
}

impl Default for DcState {
    fn default() -> Self {
        Self {
            stroke_color: Rgba([0, 0, 0, 255]),
            line_width: 1.0,
            fill_color: Rgba([255, 255, 255, 255]),
            fill_rule: FillRule::default(),
            text_color: Rgba([0, 0, 0, 255]),
            bk_color: Rgba([255, 255, 255, 255]),
            bk_mode: 2, // OPAQUE
            text_align: 0,
            stretch_blt_mode: 0,
            font: None,
            current_point: (0.0, 0.0),
            path_state: PathState::Inactive,
        }
    }
}

/// The device context one metafile plays against.
pub struct DeviceContext {
    pub state: DcState,
    saved: Vec<DcState>,

    /// Window/viewport mapping inputs; mapping applies only once both
    /// extents have been seen.
    pub window_org: Option<PointL>,
    pub window_ext: Option<SizeL>,
    pub viewport_org: Option<PointL>,
    pub viewport_ext: Option<SizeL>,
    pub map_mode: u32,

    /// Device canvas size, the fallback denominator for metric map modes.
    pub canvas_width: u32,
    pub canvas_height: u32,

    pub objects: ObjectTable,
}

impl DeviceContext {
    pub fn new(canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            state: DcState::default(),
            saved: Vec::new(),
            window_org: None,
            window_ext: None,
            viewport_org: None,
            viewport_ext: None,
            map_mode: map_mode::MM_TEXT,
            canvas_width,
            canvas_height,
            objects: ObjectTable::new(),
        }
    }

    /// EMR_SAVEDC: push an immutable snapshot of the graphics state.
    pub fn save(&mut self) {
        self.saved.push(self.state.clone());
    }

    /// EMR_RESTOREDC: pop the most recent snapshot. Returns false when the
    /// stack is already empty.
    pub fn restore(&mut self) -> bool {
        match self.saved.pop() {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }

    /// Save/restore nesting depth; zero after a balanced file.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// The window→viewport scale factors, when both extents are known.
    /// Metric map modes scale against the device canvas instead of the
    /// viewport extent.
    pub fn mapping_scale(&self) -> Option<(f64, f64)> {
        let we = self.window_ext?;
        let ve = self.viewport_ext?;
        if we.cx == 0 || we.cy == 0 {
            return None;
        }
        match self.map_mode {
            map_mode::MM_TEXT | map_mode::MM_ISOTROPIC | map_mode::MM_ANISOTROPIC => {
                if ve.cx == 0 || ve.cy == 0 {
                    return None;
                }
                Some((ve.cx as f64 / we.cx as f64, ve.cy as f64 / we.cy as f64))
            }
            _ => Some((
                self.canvas_width as f64 / we.cx as f64,
                self.canvas_height as f64 / we.cy as f64,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_restore_balances() {
        let mut dc = DeviceContext::new(100, 100);
        assert_eq!(dc.depth(), 0);

        dc.state.line_width = 4.0;
        dc.save();
        dc.state.line_width = 9.0;
        dc.save();
        assert_eq!(dc.depth(), 2);

        assert!(dc.restore());
        assert_eq!(dc.state.line_width, 4.0);
        assert!(dc.restore());
        assert_eq!(dc.depth(), 0);
        assert!(!dc.restore());
    }

    #[test]
    fn test_mapping_needs_both_extents() {
        let mut dc = DeviceContext::new(200, 100);
        assert!(dc.mapping_scale().is_none());

        dc.window_ext = Some(SizeL { cx: 100, cy: 50 });
        assert!(dc.mapping_scale().is_none());

        dc.viewport_ext = Some(SizeL { cx: 200, cy: 200 });
        assert_eq!(dc.mapping_scale(), Some((2.0, 4.0)));
    }

    #[test]
    fn test_metric_modes_scale_to_canvas() {
        let mut dc = DeviceContext::new(300, 150);
        dc.map_mode = map_mode::MM_HIMETRIC;
        dc.window_ext = Some(SizeL { cx: 100, cy: 50 });
        dc.viewport_ext = Some(SizeL { cx: 1, cy: 1 });
        assert_eq!(dc.mapping_scale(), Some((3.0, 3.0)));
    }

    #[test]
    fn test_zero_window_extent_is_ignored() {
        let mut dc = DeviceContext::new(100, 100);
        dc.window_ext = Some(SizeL { cx: 0, cy: 10 });
        dc.viewport_ext = Some(SizeL { cx: 10, cy: 10 });
        assert!(dc.mapping_scale().is_none());
    }
}
