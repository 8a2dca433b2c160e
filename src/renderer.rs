//! Metafile playback: one pass over the record sequence, mutating the
//! device context and issuing draw calls against a [`Canvas`].

use crate::canvas::{self, Canvas, FillRule, PixmapCanvas};
use crate::device_context::{DeviceContext, PathState};
use crate::dib;
use crate::error::{Error, Result};
use crate::gdi::GdiObject;
use crate::parser::EmfFile;
use crate::records::bitmap::DibSection;
use crate::records::drawing::{ArcRecord, PolyPoly16};
use crate::records::state::ModifyWorldTransform;
use crate::records::types::{
    brush_style, map_mode, poly_fill_mode, world_transform_mode, PointS, RectL,
};
use crate::records::EmfRecord;
use image::{Rgba, RgbaImage};
use log::{debug, warn};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Guard against absurd canvas allocations from corrupt bounds.
const MAX_CANVAS_PIXELS: u64 = 1 << 26;

impl EmfFile {
    /// Rasterize the metafile into an RGBA image sized from the header
    /// bounds (inclusive-inclusive, so `width + 1` by `height + 1`).
    pub fn render(&self) -> Result<RgbaImage> {
        let width = self.header.width();
        let height = self.header.height();
        if width as u64 * height as u64 > MAX_CANVAS_PIXELS {
            return Err(Error::Malformed(format!(
                "canvas dimensions {width}x{height} out of range"
            )));
        }
        let mut canvas = PixmapCanvas::new(width, height)
            .ok_or_else(|| Error::Malformed(format!("invalid canvas dimensions {width}x{height}")))?;
        self.play(&mut canvas)?;
        Ok(canvas.into_image())
    }

    /// Play every record against a caller-supplied canvas sized to the
    /// header bounds.
    pub fn play(&self, canvas: &mut dyn Canvas) -> Result<()> {
        let mut dc = DeviceContext::new(self.header.width(), self.header.height());

        let bounds = self.header.bounds;
        if bounds.left != 0 || bounds.top != 0 {
            canvas.translate(-bounds.left as f64, -bounds.top as f64);
        }

        for record in &self.records {
            play_record(record, &mut dc, canvas);
        }

        if dc.depth() != 0 {
            warn!("unbalanced save/restore: {} contexts still saved", dc.depth());
        }
        Ok(())
    }
}

fn play_record(record: &EmfRecord, dc: &mut DeviceContext, canvas: &mut dyn Canvas) {
    match record {
        EmfRecord::SetWindowExtEx(extent) => {
            dc.window_ext = Some(*extent);
            apply_transformation(dc, canvas);
        }
        EmfRecord::SetWindowOrgEx(origin) => {
            dc.window_org = Some(*origin);
            apply_transformation(dc, canvas);
        }
        EmfRecord::SetViewportExtEx(extent) => {
            dc.viewport_ext = Some(*extent);
            apply_transformation(dc, canvas);
        }
        EmfRecord::SetViewportOrgEx(origin) => {
            dc.viewport_org = Some(*origin);
            apply_transformation(dc, canvas);
        }
        EmfRecord::SetMapMode(mode) => set_map_mode(*mode, dc, canvas),
        EmfRecord::SetBkMode(mode) => dc.state.bk_mode = *mode,
        EmfRecord::SetPolyFillMode(mode) => {
            let rule = if *mode == poly_fill_mode::WINDING {
                FillRule::Winding
            } else {
                FillRule::EvenOdd
            };
            dc.state.fill_rule = rule;
            canvas.set_fill_rule(rule);
        }
        EmfRecord::SetStretchBltMode(mode) => dc.state.stretch_blt_mode = *mode,
        EmfRecord::SetTextAlign(align) => dc.state.text_align = *align,
        EmfRecord::SetTextColor(color) => dc.state.text_color = color.to_rgba(),
        EmfRecord::SetBkColor(color) => dc.state.bk_color = color.to_rgba(),
        EmfRecord::SetIcmMode(_) => {}

        EmfRecord::MoveToEx(point) => {
            dc.state.current_point = (point.x as f64, point.y as f64);
            canvas.move_to(point.x as f64, point.y as f64);
        }
        EmfRecord::LineTo(point) => {
            dc.state.current_point = (point.x as f64, point.y as f64);
            canvas.line_to(point.x as f64, point.y as f64);
        }

        EmfRecord::IntersectClipRect(_) | EmfRecord::SelectClipPath(_) => {
            debug!("clip record ignored");
        }

        EmfRecord::SaveDc => {
            dc.save();
            canvas.save();
        }
        EmfRecord::RestoreDc(_) => {
            if !dc.restore() {
                warn!("restore with no saved device context");
            }
            canvas.restore();
        }

        EmfRecord::SetWorldTransform(xform) => {
            canvas.set_matrix_transform(xform.to_matrix());
        }
        EmfRecord::ModifyWorldTransform(modify) => {
            modify_world_transform(modify, canvas);
        }

        EmfRecord::SelectObject(handle) => select_object(*handle, dc, canvas),
        EmfRecord::CreatePen { handle, pen } => {
            dc.objects.insert(*handle, GdiObject::Pen(*pen));
        }
        EmfRecord::CreateBrushIndirect { handle, brush } => {
            dc.objects.insert(*handle, GdiObject::Brush(*brush));
        }
        EmfRecord::ExtCreatePen { handle, pen } => {
            dc.objects.insert(*handle, GdiObject::PenEx(pen.clone()));
        }
        EmfRecord::ExtCreateFontIndirectW { handle, font } => {
            dc.objects.insert(*handle, GdiObject::Font(font.clone()));
        }
        EmfRecord::DeleteObject(handle) => dc.objects.delete(*handle),

        EmfRecord::Rectangle(rect) => {
            canvas.begin_path();
            canvas.move_to(rect.left as f64, rect.top as f64);
            canvas.line_to(rect.right as f64, rect.top as f64);
            canvas.line_to(rect.right as f64, rect.bottom as f64);
            canvas.line_to(rect.left as f64, rect.bottom as f64);
            canvas.close();
            canvas.fill_stroke();
        }
        EmfRecord::Arc(arc) => draw_arc(arc, canvas),

        EmfRecord::BeginPath => {
            dc.state.path_state = PathState::Building;
            canvas.begin_path();
        }
        EmfRecord::EndPath => {
            dc.state.path_state = PathState::Inactive;
            canvas.close();
        }
        EmfRecord::CloseFigure => canvas.close(),
        EmfRecord::FillPath(_) => canvas.fill(),
        EmfRecord::StrokePath(_) => canvas.stroke(),
        EmfRecord::StrokeAndFillPath(_) => canvas.fill_stroke(),

        EmfRecord::Polyline16(poly) => {
            trace_polyline(&poly.points, canvas);
        }
        EmfRecord::Polygon16(poly) => {
            canvas.begin_path();
            trace_polyline(&poly.points, canvas);
            canvas.close();
            canvas.fill_stroke();
        }
        EmfRecord::PolyPolygon16(poly) => draw_poly_polygon(poly, canvas),
        EmfRecord::PolyBezier16(poly) => {
            if let Some((first, rest)) = poly.points.split_first() {
                canvas.move_to(first.x as f64, first.y as f64);
                trace_beziers(rest, canvas);
            }
        }
        EmfRecord::PolyBezierTo16(poly) => trace_beziers(&poly.points, canvas),
        EmfRecord::PolyLineTo16(poly) => {
            for point in &poly.points {
                canvas.line_to(point.x as f64, point.y as f64);
            }
        }

        EmfRecord::BitBlt(blt) | EmfRecord::StretchBlt(blt) => {
            draw_dib(blt.dib.as_ref(), blt.bounds, canvas);
        }
        EmfRecord::StretchDiBits(record) => {
            draw_dib(record.dib.as_ref(), record.bounds, canvas);
        }

        // Parsed for state tracking; glyph rendering is out of scope
        EmfRecord::ExtTextOutW(_) => {}

        EmfRecord::Comment | EmfRecord::Skipped { .. } | EmfRecord::Unknown { .. } => {}
    }
}

/// Re-apply the window→viewport scale whenever a mapping input changes and
/// both extents are known.
fn apply_transformation(dc: &DeviceContext, canvas: &mut dyn Canvas) {
    if let Some((sx, sy)) = dc.mapping_scale() {
        canvas.scale(sx, sy);
    }
}

fn set_map_mode(mode: u32, dc: &mut DeviceContext, canvas: &mut dyn Canvas) {
    dc.map_mode = mode;
    match mode {
        map_mode::MM_LOMETRIC
        | map_mode::MM_HIMETRIC
        | map_mode::MM_LOENGLISH
        | map_mode::MM_HIENGLISH
        | map_mode::MM_TWIPS => {
            // Metric modes run the y axis upwards: flip it and drop the
            // origin to the bottom edge. The translation component is
            // written directly; a translate call would be scaled by any
            // mapping already applied.
            canvas.scale(1.0, -1.0);
            let mut matrix = canvas.matrix_transform();
            matrix[5] = dc.canvas_height as f64;
            canvas.set_matrix_transform(matrix);
        }
        _ => {}
    }
}

fn modify_world_transform(modify: &ModifyWorldTransform, canvas: &mut dyn Canvas) {
    let xform = modify.xform.to_matrix();
    match modify.mode {
        world_transform_mode::MWT_IDENTITY => canvas.set_matrix_transform(canvas::IDENTITY),
        world_transform_mode::MWT_LEFTMULTIPLY => {
            let matrix = canvas::multiply(&xform, &canvas.matrix_transform());
            canvas.set_matrix_transform(matrix);
        }
        world_transform_mode::MWT_RIGHTMULTIPLY => {
            let matrix = canvas::multiply(&canvas.matrix_transform(), &xform);
            canvas.set_matrix_transform(matrix);
        }
        world_transform_mode::MWT_SET => canvas.set_matrix_transform(xform),
        other => {
            warn!("unknown world transform mode {other}; treating as set");
            canvas.set_matrix_transform(xform);
        }
    }
}

fn select_object(handle: u32, dc: &mut DeviceContext, canvas: &mut dyn Canvas) {
    let Some(object) = dc.objects.resolve(handle) else {
        warn!("object {handle:#x} not found");
        return;
    };
    match object {
        GdiObject::NullPen => {
            dc.state.stroke_color = TRANSPARENT;
            canvas.set_stroke_color(TRANSPARENT);
        }
        GdiObject::NullBrush => {
            dc.state.fill_color = TRANSPARENT;
            canvas.set_fill_color(TRANSPARENT);
        }
        GdiObject::Pen(pen) => {
            let width = pen.width.x.max(1) as f64;
            dc.state.stroke_color = pen.color.to_rgba();
            dc.state.line_width = width;
            canvas.set_stroke_color(pen.color.to_rgba());
            canvas.set_line_width(width);
        }
        GdiObject::PenEx(pen) => {
            let width = pen.width.max(1) as f64;
            dc.state.stroke_color = pen.color.to_rgba();
            dc.state.line_width = width;
            canvas.set_stroke_color(pen.color.to_rgba());
            canvas.set_line_width(width);
        }
        GdiObject::Brush(brush) => {
            let color = if brush.style == brush_style::BS_NULL {
                TRANSPARENT
            } else {
                brush.color.to_rgba()
            };
            dc.state.fill_color = color;
            canvas.set_fill_color(color);
        }
        GdiObject::Font(font) => dc.state.font = Some(font),
    }
}

fn trace_polyline(points: &[PointS], canvas: &mut dyn Canvas) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    canvas.move_to(first.x as f64, first.y as f64);
    for point in rest {
        canvas.line_to(point.x as f64, point.y as f64);
    }
}

/// Consume control points in cubic triplets; a trailing partial group is
/// dropped.
fn trace_beziers(points: &[PointS], canvas: &mut dyn Canvas) {
    for triple in points.chunks_exact(3) {
        canvas.cubic_curve_to(
            triple[0].x as f64,
            triple[0].y as f64,
            triple[1].x as f64,
            triple[1].y as f64,
            triple[2].x as f64,
            triple[2].y as f64,
        );
    }
}

fn draw_poly_polygon(poly: &PolyPoly16, canvas: &mut dyn Canvas) {
    canvas.begin_path();
    let mut offset = 0usize;
    for count in &poly.counts {
        let count = *count as usize;
        let Some(points) = poly.points.get(offset..offset + count) else {
            break;
        };
        trace_polyline(points, canvas);
        canvas.close();
        offset += count;
    }
    canvas.fill_stroke();
}

fn draw_arc(arc: &ArcRecord, canvas: &mut dyn Canvas) {
    let rx = (arc.bounds.width() - 1).max(0) as f64 / 2.0;
    let ry = (arc.bounds.height() - 1).max(0) as f64 / 2.0;
    let cx = arc.bounds.left as f64 + rx;
    let cy = arc.bounds.top as f64 + ry;

    let start = (arc.start.y as f64 - cy).atan2(arc.start.x as f64 - cx);
    let end = (arc.end.y as f64 - cy).atan2(arc.end.x as f64 - cx);
    let mut sweep = end - start;
    if sweep <= 0.0 {
        sweep += std::f64::consts::TAU;
    }

    canvas.begin_path();
    canvas.arc_to(cx, cy, rx, ry, start, sweep);
    canvas.stroke();
}

/// Place an embedded bitmap: the destination comes from the record bounds
/// shifted by the current translation. Shear and rotation are not applied
/// to raster placement.
fn draw_dib(dib: Option<&DibSection>, bounds: RectL, canvas: &mut dyn Canvas) {
    let Some(dib) = dib else {
        debug!("raster record without bitmap data");
        return;
    };
    let Some(image) = dib::decode(&dib.header, &dib.bits) else {
        return;
    };

    let matrix = canvas.matrix_transform();
    let (tx, ty) = (matrix[4].round() as i32, matrix[5].round() as i32);
    let dest = RectL {
        left: bounds.left + tx,
        top: bounds.top + ty,
        right: bounds.right + tx,
        bottom: bounds.bottom + ty,
    };
    canvas.blit(dest, &image);
}
