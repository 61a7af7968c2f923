//! Procedural sprite painting on a `tiny_skia::Pixmap`.
//!
//! Anti-aliasing is off for every shape, so the same sequence of calls always
//! produces byte-identical pixmaps. All coordinates are in pixels with `y`
//! growing downwards; shapes that extend past the edges are clipped.

use glam::Vec2;
use image::RgbaImage;
use std::f32::consts::{FRAC_PI_2, PI, TAU};
use tiny_skia::{
    Color, FillRule, LineCap, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform,
};

/// `0xRRGGBB` to an opaque colour.
pub fn rgb(hex: u32) -> Color {
    Color::from_rgba8((hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 0xff)
}

/// Pixmap plus the current fill colour.
pub struct Canvas {
    pixmap: Pixmap,
    paint: Paint<'static>,
}

impl Canvas {
    /// Transparent canvas. `None` for a zero-sized surface.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        let pixmap = Pixmap::new(width, height)?;
        let mut paint = Paint::default();
        paint.anti_alias = false;
        paint.set_color(Color::BLACK);
        Some(Self { pixmap, paint })
    }

    pub fn set_fill(&mut self, color: Color) {
        self.paint.set_color(color);
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        if let Some(rect) = Rect::from_xywh(x, y, w, h) {
            self.pixmap
                .fill_rect(rect, &self.paint, Transform::identity(), None);
        }
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, r: f32) {
        if let Some(path) = PathBuilder::from_circle(cx, cy, r) {
            self.fill(&path, FillRule::Winding);
        }
    }

    /// Fill the upper half of a disc (the half with `y <= cy`).
    pub fn fill_upper_half_disc(&mut self, cx: f32, cy: f32, r: f32) {
        let mut pb = PathBuilder::new();
        pb.move_to(cx - r, cy);
        push_arc(&mut pb, Vec2::new(cx, cy), r, PI, TAU);
        pb.close();
        if let Some(path) = pb.finish() {
            self.fill(&path, FillRule::Winding);
        }
    }

    /// Even-odd fill of a closed polygon.
    pub fn fill_polygon(&mut self, points: &[Vec2]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(first.x, first.y);
        for p in rest {
            pb.line_to(p.x, p.y);
        }
        pb.close();
        if let Some(path) = pb.finish() {
            self.fill(&path, FillRule::EvenOdd);
        }
    }

    /// Straight stroke with round caps.
    pub fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.x, from.y);
        pb.line_to(to.x, to.y);
        if let Some(path) = pb.finish() {
            self.stroke(&path, width, LineCap::Round);
        }
    }

    /// Stroke of the arc from `start` to `end` radians, clockwise on screen.
    pub fn stroke_arc(&mut self, cx: f32, cy: f32, r: f32, start: f32, end: f32, width: f32) {
        let centre = Vec2::new(cx, cy);
        let from = centre + r * Vec2::from_angle(start);
        let mut pb = PathBuilder::new();
        pb.move_to(from.x, from.y);
        push_arc(&mut pb, centre, r, start, end);
        if let Some(path) = pb.finish() {
            self.stroke(&path, width, LineCap::Butt);
        }
    }

    fn fill(&mut self, path: &Path, rule: FillRule) {
        self.pixmap
            .fill_path(path, &self.paint, rule, Transform::identity(), None);
    }

    fn stroke(&mut self, path: &Path, width: f32, line_cap: LineCap) {
        let stroke = Stroke {
            width,
            line_cap,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(path, &self.paint, &stroke, Transform::identity(), None);
    }
}

/// Append a circular arc as cubic segments of at most a quarter turn each.
/// The builder's current point must already sit on the arc start.
fn push_arc(pb: &mut PathBuilder, centre: Vec2, r: f32, start: f32, end: f32) {
    let sweep = end - start;
    let segments = (sweep.abs() / FRAC_PI_2).ceil().max(1.0) as u32;
    let step = sweep / segments as f32;
    let k = 4.0 / 3.0 * (step / 4.0).tan();
    for i in 0..segments {
        let a0 = start + step * i as f32;
        let a1 = a0 + step;
        let (d0, d1) = (Vec2::from_angle(a0), Vec2::from_angle(a1));
        let p0 = centre + r * d0;
        let p3 = centre + r * d1;
        let c1 = p0 + k * r * d0.perp();
        let c2 = p3 - k * r * d1.perp();
        pb.cubic_to(c1.x, c1.y, c2.x, c2.y, p3.x, p3.y);
    }
}

/// Straight-alpha copy of a pixmap for PNG encoding.
pub fn to_rgba_image(pixmap: &Pixmap) -> Option<RgbaImage> {
    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
}
