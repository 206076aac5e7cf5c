//! Paths as they are built by the drawing API.

use tiny_skia::{PathSegment, Point, Transform};

/// Control point distance for approximating a quarter circle with a cubic curve.
const KAPPA: f32 = 0.552_284_75;

/// An ordered list of drawing instructions with absolute coordinates in the
/// drawing model's coordinate space (origin bottom-left, y grows upwards).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BezierPath {
    segments: Vec<PathSegment>,
}

impl BezierPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.segments.push(PathSegment::MoveTo(Point::from_xy(x, y)));
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.segments.push(PathSegment::LineTo(Point::from_xy(x, y)));
    }

    /// Add a cubic curve with two control points.
    pub fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.segments.push(PathSegment::CubicTo(
            Point::from_xy(x1, y1),
            Point::from_xy(x2, y2),
            Point::from_xy(x, y),
        ));
    }

    /// Add a quadratic curve with one control point.
    pub fn qcurve_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.segments
            .push(PathSegment::QuadTo(Point::from_xy(x1, y1), Point::from_xy(x, y)));
    }

    pub fn close_path(&mut self) {
        self.segments.push(PathSegment::Close);
    }

    /// Add a closed rectangle.
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.move_to(x, y);
        self.line_to(x + width, y);
        self.line_to(x + width, y + height);
        self.line_to(x, y + height);
        self.close_path();
    }

    /// Add a closed ellipse inscribed in the given rectangle.
    pub fn oval(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let rx = width / 2.0;
        let ry = height / 2.0;
        let cx = x + rx;
        let cy = y + ry;
        let kx = rx * KAPPA;
        let ky = ry * KAPPA;

        self.move_to(cx + rx, cy);
        self.curve_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
        self.curve_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
        self.curve_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);
        self.curve_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
        self.close_path();
    }

    /// Add a polygon through the given points, optionally closed.
    pub fn polygon(&mut self, points: &[(f32, f32)], close: bool) {
        let Some(((x, y), rest)) = points.split_first() else {
            return;
        };
        self.move_to(*x, *y);
        for (x, y) in rest {
            self.line_to(*x, *y);
        }
        if close {
            self.close_path();
        }
    }

    /// Return a copy of the path with every point mapped through `transform`.
    pub fn transformed(&self, transform: &Transform) -> BezierPath {
        let segments = self
            .segments
            .iter()
            .map(|segment| match *segment {
                PathSegment::MoveTo(mut p) => {
                    transform.map_point(&mut p);
                    PathSegment::MoveTo(p)
                }
                PathSegment::LineTo(mut p) => {
                    transform.map_point(&mut p);
                    PathSegment::LineTo(p)
                }
                PathSegment::QuadTo(p1, p2) => {
                    let mut points = [p1, p2];
                    transform.map_points(&mut points);
                    PathSegment::QuadTo(points[0], points[1])
                }
                PathSegment::CubicTo(p1, p2, p3) => {
                    let mut points = [p1, p2, p3];
                    transform.map_points(&mut points);
                    PathSegment::CubicTo(points[0], points[1], points[2])
                }
                PathSegment::Close => PathSegment::Close,
            })
            .collect();

        BezierPath { segments }
    }
}
