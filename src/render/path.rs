use tiny_skia::{PathSegment, Point, Transform};

use super::{begin_clip, drawing_attributes, end_clip};
use crate::bezier::BezierPath;
use crate::state::GraphicsState;
use crate::util::context::Page;
use crate::util::helper::{format_number, url, TransformExt};
use crate::Result;

/// Fill and stroke the current path of the state.
pub fn render(page: &mut Page, state: &GraphicsState) -> Result<()> {
    if state.path.is_empty() {
        return Ok(());
    }

    begin_clip(page, state)?;

    let mut attributes = drawing_attributes(state);
    attributes.insert("d", path_to_markup(&state.path, None));
    attributes.insert("transform", state.transform.to_svg_matrix());
    if let Some(shadow) = &state.shadow {
        attributes.insert("filter", url(&shadow.id));
    }
    if let Some(gradient) = &state.gradient {
        attributes.insert("fill", url(&gradient.id));
    }
    page.empty("path", &attributes)?;

    end_clip(page, state)
}

/// Turn a path into SVG path data. The first point of every subpath is
/// absolute, everything after it is relative to the previous point.
pub fn path_to_markup(path: &BezierPath, transform: Option<&Transform>) -> String {
    // Taken from resvg
    fn calc(n1: f32, n2: f32) -> f32 {
        (n1 + n2 * 2.0) / 3.0
    }

    let transformed;
    let path = match transform {
        Some(transform) => {
            transformed = path.transformed(transform);
            &transformed
        }
        None => path,
    };

    let mut data = String::new();
    let mut previous = Point::from_xy(0.0, 0.0);
    let mut subpath_start = Point::from_xy(0.0, 0.0);

    let relative = |p: Point, previous: Point| {
        format!("{},{}", format_number(p.x - previous.x), format_number(p.y - previous.y))
    };

    for segment in path.segments() {
        match *segment {
            PathSegment::MoveTo(p) => {
                data.push_str(&format!("M{},{} ", format_number(p.x), format_number(p.y)));
                previous = p;
                subpath_start = p;
            }
            PathSegment::LineTo(p) => {
                data.push_str(&format!("l{} ", relative(p, previous)));
                previous = p;
            }
            PathSegment::QuadTo(p1, p2) => {
                // Quadratic curves are written as their cubic equivalent.
                let c1 = Point::from_xy(calc(previous.x, p1.x), calc(previous.y, p1.y));
                let c2 = Point::from_xy(calc(p2.x, p1.x), calc(p2.y, p1.y));
                data.push_str(&format!(
                    "c{},{},{} ",
                    relative(c1, previous),
                    relative(c2, previous),
                    relative(p2, previous)
                ));
                previous = p2;
            }
            PathSegment::CubicTo(p1, p2, p3) => {
                data.push_str(&format!(
                    "c{},{},{} ",
                    relative(p1, previous),
                    relative(p2, previous),
                    relative(p3, previous)
                ));
                previous = p3;
            }
            PathSegment::Close => {
                data.push_str("Z ");
                previous = subpath_start;
            }
        }
    }

    data
}
