use crate::color::SvgColorExt;
use crate::state::{Gradient, GradientKind};
use crate::util::context::Page;
use crate::util::helper::{format_number, Attributes};
use crate::Result;

/// Write the definitions of a gradient into the page. The gradient is written
/// twice: once as is, and once mirrored about the page height with the
/// suffix `_flipped`, for use inside flipped coordinate systems such as text.
pub fn write_defs(page: &mut Page, gradient: &Gradient) -> Result<()> {
    page.begin("defs", &Attributes::new())?;
    write_gradient(page, gradient, &gradient.id)?;
    let flipped = gradient.flipped(page.height);
    write_gradient(page, &flipped, &format!("{}_flipped", gradient.id))?;
    page.end("defs")
}

fn write_gradient(page: &mut Page, gradient: &Gradient, id: &str) -> Result<()> {
    let mut attributes = Attributes::new();
    attributes.insert("id", id.to_string());
    attributes.insert("gradientUnits", "userSpaceOnUse".to_string());

    let name = match gradient.kind {
        GradientKind::Linear => {
            attributes.insert("x1", format_number(gradient.start.x));
            attributes.insert("y1", format_number(gradient.start.y));
            attributes.insert("x2", format_number(gradient.end.x));
            attributes.insert("y2", format_number(gradient.end.y));
            "linearGradient"
        }
        GradientKind::Radial { end_radius } => {
            attributes.insert("cx", format_number(gradient.end.x));
            attributes.insert("cy", format_number(gradient.end.y));
            attributes.insert("r", format_number(end_radius));
            attributes.insert("fx", format_number(gradient.start.x));
            attributes.insert("fy", format_number(gradient.start.y));
            "radialGradient"
        }
    };

    page.begin(name, &attributes)?;
    for stop in &gradient.stops {
        let mut stop_attributes = Attributes::new();
        stop_attributes.insert("offset", format_number(stop.position));
        if let Some(color) = stop.color.to_svg_color() {
            stop_attributes.insert("stop-color", color);
        }
        page.empty("stop", &stop_attributes)?;
    }
    page.end(name)
}
