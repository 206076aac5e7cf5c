use tiny_skia::Point;

use super::{begin_clip, end_clip};
use crate::state::GraphicsState;
use crate::util::context::Page;
use crate::util::helper::{format_number, Attributes, TransformExt};
use crate::Result;

/// Place an image by reference. The image data itself is not embedded; the
/// element links to the original reference.
pub fn render(
    page: &mut Page,
    state: &GraphicsState,
    reference: &str,
    position: Point,
    size: (f32, f32),
    alpha: f32,
) -> Result<()> {
    begin_clip(page, state)?;

    let (width, height) = size;
    let transform = state
        .transform
        .pre_translate(position.x, position.y + height)
        .pre_scale(1.0, -1.0);

    let mut attributes = Attributes::new();
    attributes.insert("x", "0".to_string());
    attributes.insert("y", "0".to_string());
    attributes.insert("width", format_number(width));
    attributes.insert("height", format_number(height));
    attributes.insert("opacity", format_number(alpha));
    attributes.insert("transform", transform.to_svg_matrix());
    attributes.insert("xlink:href", reference.to_string());
    page.empty("image", &attributes)?;

    end_clip(page, state)
}
