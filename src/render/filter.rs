use crate::color::SvgColorExt;
use crate::state::Shadow;
use crate::util::context::Page;
use crate::util::helper::{format_number, Attributes};
use crate::Result;

/// Write the drop shadow filter of a shadow into the page, once as is and once
/// with the vertical offset negated under the `_flipped` suffix.
pub fn write_defs(page: &mut Page, shadow: &Shadow) -> Result<()> {
    page.begin("defs", &Attributes::new())?;
    write_filter(page, shadow, &shadow.id)?;
    write_filter(page, &shadow.flipped(), &format!("{}_flipped", shadow.id))?;
    page.end("defs")
}

fn write_filter(page: &mut Page, shadow: &Shadow, id: &str) -> Result<()> {
    // The filter region has to be large enough to not cut off the blur.
    let filter = attributes([
        ("id", id.to_string()),
        ("x", "-500%".to_string()),
        ("y", "-500%".to_string()),
        ("width", "1000%".to_string()),
        ("height", "1000%".to_string()),
    ]);
    page.begin("filter", &filter)?;

    let blur = attributes([
        ("in", "SourceAlpha".to_string()),
        ("stdDeviation", format_number(shadow.blur.max(0.0))),
    ]);
    page.empty("feGaussianBlur", &blur)?;

    let (dx, dy) = shadow.offset;
    let offset = attributes([
        ("dx", format_number(dx)),
        ("dy", format_number(dy)),
        ("result", "offsetblur".to_string()),
    ]);
    page.empty("feOffset", &offset)?;

    let mut flood = Attributes::new();
    if let Some(color) = shadow.color.to_svg_color() {
        flood.insert("flood-color", color);
    }
    page.empty("feFlood", &flood)?;

    let composite =
        attributes([("in2", "offsetblur".to_string()), ("operator", "in".to_string())]);
    page.empty("feComposite", &composite)?;

    // The shadow goes first so that it ends up beneath the source graphic.
    page.begin("feMerge", &Attributes::new())?;
    page.empty("feMergeNode", &Attributes::new())?;
    page.empty("feMergeNode", &attributes([("in", "SourceGraphic".to_string())]))?;
    page.end("feMerge")?;

    page.end("filter")
}

fn attributes<const N: usize>(pairs: [(&'static str, String); N]) -> Attributes {
    pairs.into_iter().collect()
}
