pub mod clip_path;
pub mod filter;
pub mod gradient;
pub mod image;
pub mod path;
pub mod text;

use crate::color::SvgColorExt;
use crate::state::GraphicsState;
use crate::util::context::Page;
use crate::util::helper::{
    format_number, url, Attributes, BlendModeExt, LineCapExt, LineJoinExt,
};
use crate::Result;

/// Collect the paint attributes of the graphics state that apply to every
/// drawn element.
pub fn drawing_attributes(state: &GraphicsState) -> Attributes {
    let mut attributes = Attributes::new();
    if let Some(fill) = state.fill_color.to_svg_color() {
        attributes.insert("fill", fill);
    }
    if let Some(stroke) = state.stroke_color.to_svg_color() {
        attributes.insert("stroke", stroke);
        attributes.insert("stroke-width", format_number(state.stroke_width.abs()));
    }
    if let Some(dash) = state.line_dash.as_ref().filter(|dash| !dash.is_empty()) {
        let dash: Vec<String> = dash.iter().map(|v| format_number(*v)).collect();
        attributes.insert("stroke-dasharray", dash.join(","));
    }
    if let Some(join) = state.line_join {
        attributes.insert("stroke-linejoin", join.to_svg_line_join().to_string());
    }
    if let Some(cap) = state.line_cap {
        attributes.insert("stroke-linecap", cap.to_svg_line_cap().to_string());
    }
    if state.blend_mode.is_some() {
        attributes.insert("style", style(state, &[]));
    }
    attributes
}

/// Build a CSS style declaration list. The blend mode of the state always
/// comes first.
pub fn style(state: &GraphicsState, properties: &[(&str, String)]) -> String {
    let mut declarations = vec![];
    if let Some(mode) = state.blend_mode {
        declarations.push(format!("mix-blend-mode: {};", mode.to_css_blend_mode()));
    }
    for (key, value) in properties {
        declarations.push(format!("{key}: {value};"));
    }
    declarations.join(" ")
}

/// Wrap the following elements into a group referencing the active clip
/// path, if there is one.
pub fn begin_clip(page: &mut Page, state: &GraphicsState) -> Result<()> {
    if let Some(id) = &state.clip_path_id {
        let mut attributes = Attributes::new();
        attributes.insert("clip-path", url(id));
        page.begin("g", &attributes)?;
    }
    Ok(())
}

pub fn end_clip(page: &mut Page, state: &GraphicsState) -> Result<()> {
    if state.clip_path_id.is_some() {
        page.end("g")?;
    }
    Ok(())
}
