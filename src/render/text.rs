use std::collections::BTreeMap;

use tiny_skia::Point;

use super::{begin_clip, drawing_attributes, end_clip, style};
use crate::color::SvgColorExt;
use crate::state::GraphicsState;
use crate::text::TextLine;
use crate::util::context::Page;
use crate::util::helper::{format_number, url, Attributes, TransformExt};
use crate::Result;

/// Write laid out lines as one `text` element with a `tspan` per run.
///
/// `origin` is the bottom-left corner of the text frame in user space. The
/// text element lives in a flipped coordinate system whose origin is placed so
/// that run positions can be given relative to the page height.
pub fn render(
    page: &mut Page,
    state: &GraphicsState,
    origin: Point,
    lines: &[TextLine],
) -> Result<()> {
    begin_clip(page, state)?;

    let defaults = drawing_attributes(state);
    let transform = state
        .transform
        .pre_translate(origin.x, origin.y + page.height)
        .pre_scale(1.0, -1.0);

    let mut attributes = Attributes::new();
    attributes.insert("text-anchor", "start".to_string());
    attributes.insert("transform", transform.to_svg_matrix());
    if let Some(shadow) = &state.shadow {
        attributes.insert("filter", url(&format!("{}_flipped", shadow.id)));
    }
    page.begin("text", &attributes)?;

    for line in lines {
        for run in &line.runs {
            let mut span = defaults.clone();
            if let Some(fill) = run.fill.to_svg_color() {
                span.insert("fill", fill);
            }
            if let Some(stroke) = run.stroke.to_svg_color() {
                span.insert("stroke", stroke);
                let width = run.stroke_width.unwrap_or(state.stroke_width);
                span.insert("stroke-width", format_number(width.abs()));
            }
            span.insert("font-family", run.font.clone());
            span.insert("font-size", format_number(run.font_size));

            if !run.open_type_features.is_empty() {
                let features = font_feature_settings(&run.open_type_features);
                span.insert("style", style(state, &[("font-feature-settings", features)]));
            }

            if let Some(gradient) = &state.gradient {
                span.insert("fill", url(&format!("{}_flipped", gradient.id)));
            }

            let x = line.origin.x + run.offset.x;
            let y = page.height - line.origin.y - run.offset.y + run.baseline_shift;
            span.insert("x", format_number(x));
            span.insert("y", format_number(y));

            page.text("tspan", &span, &run_text(&run.text))?;
        }
    }

    page.end("text")?;
    end_clip(page, state)
}

/// Trailing spaces and line breaks are not part of the emitted run text.
fn run_text(text: &str) -> String {
    text.trim_end_matches(' ').replace('\n', "")
}

/// Format OpenType features as a CSS `font-feature-settings` value.
fn font_feature_settings(features: &BTreeMap<String, bool>) -> String {
    features
        .iter()
        .map(|(tag, on)| if *on { format!("'{tag}'") } else { format!("'{tag}' off") })
        .collect::<Vec<_>>()
        .join(", ")
}
