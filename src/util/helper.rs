use std::collections::BTreeMap;

use quick_xml::events::BytesStart;
use tiny_skia::Transform;

use crate::state::{BlendMode, LineCap, LineJoin};

/// Attributes of a single element. Keys are kept sorted so that the written
/// markup is stable between runs.
pub type Attributes = BTreeMap<&'static str, String>;

/// Format a number the way every coordinate, size and offset in the output is
/// written: at most three decimals, no trailing zeros, integers without a dot.
/// Non-finite values have no SVG representation and are written as `0`.
pub fn format_number(value: f32) -> String {
    if !value.is_finite() {
        log::warn!("cannot write non-finite number {value}, writing 0 instead");
        return "0".to_string();
    }

    let value = value as f64;
    // Large floats are integral already and would lose precision when scaled.
    let rounded =
        if value.fract() == 0.0 { value } else { (value * 1000.0).round() / 1000.0 };
    if rounded == 0.0 {
        // `-0` included.
        "0".to_string()
    } else if rounded == rounded.trunc() {
        format!("{rounded}")
    } else {
        let formatted = format!("{:.3}", rounded);
        formatted.trim_end_matches('0').to_string()
    }
}

/// Extension trait to convert a [Transform] into a SVG transform attribute.
pub trait TransformExt {
    fn to_svg_matrix(&self) -> String;
}

impl TransformExt for Transform {
    fn to_svg_matrix(&self) -> String {
        let values = [self.sx, self.ky, self.kx, self.sy, self.tx, self.ty];
        let values: Vec<String> = values.iter().map(|v| format_number(*v)).collect();
        format!("matrix({})", values.join(","))
    }
}

pub trait LineCapExt {
    fn to_svg_line_cap(&self) -> &'static str;
}

impl LineCapExt for LineCap {
    fn to_svg_line_cap(&self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Square => "square",
            LineCap::Round => "round",
        }
    }
}

pub trait LineJoinExt {
    fn to_svg_line_join(&self) -> &'static str;
}

impl LineJoinExt for LineJoin {
    fn to_svg_line_join(&self) -> &'static str {
        match self {
            LineJoin::Miter => "miter",
            LineJoin::Round => "round",
            LineJoin::Bevel => "bevel",
        }
    }
}

/// Extension trait to turn a [BlendMode] into a CSS `mix-blend-mode` value.
pub trait BlendModeExt {
    fn to_css_blend_mode(&self) -> &'static str;
}

impl BlendModeExt for BlendMode {
    fn to_css_blend_mode(&self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::ColorDodge => "color-dodge",
            BlendMode::ColorBurn => "color-burn",
            BlendMode::HardLight => "hard-light",
            BlendMode::SoftLight => "soft-light",
            BlendMode::Difference => "difference",
            BlendMode::Exclusion => "exclusion",
            BlendMode::Hue => "hue",
            BlendMode::Saturation => "saturation",
            BlendMode::Color => "color",
            BlendMode::Luminosity => "luminosity",
        }
    }
}

/// Build the start tag of an element from an attribute map.
pub fn start_tag<'a>(name: &'a str, attributes: &Attributes) -> BytesStart<'a> {
    let mut tag = BytesStart::new(name);
    for (key, value) in attributes {
        tag.push_attribute((*key, value.as_str()));
    }
    tag
}

/// Shorthand for a `url(#id)` reference.
pub fn url(id: &str) -> String {
    format!("url(#{id})")
}

/// Mirror a y coordinate about the height of a page.
pub fn flip_y(y: f32, height: f32) -> f32 {
    height - y
}
