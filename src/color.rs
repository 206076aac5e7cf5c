use crate::util::helper::format_number;

/// A color as it is set by the drawing API. Channel values are between 0.0
/// and 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    /// A gray value with alpha.
    Gray { white: f32, alpha: f32 },
    /// A calibrated RGB color.
    Rgb { red: f32, green: f32, blue: f32, alpha: f32 },
    /// A CMYK color. Formats without CMYK support see it converted to RGB.
    Cmyk { cyan: f32, magenta: f32, yellow: f32, key: f32, alpha: f32 },
}

impl Color {
    /// Create a gray color.
    pub fn gray(white: f32, alpha: f32) -> Self {
        Color::Gray { white, alpha }
    }

    /// Create a RGB color.
    pub fn rgb(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Color::Rgb { red, green, blue, alpha }
    }

    /// Create a CMYK color.
    pub fn cmyk(cyan: f32, magenta: f32, yellow: f32, key: f32, alpha: f32) -> Self {
        Color::Cmyk { cyan, magenta, yellow, key, alpha }
    }

    /// Opaque black.
    pub fn black() -> Self {
        Color::rgb(0.0, 0.0, 0.0, 1.0)
    }

    /// Convert the color into RGB components with alpha.
    pub fn to_rgba(&self) -> [f32; 4] {
        match *self {
            Color::Gray { white, alpha } => [white, white, white, alpha],
            Color::Rgb { red, green, blue, alpha } => [red, green, blue, alpha],
            Color::Cmyk { cyan, magenta, yellow, key, alpha } => [
                (1.0 - cyan) * (1.0 - key),
                (1.0 - magenta) * (1.0 - key),
                (1.0 - yellow) * (1.0 - key),
                alpha,
            ],
        }
    }
}

fn channel(value: f32) -> u8 {
    (255.0 * value.clamp(0.0, 1.0)).round() as u8
}

/// Alpha is written as the unrounded fraction.
fn alpha(value: f32) -> String {
    if value.is_finite() {
        format!("{value}")
    } else {
        format_number(value)
    }
}

/// Extension trait to convert colors into SVG paint values.
pub trait SvgColorExt {
    /// Format as `rgba(r,g,b,a)`, or `None` if there is no color at all.
    fn to_svg_color(&self) -> Option<String>;
}

impl SvgColorExt for Color {
    fn to_svg_color(&self) -> Option<String> {
        // Gray values are replicated into all three channels, everything
        // else goes through RGB first.
        let [r, g, b, a] = self.to_rgba();
        Some(format!(
            "rgba({},{},{},{})",
            channel(r),
            channel(g),
            channel(b),
            alpha(a)
        ))
    }
}

impl SvgColorExt for Option<Color> {
    fn to_svg_color(&self) -> Option<String> {
        self.as_ref().and_then(|color| color.to_svg_color())
    }
}
