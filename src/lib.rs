/*! Record drawing commands and export them as SVG documents or animated GIFs.

A [`Drawing`] session holds the graphics state (colors, transform, clip,
gradient, shadow, text attributes) and forwards every drawing operation to an
export context:

- [`SvgContext`] writes one SVG document per page. On export either the last
  page or every page is written to disk.
- [`GifContext`] (feature `gif`) rasterizes every page and assembles the frames
  into a looping animation with gifsicle.

Things a format cannot represent, such as CMYK colors in SVG, are reported as
warnings through the `log` crate and on the session itself, and the drawing
carries on without them.

# Example
```no_run
use drawexport::{Color, Drawing, SvgContext};

let mut drawing = Drawing::new(SvgContext::new());
drawing.new_page(200.0, 200.0)?;
drawing.fill(Some(Color::rgb(1.0, 0.0, 0.0, 1.0)));
drawing.rect(10.0, 10.0, 100.0, 50.0)?;
drawing.save_image("out.svg", false)?;
# Ok::<(), drawexport::ExportError>(())
```
 */

mod assets;
mod bezier;
mod color;
mod drawing;
#[cfg(feature = "gif")]
mod gif;
#[cfg(feature = "gif")]
mod optimizer;
mod render;
mod state;
mod svg;
mod text;
mod util;

use std::path::PathBuf;

use thiserror::Error;

pub use assets::{ImageLoader, ImageResolver};
pub use bezier::BezierPath;
pub use color::{Color, SvgColorExt};
pub use drawing::{Drawing, ExportContext, Feature};
#[cfg(feature = "gif")]
pub use gif::{rasterize, write_animation, Frame, GifContext, GifOptions, DEFAULT_DELAY};
#[cfg(feature = "gif")]
pub use optimizer::Gifsicle;
pub use render::path::path_to_markup;
pub use state::{
    BlendMode, Gradient, GradientKind, GraphicsState, LineCap, LineJoin, Shadow, Stop,
};
pub use svg::{page_path, SvgContext};
pub use text::{
    FontTypesetter, FormattedString, TextAlign, TextLine, TextRun, TextSegment, TextStyle,
    Typesetter,
};
pub use tiny_skia::{Point, Transform};
pub use util::allocate::IdAllocator;
pub use util::context::DocumentState;
pub use util::helper::{format_number, TransformExt};

/// Errors that can occur while drawing or exporting.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("there is no page to draw on")]
    NoPage,
    #[error("page {0} has already been closed")]
    PageClosed(usize),
    #[error("gradient has {colors} colors but {locations} locations")]
    GradientStops { colors: usize, locations: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to load image {reference}: {source}")]
    Image {
        reference: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to parse frame: {0}")]
    Render(String),
    #[error("frame has an invalid size")]
    FrameSize,
    #[error("failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),
    #[error("gifsicle could not be found (looked in {})", display_paths(.0))]
    OptimizerNotFound(Vec<PathBuf>),
    #[error("gifsicle failed with exit code {}:\n{output}", display_code(.code))]
    Optimizer { code: Option<i32>, output: String },
    #[error("failed to fetch image {reference}: {message}")]
    Http { reference: String, message: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |code| code.to_string())
}

pub type Result<T> = std::result::Result<T, ExportError>;
