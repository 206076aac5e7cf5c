/*! The animated GIF export context.

Pages are recorded as SVG and rasterized when the image is saved. A single page
is written as a plain GIF. More pages are written as single frame GIFs into a
temporary directory and merged into a looping animation by gifsicle. The
temporary directory is removed on every exit path.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use fontdb::Database;
use image::{ImageFormat, RgbaImage};
use tiny_skia::{Point, Transform};

use crate::drawing::{ExportContext, Feature};
use crate::optimizer::Gifsicle;
use crate::state::{Gradient, GraphicsState, Shadow};
use crate::svg::SvgContext;
use crate::text::TextLine;
use crate::util::allocate::IdAllocator;
use crate::util::context::DocumentState;
use crate::{ExportError, Result};

/// Delay of a frame that has no explicit duration, in hundredths of a second.
pub const DEFAULT_DELAY: u32 = 10;

/// Settings for writing animations.
#[derive(Debug, Clone, Default)]
pub struct GifOptions {
    /// The gifsicle binary. Searched in the usual places if not set.
    pub optimizer: Option<PathBuf>,
    /// Where temporary frames are written. Defaults to the system temp dir.
    pub temp_dir: Option<PathBuf>,
    /// Fonts for rasterizing text. Defaults to the system fonts.
    pub fontdb: Option<Arc<Database>>,
}

/// One frame of an animation: an SVG document and its delay.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub markup: String,
    pub delay: u32,
}

pub struct GifContext {
    svg: SvgContext,
    delays: Vec<u32>,
    options: GifOptions,
}

impl Default for GifContext {
    fn default() -> Self {
        Self::new(GifOptions::default())
    }
}

impl GifContext {
    pub fn new(options: GifOptions) -> Self {
        Self::with_ids(options, IdAllocator::random())
    }

    pub fn with_ids(options: GifOptions, ids: IdAllocator) -> Self {
        Self { svg: SvgContext::with_ids(ids), delays: vec![], options }
    }

    /// The delay of every page in hundredths of a second.
    pub fn delays(&self) -> &[u32] {
        &self.delays
    }

    /// The recorded pages as frames.
    pub fn frames(&self) -> Vec<Frame> {
        self.svg
            .markup()
            .into_iter()
            .zip(&self.delays)
            .map(|(markup, delay)| Frame { markup, delay: *delay })
            .collect()
    }
}

impl ExportContext for GifContext {
    fn name(&self) -> &'static str {
        "gif"
    }

    fn supports(&self, feature: Feature) -> bool {
        // CMYK colors are converted to RGB before rasterization.
        feature == Feature::Cmyk
    }

    fn document_state(&self) -> DocumentState {
        self.svg.document_state()
    }

    fn new_page(&mut self, width: f32, height: f32) -> Result<Transform> {
        let transform = self.svg.new_page(width, height)?;
        self.delays.push(DEFAULT_DELAY);
        Ok(transform)
    }

    fn frame_duration(&mut self, seconds: f32) {
        if let Some(delay) = self.delays.last_mut() {
            *delay = (seconds * 100.0) as u32;
        }
    }

    fn alloc_id(&mut self) -> String {
        self.svg.alloc_id()
    }

    fn write_gradient(&mut self, gradient: &Gradient) -> Result<()> {
        self.svg.write_gradient(gradient)
    }

    fn write_shadow(&mut self, shadow: &Shadow) -> Result<()> {
        self.svg.write_shadow(shadow)
    }

    fn draw_path(&mut self, state: &GraphicsState) -> Result<()> {
        self.svg.draw_path(state)
    }

    fn clip_path(&mut self, state: &mut GraphicsState) -> Result<()> {
        self.svg.clip_path(state)
    }

    fn draw_text(
        &mut self,
        state: &GraphicsState,
        origin: Point,
        lines: &[TextLine],
    ) -> Result<()> {
        self.svg.draw_text(state, origin, lines)
    }

    fn draw_image(
        &mut self,
        state: &GraphicsState,
        reference: &str,
        position: Point,
        size: (f32, f32),
        alpha: f32,
    ) -> Result<()> {
        self.svg.draw_image(state, reference, position, size, alpha)
    }

    fn save_image(&mut self, path: &Path, _multipage: bool) -> Result<()> {
        self.svg.finish()?;
        write_animation(&self.frames(), path, &self.options)
    }
}

/// Rasterize `frames` and write them to `path`, as an animation if there is
/// more than one.
pub fn write_animation(frames: &[Frame], path: &Path, options: &GifOptions) -> Result<()> {
    let fontdb = options.fontdb.clone().unwrap_or_else(|| {
        let mut fontdb = Database::new();
        fontdb.load_system_fonts();
        Arc::new(fontdb)
    });

    match frames {
        [] => Err(ExportError::NoPage),
        [frame] => {
            rasterize(&frame.markup, &fontdb)?.save_with_format(path, ImageFormat::Gif)?;
            Ok(())
        }
        frames => {
            let gifsicle = Gifsicle::locate(options.optimizer.as_deref())?;

            let builder = {
                let mut builder = tempfile::Builder::new();
                builder.prefix("drawexport-");
                builder
            };
            let dir = match &options.temp_dir {
                Some(parent) => builder.tempdir_in(parent)?,
                None => builder.tempdir()?,
            };

            let mut inputs = Vec::with_capacity(frames.len());
            for (index, frame) in frames.iter().enumerate() {
                let input = dir.path().join(format!("frame-{}.gif", index + 1));
                rasterize(&frame.markup, &fontdb)?.save_with_format(&input, ImageFormat::Gif)?;
                inputs.push((input, frame.delay));
            }

            log::debug!("merging {} frames into {}", inputs.len(), path.display());
            let result = gifsicle.run(&inputs, path);
            // The gifsicle error takes precedence over the cleanup error.
            let cleanup = dir.close();
            result?;
            cleanup?;
            Ok(())
        }
    }
}

/// Render an SVG document into an image of its own size.
pub fn rasterize(markup: &str, fontdb: &Arc<Database>) -> Result<RgbaImage> {
    let options = usvg::Options { fontdb: fontdb.clone(), ..usvg::Options::default() };
    let tree = usvg::Tree::from_str(markup, &options)
        .map_err(|err| ExportError::Render(err.to_string()))?;

    let size = tree.size().to_int_size();
    let mut pixmap =
        tiny_skia::Pixmap::new(size.width(), size.height()).ok_or(ExportError::FrameSize)?;
    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let color = pixel.demultiply();
            [color.red(), color.green(), color.blue(), color.alpha()]
        })
        .collect();
    RgbaImage::from_raw(size.width(), size.height(), data).ok_or(ExportError::FrameSize)
}
