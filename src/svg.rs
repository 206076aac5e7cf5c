/*! The SVG export context.

Every page becomes a standalone SVG document. Coordinates of the drawing model
(origin bottom-left, y up) are mapped into SVG space (origin top-left, y down)
by the transform every page starts with, so path data is written as is and the
current transform goes into a `matrix(...)` attribute.

Gradients and shadows are written into a `defs` block of the current page the
moment they are created. Each of them is written a second time with the suffix
`_flipped` for elements that live in a flipped coordinate system, such as text.
 */

use std::path::{Path, PathBuf};

use tiny_skia::{Point, Transform};

use crate::drawing::{ExportContext, Feature};
use crate::render;
use crate::state::{Gradient, GraphicsState, Shadow};
use crate::text::TextLine;
use crate::util::allocate::IdAllocator;
use crate::util::context::{Context, DocumentState};
use crate::{ExportError, Result};

pub struct SvgContext {
    context: Context,
}

impl Default for SvgContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgContext {
    /// A context with random resource identifiers.
    pub fn new() -> Self {
        Self::with_ids(IdAllocator::random())
    }

    /// A context taking its resource identifiers from `ids`.
    pub fn with_ids(ids: IdAllocator) -> Self {
        Self { context: Context::new(ids) }
    }

    /// The markup of every page written so far. Pages that are still open
    /// lack their closing root tag.
    pub fn markup(&self) -> Vec<String> {
        self.context.pages().iter().map(|page| page.markup().into_owned()).collect()
    }

    /// The size of every page.
    pub fn page_sizes(&self) -> Vec<(f32, f32)> {
        self.context.pages().iter().map(|page| (page.width, page.height)).collect()
    }

    /// Close the current page. Nothing can be drawn afterwards until a new
    /// page is started.
    pub fn finish(&mut self) -> Result<()> {
        self.context.close()
    }
}

impl ExportContext for SvgContext {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn supports(&self, _feature: Feature) -> bool {
        false
    }

    fn document_state(&self) -> DocumentState {
        self.context.state()
    }

    fn new_page(&mut self, width: f32, height: f32) -> Result<Transform> {
        self.context.new_page(width, height)?;
        Ok(Transform::from_scale(1.0, -1.0).pre_translate(0.0, -height))
    }

    fn alloc_id(&mut self) -> String {
        self.context.alloc_id()
    }

    fn write_gradient(&mut self, gradient: &Gradient) -> Result<()> {
        log::debug!("writing gradient {}", gradient.id);
        render::gradient::write_defs(self.context.current_page()?, gradient)
    }

    fn write_shadow(&mut self, shadow: &Shadow) -> Result<()> {
        log::debug!("writing shadow {}", shadow.id);
        render::filter::write_defs(self.context.current_page()?, shadow)
    }

    fn draw_path(&mut self, state: &GraphicsState) -> Result<()> {
        render::path::render(self.context.current_page()?, state)
    }

    fn clip_path(&mut self, state: &mut GraphicsState) -> Result<()> {
        let id = self.context.alloc_id();
        render::clip_path::render(self.context.current_page()?, state, id)
    }

    fn draw_text(
        &mut self,
        state: &GraphicsState,
        origin: Point,
        lines: &[TextLine],
    ) -> Result<()> {
        render::text::render(self.context.current_page()?, state, origin, lines)
    }

    fn draw_image(
        &mut self,
        state: &GraphicsState,
        reference: &str,
        position: Point,
        size: (f32, f32),
        alpha: f32,
    ) -> Result<()> {
        let page = self.context.current_page()?;
        render::image::render(page, state, reference, position, size, alpha)
    }

    fn save_image(&mut self, path: &Path, multipage: bool) -> Result<()> {
        self.finish()?;
        let pages = self.context.pages();

        if multipage {
            for (index, page) in pages.iter().enumerate() {
                let path = page_path(path, index + 1);
                log::debug!("writing page {} to {}", index + 1, path.display());
                std::fs::write(path, page.markup().as_bytes())?;
            }
        } else {
            let page = pages.last().ok_or(ExportError::NoPage)?;
            std::fs::write(path, page.markup().as_bytes())?;
        }

        Ok(())
    }
}

/// The file a page is written to in multipage mode: the first page keeps
/// `path`, page `n` gets `_n` appended to the file stem.
pub fn page_path(path: &Path, number: usize) -> PathBuf {
    if number <= 1 {
        return path.to_path_buf();
    }

    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = match path.extension() {
        Some(extension) => format!("{stem}_{number}.{}", extension.to_string_lossy()),
        None => format!("{stem}_{number}"),
    };
    path.with_file_name(name)
}
