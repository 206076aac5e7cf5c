/*! The drawing session: a graphics state machine in front of an export context.

[`Drawing`] keeps the graphics state stack, builds paths and lays out text. Every
operation that produces output is forwarded to an [`ExportContext`], which
writes it in its own format. Operations a format cannot represent are reported
as warnings and degrade gracefully.
 */

use std::path::Path;
use std::rc::Rc;

use tiny_skia::{Point, Transform};

use crate::assets::{ImageLoader, ImageResolver};
use crate::bezier::BezierPath;
use crate::color::Color;
use crate::state::{
    BlendMode, Gradient, GradientKind, GraphicsState, LineCap, LineJoin, Shadow, Stop,
};
use crate::text::{FontTypesetter, FormattedString, TextAlign, TextLine, TextStyle, Typesetter};
use crate::util::context::DocumentState;
use crate::{ExportError, Result};

/// Size of the page that is opened when drawing starts without one.
const DEFAULT_PAGE_SIZE: (f32, f32) = (1000.0, 1000.0);

/// Capabilities an export format may lack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Cmyk,
    JustifiedText,
    GradientStartRadius,
}

/// The output side of a drawing session. Implemented once per format.
pub trait ExportContext {
    /// Short name of the format, used in warnings.
    fn name(&self) -> &'static str;

    fn supports(&self, feature: Feature) -> bool;

    fn document_state(&self) -> DocumentState;

    /// Open a new page, closing the current one. Returns the transform the
    /// graphics state of the page starts with.
    fn new_page(&mut self, width: f32, height: f32) -> Result<Transform>;

    /// Set how long the current page is shown, for animated formats.
    fn frame_duration(&mut self, _seconds: f32) {}

    /// Allocate an identifier for a resource or clip path.
    fn alloc_id(&mut self) -> String;

    /// Write the definition of a gradient before anything refers to it.
    fn write_gradient(&mut self, gradient: &Gradient) -> Result<()>;

    /// Write the definition of a shadow before anything refers to it.
    fn write_shadow(&mut self, shadow: &Shadow) -> Result<()>;

    /// Fill and stroke the current path of the state.
    fn draw_path(&mut self, state: &GraphicsState) -> Result<()>;

    /// Turn the current path of the state into the active clip.
    fn clip_path(&mut self, state: &mut GraphicsState) -> Result<()>;

    /// Draw laid out text. `origin` is the bottom-left corner of the frame.
    fn draw_text(&mut self, state: &GraphicsState, origin: Point, lines: &[TextLine])
        -> Result<()>;

    /// Place an image of the given intrinsic size.
    fn draw_image(
        &mut self,
        state: &GraphicsState,
        reference: &str,
        position: Point,
        size: (f32, f32),
        alpha: f32,
    ) -> Result<()>;

    /// Close the document and write it to `path`.
    fn save_image(&mut self, path: &Path, multipage: bool) -> Result<()>;
}

/// A drawing session writing into the export context `C`.
pub struct Drawing<C> {
    context: C,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    typesetter: Option<Box<dyn Typesetter>>,
    images: Box<dyn ImageResolver>,
    warnings: Vec<String>,
}

impl<C: ExportContext> Drawing<C> {
    pub fn new(context: C) -> Self {
        Self {
            context,
            state: GraphicsState::default(),
            stack: Vec::new(),
            typesetter: None,
            images: Box::new(ImageLoader::new()),
            warnings: Vec::new(),
        }
    }

    /// Use a different typesetter. By default text is set with the fonts
    /// installed on the system.
    pub fn with_typesetter(mut self, typesetter: impl Typesetter + 'static) -> Self {
        self.typesetter = Some(Box::new(typesetter));
        self
    }

    /// Use a different source for image sizes.
    pub fn with_image_resolver(mut self, images: impl ImageResolver + 'static) -> Self {
        self.images = Box::new(images);
        self
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }

    /// The current graphics state.
    pub fn state(&self) -> &GraphicsState {
        &self.state
    }

    /// Every unsupported-feature warning raised so far.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    fn unsupported(&mut self, what: &str) {
        let message = format!("{what} is not supported in a {} context", self.context.name());
        log::warn!("{message}");
        self.warnings.push(message);
    }

    fn ensure_page(&mut self) -> Result<()> {
        if self.context.document_state() == DocumentState::NoPage {
            let (width, height) = DEFAULT_PAGE_SIZE;
            self.new_page(width, height)?;
        }
        Ok(())
    }

    // Pages

    /// Start a new page. The graphics state is reset.
    pub fn new_page(&mut self, width: f32, height: f32) -> Result<()> {
        let transform = self.context.new_page(width, height)?;
        self.stack.clear();
        self.state = GraphicsState { transform, ..GraphicsState::default() };
        Ok(())
    }

    /// Set how long the current page is shown in animated output.
    pub fn frame_duration(&mut self, seconds: f32) {
        self.context.frame_duration(seconds);
    }

    /// Close the document and write it to `path`. With `multipage` every page
    /// is written to a file of its own, otherwise only the last page is.
    pub fn save_image(&mut self, path: impl AsRef<Path>, multipage: bool) -> Result<()> {
        self.context.save_image(path.as_ref(), multipage)
    }

    // State stack

    /// Push a copy of the current graphics state.
    pub fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    /// Pop the graphics state pushed last. Does nothing on an empty stack.
    pub fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    // Colors

    /// Set the fill color. This clears an active gradient.
    pub fn fill(&mut self, color: Option<Color>) {
        self.state.fill_color = color;
        self.state.gradient = None;
    }

    pub fn stroke(&mut self, color: Option<Color>) {
        self.state.stroke_color = color;
    }

    pub fn cmyk_fill(&mut self, color: Option<Color>) {
        if self.context.supports(Feature::Cmyk) {
            self.fill(color);
        } else {
            self.unsupported("cmyk_fill");
        }
    }

    pub fn cmyk_stroke(&mut self, color: Option<Color>) {
        if self.context.supports(Feature::Cmyk) {
            self.stroke(color);
        } else {
            self.unsupported("cmyk_stroke");
        }
    }

    pub fn stroke_width(&mut self, width: f32) {
        self.state.stroke_width = width;
    }

    pub fn line_dash(&mut self, dash: Option<Vec<f32>>) {
        self.state.line_dash = dash;
    }

    pub fn line_join(&mut self, join: Option<LineJoin>) {
        self.state.line_join = join;
    }

    pub fn line_cap(&mut self, cap: Option<LineCap>) {
        self.state.line_cap = cap;
    }

    pub fn blend_mode(&mut self, mode: Option<BlendMode>) {
        self.state.blend_mode = mode;
    }

    // Gradients and shadows

    /// Fill with a linear gradient from `start` to `end`. Without `locations`
    /// the colors are spread evenly.
    pub fn linear_gradient(
        &mut self,
        start: (f32, f32),
        end: (f32, f32),
        colors: &[Color],
        locations: Option<&[f32]>,
    ) -> Result<()> {
        self.set_gradient(GradientKind::Linear, start, end, colors, locations)
    }

    /// Fill with a radial gradient. The start radius must be zero, other
    /// values are reported and ignored.
    pub fn radial_gradient(
        &mut self,
        start: (f32, f32),
        end: (f32, f32),
        colors: &[Color],
        locations: Option<&[f32]>,
        start_radius: f32,
        end_radius: f32,
    ) -> Result<()> {
        if start_radius != 0.0 && !self.context.supports(Feature::GradientStartRadius) {
            self.unsupported("radial gradient start radius");
        }
        let kind = GradientKind::Radial { end_radius };
        self.set_gradient(kind, start, end, colors, locations)
    }

    pub fn cmyk_linear_gradient(
        &mut self,
        start: (f32, f32),
        end: (f32, f32),
        colors: &[Color],
        locations: Option<&[f32]>,
    ) -> Result<()> {
        if !self.context.supports(Feature::Cmyk) {
            self.unsupported("cmyk_linear_gradient");
            return Ok(());
        }
        self.linear_gradient(start, end, colors, locations)
    }

    pub fn cmyk_radial_gradient(
        &mut self,
        start: (f32, f32),
        end: (f32, f32),
        colors: &[Color],
        locations: Option<&[f32]>,
        start_radius: f32,
        end_radius: f32,
    ) -> Result<()> {
        if !self.context.supports(Feature::Cmyk) {
            self.unsupported("cmyk_radial_gradient");
            return Ok(());
        }
        self.radial_gradient(start, end, colors, locations, start_radius, end_radius)
    }

    fn set_gradient(
        &mut self,
        kind: GradientKind,
        start: (f32, f32),
        end: (f32, f32),
        colors: &[Color],
        locations: Option<&[f32]>,
    ) -> Result<()> {
        let stops = gradient_stops(colors, locations)?;
        self.ensure_page()?;

        let gradient = Gradient {
            id: self.context.alloc_id(),
            kind,
            start: Point::from_xy(start.0, start.1),
            end: Point::from_xy(end.0, end.1),
            stops,
        };
        self.context.write_gradient(&gradient)?;
        self.state.gradient = Some(Rc::new(gradient));
        Ok(())
    }

    pub fn clear_gradient(&mut self) {
        self.state.gradient = None;
    }

    /// Add a drop shadow to everything drawn from now on. The color defaults
    /// to black.
    pub fn shadow(&mut self, offset: (f32, f32), blur: f32, color: Option<Color>) -> Result<()> {
        self.ensure_page()?;
        let id = self.context.alloc_id();
        let shadow = Shadow::new(id, offset, blur, color.unwrap_or_else(Color::black));
        self.context.write_shadow(&shadow)?;
        self.state.shadow = Some(Rc::new(shadow));
        Ok(())
    }

    pub fn cmyk_shadow(
        &mut self,
        offset: (f32, f32),
        blur: f32,
        color: Option<Color>,
    ) -> Result<()> {
        if !self.context.supports(Feature::Cmyk) {
            self.unsupported("cmyk_shadow");
            return Ok(());
        }
        self.shadow(offset, blur, color)
    }

    pub fn clear_shadow(&mut self) {
        self.state.shadow = None;
    }

    // Transforms

    pub fn translate(&mut self, x: f32, y: f32) {
        self.transform(Transform::from_translate(x, y));
    }

    /// Rotate by `angle` degrees around `center`.
    pub fn rotate(&mut self, angle: f32, center: (f32, f32)) {
        let (cx, cy) = center;
        self.transform(
            Transform::from_translate(cx, cy)
                .pre_concat(Transform::from_rotate(angle))
                .pre_translate(-cx, -cy),
        );
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.transform(Transform::from_scale(sx, sy));
    }

    /// Skew by the given angles in degrees.
    pub fn skew(&mut self, angle_x: f32, angle_y: f32) {
        let kx = angle_x.to_radians().tan();
        let ky = angle_y.to_radians().tan();
        self.transform(Transform::from_row(1.0, ky, kx, 1.0, 0.0, 0.0));
    }

    /// Right-multiply the current transform with `transform`.
    pub fn transform(&mut self, transform: Transform) {
        self.state.transform = self.state.transform.pre_concat(transform);
    }

    // Paths

    pub fn new_path(&mut self) {
        self.state.path = BezierPath::new();
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.state.path.move_to(x, y);
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.state.path.line_to(x, y);
    }

    pub fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.state.path.curve_to(x1, y1, x2, y2, x, y);
    }

    pub fn qcurve_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.state.path.qcurve_to(x1, y1, x, y);
    }

    pub fn close_path(&mut self) {
        self.state.path.close_path();
    }

    /// Fill and stroke the current path and start a new one.
    pub fn draw_path(&mut self) -> Result<()> {
        self.ensure_page()?;
        self.context.draw_path(&self.state)?;
        self.new_path();
        Ok(())
    }

    /// Clip everything drawn afterwards to the current path, until the
    /// graphics state is restored.
    pub fn clip_path(&mut self) -> Result<()> {
        self.ensure_page()?;
        self.context.clip_path(&mut self.state)?;
        self.new_path();
        Ok(())
    }

    fn draw_shape(&mut self, build: impl FnOnce(&mut BezierPath)) -> Result<()> {
        let mut path = BezierPath::new();
        build(&mut path);
        let current = std::mem::replace(&mut self.state.path, path);
        let result = self.draw_path();
        self.state.path = current;
        result
    }

    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<()> {
        self.draw_shape(|path| path.rect(x, y, width, height))
    }

    pub fn oval(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<()> {
        self.draw_shape(|path| path.oval(x, y, width, height))
    }

    pub fn line(&mut self, start: (f32, f32), end: (f32, f32)) -> Result<()> {
        self.draw_shape(|path| path.polygon(&[start, end], false))
    }

    pub fn polygon(&mut self, points: &[(f32, f32)], close: bool) -> Result<()> {
        self.draw_shape(|path| path.polygon(points, close))
    }

    // Text

    pub fn font(&mut self, name: impl Into<String>) {
        self.state.text.font = name.into();
    }

    pub fn font_size(&mut self, size: f32) {
        self.state.text.font_size = size;
    }

    pub fn line_height(&mut self, height: Option<f32>) {
        self.state.text.line_height = height;
    }

    /// Enable or disable OpenType features, keeping the ones not mentioned.
    pub fn open_type_features<'a>(&mut self, features: impl IntoIterator<Item = (&'a str, bool)>) {
        for (tag, on) in features {
            self.state.text.open_type_features.insert(tag.to_string(), on);
        }
    }

    /// The text attributes of the current graphics state.
    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            font: self.state.text.font.clone(),
            font_size: self.state.text.font_size,
            line_height: self.state.text.line_height,
            fill: self.state.fill_color,
            stroke: self.state.stroke_color,
            stroke_width: Some(self.state.stroke_width),
            baseline_shift: 0.0,
            open_type_features: self.state.text.open_type_features.clone(),
        }
    }

    /// Set `text` in the frame `(x, y, width, height)` with the current text
    /// attributes.
    pub fn text_box(
        &mut self,
        text: &str,
        frame: (f32, f32, f32, f32),
        align: TextAlign,
    ) -> Result<()> {
        let mut string = FormattedString::new();
        string.append(text, self.text_style());
        self.formatted_text_box(&string, frame, align)
    }

    pub fn formatted_text_box(
        &mut self,
        text: &FormattedString,
        frame: (f32, f32, f32, f32),
        align: TextAlign,
    ) -> Result<()> {
        let mut align = align;
        if align == TextAlign::Justified && !self.context.supports(Feature::JustifiedText) {
            self.unsupported("justified text");
            align = TextAlign::Left;
        }
        self.ensure_page()?;

        let (x, y, width, height) = frame;
        let typesetter = self
            .typesetter
            .get_or_insert_with(|| Box::new(FontTypesetter::system()) as Box<dyn Typesetter>);
        let lines = typesetter.layout(text, width, height, align);
        self.context.draw_text(&self.state, Point::from_xy(x, y), &lines)
    }

    // Images

    /// Place the image at `reference` with its bottom-left corner at
    /// `position`.
    pub fn image(
        &mut self,
        reference: &str,
        position: (f32, f32),
        alpha: f32,
        page_number: Option<usize>,
    ) -> Result<()> {
        self.ensure_page()?;
        let size = self.images.size(reference, page_number)?;
        let position = Point::from_xy(position.0, position.1);
        self.context.draw_image(&self.state, reference, position, size, alpha)
    }
}

/// Pair gradient colors with their positions.
fn gradient_stops(colors: &[Color], locations: Option<&[f32]>) -> Result<Vec<Stop>> {
    let positions: Vec<f32> = match locations {
        Some(locations) if locations.len() != colors.len() => {
            return Err(ExportError::GradientStops {
                colors: colors.len(),
                locations: locations.len(),
            });
        }
        Some(locations) => locations.to_vec(),
        None if colors.len() < 2 => vec![0.0; colors.len()],
        None => {
            let last = (colors.len() - 1) as f32;
            (0..colors.len()).map(|i| i as f32 / last).collect()
        }
    };

    Ok(colors
        .iter()
        .zip(positions)
        .map(|(color, position)| Stop { color: *color, position })
        .collect())
}
