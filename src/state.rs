//! The graphics state and the resources it refers to.

use std::collections::BTreeMap;
use std::rc::Rc;

use tiny_skia::{Point, Transform};

use crate::bezier::BezierPath;
use crate::color::Color;
use crate::util::helper::flip_y;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Square,
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientKind {
    Linear,
    /// A radial gradient. Only the end radius can be represented in the
    /// output; the start radius is always treated as zero.
    Radial { end_radius: f32 },
}

/// A color stop of a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop {
    pub color: Color,
    pub position: f32,
}

/// A linear or radial gradient, referenced by its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub id: String,
    pub kind: GradientKind,
    pub start: Point,
    pub end: Point,
    pub stops: Vec<Stop>,
}

impl Gradient {
    /// The same gradient with both end points mirrored about `height`.
    pub fn flipped(&self, height: f32) -> Gradient {
        Gradient {
            start: Point::from_xy(self.start.x, flip_y(self.start.y, height)),
            end: Point::from_xy(self.end.x, flip_y(self.end.y, height)),
            ..self.clone()
        }
    }
}

/// A gaussian blur drop shadow, referenced by its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Shadow {
    pub id: String,
    pub offset: (f32, f32),
    pub blur: f32,
    pub color: Color,
}

impl Shadow {
    /// Create a shadow. Negative blur values are clamped to zero.
    pub fn new(id: String, offset: (f32, f32), blur: f32, color: Color) -> Self {
        Self { id, offset, blur: blur.max(0.0), color }
    }

    /// The same shadow for a vertically flipped coordinate system.
    pub fn flipped(&self) -> Shadow {
        Shadow { offset: (self.offset.0, -self.offset.1), ..self.clone() }
    }
}

/// Text attributes that new text picks up from the graphics state.
#[derive(Debug, Clone, PartialEq)]
pub struct TextState {
    pub font: String,
    pub font_size: f32,
    pub line_height: Option<f32>,
    pub open_type_features: BTreeMap<String, bool>,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: "sans-serif".to_string(),
            font_size: 10.0,
            line_height: None,
            open_type_features: BTreeMap::new(),
        }
    }
}

/// One frame of the graphics state stack.
#[derive(Debug)]
pub struct GraphicsState {
    pub fill_color: Option<Color>,
    pub stroke_color: Option<Color>,
    pub stroke_width: f32,
    pub line_dash: Option<Vec<f32>>,
    pub line_join: Option<LineJoin>,
    pub line_cap: Option<LineCap>,
    pub blend_mode: Option<BlendMode>,
    pub transform: Transform,
    pub clip_path_id: Option<String>,
    pub gradient: Option<Rc<Gradient>>,
    pub shadow: Option<Rc<Shadow>>,
    pub path: BezierPath,
    pub text: TextState,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            fill_color: Some(Color::black()),
            stroke_color: None,
            stroke_width: 1.0,
            line_dash: None,
            line_join: None,
            line_cap: None,
            blend_mode: None,
            transform: Transform::identity(),
            clip_path_id: None,
            gradient: None,
            shadow: None,
            path: BezierPath::new(),
            text: TextState::default(),
        }
    }
}

impl Clone for GraphicsState {
    fn clone(&self) -> Self {
        Self {
            fill_color: self.fill_color,
            stroke_color: self.stroke_color,
            stroke_width: self.stroke_width,
            line_dash: self.line_dash.clone(),
            line_join: self.line_join,
            line_cap: self.line_cap,
            blend_mode: self.blend_mode,
            transform: self.transform,
            clip_path_id: self.clip_path_id.clone(),
            // Shared with the parent frame, identifiers included.
            gradient: self.gradient.as_ref().map(Rc::clone),
            shadow: self.shadow.as_ref().map(Rc::clone),
            path: self.path.clone(),
            text: self.text.clone(),
        }
    }
}
