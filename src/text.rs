/*! Styled text and the typesetter that lays it out into lines and runs.

The export contexts do not shape text themselves; they ask a [`Typesetter`] for
lines of runs and write those out. [`FontTypesetter`] is a simple default built
on `fontdb` and `ttf-parser` metrics.
 */

use std::collections::BTreeMap;
use std::sync::Arc;

use fontdb::{Database, Family, Query};
use tiny_skia::Point;

use crate::color::Color;

/// Advance used for every character when no font data is available, relative
/// to the font size.
const FALLBACK_ADVANCE: f32 = 0.5;
const FALLBACK_ASCENDER: f32 = 0.8;
const FALLBACK_DESCENDER: f32 = -0.2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justified,
}

/// The attributes of a span of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font: String,
    pub font_size: f32,
    pub line_height: Option<f32>,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: Option<f32>,
    pub baseline_shift: f32,
    pub open_type_features: BTreeMap<String, bool>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: "sans-serif".to_string(),
            font_size: 10.0,
            line_height: None,
            fill: Some(Color::black()),
            stroke: None,
            stroke_width: None,
            baseline_shift: 0.0,
            open_type_features: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextSegment {
    pub text: String,
    pub style: TextStyle,
}

/// A string made of differently styled segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormattedString {
    segments: Vec<TextSegment>,
}

impl FormattedString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text with the given style.
    pub fn append(&mut self, text: impl Into<String>, style: TextStyle) {
        let text = text.into();
        if !text.is_empty() {
            self.segments.push(TextSegment { text, style });
        }
    }

    pub fn segments(&self) -> &[TextSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// A maximal span of text inside a line that shares all attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Position of the run relative to the line origin.
    pub offset: Point,
    /// The name of the font the run is set in.
    pub font: String,
    pub font_size: f32,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: Option<f32>,
    pub baseline_shift: f32,
    pub open_type_features: BTreeMap<String, bool>,
}

/// A laid out line. The origin is the start of the baseline relative to the
/// bottom-left corner of the text frame, with y growing upwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub origin: Point,
    pub runs: Vec<TextRun>,
}

/// Lays out text into lines of runs.
pub trait Typesetter {
    fn layout(
        &mut self,
        text: &FormattedString,
        width: f32,
        height: f32,
        align: TextAlign,
    ) -> Vec<TextLine>;
}

/// Metrics of one segment set in one font.
struct Measured {
    font: String,
    advances: Vec<f32>,
    ascender: f32,
    descender: f32,
    line_gap: f32,
}

impl Measured {
    fn fallback(text: &str, style: &TextStyle) -> Self {
        let size = style.font_size;
        Self {
            font: style.font.clone(),
            advances: text
                .chars()
                .map(|c| if c == '\n' { 0.0 } else { size * FALLBACK_ADVANCE })
                .collect(),
            ascender: size * FALLBACK_ASCENDER,
            descender: size * FALLBACK_DESCENDER,
            line_gap: 0.0,
        }
    }
}

struct Glyph {
    ch: char,
    segment: usize,
    advance: f32,
}

/// A word together with the spaces (and the line break) following it.
struct Token {
    start: usize,
    end: usize,
    word_width: f32,
    width: f32,
    breaks_line: bool,
}

/// A typesetter using font metrics from a font database with greedy word
/// wrapping.
pub struct FontTypesetter {
    fontdb: Arc<Database>,
}

impl Default for FontTypesetter {
    fn default() -> Self {
        Self::system()
    }
}

impl FontTypesetter {
    pub fn new(fontdb: Database) -> Self {
        Self { fontdb: Arc::new(fontdb) }
    }

    /// A typesetter with all fonts installed on the system.
    pub fn system() -> Self {
        let mut fontdb = Database::new();
        fontdb.load_system_fonts();
        Self::new(fontdb)
    }

    pub fn fontdb(&self) -> &Arc<Database> {
        &self.fontdb
    }

    fn measure(&self, text: &str, style: &TextStyle) -> Measured {
        let family = match style.font.as_str() {
            "serif" => Family::Serif,
            "sans-serif" => Family::SansSerif,
            "monospace" => Family::Monospace,
            "cursive" => Family::Cursive,
            "fantasy" => Family::Fantasy,
            name => Family::Name(name),
        };
        let families = [family];
        let query = Query { families: &families, ..Query::default() };

        let size = style.font_size;
        let measured = self.fontdb.query(&query).and_then(|id| {
            let font = self.fontdb.face(id)?.post_script_name.clone();
            self.fontdb
                .with_face_data(id, |data, index| {
                    let face = ttf_parser::Face::parse(data, index).ok()?;
                    let scale = size / face.units_per_em() as f32;
                    let advances = text
                        .chars()
                        .map(|c| match c {
                            '\n' => 0.0,
                            _ => face
                                .glyph_index(c)
                                .and_then(|g| face.glyph_hor_advance(g))
                                .map(|a| a as f32 * scale)
                                .unwrap_or(size * FALLBACK_ADVANCE),
                        })
                        .collect();
                    Some(Measured {
                        font: font.clone(),
                        advances,
                        ascender: face.ascender() as f32 * scale,
                        descender: face.descender() as f32 * scale,
                        line_gap: face.line_gap() as f32 * scale,
                    })
                })
                .flatten()
        });

        measured.unwrap_or_else(|| {
            log::debug!("no font data for `{}`, using fallback metrics", style.font);
            Measured::fallback(text, style)
        })
    }
}

impl Typesetter for FontTypesetter {
    fn layout(
        &mut self,
        text: &FormattedString,
        width: f32,
        height: f32,
        align: TextAlign,
    ) -> Vec<TextLine> {
        let segments = text.segments();
        let measured: Vec<Measured> =
            segments.iter().map(|s| self.measure(&s.text, &s.style)).collect();

        let glyphs: Vec<Glyph> = segments
            .iter()
            .zip(&measured)
            .enumerate()
            .flat_map(|(index, (segment, measured))| {
                segment.text.chars().zip(measured.advances.iter()).map(move |(ch, advance)| {
                    Glyph { ch, segment: index, advance: *advance }
                })
            })
            .collect();

        let mut lines = vec![];
        let mut y = height;
        let mut first = true;

        for range in break_lines(&glyphs, width) {
            let line = &glyphs[range];
            let used: Vec<usize> = dedup_segments(line);

            let ascender = used
                .iter()
                .map(|&i| measured[i].ascender)
                .fold(f32::MIN, f32::max);
            let descender = used
                .iter()
                .map(|&i| measured[i].descender)
                .fold(f32::MAX, f32::min);
            let line_gap =
                used.iter().map(|&i| measured[i].line_gap).fold(0.0, f32::max);
            let line_height = used
                .iter()
                .filter_map(|&i| segments[i].style.line_height)
                .reduce(f32::max)
                .unwrap_or(ascender - descender + line_gap);

            y -= if first { ascender } else { line_height };
            first = false;

            // Lines that do not fit into the frame are dropped.
            if y + descender < 0.0 {
                break;
            }

            let visible_width: f32 = line
                .iter()
                .rev()
                .skip_while(|g| g.ch.is_whitespace())
                .map(|g| g.advance)
                .sum();
            let x = match align {
                TextAlign::Left | TextAlign::Justified => 0.0,
                TextAlign::Center => (width - visible_width) / 2.0,
                TextAlign::Right => width - visible_width,
            };

            lines.push(TextLine {
                origin: Point::from_xy(x, y),
                runs: runs(line, segments, &measured),
            });
        }

        lines
    }
}

/// The segments used by a line, in order.
fn dedup_segments(line: &[Glyph]) -> Vec<usize> {
    let mut used: Vec<usize> = line.iter().map(|g| g.segment).collect();
    used.dedup();
    used
}

fn tokenize(glyphs: &[Glyph]) -> Vec<Token> {
    let mut tokens = vec![];
    let mut i = 0;

    while i < glyphs.len() {
        let start = i;
        let mut word_width = 0.0;
        while i < glyphs.len() && !glyphs[i].ch.is_whitespace() {
            word_width += glyphs[i].advance;
            i += 1;
        }

        let mut width = word_width;
        while i < glyphs.len() && glyphs[i].ch.is_whitespace() && glyphs[i].ch != '\n' {
            width += glyphs[i].advance;
            i += 1;
        }

        let breaks_line = i < glyphs.len() && glyphs[i].ch == '\n';
        if breaks_line {
            i += 1;
        }

        tokens.push(Token { start, end: i, word_width, width, breaks_line });
    }

    tokens
}

fn break_lines(glyphs: &[Glyph], width: f32) -> Vec<std::ops::Range<usize>> {
    let mut lines = vec![];
    let mut line_start = 0;
    let mut line_width = 0.0;

    for token in tokenize(glyphs) {
        if token.start > line_start && line_width + token.word_width > width {
            lines.push(line_start..token.start);
            line_start = token.start;
            line_width = 0.0;
        }

        line_width += token.width;

        if token.breaks_line {
            lines.push(line_start..token.end);
            line_start = token.end;
            line_width = 0.0;
        }
    }

    if line_start < glyphs.len() {
        lines.push(line_start..glyphs.len());
    }

    lines
}

fn runs(line: &[Glyph], segments: &[TextSegment], measured: &[Measured]) -> Vec<TextRun> {
    let mut runs: Vec<TextRun> = vec![];
    let mut x = 0.0;
    let mut current: Option<usize> = None;

    for glyph in line {
        if current == Some(glyph.segment) {
            if let Some(run) = runs.last_mut() {
                run.text.push(glyph.ch);
            }
        } else {
            let style = &segments[glyph.segment].style;
            runs.push(TextRun {
                text: glyph.ch.to_string(),
                offset: Point::from_xy(x, 0.0),
                font: measured[glyph.segment].font.clone(),
                font_size: style.font_size,
                fill: style.fill,
                stroke: style.stroke,
                stroke_width: style.stroke_width,
                baseline_shift: style.baseline_shift,
                open_type_features: style.open_type_features.clone(),
            });
            current = Some(glyph.segment);
        }
        x += glyph.advance;
    }

    runs
}
