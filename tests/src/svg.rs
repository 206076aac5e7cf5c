use std::fs;

use drawexport::{
    format_number, path_to_markup, BezierPath, BlendMode, Color, Drawing, ExportContext,
    ExportError, Gradient, GradientKind, ImageLoader, LineCap, LineJoin, Point, Stop,
    SvgContext, TextAlign, Transform, TransformExt,
};
use drawexport_tests::*;
use proptest::prelude::*;

fn red() -> Color {
    Color::rgb(1.0, 0.0, 0.0, 1.0)
}

fn blue() -> Color {
    Color::rgb(0.0, 0.0, 1.0, 1.0)
}

#[test]
fn page_has_prolog_and_root_attributes() {
    let mut drawing = svg_drawing(1);
    drawing.new_page(200.0, 100.0).unwrap();
    let markup = first_page(&drawing);
    assert!(markup.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));

    drawing.context_finish();
    let markup = first_page(&drawing);
    let document = roxmltree::Document::parse(&markup).unwrap();
    let root = document.root_element();
    assert_eq!(root.tag_name().name(), "svg");
    assert_eq!(root.tag_name().namespace(), Some(SVG_NAMESPACE));
    assert_eq!(root.attribute("width"), Some("200"));
    assert_eq!(root.attribute("height"), Some("100"));
    assert_eq!(root.attribute("version"), Some("1.1"));
}

/// Closes the pages of a session without writing them anywhere.
trait FinishExt {
    fn context_finish(&mut self);
}

impl FinishExt for Drawing<SvgContext> {
    fn context_finish(&mut self) {
        let dir = tempfile::tempdir().unwrap();
        self.save_image(dir.path().join("scratch.svg"), false).unwrap();
    }
}

fn finished(drawing: &mut Drawing<SvgContext>) -> String {
    drawing.context_finish();
    drawing.context().markup().pop().unwrap()
}

#[test]
fn filled_rect() {
    let mut drawing = svg_drawing(1);
    drawing.new_page(200.0, 100.0).unwrap();
    drawing.fill(Some(red()));
    drawing.rect(10.0, 10.0, 100.0, 50.0).unwrap();

    let markup = finished(&mut drawing);
    assert!(markup.contains("\n <path"));

    let document = roxmltree::Document::parse(&markup).unwrap();
    let paths = elements(&document, "path");
    assert_eq!(paths.len(), 1);
    let path = paths[0];
    assert_eq!(path.attribute("d"), Some("M10,10 l100,0 l0,50 l-100,0 Z "));
    assert_eq!(path.attribute("transform"), Some("matrix(1,0,0,-1,0,100)"));
    assert_eq!(path.attribute("fill"), Some("rgba(255,0,0,1)"));
    assert_eq!(path.attribute("stroke"), None);
}

#[test]
fn empty_path_is_skipped() {
    let mut drawing = svg_drawing(1);
    drawing.new_page(100.0, 100.0).unwrap();
    drawing.draw_path().unwrap();
    drawing.polygon(&[], true).unwrap();

    let markup = finished(&mut drawing);
    let document = roxmltree::Document::parse(&markup).unwrap();
    assert!(elements(&document, "path").is_empty());
}

#[test]
fn stroke_attributes() {
    let mut drawing = svg_drawing(1);
    drawing.new_page(100.0, 100.0).unwrap();
    drawing.fill(None);
    drawing.stroke(Some(Color::gray(0.0, 1.0)));
    drawing.stroke_width(-3.0);
    drawing.line_dash(Some(vec![4.0, 2.0]));
    drawing.line_join(Some(LineJoin::Round));
    drawing.line_cap(Some(LineCap::Butt));
    drawing.blend_mode(Some(BlendMode::Multiply));
    drawing.line((0.0, 0.0), (10.0, 10.0)).unwrap();

    let markup = finished(&mut drawing);
    let document = roxmltree::Document::parse(&markup).unwrap();
    let path = elements(&document, "path")[0];
    assert_eq!(path.attribute("fill"), None);
    assert_eq!(path.attribute("stroke"), Some("rgba(0,0,0,1)"));
    assert_eq!(path.attribute("stroke-width"), Some("3"));
    assert_eq!(path.attribute("stroke-dasharray"), Some("4,2"));
    assert_eq!(path.attribute("stroke-linejoin"), Some("round"));
    assert_eq!(path.attribute("stroke-linecap"), Some("butt"));
    assert_eq!(path.attribute("style"), Some("mix-blend-mode: multiply;"));
    assert_eq!(path.attribute("d"), Some("M0,0 l10,10 "));
}

#[test]
fn linear_gradient_is_written_twice() {
    let mut drawing = svg_drawing(2);
    drawing.new_page(100.0, 100.0).unwrap();
    drawing.linear_gradient((0.0, 10.0), (100.0, 30.0), &[red(), blue()], None).unwrap();
    drawing.rect(0.0, 0.0, 100.0, 100.0).unwrap();

    let markup = finished(&mut drawing);
    let document = roxmltree::Document::parse(&markup).unwrap();
    let gradients = elements(&document, "linearGradient");
    assert_eq!(gradients.len(), 2);

    let (natural, flipped) = (gradients[0], gradients[1]);
    let id = natural.attribute("id").unwrap();
    assert_eq!(id.len(), 32);
    assert_eq!(flipped.attribute("id"), Some(format!("{id}_flipped").as_str()));
    assert_eq!(natural.parent_element().unwrap().tag_name().name(), "defs");
    assert_eq!(natural.attribute("gradientUnits"), Some("userSpaceOnUse"));
    assert_eq!(natural.attribute("y1"), Some("10"));
    assert_eq!(natural.attribute("y2"), Some("30"));
    assert_eq!(flipped.attribute("y1"), Some("90"));
    assert_eq!(flipped.attribute("y2"), Some("70"));
    assert_eq!(flipped.attribute("x2"), Some("100"));

    let stops: Vec<_> = natural.children().filter(|n| n.is_element()).collect();
    assert_eq!(stops.len(), 2);
    assert_eq!(stops[0].attribute("offset"), Some("0"));
    assert_eq!(stops[0].attribute("stop-color"), Some("rgba(255,0,0,1)"));
    assert_eq!(stops[1].attribute("offset"), Some("1"));

    let path = elements(&document, "path")[0];
    assert_eq!(path.attribute("fill"), Some(format!("url(#{id})").as_str()));
}

#[test]
fn radial_gradient_attributes() {
    let mut drawing = svg_drawing(3);
    drawing.new_page(100.0, 100.0).unwrap();
    drawing
        .radial_gradient((10.0, 10.0), (50.0, 30.0), &[red(), blue()], Some(&[0.0, 0.25][..]), 0.0, 40.0)
        .unwrap();
    assert!(drawing.warnings().is_empty());

    let markup = finished(&mut drawing);
    let document = roxmltree::Document::parse(&markup).unwrap();
    let gradients = elements(&document, "radialGradient");
    assert_eq!(gradients.len(), 2);
    let (gradient, flipped) = (gradients[0], gradients[1]);
    assert_eq!(gradient.attribute("cx"), Some("50"));
    assert_eq!(gradient.attribute("cy"), Some("30"));
    assert_eq!(gradient.attribute("r"), Some("40"));
    assert_eq!(gradient.attribute("fx"), Some("10"));
    assert_eq!(gradient.attribute("fy"), Some("10"));

    let id = gradient.attribute("id").unwrap();
    assert_eq!(flipped.attribute("id"), Some(format!("{id}_flipped").as_str()));
    assert_eq!(flipped.attribute("cx"), Some("50"));
    assert_eq!(flipped.attribute("cy"), Some("70"));
    assert_eq!(flipped.attribute("r"), Some("40"));
    assert_eq!(flipped.attribute("fx"), Some("10"));
    assert_eq!(flipped.attribute("fy"), Some("90"));
    let offsets: Vec<_> = elements(&document, "stop")
        .iter()
        .take(2)
        .map(|stop| stop.attribute("offset").unwrap().to_string())
        .collect();
    assert_eq!(offsets, ["0", "0.25"]);
}

#[test]
fn gradient_with_mismatching_locations_fails() {
    let mut drawing = svg_drawing(3);
    drawing.new_page(100.0, 100.0).unwrap();
    let result =
        drawing.linear_gradient((0.0, 0.0), (1.0, 1.0), &[red(), blue()], Some(&[0.0][..]));
    assert!(matches!(result, Err(ExportError::GradientStops { colors: 2, locations: 1 })));
    assert!(drawing.state().gradient.is_none());
}

#[test]
fn shadow_filter_primitives_in_order() {
    let mut drawing = svg_drawing(4);
    drawing.new_page(100.0, 100.0).unwrap();
    drawing.shadow((5.0, -5.0), 3.0, None).unwrap();
    drawing.oval(10.0, 10.0, 20.0, 20.0).unwrap();

    let markup = finished(&mut drawing);
    let document = roxmltree::Document::parse(&markup).unwrap();
    let filters = elements(&document, "filter");
    assert_eq!(filters.len(), 2);

    let id = filters[0].attribute("id").unwrap();
    assert_eq!(filters[1].attribute("id"), Some(format!("{id}_flipped").as_str()));

    let primitives: Vec<_> = filters[0]
        .children()
        .filter(|n| n.is_element())
        .map(|n| n.tag_name().name().to_string())
        .collect();
    assert_eq!(primitives, ["feGaussianBlur", "feOffset", "feFlood", "feComposite", "feMerge"]);

    let blur = elements(&document, "feGaussianBlur")[0];
    assert_eq!(blur.attribute("in"), Some("SourceAlpha"));
    assert_eq!(blur.attribute("stdDeviation"), Some("3"));

    let offsets = elements(&document, "feOffset");
    assert_eq!(offsets[0].attribute("dy"), Some("-5"));
    assert_eq!(offsets[1].attribute("dy"), Some("5"));
    assert_eq!(offsets[0].attribute("result"), Some("offsetblur"));

    let flood = elements(&document, "feFlood")[0];
    assert_eq!(flood.attribute("flood-color"), Some("rgba(0,0,0,1)"));

    let composite = elements(&document, "feComposite")[0];
    assert_eq!(composite.attribute("in2"), Some("offsetblur"));
    assert_eq!(composite.attribute("operator"), Some("in"));

    let nodes: Vec<_> = elements(&document, "feMergeNode")
        .iter()
        .take(2)
        .map(|node| node.attribute("in"))
        .collect();
    assert_eq!(nodes, [None, Some("SourceGraphic")]);

    let path = elements(&document, "path")[0];
    assert_eq!(path.attribute("filter"), Some(format!("url(#{id})").as_str()));
}

#[test]
fn negative_shadow_blur_is_clamped() {
    let mut drawing = svg_drawing(4);
    drawing.new_page(100.0, 100.0).unwrap();
    drawing.shadow((0.0, 0.0), -2.0, Some(red())).unwrap();

    let markup = finished(&mut drawing);
    let document = roxmltree::Document::parse(&markup).unwrap();
    let blur = elements(&document, "feGaussianBlur")[0];
    assert_eq!(blur.attribute("stdDeviation"), Some("0"));
}

#[test]
fn clip_groups_until_restore() {
    let mut drawing = svg_drawing(5);
    drawing.new_page(100.0, 100.0).unwrap();
    drawing.save();
    drawing.move_to(0.0, 0.0);
    drawing.line_to(50.0, 0.0);
    drawing.line_to(50.0, 50.0);
    drawing.close_path();
    drawing.clip_path().unwrap();
    drawing.rect(0.0, 0.0, 10.0, 10.0).unwrap();
    drawing.restore();
    drawing.rect(20.0, 20.0, 5.0, 5.0).unwrap();

    let markup = finished(&mut drawing);
    let document = roxmltree::Document::parse(&markup).unwrap();

    let clip = elements(&document, "clipPath")[0];
    let id = clip.attribute("id").unwrap();
    let clip_shape = clip.children().find(|n| n.is_element()).unwrap();
    assert_eq!(clip_shape.attribute("clip-rule"), Some("evenodd"));
    assert_eq!(clip_shape.attribute("d"), Some("M0,0 l50,0 l0,50 Z "));

    let groups = elements(&document, "g");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].attribute("clip-path"), Some(format!("url(#{id})").as_str()));

    let paths: Vec<_> =
        elements(&document, "path").into_iter().filter(|p| p.attribute("clip-rule").is_none()).collect();
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0].parent_element().unwrap().tag_name().name(), "g");
    assert_eq!(paths[1].parent_element().unwrap().tag_name().name(), "svg");
}

#[test]
fn text_and_images_are_clipped() {
    let mut drawing = svg_drawing(12);
    drawing.new_page(100.0, 100.0).unwrap();
    drawing.save();
    drawing.move_to(0.0, 0.0);
    drawing.line_to(50.0, 0.0);
    drawing.line_to(50.0, 50.0);
    drawing.close_path();
    drawing.clip_path().unwrap();
    drawing.text_box("clipped", (0.0, 0.0, 100.0, 100.0), TextAlign::Left).unwrap();
    drawing.image("photo.png", (5.0, 5.0), 1.0, None).unwrap();
    drawing.restore();
    drawing.image("photo.png", (5.0, 5.0), 1.0, None).unwrap();

    let markup = finished(&mut drawing);
    let document = roxmltree::Document::parse(&markup).unwrap();
    let id = elements(&document, "clipPath")[0].attribute("id").unwrap();
    let clip = format!("url(#{id})");

    let text = elements(&document, "text")[0];
    let group = text.parent_element().unwrap();
    assert_eq!(group.tag_name().name(), "g");
    assert_eq!(group.attribute("clip-path"), Some(clip.as_str()));

    let images = elements(&document, "image");
    assert_eq!(images.len(), 2);
    let group = images[0].parent_element().unwrap();
    assert_eq!(group.tag_name().name(), "g");
    assert_eq!(group.attribute("clip-path"), Some(clip.as_str()));
    assert_eq!(images[1].parent_element().unwrap().tag_name().name(), "svg");
}

#[test]
fn text_runs_become_tspans() {
    let mut drawing = svg_drawing(6);
    drawing.new_page(100.0, 100.0).unwrap();
    drawing.text_box("hello world  ", (10.0, 20.0, 200.0, 50.0), TextAlign::Left).unwrap();

    let markup = finished(&mut drawing);
    let document = roxmltree::Document::parse(&markup).unwrap();

    let text = elements(&document, "text")[0];
    assert_eq!(text.attribute("text-anchor"), Some("start"));
    assert_eq!(text.attribute("transform"), Some("matrix(1,0,0,1,10,-20)"));
    assert_eq!(text.attribute("filter"), None);

    let spans = elements(&document, "tspan");
    assert_eq!(spans.len(), 1);
    let span = spans[0];
    assert_eq!(span.text(), Some("hello world"));
    assert_eq!(span.attribute("x"), Some("0"));
    assert_eq!(span.attribute("y"), Some("58"));
    assert_eq!(span.attribute("font-family"), Some("sans-serif"));
    assert_eq!(span.attribute("font-size"), Some("10"));
    assert_eq!(span.attribute("fill"), Some("rgba(0,0,0,1)"));
}

#[test]
fn text_uses_flipped_resources() {
    let mut drawing = svg_drawing(7);
    drawing.new_page(100.0, 100.0).unwrap();
    drawing.linear_gradient((0.0, 0.0), (100.0, 0.0), &[red(), blue()], None).unwrap();
    drawing.shadow((2.0, 2.0), 1.0, None).unwrap();
    drawing.blend_mode(Some(BlendMode::Screen));
    drawing.open_type_features([("smcp", false), ("liga", true)]);
    drawing.text_box("styled", (0.0, 0.0, 100.0, 100.0), TextAlign::Center).unwrap();

    let markup = finished(&mut drawing);
    let document = roxmltree::Document::parse(&markup).unwrap();
    let gradient_id = elements(&document, "linearGradient")[0].attribute("id").unwrap();
    let shadow_id = elements(&document, "filter")[0].attribute("id").unwrap();

    let text = elements(&document, "text")[0];
    assert_eq!(text.attribute("filter"), Some(format!("url(#{shadow_id}_flipped)").as_str()));

    let span = elements(&document, "tspan")[0];
    assert_eq!(span.attribute("fill"), Some(format!("url(#{gradient_id}_flipped)").as_str()));
    assert_eq!(
        span.attribute("style"),
        Some("mix-blend-mode: screen; font-feature-settings: 'liga', 'smcp' off;")
    );
    // Six characters with fallback metrics are 30 wide.
    assert_eq!(span.attribute("x"), Some("35"));
}

#[test]
fn styled_runs_keep_their_colors() {
    let mut drawing = svg_drawing(8);
    drawing.new_page(100.0, 100.0).unwrap();
    let mut text = drawexport::FormattedString::new();
    text.append("ab", drawing.text_style());
    text.append(
        "cd",
        drawexport::TextStyle {
            fill: Some(red()),
            stroke: Some(blue()),
            stroke_width: Some(-2.0),
            baseline_shift: 3.0,
            ..drawing.text_style()
        },
    );
    drawing.formatted_text_box(&text, (0.0, 0.0, 100.0, 100.0), TextAlign::Left).unwrap();

    let markup = finished(&mut drawing);
    let document = roxmltree::Document::parse(&markup).unwrap();
    let spans = elements(&document, "tspan");
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[1].attribute("fill"), Some("rgba(255,0,0,1)"));
    assert_eq!(spans[1].attribute("stroke"), Some("rgba(0,0,255,1)"));
    assert_eq!(spans[1].attribute("stroke-width"), Some("2"));
    assert_eq!(spans[1].attribute("x"), Some("10"));
    assert_eq!(spans[1].attribute("y"), Some("11"));
}

#[test]
fn image_links_to_reference() {
    let mut drawing = svg_drawing(9);
    drawing.new_page(100.0, 100.0).unwrap();
    drawing.image("photo.png", (5.0, 5.0), 0.5, None).unwrap();

    let markup = finished(&mut drawing);
    let document = roxmltree::Document::parse(&markup).unwrap();
    let image = elements(&document, "image")[0];
    assert_eq!(image.attribute("x"), Some("0"));
    assert_eq!(image.attribute("y"), Some("0"));
    assert_eq!(image.attribute("width"), Some("30"));
    assert_eq!(image.attribute("height"), Some("20"));
    assert_eq!(image.attribute("opacity"), Some("0.5"));
    assert_eq!(image.attribute("transform"), Some("matrix(1,0,0,1,5,75)"));
    assert_eq!(image.attribute((XLINK_NAMESPACE, "href")), Some("photo.png"));
}

#[test]
fn image_size_is_read_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pixels.png");
    image::RgbaImage::new(3, 2).save(&path).unwrap();
    let reference = path.to_str().unwrap();

    let mut drawing = Drawing::new(SvgContext::new()).with_image_resolver(ImageLoader::new());
    drawing.new_page(10.0, 10.0).unwrap();
    drawing.image(reference, (0.0, 0.0), 1.0, None).unwrap();
    let missing = drawing.image("missing.png", (0.0, 0.0), 1.0, None);
    assert!(matches!(missing, Err(ExportError::Image { .. })));

    let markup = first_page(&drawing);
    assert!(markup.contains(r#"width="3""#));
    assert!(markup.contains(&format!(r#"xlink:href="{reference}""#)));
}

#[test]
fn cmyk_is_not_supported() {
    let mut drawing = svg_drawing(10);
    drawing.new_page(100.0, 100.0).unwrap();
    let cmyk = Color::cmyk(1.0, 0.0, 0.0, 0.0, 1.0);
    drawing.cmyk_linear_gradient((0.0, 0.0), (1.0, 1.0), &[cmyk, cmyk], None).unwrap();
    drawing.cmyk_radial_gradient((0.0, 0.0), (1.0, 1.0), &[cmyk], None, 0.0, 1.0).unwrap();
    assert!(drawing.state().gradient.is_none());
    assert_eq!(
        drawing.warnings(),
        [
            "cmyk_linear_gradient is not supported in a svg context",
            "cmyk_radial_gradient is not supported in a svg context",
        ]
    );
    let markup = finished(&mut drawing);
    assert!(!markup.contains("Gradient"));
}

#[test]
fn multipage_export_names_pages() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.svg");

    let mut drawing = svg_drawing(11);
    for size in [10.0, 20.0, 30.0] {
        drawing.new_page(size, size).unwrap();
        drawing.rect(0.0, 0.0, 1.0, 1.0).unwrap();
    }
    drawing.save_image(&path, true).unwrap();

    let widths: Vec<String> = ["out.svg", "out_2.svg", "out_3.svg"]
        .iter()
        .map(|name| {
            let markup = read(&dir.path().join(name));
            let document = roxmltree::Document::parse(&markup).unwrap();
            document.root_element().attribute("width").unwrap().to_string()
        })
        .collect();
    assert_eq!(widths, ["10", "20", "30"]);
    assert!(!dir.path().join("out_1.svg").exists());
}

#[test]
fn single_page_export_writes_last_page() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.svg");

    let mut drawing = svg_drawing(12);
    for size in [10.0, 20.0, 30.0] {
        drawing.new_page(size, size).unwrap();
    }
    drawing.save_image(&path, false).unwrap();

    let markup = read(&path);
    let document = roxmltree::Document::parse(&markup).unwrap();
    assert_eq!(document.root_element().attribute("width"), Some("30"));
    assert!(!dir.path().join("out_2.svg").exists());
}

#[test]
fn export_without_pages_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut drawing = svg_drawing(13);
    let result = drawing.save_image(dir.path().join("out.svg"), false);
    assert!(matches!(result, Err(ExportError::NoPage)));
}

#[test]
fn closed_page_rejects_drawing() {
    let dir = tempfile::tempdir().unwrap();
    let mut drawing = svg_drawing(14);
    drawing.new_page(10.0, 10.0).unwrap();
    drawing.save_image(dir.path().join("out.svg"), false).unwrap();

    let result = drawing.rect(0.0, 0.0, 1.0, 1.0);
    assert!(matches!(result, Err(ExportError::PageClosed(1))));

    drawing.new_page(10.0, 10.0).unwrap();
    drawing.rect(0.0, 0.0, 1.0, 1.0).unwrap();
    assert!(drawing.context().markup()[1].contains("<path"));
}

#[test]
fn pages_parse_as_svg() {
    let mut drawing = svg_drawing(15);
    drawing.new_page(100.0, 100.0).unwrap();
    drawing.linear_gradient((0.0, 0.0), (100.0, 0.0), &[red(), blue()], None).unwrap();
    drawing.shadow((2.0, -2.0), 4.0, None).unwrap();
    drawing.save();
    drawing.oval(0.0, 0.0, 50.0, 50.0).unwrap();
    drawing.move_to(0.0, 0.0);
    drawing.qcurve_to(50.0, 100.0, 100.0, 0.0);
    drawing.clip_path().unwrap();
    drawing.text_box("clipped text", (0.0, 0.0, 100.0, 100.0), TextAlign::Right).unwrap();
    drawing.image("photo.png", (0.0, 0.0), 1.0, None).unwrap();
    drawing.restore();

    let markup = finished(&mut drawing);
    let tree = usvg::Tree::from_str(&markup, &usvg::Options::default()).unwrap();
    assert_eq!(tree.size().width(), 100.0);
}

fn recorded_session(seed: u64, rects: &[(f32, f32, f32, f32)]) -> Drawing<SvgContext> {
    let mut drawing = svg_drawing(seed);
    drawing.new_page(500.0, 500.0).unwrap();
    drawing.shadow((1.0, 1.0), 2.0, None).unwrap();
    for (x, y, w, h) in rects {
        drawing.rect(*x, *y, *w, *h).unwrap();
    }
    drawing
}

fn matrix_values(matrix: &str) -> Vec<f32> {
    matrix
        .trim_start_matches("matrix(")
        .trim_end_matches(')')
        .split(',')
        .map(|v| v.parse().unwrap())
        .collect()
}

fn close(a: f32, b: f32, tolerance: f32) -> bool {
    (a - b).abs() <= tolerance * (1.0 + a.abs().max(b.abs()))
}

fn transform() -> impl Strategy<Value = Transform> {
    prop::array::uniform6(-10.0f32..10.0)
        .prop_map(|[sx, ky, kx, sy, tx, ty]| Transform::from_row(sx, ky, kx, sy, tx, ty))
}

proptest! {
    #[test]
    fn path_data_is_relative_after_first_point(
        points in prop::collection::vec((-1000.0f32..1000.0, -1000.0f32..1000.0), 1..12)
    ) {
        let mut path = BezierPath::new();
        path.polygon(&points, false);
        let data = path_to_markup(&path, None);

        prop_assert!(data.starts_with('M'));
        prop_assert_eq!(data.matches('M').count(), 1);

        // Summing up the relative steps leads back to the last point.
        let mut commands = data.split_whitespace();
        let first = commands.next().unwrap().trim_start_matches('M');
        let mut current: Vec<f32> = first.split(',').map(|v| v.parse().unwrap()).collect();
        for command in commands {
            let delta: Vec<f32> =
                command.trim_start_matches('l').split(',').map(|v| v.parse().unwrap()).collect();
            current[0] += delta[0];
            current[1] += delta[1];
        }
        let last = points[points.len() - 1];
        let tolerance = 0.001 * points.len() as f32;
        prop_assert!((current[0] - last.0).abs() <= tolerance);
        prop_assert!((current[1] - last.1).abs() <= tolerance);
    }

    #[test]
    fn empty_paths_have_no_data(ts in transform()) {
        prop_assert_eq!(path_to_markup(&BezierPath::new(), Some(&ts)), "");
    }

    #[test]
    fn flipping_is_involutive(
        y1 in -1000.0f32..1000.0,
        y2 in -1000.0f32..1000.0,
        height in 1.0f32..2000.0,
        dy in -100.0f32..100.0,
    ) {
        let gradient = Gradient {
            id: "g".to_string(),
            kind: GradientKind::Linear,
            start: Point::from_xy(0.0, y1),
            end: Point::from_xy(10.0, y2),
            stops: vec![Stop { color: Color::black(), position: 0.0 }],
        };
        let twice = gradient.flipped(height).flipped(height);
        prop_assert!((twice.start.y - y1).abs() < 1e-3);
        prop_assert!((twice.end.y - y2).abs() < 1e-3);
        prop_assert_eq!(twice.id, gradient.id);

        let shadow = drawexport::Shadow::new("s".to_string(), (1.0, dy), 1.0, Color::black());
        prop_assert_eq!(shadow.flipped().flipped(), shadow);
    }

    #[test]
    fn transforms_compose_like_matrices(t1 in transform(), t2 in transform()) {
        let mut drawing = svg_drawing(0);
        drawing.new_page(100.0, 100.0).unwrap();
        let initial = drawing.state().transform;
        drawing.transform(t1);
        drawing.transform(t2);

        let expected = initial.pre_concat(t1).pre_concat(t2);
        let written = matrix_values(&drawing.state().transform.to_svg_matrix());
        let reference = [expected.sx, expected.ky, expected.kx, expected.sy, expected.tx, expected.ty];
        for (written, reference) in written.iter().zip(reference) {
            prop_assert!(close(*written, reference, 1e-3), "{} != {}", written, reference);
        }
    }

    #[test]
    fn matrix_keeps_natural_order(ts in transform()) {
        let written = matrix_values(&ts.to_svg_matrix());
        let reference = [ts.sx, ts.ky, ts.kx, ts.sy, ts.tx, ts.ty];
        for (written, reference) in written.iter().zip(reference) {
            prop_assert!((written - reference).abs() <= 0.0006);
            prop_assert_eq!(format_number(*written), format_number(reference));
        }
    }

    #[test]
    fn export_is_idempotent(
        seed in any::<u64>(),
        rects in prop::collection::vec(
            (0.0f32..500.0, 0.0f32..500.0, 0.0f32..100.0, 0.0f32..100.0),
            0..8,
        )
    ) {
        let dir = tempfile::tempdir().unwrap();
        let mut drawing = recorded_session(seed, &rects);
        drawing.save_image(dir.path().join("a.svg"), false).unwrap();
        drawing.save_image(dir.path().join("b.svg"), false).unwrap();
        let a = fs::read(dir.path().join("a.svg")).unwrap();
        let b = fs::read(dir.path().join("b.svg")).unwrap();
        prop_assert_eq!(&a, &b);

        let mut again = recorded_session(seed, &rects);
        again.save_image(dir.path().join("c.svg"), false).unwrap();
        prop_assert_eq!(a, fs::read(dir.path().join("c.svg")).unwrap());
    }
}

#[test]
fn contexts_are_independent() {
    let mut first = svg_drawing(1);
    let mut second = svg_drawing(1);
    first.new_page(10.0, 10.0).unwrap();
    first.rect(0.0, 0.0, 1.0, 1.0).unwrap();
    assert_eq!(second.context().document_state(), drawexport::DocumentState::NoPage);
    second.new_page(10.0, 10.0).unwrap();
    assert!(!first_page(&second).contains("<path"));
}
