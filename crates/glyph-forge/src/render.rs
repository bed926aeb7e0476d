//! SVG and JSON renderings of a [`GeometryDescriptor`].
//!
//! Rendering is a pure function of the descriptor: equal descriptors always
//! produce byte-identical output.

use crate::geometry::{Circle, GeometryDescriptor, Line, Primitive, stroke_scale};

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub(crate) const CORE_FILL_OPACITY: f64 = 0.15;
pub(crate) const CORE_STROKE_WIDTH: f64 = 1.5;

/// Renders the descriptor as a standalone SVG document.
///
/// The core polygon is painted first, then every primitive in descriptor
/// order. Coordinates use two decimal places.
///
/// ```
/// use glyph_forge::{GlyphOptions, derive_seed, render_svg, synthesize_with};
///
/// let glyph = synthesize_with(derive_seed("item-42"), &GlyphOptions::default());
/// let svg = render_svg(&glyph);
/// assert!(svg.starts_with("<svg"));
/// assert!(svg.contains("viewBox=\"0 0 100 100\""));
/// ```
#[must_use]
pub fn render_svg(descriptor: &GeometryDescriptor) -> String {
    let size = descriptor.canvas_size;
    let scale = stroke_scale(size);
    let mut svg = format!(
        "<svg xmlns=\"{SVG_NAMESPACE}\" width=\"{size}\" height=\"{size}\" viewBox=\"0 0 {size} {size}\">\n"
    );
    svg.push_str(&format!(
        "  <path d=\"{}\" fill=\"{primary}\" fill-opacity=\"{CORE_FILL_OPACITY:.2}\" stroke=\"{primary}\" stroke-width=\"{:.2}\" stroke-linejoin=\"round\"/>\n",
        descriptor.core_path(),
        CORE_STROKE_WIDTH * scale,
        primary = descriptor.palette.primary,
    ));
    for primitive in &descriptor.primitives {
        let element = match primitive {
            Primitive::Line(line) => line_element(line),
            Primitive::Circle(circle) => circle_element(circle),
        };
        svg.push_str("  ");
        svg.push_str(&element);
        svg.push('\n');
    }
    svg.push_str("</svg>\n");
    svg
}

fn line_element(line: &Line) -> String {
    let dash = line
        .stroke
        .dash
        .as_deref()
        .map(|pattern| format!(" stroke-dasharray=\"{pattern}\""))
        .unwrap_or_default();
    format!(
        "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{:.2}\" stroke-opacity=\"{:.2}\" stroke-linecap=\"round\"{dash}/>",
        line.start.x,
        line.start.y,
        line.end.x,
        line.end.y,
        line.stroke.color,
        line.stroke.width,
        line.stroke.opacity,
    )
}

fn circle_element(circle: &Circle) -> String {
    format!(
        "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\" fill-opacity=\"{:.2}\"/>",
        circle.center.x, circle.center.y, circle.radius, circle.fill, circle.opacity,
    )
}

/// Renders the descriptor as pretty-printed JSON.
///
/// # Errors
///
/// Returns the serializer error if the descriptor cannot be encoded, which
/// only happens for non-finite coordinates.
pub fn render_json(descriptor: &GeometryDescriptor) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(descriptor)
}
