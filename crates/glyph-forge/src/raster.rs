//! PNG rendering of a [`GeometryDescriptor`].
//!
//! Shapes are rasterized by per-pixel coverage in the same paint order as
//! the SVG rendering: the core polygon first, then every primitive. One
//! canvas unit maps to one pixel and the background stays transparent.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::color::{Color, to_channel};
use crate::error::RasterError;
use crate::geometry::{
    Circle, GeometryDescriptor, Line, MAX_CANVAS_SIZE, MIN_CANVAS_SIZE, Point, Primitive,
    stroke_scale,
};
use crate::render::{CORE_FILL_OPACITY, CORE_STROKE_WIDTH};

/// Renders the descriptor as a PNG image.
///
/// # Errors
///
/// Returns [`RasterError::CanvasOutOfRange`] for a canvas outside the
/// accepted size range and [`RasterError::EncodeError`] if encoding fails.
///
/// ```
/// use glyph_forge::{GlyphOptions, derive_seed, render_png, synthesize_with};
///
/// let glyph = synthesize_with(derive_seed("item-42"), &GlyphOptions::default());
/// let png = render_png(&glyph).expect("encode png");
/// assert!(png.starts_with(b"\x89PNG"));
/// ```
pub fn render_png(descriptor: &GeometryDescriptor) -> Result<Vec<u8>, RasterError> {
    let image = rasterize(descriptor)?;
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|err| RasterError::EncodeError {
            message: err.to_string(),
        })?;
    Ok(out.into_inner())
}

/// Paints the descriptor onto a transparent RGBA canvas.
///
/// # Errors
///
/// Returns [`RasterError::CanvasOutOfRange`] for a canvas outside the
/// accepted size range.
pub fn rasterize(descriptor: &GeometryDescriptor) -> Result<RgbaImage, RasterError> {
    let size = descriptor.canvas_size;
    if !(MIN_CANVAS_SIZE..=MAX_CANVAS_SIZE).contains(&size) {
        return Err(RasterError::CanvasOutOfRange { size });
    }
    let mut image = RgbaImage::new(size, size);
    let primary = descriptor.palette.primary;

    let core: Vec<Point> = descriptor
        .core_points
        .iter()
        .map(|point| point.position)
        .collect();
    paint(&mut image, &Shape::Fill(&core), primary, CORE_FILL_OPACITY);
    let core_half_width = CORE_STROKE_WIDTH * stroke_scale(size) / 2.0;
    for (start, end) in closed_edges(&core) {
        let edge = Shape::Stroke {
            start,
            end,
            half_width: core_half_width,
            dash: None,
        };
        paint(&mut image, &edge, primary, 1.0);
    }

    for primitive in &descriptor.primitives {
        match primitive {
            Primitive::Line(line) => paint_line(&mut image, line),
            Primitive::Circle(circle) => paint_circle(&mut image, circle),
        }
    }
    Ok(image)
}

fn paint_line(image: &mut RgbaImage, line: &Line) {
    let shape = Shape::Stroke {
        start: line.start,
        end: line.end,
        half_width: line.stroke.width / 2.0,
        dash: line.stroke.dash.as_deref().and_then(DashPattern::parse),
    };
    paint(image, &shape, line.stroke.color, line.stroke.opacity);
}

fn paint_circle(image: &mut RgbaImage, circle: &Circle) {
    let shape = Shape::Disc {
        center: circle.center,
        radius: circle.radius,
    };
    paint(image, &shape, circle.fill, circle.opacity);
}

/// A paintable region with anti-aliased edges.
enum Shape<'a> {
    /// Even-odd interior of a closed polygon.
    Fill(&'a [Point]),
    /// A round-capped stroke, optionally dashed.
    Stroke {
        start: Point,
        end: Point,
        half_width: f64,
        dash: Option<DashPattern>,
    },
    Disc {
        center: Point,
        radius: f64,
    },
}

/// Axis-aligned extent of a shape in canvas units.
struct Bounds {
    min: Point,
    max: Point,
}

impl Shape<'_> {
    /// Fraction of the pixel centred on `point` the shape covers.
    fn coverage(&self, point: Point) -> f64 {
        match self {
            Self::Fill(polygon) => {
                if contains(polygon, point) {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Stroke {
                start,
                end,
                half_width,
                dash,
            } => segment_distance(point, *start, *end, dash.as_ref())
                .map_or(0.0, |gap| edge_coverage(*half_width - gap)),
            Self::Disc { center, radius } => edge_coverage(*radius - distance(point, *center)),
        }
    }

    fn bounds(&self) -> Bounds {
        match self {
            Self::Fill(polygon) => polygon.iter().fold(
                Bounds {
                    min: Point {
                        x: f64::INFINITY,
                        y: f64::INFINITY,
                    },
                    max: Point {
                        x: f64::NEG_INFINITY,
                        y: f64::NEG_INFINITY,
                    },
                },
                |acc, point| Bounds {
                    min: Point {
                        x: acc.min.x.min(point.x),
                        y: acc.min.y.min(point.y),
                    },
                    max: Point {
                        x: acc.max.x.max(point.x),
                        y: acc.max.y.max(point.y),
                    },
                },
            ),
            Self::Stroke {
                start,
                end,
                half_width,
                ..
            } => Bounds {
                min: Point {
                    x: start.x.min(end.x) - half_width,
                    y: start.y.min(end.y) - half_width,
                },
                max: Point {
                    x: start.x.max(end.x) + half_width,
                    y: start.y.max(end.y) + half_width,
                },
            },
            Self::Disc { center, radius } => Bounds {
                min: Point {
                    x: center.x - radius,
                    y: center.y - radius,
                },
                max: Point {
                    x: center.x + radius,
                    y: center.y + radius,
                },
            },
        }
    }
}

/// An SVG dash array resolved into painted intervals within one period.
#[derive(Debug, PartialEq)]
struct DashPattern {
    period: f64,
    intervals: Vec<(f64, f64)>,
}

impl DashPattern {
    /// Parses a dash array; `None` means the stroke is solid.
    ///
    /// An odd number of lengths is repeated, as SVG does.
    fn parse(pattern: &str) -> Option<Self> {
        let lengths: Vec<f64> = pattern
            .split(|ch: char| ch == ',' || ch.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::parse::<f64>)
            .collect::<Result<_, _>>()
            .ok()?;
        if lengths.iter().any(|length| !length.is_finite() || *length < 0.0) {
            return None;
        }
        let cycle: Vec<f64> = if lengths.len().rem_euclid(2) == 1 {
            lengths.iter().chain(&lengths).copied().collect()
        } else {
            lengths
        };
        let period: f64 = cycle.iter().sum();
        if period <= 0.0 {
            return None;
        }
        let mut offset = 0.0;
        let mut intervals = Vec::new();
        for (index, length) in cycle.iter().enumerate() {
            if index.rem_euclid(2) == 0 {
                intervals.push((offset, offset + length));
            }
            offset += length;
        }
        Some(Self { period, intervals })
    }

    /// Moves `along` to the nearest painted position on a line of `length`.
    fn nearest_painted(&self, along: f64, length: f64) -> Option<f64> {
        let cycle = (along / self.period).floor();
        [cycle - 1.0, cycle, cycle + 1.0]
            .into_iter()
            .flat_map(|repeat| {
                let origin = repeat * self.period;
                self.intervals
                    .iter()
                    .map(move |&(from, to)| ((origin + from).max(0.0), (origin + to).min(length)))
            })
            .filter(|&(from, to)| from <= to)
            .map(|(from, to)| along.clamp(from, to))
            .min_by(|left, right| (left - along).abs().total_cmp(&(right - along).abs()))
    }
}

fn closed_edges(points: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    points
        .iter()
        .copied()
        .zip(points.iter().copied().cycle().skip(1))
}

/// Even-odd containment test.
fn contains(polygon: &[Point], point: Point) -> bool {
    closed_edges(polygon)
        .filter(|(from, to)| {
            (from.y > point.y) != (to.y > point.y)
                && point.x < (to.x - from.x) * (point.y - from.y) / (to.y - from.y) + from.x
        })
        .count()
        .rem_euclid(2)
        == 1
}

fn distance(from: Point, to: Point) -> f64 {
    (to.x - from.x).hypot(to.y - from.y)
}

/// Distance from `point` to the painted part of a segment, if any is painted.
fn segment_distance(
    point: Point,
    start: Point,
    end: Point,
    dash: Option<&DashPattern>,
) -> Option<f64> {
    let length = distance(start, end);
    if length <= f64::EPSILON {
        return Some(distance(point, start));
    }
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let along = ((point.x - start.x) * dx + (point.y - start.y) * dy) / length;
    let nearest = match dash {
        Some(pattern) => pattern.nearest_painted(along, length)?,
        None => along.clamp(0.0, length),
    };
    let t = nearest / length;
    Some(distance(
        point,
        Point {
            x: start.x + dx * t,
            y: start.y + dy * t,
        },
    ))
}

/// Anti-aliased coverage for a pixel whose centre sits `inside` units
/// within an edge.
const fn edge_coverage(inside: f64) -> f64 {
    (inside + 0.5).clamp(0.0, 1.0)
}

fn paint(image: &mut RgbaImage, shape: &Shape<'_>, color: Color, opacity: f64) {
    let (width, height) = image.dimensions();
    let bounds = shape.bounds();
    for y in pixel_bound(bounds.min.y - 1.0, height)..pixel_bound(bounds.max.y + 1.0, height) {
        for x in pixel_bound(bounds.min.x - 1.0, width)..pixel_bound(bounds.max.x + 1.0, width) {
            let centre = Point {
                x: f64::from(x) + 0.5,
                y: f64::from(y) + 0.5,
            };
            let alpha = shape.coverage(centre) * opacity;
            if alpha > 0.0 {
                blend(image.get_pixel_mut(x, y), color, alpha);
            }
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is floored and clamped to 0..=limit first"
)]
fn pixel_bound(value: f64, limit: u32) -> u32 {
    value.floor().clamp(0.0, f64::from(limit)) as u32
}

/// Source-over compositing onto a straight-alpha pixel.
fn blend(pixel: &mut Rgba<u8>, color: Color, alpha: f64) {
    let [red, green, blue, existing] = pixel.0;
    let below = f64::from(existing) / 255.0 * (1.0 - alpha);
    let combined = alpha + below;
    let (src_red, src_green, src_blue) = color.channels();
    let mix = |src: u8, dst: u8| {
        (f64::from(src) * alpha + f64::from(dst) * below) / combined / 255.0
    };
    pixel.0 = [
        to_channel(mix(src_red, red)),
        to_channel(mix(src_green, green)),
        to_channel(mix(src_blue, blue)),
        to_channel(combined),
    ];
}
