//! Geometry synthesis for seeded glyphs.
//!
//! A glyph is built on a square canvas from two rings of points placed around
//! the centre. The inner ("core") ring forms a closed polygon whose radius
//! perturbation is shared between opposite points, giving bilateral symmetry.
//! The outer ring is perturbed independently and only carries decoration.
//! Chords, outer edges, spokes, and nodes are layered on according to the
//! requested complexity, and a central ornament is always present.
//!
//! Every random choice is a salted draw on the [`Seed`], so each feature's
//! values are independent of which other features were generated.

use std::collections::BTreeSet;
use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::color::{Color, Palette};
use crate::seed::{Seed, derive_seed};

/// Canvas edge length used when none is requested.
pub const DEFAULT_CANVAS_SIZE: u32 = 100;
/// Smallest accepted canvas edge length.
pub const MIN_CANVAS_SIZE: u32 = 16;
/// Largest accepted canvas edge length.
pub const MAX_CANVAS_SIZE: u32 = 4096;

/// Fewest segments a glyph can have.
pub const MIN_SEGMENTS: u32 = 4;
/// Most segments a glyph can have (inclusive).
pub const MAX_SEGMENTS: u32 = 7;

/// Dash pattern applied to dashed spokes.
pub const SPOKE_DASH_PATTERN: &str = "2 2";

const CORE_RADIUS_RATIO: f64 = 0.6;
const OUTER_RADIUS_RATIO: f64 = 0.85;
const OUTER_EDGE_PROBABILITY: f64 = 0.7;
const DECORATION_THRESHOLD: f64 = 0.4;
const NODE_THRESHOLD: f64 = 0.7;
const REDRAW_ATTEMPTS: u32 = 8;

/// Detail level in `[0, 1]`.
///
/// Out-of-range values are clamped and NaN becomes `0`.
///
/// ```
/// use glyph_forge::Complexity;
///
/// assert_eq!(Complexity::new(5.0), Complexity::new(1.0));
/// assert_eq!(Complexity::new(f64::NAN).value(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Complexity(f64);

impl Complexity {
    /// Clamps a raw value into `[0, 1]`.
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Returns the clamped value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl Default for Complexity {
    fn default() -> Self {
        Self(0.5)
    }
}

impl From<f64> for Complexity {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Complexity> for f64 {
    fn from(complexity: Complexity) -> Self {
        complexity.0
    }
}

/// Caller-supplied parameters for synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphOptions {
    complexity: Complexity,
    palette: Palette,
    canvas_size: Option<u32>,
}

impl GlyphOptions {
    /// Creates options on the default canvas.
    #[must_use]
    pub fn new(complexity: f64, palette: Palette) -> Self {
        Self {
            complexity: Complexity::new(complexity),
            palette,
            canvas_size: None,
        }
    }

    /// Sets the canvas edge length, clamped to the accepted range.
    #[must_use]
    pub fn with_canvas_size(mut self, size: u32) -> Self {
        self.canvas_size = Some(size.clamp(MIN_CANVAS_SIZE, MAX_CANVAS_SIZE));
        self
    }

    /// Returns the clamped complexity.
    #[must_use]
    pub const fn complexity(&self) -> Complexity {
        self.complexity
    }

    /// Returns the palette.
    #[must_use]
    pub const fn palette(&self) -> Palette {
        self.palette
    }

    /// Returns the canvas edge length.
    #[must_use]
    pub fn canvas_size(&self) -> u32 {
        self.canvas_size.unwrap_or(DEFAULT_CANVAS_SIZE)
    }
}

/// A position on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate (grows downwards).
    pub y: f64,
}

/// A point on the core or outer ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RingPoint {
    /// Position of the point within its ring.
    pub index: u32,
    /// Angle from the positive x axis, in radians.
    pub angle: f64,
    /// Multiplier applied to the ring's base radius.
    pub radius_factor: f64,
    /// Distance from the canvas centre.
    pub radius: f64,
    /// Canvas coordinates.
    pub position: Point,
}

/// Stroke styling for a line primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    /// Stroke colour.
    pub color: Color,
    /// Stroke width in canvas units.
    pub width: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Optional SVG dash pattern.
    pub dash: Option<String>,
}

/// Role of a line within the glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineKind {
    /// Connects two core points across the polygon.
    Chord,
    /// Connects neighbouring outer points.
    OuterEdge,
    /// Connects a core point to its matching outer point.
    Spoke,
}

/// A straight line between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Role of the line.
    pub kind: LineKind,
    /// Start point.
    pub start: Point,
    /// End point.
    pub end: Point,
    /// Styling.
    pub stroke: Stroke,
}

/// Role of a circle within the glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CircleKind {
    /// The central focal element.
    Ornament,
    /// A marker on a core point.
    Node,
}

/// A filled circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Role of the circle.
    pub kind: CircleKind,
    /// Centre point.
    pub center: Point,
    /// Radius in canvas units.
    pub radius: f64,
    /// Fill colour.
    pub fill: Color,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

/// A drawable element of the glyph, in paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Primitive {
    /// A line segment.
    Line(Line),
    /// A filled circle.
    Circle(Circle),
}

/// Complete, renderer-independent description of a glyph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryDescriptor {
    /// Canvas edge length; the view box is `0 0 size size`.
    pub canvas_size: u32,
    /// Clamped complexity the glyph was built with.
    pub complexity: Complexity,
    /// Colours the glyph was built with.
    pub palette: Palette,
    /// Number of points on each ring, in `[4, 7]`.
    pub segment_count: u32,
    /// Core polygon vertices in drawing order.
    pub core_points: Vec<RingPoint>,
    /// Outer decorative points, aligned with the core points.
    pub outer_points: Vec<RingPoint>,
    /// Lines and circles layered over the core polygon.
    pub primitives: Vec<Primitive>,
}

impl GeometryDescriptor {
    /// Returns the closed SVG path of the core polygon.
    ///
    /// ```
    /// use glyph_forge::{GlyphOptions, derive_seed, synthesize_with};
    ///
    /// let glyph = synthesize_with(derive_seed("item-1"), &GlyphOptions::default());
    /// let path = glyph.core_path();
    /// assert!(path.starts_with('M'));
    /// assert!(path.ends_with('Z'));
    /// ```
    #[must_use]
    pub fn core_path(&self) -> String {
        let mut commands: Vec<String> = self
            .core_points
            .iter()
            .enumerate()
            .map(|(position, point)| {
                let command = if position == 0 { 'M' } else { 'L' };
                format!("{command}{:.2},{:.2}", point.position.x, point.position.y)
            })
            .collect();
        if commands.is_empty() {
            return String::new();
        }
        commands.push("Z".to_owned());
        commands.join(" ")
    }

    /// Iterates over the line primitives.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.primitives.iter().filter_map(|primitive| match primitive {
            Primitive::Line(line) => Some(line),
            Primitive::Circle(_) => None,
        })
    }

    /// Iterates over the circle primitives.
    pub fn circles(&self) -> impl Iterator<Item = &Circle> {
        self.primitives.iter().filter_map(|primitive| match primitive {
            Primitive::Circle(circle) => Some(circle),
            Primitive::Line(_) => None,
        })
    }

    /// Counts lines of one kind.
    #[must_use]
    pub fn line_count(&self, kind: LineKind) -> usize {
        self.lines().filter(|line| line.kind == kind).count()
    }

    /// Counts circles of one kind.
    #[must_use]
    pub fn circle_count(&self, kind: CircleKind) -> usize {
        self.circles().filter(|circle| circle.kind == kind).count()
    }
}

/// Synthesizes the glyph for an identity string.
///
/// Complexity is clamped to `[0, 1]` and the default canvas is used.
///
/// ```
/// use glyph_forge::{Color, synthesize};
///
/// let primary: Color = "#6366f1".parse().expect("colour");
/// let secondary: Color = "#a5b4fc".parse().expect("colour");
/// let first = synthesize("item-42-Widget", 0.6, primary, secondary);
/// let second = synthesize("item-42-Widget", 0.6, primary, secondary);
/// assert_eq!(first, second);
/// ```
#[must_use]
pub fn synthesize(
    identity: &str,
    complexity: f64,
    primary: Color,
    secondary: Color,
) -> GeometryDescriptor {
    let options = GlyphOptions::new(complexity, Palette::new(primary, secondary));
    synthesize_with(derive_seed(identity), &options)
}

/// Synthesizes the glyph for a seed with full options.
#[must_use]
pub fn synthesize_with(seed: Seed, options: &GlyphOptions) -> GeometryDescriptor {
    let canvas_size = options.canvas_size();
    let canvas = Canvas::new(canvas_size);
    let complexity = options.complexity();
    let palette = options.palette();
    let segment_count = segment_count(seed);

    let core_points = core_ring(seed, segment_count, &canvas);
    let outer_points = outer_ring(seed, segment_count, &canvas);

    let mut primitives = chords(seed, &core_points, complexity, palette.secondary, &canvas);
    if complexity.value() > DECORATION_THRESHOLD {
        primitives.extend(outer_edges(seed, &outer_points, palette.primary, &canvas));
        primitives.extend(spokes(
            seed,
            &core_points,
            &outer_points,
            complexity,
            palette.secondary,
            &canvas,
        ));
    }
    if complexity.value() > NODE_THRESHOLD {
        primitives.extend(nodes(&core_points, palette.secondary, &canvas));
    }
    primitives.push(Primitive::Circle(ornament(seed, palette.primary, &canvas)));

    GeometryDescriptor {
        canvas_size,
        complexity,
        palette,
        segment_count,
        core_points,
        outer_points,
        primitives,
    }
}

/// Stroke width multiplier for a canvas, relative to the default canvas.
#[must_use]
pub(crate) fn stroke_scale(canvas_size: u32) -> f64 {
    f64::from(canvas_size) / f64::from(DEFAULT_CANVAS_SIZE)
}

/// Derived canvas measurements shared by every stage.
struct Canvas {
    half: f64,
    center: Point,
    /// Stroke scale relative to the default canvas.
    scale: f64,
}

impl Canvas {
    fn new(size: u32) -> Self {
        let edge = f64::from(size);
        let half = edge / 2.0;
        Self {
            half,
            center: Point { x: half, y: half },
            scale: stroke_scale(size),
        }
    }

    fn ring_point(&self, index: u32, segments: u32, base_ratio: f64, factor: f64) -> RingPoint {
        let angle = f64::from(index) / f64::from(segments) * TAU;
        let radius = self.half * base_ratio * factor;
        RingPoint {
            index,
            angle,
            radius_factor: factor,
            radius,
            position: Point {
                x: self.center.x + radius * angle.cos(),
                y: self.center.y + radius * angle.sin(),
            },
        }
    }
}

/// Segment count in `[MIN_SEGMENTS, MAX_SEGMENTS]`, using floor rounding.
fn segment_count(seed: Seed) -> u32 {
    MIN_SEGMENTS + seed.draw_index("segments", MAX_SEGMENTS - MIN_SEGMENTS + 1)
}

/// Symmetry group shared by point `i` and point `i + segments / 2`.
const fn symmetry_group(index: u32, segments: u32) -> u32 {
    index.rem_euclid(segments.div_euclid(2))
}

fn core_ring(seed: Seed, segments: u32, canvas: &Canvas) -> Vec<RingPoint> {
    (0..segments)
        .map(|index| {
            let group = symmetry_group(index, segments);
            let factor = 0.8 + seed.draw(&format!("core-{group}")) * 0.4;
            canvas.ring_point(index, segments, CORE_RADIUS_RATIO, factor)
        })
        .collect()
}

fn outer_ring(seed: Seed, segments: u32, canvas: &Canvas) -> Vec<RingPoint> {
    (0..segments)
        .map(|index| {
            let factor = 0.9 + seed.draw(&format!("outer-{index}")) * 0.2;
            canvas.ring_point(index, segments, OUTER_RADIUS_RATIO, factor)
        })
        .collect()
}

fn point_at(points: &[RingPoint], index: u32) -> Option<Point> {
    let position = usize::try_from(index).ok()?;
    points.get(position).map(|point| point.position)
}

fn ring_len(points: &[RingPoint]) -> u32 {
    u32::try_from(points.len()).unwrap_or(u32::MAX)
}

/// Floors `fraction * bound` for a fraction in `[0, 1]`.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "fraction is a clamped complexity, so the product lies in 0..=bound"
)]
fn scaled_count(fraction: Complexity, bound: u32) -> u32 {
    (fraction.value() * f64::from(bound)).floor() as u32
}

fn chords(
    seed: Seed,
    core: &[RingPoint],
    complexity: Complexity,
    color: Color,
    canvas: &Canvas,
) -> Vec<Primitive> {
    let segments = ring_len(core);
    if segments < 2 {
        return Vec::new();
    }
    let mut joined = BTreeSet::new();
    (0..scaled_count(complexity, segments))
        .filter_map(|chord| {
            let (start, end) = distinct_chord(seed, chord, segments, &joined);
            joined.insert(unordered(start, end));
            let stroke = Stroke {
                color,
                width: (0.5 + seed.draw(&format!("line-width-{chord}"))) * canvas.scale,
                opacity: 0.35 + seed.draw(&format!("line-opacity-{chord}")) * 0.45,
                dash: None,
            };
            Some(Primitive::Line(Line {
                kind: LineKind::Chord,
                start: point_at(core, start)?,
                end: point_at(core, end)?,
                stroke,
            }))
        })
        .collect()
}

/// Salt for a redrawable choice; the first attempt uses the bare key.
fn attempt_salt(key: &str, index: u32, attempt: u32) -> String {
    if attempt == 0 {
        format!("{key}-{index}")
    } else {
        format!("{key}-{index}-{attempt}")
    }
}

const fn unordered(first: u32, second: u32) -> (u32, u32) {
    if first <= second {
        (first, second)
    } else {
        (second, first)
    }
}

fn drawn_chord(seed: Seed, chord: u32, attempt: u32, segments: u32) -> (u32, u32) {
    let start = seed.draw_index(&attempt_salt("line-start", chord, attempt), segments);
    let offset = 1 + seed.draw_index(&attempt_salt("line-end", chord, attempt), segments - 1);
    (start, (start + offset).rem_euclid(segments))
}

/// Draws a chord whose endpoints no earlier chord has joined.
///
/// Repeats are redrawn with attempt-suffixed salts; if every attempt repeats,
/// the lowest unused pair is taken.
fn distinct_chord(
    seed: Seed,
    chord: u32,
    segments: u32,
    joined: &BTreeSet<(u32, u32)>,
) -> (u32, u32) {
    let unused = |pair: &(u32, u32)| !joined.contains(&unordered(pair.0, pair.1));
    (0..REDRAW_ATTEMPTS)
        .map(|attempt| drawn_chord(seed, chord, attempt, segments))
        .find(unused)
        .or_else(|| {
            (0..segments)
                .flat_map(|first| (first + 1..segments).map(move |second| (first, second)))
                .find(unused)
        })
        .unwrap_or_else(|| drawn_chord(seed, chord, 0, segments))
}

fn outer_edges(seed: Seed, outer: &[RingPoint], color: Color, canvas: &Canvas) -> Vec<Primitive> {
    let segments = ring_len(outer);
    (0..segments)
        .filter(|index| seed.draw_chance(&format!("outer-edge-{index}"), OUTER_EDGE_PROBABILITY))
        .filter_map(|index| {
            let next = (index + 1).rem_euclid(segments);
            Some(Primitive::Line(Line {
                kind: LineKind::OuterEdge,
                start: point_at(outer, index)?,
                end: point_at(outer, next)?,
                stroke: Stroke {
                    color,
                    width: 0.75 * canvas.scale,
                    opacity: 0.5,
                    dash: None,
                },
            }))
        })
        .collect()
}

fn spokes(
    seed: Seed,
    core: &[RingPoint],
    outer: &[RingPoint],
    complexity: Complexity,
    color: Color,
    canvas: &Canvas,
) -> Vec<Primitive> {
    let segments = ring_len(core);
    let count = 1 + scaled_count(complexity, segments.div_euclid(2));
    let mut anchored = BTreeSet::new();
    (0..count)
        .filter_map(|spoke| {
            let target = distinct_spoke(seed, spoke, segments, &anchored);
            anchored.insert(target);
            let dashed = !seed.draw_chance(&format!("spoke-dash-{spoke}"), 0.5);
            Some(Primitive::Line(Line {
                kind: LineKind::Spoke,
                start: point_at(core, target)?,
                end: point_at(outer, target)?,
                stroke: Stroke {
                    color,
                    width: 0.6 * canvas.scale,
                    opacity: 0.6,
                    dash: dashed.then(|| SPOKE_DASH_PATTERN.to_owned()),
                },
            }))
        })
        .collect()
}

/// Draws a spoke target no earlier spoke uses, redrawing like [`distinct_chord`].
fn distinct_spoke(seed: Seed, spoke: u32, segments: u32, anchored: &BTreeSet<u32>) -> u32 {
    let draw = |attempt| seed.draw_index(&attempt_salt("spoke", spoke, attempt), segments);
    (0..REDRAW_ATTEMPTS)
        .map(draw)
        .find(|target| !anchored.contains(target))
        .or_else(|| (0..segments).find(|target| !anchored.contains(target)))
        .unwrap_or_else(|| draw(0))
}

fn nodes(core: &[RingPoint], color: Color, canvas: &Canvas) -> Vec<Primitive> {
    core.iter()
        .map(|point| {
            Primitive::Circle(Circle {
                kind: CircleKind::Node,
                center: point.position,
                radius: canvas.half * 0.03,
                fill: color,
                opacity: 0.85,
            })
        })
        .collect()
}

fn ornament(seed: Seed, color: Color, canvas: &Canvas) -> Circle {
    Circle {
        kind: CircleKind::Ornament,
        center: canvas.center,
        radius: canvas.half * (0.08 + seed.draw("center-size") * 0.06),
        fill: color,
        opacity: 0.9,
    }
}
