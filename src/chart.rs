use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::domain::Channel;
use crate::metrics::DayAggregate;

const MAX_BALL_DIAMETER: f64 = 36.0;
const BALL_SPACING_SHARE: f64 = 0.55;
const BALL_FILL_SHARE: f64 = 0.95;
const TARGET_LABEL_COUNT: usize = 6;
const MOOD_MIN: f64 = 1.0;
const MOOD_MAX: f64 = 5.0;
const SLEEP_AXIS_FLOOR_HOURS: f64 = 8.0;
const OUTLINE_STROKE_WIDTH: f64 = 1.25;

pub const MOOD_LINE_COLOR: Rgba = Rgba::rgb(0x9A, 0x7B, 0xFF);
pub const SLEEP_LINE_COLOR: Rgba = Rgba::rgb(0x00, 0xE6, 0xFF);
const BAR_COLOR: Rgba = Rgba::rgb(0x7E, 0x6A, 0xF4).with_alpha(0.38);
const OUTLINE_COLOR: Rgba = Rgba::rgb(0x9E, 0xB8, 0xFF).with_alpha(0.25);
const LABEL_COLOR: Rgba = Rgba::rgb(220, 230, 255).with_alpha(160.0 / 255.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartMode {
    Mood,
    Sleep,
    Totals,
}

impl ChartMode {
    pub const ALL: [ChartMode; 3] = [ChartMode::Mood, ChartMode::Sleep, ChartMode::Totals];

    pub fn next(self) -> Self {
        match self {
            ChartMode::Mood => ChartMode::Sleep,
            ChartMode::Sleep => ChartMode::Totals,
            ChartMode::Totals => ChartMode::Mood,
        }
    }
}

impl Display for ChartMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ChartMode::Mood => "mood",
            ChartMode::Sleep => "sleep",
            ChartMode::Totals => "totals",
        };
        f.write_str(label)
    }
}

impl FromStr for ChartMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mood" => Ok(ChartMode::Mood),
            "sleep" => Ok(ChartMode::Sleep),
            "totals" | "hist" => Ok(ChartMode::Totals),
            other => {
                let expected = ChartMode::ALL.map(|mode| mode.to_string()).join(", ");
                Err(format!("unknown chart mode: {other} (expected one of {expected})"))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f64,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: 1.0 }
    }

    pub const fn with_alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }
}

pub fn channel_color(channel: Channel) -> Rgba {
    match channel {
        Channel::X => Rgba::rgb(0x6E, 0xE7, 0xB7),
        Channel::Y => Rgba::rgb(0xF8, 0xD4, 0x77),
        Channel::Z => Rgba::rgb(0xFF, 0x6B, 0x6B),
        Channel::W => Rgba::rgb(0x60, 0xA5, 0xFA),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 8.0,
            top: 8.0,
            right: 8.0,
            bottom: 28.0,
        }
    }
}

// Origin is top-left, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
    pub label_inset: f64,
    pub label_baseline: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margins: Margins::default(),
            label_inset: 18.0,
            label_baseline: 4.0,
        }
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_labels(mut self, label_inset: f64, label_baseline: f64) -> Self {
        self.label_inset = label_inset;
        self.label_baseline = label_baseline;
        self
    }

    fn left(&self) -> f64 {
        self.margins.left
    }

    fn right(&self) -> f64 {
        (self.width - self.margins.right).max(self.left())
    }

    fn top(&self) -> f64 {
        self.margins.top
    }

    fn bottom(&self) -> f64 {
        (self.height - self.margins.bottom).max(self.top())
    }

    pub fn plot_width(&self) -> f64 {
        self.right() - self.left()
    }

    pub fn plot_height(&self) -> f64 {
        self.bottom() - self.top()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    QuadTo { control: Point, to: Point },
    LineTo(Point),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurvePath {
    pub segments: Vec<PathSegment>,
}

impl CurvePath {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectStyle {
    Fill,
    Stroke,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    Mood,
    Sleep,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    RoundedRect {
        top_left: Point,
        width: f64,
        height: f64,
        corner_radius: f64,
        style: RectStyle,
        stroke_width: f64,
        color: Rgba,
    },
    Circle {
        center: Point,
        radius: f64,
        color: Rgba,
    },
    Path {
        series: Series,
        path: CurvePath,
        stroke_width: f64,
        color: Rgba,
        opacity: f64,
    },
    Text {
        position: Point,
        text: String,
        color: Rgba,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackGeometry {
    pub day_index: usize,
    pub center_x: f64,
    pub bottom: f64,
    pub height: f64,
    pub total: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartLayout {
    pub ball_diameter: f64,
    pub stacks: Vec<StackGeometry>,
    pub primitives: Vec<Primitive>,
}

impl ChartLayout {
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct LineWeight {
    stroke_width: f64,
    opacity: f64,
    point_radius: f64,
}

const DOMINANT: LineWeight = LineWeight {
    stroke_width: 6.0,
    opacity: 0.90,
    point_radius: 5.5,
};

const SECONDARY: LineWeight = LineWeight {
    stroke_width: 4.0,
    opacity: 0.35,
    point_radius: 4.0,
};

pub fn layout_chart(days: &[DayAggregate], mode: ChartMode, viewport: &Viewport) -> ChartLayout {
    if days.is_empty() {
        return ChartLayout::default();
    }

    let left = viewport.left();
    let bottom = viewport.bottom();
    let plot_height = viewport.plot_height();
    let step_x = viewport.plot_width() / days.len().saturating_sub(1).max(1) as f64;
    let xs = (0..days.len())
        .map(|index| left + index as f64 * step_x)
        .collect::<Vec<_>>();

    let ball_diameter = ball_diameter(days, step_x, plot_height);
    let stacks = days
        .iter()
        .enumerate()
        .map(|(day_index, day)| {
            let total = day.total();
            StackGeometry {
                day_index,
                center_x: xs[day_index],
                bottom,
                height: ball_diameter * f64::from(total),
                total,
            }
        })
        .collect::<Vec<_>>();

    let mut primitives = Vec::new();
    if ball_diameter > 0.0 {
        for stack in stacks.iter().filter(|stack| stack.total > 0) {
            match mode {
                ChartMode::Mood | ChartMode::Sleep => {
                    push_stack_outline(&mut primitives, stack, ball_diameter, RectStyle::Fill, BAR_COLOR);
                }
                ChartMode::Totals => {
                    push_stack_outline(
                        &mut primitives,
                        stack,
                        ball_diameter,
                        RectStyle::Stroke,
                        OUTLINE_COLOR,
                    );
                    push_stack_balls(&mut primitives, stack, &days[stack.day_index], ball_diameter);
                }
            }
        }
    }

    let max_sleep = days
        .iter()
        .map(|day| f64::from(day.sleep_avg))
        .fold(SLEEP_AXIS_FLOOR_HOURS, f64::max);
    let mood_points = days
        .iter()
        .enumerate()
        .filter_map(|(index, day)| {
            day.mood_avg.map(|mood| {
                let share = ((f64::from(mood) - MOOD_MIN) / (MOOD_MAX - MOOD_MIN)).clamp(0.0, 1.0);
                Point::new(xs[index], bottom - share * plot_height)
            })
        })
        .collect::<Vec<_>>();
    let sleep_points = days
        .iter()
        .enumerate()
        .map(|(index, day)| {
            let share = (f64::from(day.sleep_avg) / max_sleep).clamp(0.0, 1.0);
            Point::new(xs[index], bottom - share * plot_height)
        })
        .collect::<Vec<_>>();

    let mood = (Series::Mood, mood_points.as_slice(), MOOD_LINE_COLOR);
    let sleep = (Series::Sleep, sleep_points.as_slice(), SLEEP_LINE_COLOR);
    let ordered = match mode {
        ChartMode::Mood => [(sleep, SECONDARY), (mood, DOMINANT)],
        ChartMode::Sleep => [(mood, SECONDARY), (sleep, DOMINANT)],
        ChartMode::Totals => [(mood, SECONDARY), (sleep, SECONDARY)],
    };
    for ((series, points, color), weight) in ordered {
        push_curve(&mut primitives, series, points, color, weight);
    }

    let label_every = (days.len() / TARGET_LABEL_COUNT).max(1);
    for (index, day) in days.iter().enumerate() {
        if index % label_every == 0 {
            primitives.push(Primitive::Text {
                position: Point::new(
                    xs[index] - viewport.label_inset,
                    viewport.height - viewport.label_baseline,
                ),
                text: day.date.format("%-m/%-d").to_string(),
                color: LABEL_COLOR,
            });
        }
    }

    ChartLayout {
        ball_diameter,
        stacks,
        primitives,
    }
}

fn ball_diameter(days: &[DayAggregate], step_x: f64, plot_height: f64) -> f64 {
    let max_total = days.iter().map(DayAggregate::total).max().unwrap_or(0).max(1);
    let size_cap = MAX_BALL_DIAMETER.min(step_x * BALL_SPACING_SHARE);
    size_cap.min(plot_height / f64::from(max_total)).max(0.0)
}

fn push_stack_outline(
    primitives: &mut Vec<Primitive>,
    stack: &StackGeometry,
    ball_diameter: f64,
    style: RectStyle,
    color: Rgba,
) {
    let radius = ball_diameter / 2.0;
    primitives.push(Primitive::RoundedRect {
        top_left: Point::new(stack.center_x - radius, stack.bottom - stack.height),
        width: ball_diameter,
        height: stack.height,
        corner_radius: radius,
        style,
        stroke_width: match style {
            RectStyle::Fill => 0.0,
            RectStyle::Stroke => OUTLINE_STROKE_WIDTH,
        },
        color,
    });
}

fn push_stack_balls(
    primitives: &mut Vec<Primitive>,
    stack: &StackGeometry,
    day: &DayAggregate,
    ball_diameter: f64,
) {
    let radius = ball_diameter / 2.0 * BALL_FILL_SHARE;
    let mut slot = 0u32;
    for channel in Channel::STACK_ORDER {
        let color = channel_color(channel);
        for _ in 0..day.count(channel) {
            let center_y = stack.bottom - (f64::from(slot) + 0.5) * ball_diameter;
            primitives.push(Primitive::Circle {
                center: Point::new(stack.center_x, center_y),
                radius,
                color,
            });
            slot += 1;
        }
    }
}

fn push_curve(
    primitives: &mut Vec<Primitive>,
    series: Series,
    points: &[Point],
    color: Rgba,
    weight: LineWeight,
) {
    if points.is_empty() {
        return;
    }

    primitives.push(Primitive::Path {
        series,
        path: smooth_path(points),
        stroke_width: weight.stroke_width,
        color,
        opacity: weight.opacity,
    });
    for point in points {
        primitives.push(Primitive::Circle {
            center: *point,
            radius: weight.point_radius,
            color: color.with_alpha(weight.opacity),
        });
    }
}

pub fn smooth_path(points: &[Point]) -> CurvePath {
    let Some((first, rest)) = points.split_first() else {
        return CurvePath::default();
    };

    let mut segments = Vec::with_capacity(points.len() + 1);
    segments.push(PathSegment::MoveTo(*first));
    let mut previous = *first;
    for current in rest {
        segments.push(PathSegment::QuadTo {
            control: previous,
            to: previous.midpoint(*current),
        });
        previous = *current;
    }
    segments.push(PathSegment::LineTo(previous));

    CurvePath { segments }
}
