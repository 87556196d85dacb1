use ratatui::style::{Color, Style};
use ratatui::text::Span;
use ratatui::widgets::canvas::{Circle, Context, Line as CanvasLine, Rectangle};

use crate::chart::{ChartLayout, CurvePath, PathSegment, Point, Primitive, RectStyle, Rgba};

const CURVE_STEPS: usize = 8;

pub trait DrawingSurface {
    #[allow(clippy::too_many_arguments)]
    fn draw_rounded_rect(
        &mut self,
        top_left: Point,
        width: f64,
        height: f64,
        corner_radius: f64,
        style: RectStyle,
        stroke_width: f64,
        color: Rgba,
    );

    fn draw_circle(&mut self, center: Point, radius: f64, color: Rgba);

    fn draw_path(&mut self, path: &CurvePath, stroke_width: f64, color: Rgba, opacity: f64);

    fn draw_text(&mut self, position: Point, text: &str, color: Rgba);
}

pub fn render_layout<S: DrawingSurface + ?Sized>(layout: &ChartLayout, surface: &mut S) {
    for primitive in &layout.primitives {
        match primitive {
            Primitive::RoundedRect {
                top_left,
                width,
                height,
                corner_radius,
                style,
                stroke_width,
                color,
            } => surface.draw_rounded_rect(
                *top_left,
                *width,
                *height,
                *corner_radius,
                *style,
                *stroke_width,
                *color,
            ),
            Primitive::Circle {
                center,
                radius,
                color,
            } => surface.draw_circle(*center, *radius, *color),
            Primitive::Path {
                path,
                stroke_width,
                color,
                opacity,
                ..
            } => surface.draw_path(path, *stroke_width, *color, *opacity),
            Primitive::Text {
                position,
                text,
                color,
            } => surface.draw_text(*position, text, *color),
        }
    }
}

pub fn flatten_path(path: &CurvePath, steps: usize) -> Vec<Point> {
    let steps = steps.max(1);
    let mut points = Vec::new();
    let mut cursor: Option<Point> = None;

    for segment in &path.segments {
        match *segment {
            PathSegment::MoveTo(point) | PathSegment::LineTo(point) => {
                points.push(point);
                cursor = Some(point);
            }
            PathSegment::QuadTo { control, to } => {
                let from = cursor.unwrap_or(control);
                for step in 1..=steps {
                    let t = step as f64 / steps as f64;
                    let inverse = 1.0 - t;
                    points.push(Point::new(
                        inverse * inverse * from.x + 2.0 * inverse * t * control.x + t * t * to.x,
                        inverse * inverse * from.y + 2.0 * inverse * t * control.y + t * t * to.y,
                    ));
                }
                cursor = Some(to);
            }
        }
    }

    points
}

// Canvas y grows upward, so every y is mirrored against `height`.
pub struct CanvasSurface<'a, 'b> {
    ctx: &'a mut Context<'b>,
    height: f64,
}

impl<'a, 'b> CanvasSurface<'a, 'b> {
    pub fn new(ctx: &'a mut Context<'b>, height: f64) -> Self {
        Self { ctx, height }
    }

    fn flip(&self, y: f64) -> f64 {
        self.height - y
    }

    fn line(&mut self, from: Point, to: Point, color: Color) {
        let shape = CanvasLine {
            x1: from.x,
            y1: self.flip(from.y),
            x2: to.x,
            y2: self.flip(to.y),
            color,
        };
        self.ctx.draw(&shape);
    }
}

impl DrawingSurface for CanvasSurface<'_, '_> {
    fn draw_rounded_rect(
        &mut self,
        top_left: Point,
        width: f64,
        height: f64,
        _corner_radius: f64,
        style: RectStyle,
        _stroke_width: f64,
        color: Rgba,
    ) {
        let color = terminal_color(color, color.alpha);
        match style {
            RectStyle::Stroke => {
                let shape = Rectangle {
                    x: top_left.x,
                    y: self.flip(top_left.y + height),
                    width,
                    height,
                    color,
                };
                self.ctx.draw(&shape);
            }
            RectStyle::Fill => {
                let mut x = top_left.x;
                while x <= top_left.x + width {
                    self.line(Point::new(x, top_left.y), Point::new(x, top_left.y + height), color);
                    x += 1.0;
                }
            }
        }
    }

    fn draw_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        let color = terminal_color(color, color.alpha);
        let mut ring = radius;
        while ring > 0.0 {
            let shape = Circle {
                x: center.x,
                y: self.flip(center.y),
                radius: ring,
                color,
            };
            self.ctx.draw(&shape);
            ring -= 1.0;
        }
    }

    fn draw_path(&mut self, path: &CurvePath, _stroke_width: f64, color: Rgba, opacity: f64) {
        if path.is_empty() {
            return;
        }

        let color = terminal_color(color, opacity);
        let points = flatten_path(path, CURVE_STEPS);
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], color);
        }
    }

    fn draw_text(&mut self, position: Point, text: &str, color: Rgba) {
        let span = Span::styled(text.to_string(), Style::default().fg(terminal_color(color, 1.0)));
        let y = self.flip(position.y);
        self.ctx.print(position.x, y, span);
    }
}

// No blending in a terminal; faint colours are darkened instead.
fn terminal_color(color: Rgba, opacity: f64) -> Color {
    let weight = opacity.clamp(0.2, 1.0);
    let scale = |channel: u8| (f64::from(channel) * weight).round() as u8;
    Color::Rgb(scale(color.r), scale(color.g), scale(color.b))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::chart::{ChartMode, CurvePath, Point, RectStyle, Rgba, Viewport, layout_chart, smooth_path};
    use crate::metrics::DayAggregate;

    use super::{DrawingSurface, flatten_path, render_layout};

    #[derive(Default)]
    struct RecordingSurface {
        calls: Vec<String>,
    }

    impl DrawingSurface for RecordingSurface {
        fn draw_rounded_rect(
            &mut self,
            _top_left: Point,
            _width: f64,
            height: f64,
            _corner_radius: f64,
            style: RectStyle,
            _stroke_width: f64,
            _color: Rgba,
        ) {
            self.calls.push(format!("rect {style:?} {height:.1}"));
        }

        fn draw_circle(&mut self, _center: Point, _radius: f64, _color: Rgba) {
            self.calls.push("circle".to_string());
        }

        fn draw_path(&mut self, _path: &CurvePath, stroke_width: f64, _color: Rgba, _opacity: f64) {
            self.calls.push(format!("path {stroke_width}"));
        }

        fn draw_text(&mut self, _position: Point, text: &str, _color: Rgba) {
            self.calls.push(format!("text {text}"));
        }
    }

    #[test]
    fn replays_primitives_in_order() {
        let days = vec![DayAggregate {
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            sleep_avg: 7.0,
            mood_avg: None,
            count_x: 1,
            count_y: 0,
            count_z: 0,
            count_w: 1,
        }];
        let layout = layout_chart(&days, ChartMode::Totals, &Viewport::new(200.0, 300.0));
        let mut surface = RecordingSurface::default();
        render_layout(&layout, &mut surface);

        assert_eq!(surface.calls.len(), layout.primitives.len());
        assert!(surface.calls[0].starts_with("rect Stroke"));
        assert_eq!(surface.calls[1], "circle");
        assert_eq!(surface.calls[2], "circle");
        assert_eq!(surface.calls[3], "path 4");
        assert_eq!(surface.calls.last().map(String::as_str), Some("text 3/1"));
    }

    #[test]
    fn flattened_curve_starts_and_ends_on_the_data() {
        let points = [Point::new(0.0, 10.0), Point::new(10.0, 0.0), Point::new(20.0, 10.0)];
        let flat = flatten_path(&smooth_path(&points), 4);

        assert_eq!(flat.first(), Some(&points[0]));
        assert_eq!(flat.last(), Some(&points[2]));
        assert_eq!(flat.len(), 1 + 2 * 4 + 1);
        assert!(flatten_path(&CurvePath::default(), 4).is_empty());
    }
}
