// ABOUTME: Stroke model and outline generation for freehand annotations
// ABOUTME: Turns captured pointer points into a smoothed, closed, fillable polygon

use crate::raster::Color;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Color recorded for eraser strokes. Erasing ignores it.
pub const ERASER_PLACEHOLDER_COLOR: Color = Color::rgb(0, 0, 0);

/// Segments used to approximate each round cap and dot.
const CAP_STEPS: usize = 8;

/// Captured input point in surface-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
    pub pressure: f32,
}

impl StrokePoint {
    pub fn new(x: f32, y: f32, pressure: f32) -> Self {
        Self { x, y, pressure }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pen,
    Eraser,
}

/// One continuous pointer drag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<StrokePoint>,
    pub color: Color,
    pub tool: Tool,
}

impl Stroke {
    /// Open a stroke at its first point. Eraser strokes take the placeholder color.
    pub fn begin(tool: Tool, color: Color, first: StrokePoint) -> Self {
        let color = match tool {
            Tool::Pen => color,
            Tool::Eraser => ERASER_PLACEHOLDER_COLOR,
        };
        Self {
            points: vec![first],
            color,
            tool,
        }
    }

    pub fn push(&mut self, point: StrokePoint) {
        self.points.push(point);
    }

    pub fn outline(&self) -> Vec<(f32, f32)> {
        stroke_outline(&self.points, &StrokeOptions::for_tool(self.tool))
    }
}

/// Shape parameters of the outline algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeOptions {
    /// Diameter of the stroke at mid pressure.
    pub size: f32,
    /// How much pressure narrows or widens the stroke, 0..1.
    pub thinning: f32,
    /// Minimum spacing between outline points as a fraction of `size`.
    pub smoothing: f32,
    /// How strongly new input is pulled towards the previous point, 0..1.
    pub streamline: f32,
}

impl StrokeOptions {
    pub fn for_tool(tool: Tool) -> Self {
        match tool {
            Tool::Pen => Self {
                size: 6.0,
                thinning: 0.5,
                smoothing: 0.5,
                streamline: 0.5,
            },
            Tool::Eraser => Self {
                size: 32.0,
                thinning: 0.5,
                smoothing: 0.5,
                streamline: 0.5,
            },
        }
    }

    pub fn radius(&self, pressure: f32) -> f32 {
        let pressure = pressure.clamp(0.0, 1.0);
        (self.size * (0.5 - self.thinning * (0.5 - pressure))).max(0.5)
    }
}

type Vec2 = (f32, f32);

fn sub(a: Vec2, b: Vec2) -> Vec2 {
    (a.0 - b.0, a.1 - b.1)
}

fn add(a: Vec2, b: Vec2) -> Vec2 {
    (a.0 + b.0, a.1 + b.1)
}

fn scale(a: Vec2, s: f32) -> Vec2 {
    (a.0 * s, a.1 * s)
}

fn length(a: Vec2) -> f32 {
    (a.0 * a.0 + a.1 * a.1).sqrt()
}

fn dist_sq(a: Vec2, b: Vec2) -> f32 {
    let d = sub(a, b);
    d.0 * d.0 + d.1 * d.1
}

fn unit(a: Vec2) -> Option<Vec2> {
    let len = length(a);
    if len <= f32::EPSILON {
        None
    } else {
        Some((a.0 / len, a.1 / len))
    }
}

/// Pull each point towards its predecessor. The final point is kept exact so
/// the ink reaches the pointer. Points that collapse onto the previous one are dropped.
fn streamline_points(points: &[StrokePoint], streamline: f32) -> Vec<StrokePoint> {
    let mut out: Vec<StrokePoint> = Vec::with_capacity(points.len());
    let Some(&first) = points.first() else {
        return out;
    };
    out.push(first);

    let t = 0.15 + (1.0 - streamline.clamp(0.0, 1.0)) * 0.85;
    let last_index = points.len() - 1;

    for (i, point) in points.iter().enumerate().skip(1) {
        let prev = out[out.len() - 1];
        let next = if i == last_index {
            *point
        } else {
            StrokePoint {
                x: prev.x + (point.x - prev.x) * t,
                y: prev.y + (point.y - prev.y) * t,
                pressure: point.pressure,
            }
        };
        if dist_sq((next.x, next.y), (prev.x, prev.y)) <= f32::EPSILON {
            continue;
        }
        out.push(next);
    }
    out
}

fn dot(center: Vec2, radius: f32) -> Vec<Vec2> {
    let steps = CAP_STEPS * 2;
    (0..steps)
        .map(|k| {
            let a = 2.0 * PI * k as f32 / steps as f32;
            (center.0 + radius * a.cos(), center.1 + radius * a.sin())
        })
        .collect()
}

/// Half circle around `center` from `from` (a unit normal) sweeping through `through`.
fn cap(center: Vec2, from: Vec2, through: Vec2, radius: f32) -> impl Iterator<Item = Vec2> {
    (1..CAP_STEPS).map(move |k| {
        let a = PI * k as f32 / CAP_STEPS as f32;
        let offset = add(scale(from, a.cos()), scale(through, a.sin()));
        add(center, scale(offset, radius))
    })
}

/// Convert captured points into a closed outline polygon.
///
/// Input is streamlined, then offset along its normal by a pressure dependent
/// radius on both sides, with round caps at both ends. A stroke that never
/// travels becomes a round dot. The result is a pure function of its inputs.
pub fn stroke_outline(points: &[StrokePoint], options: &StrokeOptions) -> Vec<(f32, f32)> {
    let pts = streamline_points(points, options.streamline);
    let Some(first) = pts.first() else {
        return Vec::new();
    };

    let travelled: f32 = pts
        .windows(2)
        .map(|w| length(sub((w[1].x, w[1].y), (w[0].x, w[0].y))))
        .sum();
    if pts.len() < 2 || travelled < 1.0 {
        return dot((first.x, first.y), options.radius(first.pressure));
    }

    // Streamlining drops zero-length segments, so every segment has a direction.
    let segment_dirs: Vec<Vec2> = pts
        .windows(2)
        .map(|w| unit(sub((w[1].x, w[1].y), (w[0].x, w[0].y))).unwrap_or((1.0, 0.0)))
        .collect();

    let last = pts.len() - 1;
    let point_dir = |i: usize| -> Vec2 {
        if i == 0 {
            segment_dirs[0]
        } else if i == last {
            segment_dirs[last - 1]
        } else {
            unit(add(segment_dirs[i - 1], segment_dirs[i])).unwrap_or(segment_dirs[i])
        }
    };

    let min_spacing = (options.size * options.smoothing).powi(2);
    let mut left: Vec<Vec2> = Vec::with_capacity(pts.len());
    let mut right: Vec<Vec2> = Vec::with_capacity(pts.len());

    for (i, p) in pts.iter().enumerate() {
        let dir = point_dir(i);
        let normal = (-dir.1, dir.0);
        let radius = options.radius(p.pressure);
        let center = (p.x, p.y);
        let l = add(center, scale(normal, radius));
        let r = sub(center, scale(normal, radius));
        let keep = |side: &Vec<Vec2>, candidate: Vec2| {
            i == 0 || i == last || side.last().map_or(true, |&q| dist_sq(q, candidate) >= min_spacing)
        };
        if keep(&left, l) {
            left.push(l);
        }
        if keep(&right, r) {
            right.push(r);
        }
    }

    let start = (first.x, first.y);
    let start_dir = point_dir(0);
    let start_normal = (-start_dir.1, start_dir.0);
    let start_radius = options.radius(first.pressure);

    let end_point = pts[last];
    let end = (end_point.x, end_point.y);
    let end_dir = point_dir(last);
    let end_normal = (-end_dir.1, end_dir.0);
    let end_radius = options.radius(end_point.pressure);

    let mut outline = Vec::with_capacity(left.len() + right.len() + CAP_STEPS * 2);
    outline.extend(left.iter().copied());
    outline.extend(cap(end, end_normal, end_dir, end_radius));
    outline.extend(right.iter().rev().copied());
    outline.extend(cap(
        start,
        scale(start_normal, -1.0),
        scale(start_dir, -1.0),
        start_radius,
    ));
    outline
}
