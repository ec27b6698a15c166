//! SVG path data (`d` attribute).
//!
//! Parsing accepts the full command set (absolute and relative, implicit
//! repeats, `H`/`V`/`S`/`T` shorthands) and normalizes everything to
//! absolute `M`, `L`, `C`, `Q`, `A` and `Z` segments. Formatting writes the
//! normalized form, so a parsed path formats back to an equivalent string.

use crate::{Bounds, Point, ValidationError};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;
use svg_core::approx_eq;

/// Samples per elliptical arc when estimating bounds.
const ARC_SAMPLES: usize = 16;

/// One absolute path segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    CubicTo { ctrl1: Point, ctrl2: Point, to: Point },
    QuadTo { ctrl: Point, to: Point },
    ArcTo {
        radii: DVec2,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
    Close,
}

impl PathSegment {
    fn numbers(&self) -> Vec<f64> {
        match *self {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => vec![p.x, p.y],
            PathSegment::CubicTo { ctrl1, ctrl2, to } => {
                vec![ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y]
            }
            PathSegment::QuadTo { ctrl, to } => vec![ctrl.x, ctrl.y, to.x, to.y],
            PathSegment::ArcTo {
                radii,
                rotation,
                large_arc,
                sweep,
                to,
            } => vec![
                radii.x,
                radii.y,
                rotation,
                large_arc as u8 as f64,
                sweep as u8 as f64,
                to.x,
                to.y,
            ],
            PathSegment::Close => Vec::new(),
        }
    }

    fn same_command(&self, other: &PathSegment) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// A normalized list of path segments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathData(Vec<PathSegment>);

impl PathData {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builds an open or closed polyline, as used for `line`, `polyline`
    /// and `polygon` elements.
    pub fn polyline(points: &[Point], closed: bool) -> Self {
        let mut segments = Vec::with_capacity(points.len() + 1);
        for (i, point) in points.iter().enumerate() {
            segments.push(if i == 0 {
                PathSegment::MoveTo(*point)
            } else {
                PathSegment::LineTo(*point)
            });
        }
        if closed && !points.is_empty() {
            segments.push(PathSegment::Close);
        }
        Self(segments)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(first) = self.0.first() {
            if !matches!(first, PathSegment::MoveTo(_)) {
                return Err(ValidationError::InvalidPath(
                    "path must start with a moveto".into(),
                ));
            }
        }
        if self.0.iter().flat_map(|s| s.numbers()).any(|v| !v.is_finite()) {
            return Err(ValidationError::NotFinite { field: "path data" });
        }
        Ok(())
    }

    /// Bounds of the path geometry.
    ///
    /// Curves contribute their control points, which always enclose the
    /// curve. Arcs are sampled.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = Vec::new();
        let mut current = Point::ZERO;
        let mut subpath_start = Point::ZERO;

        for segment in &self.0 {
            match *segment {
                PathSegment::MoveTo(p) => {
                    points.push(p);
                    current = p;
                    subpath_start = p;
                }
                PathSegment::LineTo(p) => {
                    points.push(p);
                    current = p;
                }
                PathSegment::CubicTo { ctrl1, ctrl2, to } => {
                    points.extend([ctrl1, ctrl2, to]);
                    current = to;
                }
                PathSegment::QuadTo { ctrl, to } => {
                    points.extend([ctrl, to]);
                    current = to;
                }
                PathSegment::ArcTo {
                    radii,
                    rotation,
                    large_arc,
                    sweep,
                    to,
                } => {
                    points.extend(sample_arc(current, radii, rotation, large_arc, sweep, to));
                    points.push(to);
                    current = to;
                }
                PathSegment::Close => current = subpath_start,
            }
        }

        Bounds::from_points(points)
    }

    pub fn approx_eq(&self, other: &PathData, tolerance: f64) -> bool {
        self.0.len() == other.0.len()
            && self.0.iter().zip(&other.0).all(|(a, b)| {
                a.same_command(b)
                    && a
                        .numbers()
                        .iter()
                        .zip(b.numbers().iter())
                        .all(|(x, y)| approx_eq(*x, *y, tolerance))
            })
    }
}

/// Points along an SVG elliptical arc, using the endpoint-to-center
/// conversion from the SVG implementation notes.
fn sample_arc(
    from: Point,
    radii: DVec2,
    rotation: f64,
    large_arc: bool,
    sweep: bool,
    to: Point,
) -> Vec<Point> {
    let (mut rx, mut ry) = (radii.x.abs(), radii.y.abs());
    if from == to || rx == 0.0 || ry == 0.0 {
        return Vec::new();
    }

    let (sin, cos) = rotation.to_radians().sin_cos();
    let half = (from - to) / 2.0;
    let x1 = cos * half.x + sin * half.y;
    let y1 = -sin * half.x + cos * half.y;

    let lambda = (x1 * x1) / (rx * rx) + (y1 * y1) / (ry * ry);
    if lambda > 1.0 {
        rx *= lambda.sqrt();
        ry *= lambda.sqrt();
    }

    let numerator = rx * rx * ry * ry - rx * rx * y1 * y1 - ry * ry * x1 * x1;
    let denominator = rx * rx * y1 * y1 + ry * ry * x1 * x1;
    let sign = if large_arc == sweep { -1.0 } else { 1.0 };
    let coefficient = sign * (numerator / denominator).max(0.0).sqrt();
    let cx1 = coefficient * rx * y1 / ry;
    let cy1 = -coefficient * ry * x1 / rx;

    let mid = (from + to) / 2.0;
    let center = Point::new(cos * cx1 - sin * cy1 + mid.x, sin * cx1 + cos * cy1 + mid.y);

    let angle = |u: DVec2, v: DVec2| (u.x * v.y - u.y * v.x).atan2(u.dot(v));
    let start = DVec2::new((x1 - cx1) / rx, (y1 - cy1) / ry);
    let end = DVec2::new((-x1 - cx1) / rx, (-y1 - cy1) / ry);
    let theta = angle(DVec2::X, start);
    let mut delta = angle(start, end);
    if !sweep && delta > 0.0 {
        delta -= TAU;
    } else if sweep && delta < 0.0 {
        delta += TAU;
    }

    (0..=ARC_SAMPLES)
        .map(|i| {
            let t = theta + delta * i as f64 / ARC_SAMPLES as f64;
            let (st, ct) = t.sin_cos();
            Point::new(
                center.x + cos * rx * ct - sin * ry * st,
                center.y + sin * rx * ct + cos * ry * st,
            )
        })
        .collect()
}

impl fmt::Display for PathData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            let letter = match segment {
                PathSegment::MoveTo(_) => "M",
                PathSegment::LineTo(_) => "L",
                PathSegment::CubicTo { .. } => "C",
                PathSegment::QuadTo { .. } => "Q",
                PathSegment::ArcTo { .. } => "A",
                PathSegment::Close => "Z",
            };
            f.write_str(letter)?;
            for number in segment.numbers() {
                write!(f, " {}", number)?;
            }
        }
        Ok(())
    }
}

impl FromStr for PathData {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let data = Parser::new(s).parse()?;
        data.validate()?;
        Ok(data)
    }
}

impl Serialize for PathData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PathData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    segments: Vec<PathSegment>,
    current: Point,
    subpath_start: Point,
    last_cubic_ctrl: Option<Point>,
    last_quad_ctrl: Option<Point>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            segments: Vec::new(),
            current: Point::ZERO,
            subpath_start: Point::ZERO,
            last_cubic_ctrl: None,
            last_quad_ctrl: None,
        }
    }

    fn error(&self, message: &str) -> ValidationError {
        ValidationError::InvalidPath(format!("{} at offset {} in `{}`", message, self.pos, self.input))
    }

    fn skip_separators(&mut self) {
        while self.pos < self.bytes.len()
            && (self.bytes[self.pos].is_ascii_whitespace() || self.bytes[self.pos] == b',')
        {
            self.pos += 1;
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_separators();
        self.pos >= self.bytes.len()
    }

    fn command(&mut self) -> Option<u8> {
        self.skip_separators();
        let byte = *self.bytes.get(self.pos)?;
        if byte.is_ascii_alphabetic() && byte != b'e' && byte != b'E' {
            self.pos += 1;
            Some(byte)
        } else {
            None
        }
    }

    fn number(&mut self) -> Result<f64, ValidationError> {
        self.skip_separators();
        let start = self.pos;
        let bytes = self.bytes;
        let mut end = start;

        if matches!(bytes.get(end), Some(b'+' | b'-')) {
            end += 1;
        }
        let mut seen_dot = false;
        let mut seen_digit = false;
        while let Some(&b) = bytes.get(end) {
            if b.is_ascii_digit() {
                seen_digit = true;
            } else if b == b'.' && !seen_dot {
                seen_dot = true;
            } else {
                break;
            }
            end += 1;
        }
        if !seen_digit {
            return Err(self.error("expected number"));
        }
        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exp_end = end + 1;
            if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
                exp_end += 1;
            }
            if bytes.get(exp_end).map_or(false, |b| b.is_ascii_digit()) {
                while bytes.get(exp_end).map_or(false, |b| b.is_ascii_digit()) {
                    exp_end += 1;
                }
                end = exp_end;
            }
        }

        let value = self.input[start..end]
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| self.error("invalid number"))?;
        self.pos = end;
        Ok(value)
    }

    fn flag(&mut self) -> Result<bool, ValidationError> {
        self.skip_separators();
        match self.bytes.get(self.pos) {
            Some(b'0') => {
                self.pos += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(true)
            }
            _ => Err(self.error("expected arc flag")),
        }
    }

    fn point(&mut self, relative: bool) -> Result<Point, ValidationError> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(if relative {
            self.current + DVec2::new(x, y)
        } else {
            Point::new(x, y)
        })
    }

    fn starts_number(&mut self) -> bool {
        self.skip_separators();
        matches!(
            self.bytes.get(self.pos),
            Some(b'0'..=b'9' | b'.' | b'-' | b'+')
        )
    }

    fn parse(mut self) -> Result<PathData, ValidationError> {
        let mut command: Option<u8> = None;

        while !self.at_end() {
            let letter = match self.command() {
                Some(letter) => letter,
                None => match command {
                    // Extra coordinate pairs after a moveto are linetos.
                    Some(b'M') => b'L',
                    Some(b'm') => b'l',
                    Some(b'Z' | b'z') | None => return Err(self.error("expected command")),
                    Some(previous) => previous,
                },
            };
            command = Some(letter);

            if self.segments.is_empty() && !matches!(letter, b'M' | b'm') {
                return Err(self.error("path must start with a moveto"));
            }

            self.segment(letter)?;
        }

        Ok(PathData(self.segments))
    }

    fn segment(&mut self, letter: u8) -> Result<(), ValidationError> {
        let relative = letter.is_ascii_lowercase();
        let mut cubic_ctrl = None;
        let mut quad_ctrl = None;

        let segment = match letter.to_ascii_uppercase() {
            b'M' => {
                let to = self.point(relative)?;
                self.subpath_start = to;
                PathSegment::MoveTo(to)
            }
            b'L' => PathSegment::LineTo(self.point(relative)?),
            b'H' => {
                let x = self.number()?;
                let x = if relative { self.current.x + x } else { x };
                PathSegment::LineTo(Point::new(x, self.current.y))
            }
            b'V' => {
                let y = self.number()?;
                let y = if relative { self.current.y + y } else { y };
                PathSegment::LineTo(Point::new(self.current.x, y))
            }
            b'C' => {
                let ctrl1 = self.point(relative)?;
                let ctrl2 = self.point(relative)?;
                let to = self.point(relative)?;
                cubic_ctrl = Some(ctrl2);
                PathSegment::CubicTo { ctrl1, ctrl2, to }
            }
            b'S' => {
                let ctrl1 = self.reflect(self.last_cubic_ctrl);
                let ctrl2 = self.point(relative)?;
                let to = self.point(relative)?;
                cubic_ctrl = Some(ctrl2);
                PathSegment::CubicTo { ctrl1, ctrl2, to }
            }
            b'Q' => {
                let ctrl = self.point(relative)?;
                let to = self.point(relative)?;
                quad_ctrl = Some(ctrl);
                PathSegment::QuadTo { ctrl, to }
            }
            b'T' => {
                let ctrl = self.reflect(self.last_quad_ctrl);
                let to = self.point(relative)?;
                quad_ctrl = Some(ctrl);
                PathSegment::QuadTo { ctrl, to }
            }
            b'A' => {
                let rx = self.number()?;
                let ry = self.number()?;
                let rotation = self.number()?;
                let large_arc = self.flag()?;
                let sweep = self.flag()?;
                let to = self.point(relative)?;
                PathSegment::ArcTo {
                    radii: DVec2::new(rx, ry),
                    rotation,
                    large_arc,
                    sweep,
                    to,
                }
            }
            b'Z' => {
                if self.starts_number() {
                    return Err(self.error("closepath takes no arguments"));
                }
                PathSegment::Close
            }
            _ => return Err(self.error("unknown command")),
        };

        self.current = match segment {
            PathSegment::MoveTo(to)
            | PathSegment::LineTo(to)
            | PathSegment::CubicTo { to, .. }
            | PathSegment::QuadTo { to, .. }
            | PathSegment::ArcTo { to, .. } => to,
            PathSegment::Close => self.subpath_start,
        };
        self.last_cubic_ctrl = cubic_ctrl;
        self.last_quad_ctrl = quad_ctrl;
        self.segments.push(segment);
        Ok(())
    }

    /// Reflection of the previous control point about the current point,
    /// or the current point when the previous segment had none.
    fn reflect(&self, ctrl: Option<Point>) -> Point {
        ctrl.map_or(self.current, |c| self.current * 2.0 - c)
    }
}
