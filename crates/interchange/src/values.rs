//! Attribute value grammar: lengths, paints, point lists and inline
//! `style` declarations.

use node::{Color, Point};

/// Parses a plain number or a `px` length.
pub fn length(value: &str) -> Result<f64, String> {
    let trimmed = value.trim();
    let digits = trimmed.strip_suffix("px").unwrap_or(trimmed).trim_end();
    let number: f64 = digits.parse().map_err(|_| "expected a number".to_string())?;
    if !number.is_finite() {
        return Err("expected a finite number".into());
    }
    Ok(number)
}

/// A `fill`/`stroke` value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Paint {
    None,
    Color(Color),
    /// `url(#...)` references; gradients and patterns are not modelled.
    Reference,
}

pub fn paint(value: &str) -> Result<Paint, String> {
    let trimmed = value.trim();
    if trimmed == "none" {
        return Ok(Paint::None);
    }
    if trimmed.starts_with("url(") {
        return Ok(Paint::Reference);
    }
    Color::parse(trimmed)
        .map(Paint::Color)
        .map_err(|err| err.to_string())
}

/// Parses an opacity in `0..=1`, also accepting percentages.
pub fn opacity(value: &str) -> Result<f64, String> {
    let trimmed = value.trim();
    let number = match trimmed.strip_suffix('%') {
        Some(percent) => length(percent)? / 100.0,
        None => length(trimmed)?,
    };
    if !(0.0..=1.0).contains(&number) {
        return Err("opacity must be between 0 and 1".into());
    }
    Ok(number)
}

/// Parses a `points` list of `x,y` pairs.
pub fn points(value: &str) -> Result<Vec<Point>, String> {
    let numbers = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(length)
        .collect::<Result<Vec<f64>, String>>()?;
    if numbers.len() % 2 != 0 {
        return Err("odd number of coordinates".into());
    }
    Ok(numbers
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect())
}

/// The four numbers of a `viewBox`.
pub fn view_box(value: &str) -> Result<[f64; 4], String> {
    let numbers = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(length)
        .collect::<Result<Vec<f64>, String>>()?;
    numbers
        .try_into()
        .map_err(|_| "expected four numbers".to_string())
}

/// Splits `style="fill: red; stroke-width: 2"` into trimmed pairs.
pub fn declarations(style: &str) -> impl Iterator<Item = (&str, &str)> {
    style.split(';').filter_map(|declaration| {
        let (name, value) = declaration.split_once(':')?;
        let name = name.trim();
        let value = value.trim();
        (!name.is_empty() && !value.is_empty()).then_some((name, value))
    })
}
