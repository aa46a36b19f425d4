//! `POLYGON((x y, ...))` text encoding used at the exchange boundary.
//!
//! Encoded coordinates are in the collaborator's units: writing multiplies
//! by the scale factor and rounds to integers, reading divides it back out.

use tracing::debug;

use super::Polygon;
use crate::error::ParseError;
use crate::math::Point2;

/// Encodes a polygon as a closed ring with integer coordinates.
#[must_use]
pub fn format_polygon(polygon: &Polygon, scale: f64) -> String {
    let points = polygon.points();
    let mut coords: Vec<String> = points
        .iter()
        .map(|p| format!("{} {}", scaled_int(p.x, scale), scaled_int(p.y, scale)))
        .collect();
    if let Some(first) = coords.first().cloned() {
        coords.push(first);
    }
    format!("POLYGON(({}))", coords.join(", "))
}

fn scaled_int(value: f64, scale: f64) -> f64 {
    // Adding zero folds -0 into 0 so it prints without a sign.
    (value * scale).round() + 0.0
}

/// Decodes polygon text, dividing every coordinate by `scale`.
///
/// Only the outer ring is kept; interior rings are parsed and discarded.
///
/// # Errors
///
/// Returns a `ParseError` if the text is not a well-formed polygon with at
/// least three points in its outer ring.
pub fn parse_polygon(text: &str, scale: f64) -> Result<Polygon, ParseError> {
    let mut cursor = Cursor::new(text);
    cursor.keyword("POLYGON")?;
    if cursor.try_keyword("EMPTY") {
        return Err(ParseError::TooFewPoints(0));
    }
    cursor.expect(b'(', "'('")?;
    let mut rings = vec![cursor.ring()?];
    while cursor.try_byte(b',') {
        rings.push(cursor.ring()?);
    }
    cursor.expect(b')', "')'")?;
    cursor.end()?;

    if rings.len() > 1 {
        debug!(holes = rings.len() - 1, "dropping interior rings from polygon text");
    }
    let outer = rings.swap_remove(0);
    if outer.len() < 3 {
        return Err(ParseError::TooFewPoints(outer.len()));
    }
    Ok(Polygon::from_points(
        outer
            .into_iter()
            .map(|p| Point2::new(p.x / scale, p.y / scale))
            .collect(),
    ))
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn try_keyword(&mut self, word: &str) -> bool {
        self.skip_ws();
        let matched = self
            .rest()
            .get(..word.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(word));
        if matched {
            self.pos += word.len();
            true
        } else {
            false
        }
    }

    fn keyword(&mut self, word: &'static str) -> Result<(), ParseError> {
        if self.try_keyword(word) {
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                expected: word,
                offset: self.pos,
            })
        }
    }

    fn try_byte(&mut self, byte: u8) -> bool {
        self.skip_ws();
        if self.rest().as_bytes().first() == Some(&byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<(), ParseError> {
        if self.try_byte(byte) {
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                expected,
                offset: self.pos,
            })
        }
    }

    fn end(&mut self) -> Result<(), ParseError> {
        self.skip_ws();
        if self.rest().is_empty() {
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                expected: "end of text",
                offset: self.pos,
            })
        }
    }

    fn ring(&mut self) -> Result<Vec<Point2>, ParseError> {
        self.expect(b'(', "'('")?;
        let mut points = vec![self.coordinate()?];
        while self.try_byte(b',') {
            points.push(self.coordinate()?);
        }
        self.expect(b')', "')'")?;
        Ok(points)
    }

    fn coordinate(&mut self) -> Result<Point2, ParseError> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(Point2::new(x, y))
    }

    fn number(&mut self) -> Result<f64, ParseError> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(ParseError::UnexpectedToken {
                expected: "a number",
                offset: self.pos,
            });
        }
        let token = &rest[..len];
        let value = token
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidNumber(token.to_owned()))?;
        if !value.is_finite() {
            return Err(ParseError::InvalidNumber(token.to_owned()));
        }
        self.pos += len;
        Ok(value)
    }
}
