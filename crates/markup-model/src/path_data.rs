//! SVG path data (`M x y L x y ...`) for pen strokes.

use crate::geometry::Point;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathDataError {
    #[error("path data must start with a move command")]
    MissingMove,
    #[error("unsupported path command {0:?}, only absolute M and L are understood")]
    UnsupportedCommand(char),
    #[error("expected a coordinate pair after {command:?}")]
    IncompletePair { command: char },
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
}

/// Polyline as path data: a move to the first point, then a line to each following point.
pub fn to_path_data(points: &[Point]) -> String {
    let mut data = String::new();
    for (index, point) in points.iter().enumerate() {
        if index > 0 {
            data.push(' ');
        }
        let command = if index == 0 { 'M' } else { 'L' };
        data.push_str(&format!("{command} {} {}", point.x, point.y));
    }
    data
}

/// Parses polyline path data. Repeated coordinate pairs after a command are implicit line-tos.
pub fn parse_path_data(data: &str) -> Result<Vec<Point>, PathDataError> {
    let mut points = Vec::new();
    let mut tokens = tokenize(data).into_iter().peekable();
    let mut command: Option<char> = None;

    while let Some(token) = tokens.next() {
        let current = match token {
            Token::Command(letter @ ('M' | 'L')) => {
                if command.is_none() && letter != 'M' {
                    return Err(PathDataError::MissingMove);
                }
                command = Some(letter);
                letter
            }
            Token::Command(other) => return Err(PathDataError::UnsupportedCommand(other)),
            Token::Number(first) => {
                let letter = command.ok_or(PathDataError::MissingMove)?;
                let x = parse_number(&first)?;
                let y = match tokens.next() {
                    Some(Token::Number(second)) => parse_number(&second)?,
                    _ => return Err(PathDataError::IncompletePair { command: letter }),
                };
                points.push(Point::new(x, y));
                continue;
            }
        };

        match (tokens.next(), tokens.next()) {
            (Some(Token::Number(x)), Some(Token::Number(y))) => {
                points.push(Point::new(parse_number(&x)?, parse_number(&y)?));
            }
            _ => return Err(PathDataError::IncompletePair { command: current }),
        }
    }

    Ok(points)
}

/// Serde adapter storing a point list as a path data string.
pub(crate) mod as_path_data {
    use super::{parse_path_data, to_path_data};
    use crate::geometry::Point;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(points: &[Point], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_path_data(points))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Point>, D::Error> {
        let data = String::deserialize(deserializer)?;
        parse_path_data(&data).map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Command(char),
    Number(String),
}

fn tokenize(data: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut number = String::new();

    let flush = |number: &mut String, tokens: &mut Vec<Token>| {
        if !number.is_empty() {
            tokens.push(Token::Number(std::mem::take(number)));
        }
    };

    for ch in data.chars() {
        match ch {
            c if c.is_ascii_alphabetic() && c != 'e' && c != 'E' => {
                flush(&mut number, &mut tokens);
                tokens.push(Token::Command(c));
            }
            c if c.is_whitespace() || c == ',' => flush(&mut number, &mut tokens),
            '-' if !number.is_empty() && !number.ends_with(['e', 'E']) => {
                flush(&mut number, &mut tokens);
                number.push('-');
            }
            c => number.push(c),
        }
    }
    flush(&mut number, &mut tokens);

    tokens
}

fn parse_number(token: &str) -> Result<f32, PathDataError> {
    token
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| PathDataError::InvalidNumber(token.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_move_then_line_commands() {
        let data = to_path_data(&[Point::new(10.0, 20.5), Point::new(30.0, 40.0)]);
        assert_eq!(data, "M 10 20.5 L 30 40");
        assert_eq!(to_path_data(&[]), "");
    }

    #[test]
    fn parses_what_it_writes() {
        let points = vec![Point::new(1.5, 2.0), Point::new(-3.0, 4.25), Point::new(5.0, 6.0)];
        assert_eq!(parse_path_data(&to_path_data(&points)), Ok(points));
    }

    #[test]
    fn parses_compact_and_comma_separated_forms() {
        let points = parse_path_data("M10,20L30-40 50 60").expect("path should parse");
        assert_eq!(
            points,
            vec![Point::new(10.0, 20.0), Point::new(30.0, -40.0), Point::new(50.0, 60.0)]
        );
    }

    #[test]
    fn rejects_curves_and_dangling_coordinates() {
        assert_eq!(
            parse_path_data("M 0 0 C 1 1 2 2 3 3"),
            Err(PathDataError::UnsupportedCommand('C'))
        );
        assert_eq!(
            parse_path_data("M 0 0 L 5"),
            Err(PathDataError::IncompletePair { command: 'L' })
        );
        assert_eq!(parse_path_data("L 1 1"), Err(PathDataError::MissingMove));
        assert!(matches!(parse_path_data("M 1 1.2.3"), Err(PathDataError::InvalidNumber(_))));
    }
}
