use std::fmt::Display;

pub mod regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseToMillisError {
    InvalidFormat,
    Overflow,
}
impl Display for ParseToMillisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat => f.write_str("invalid time format (try e.g. 1h20m30s)"),
            Self::Overflow => f.write_str("time value is too large"),
        }
    }
}
impl std::error::Error for ParseToMillisError {}

/// Parses a time string such as `1h20m30s` to its total length in
/// milliseconds. The entire input must consist of `<quantity><unit>` pairs.
pub fn parse_to_millis(input: &str) -> Result<u64, ParseToMillisError> {
    let mut total: u64 = 0;
    let mut consumed = 0;

    for captures in regex::TIME_STRING.captures_iter(input) {
        let whole = captures.get(0).unwrap();
        if whole.start() != consumed {
            return Err(ParseToMillisError::InvalidFormat);
        }
        consumed = whole.end();

        let quantity = captures[1]
            .parse::<u64>()
            .map_err(|_| ParseToMillisError::Overflow)?;

        let unit_millis: u64 = match &captures[2] {
            "s" => 1000,
            "m" => 60 * 1000,
            "h" => 60 * 60 * 1000,
            "d" => 24 * 60 * 60 * 1000,
            _ => unreachable!(),
        };

        total = quantity
            .checked_mul(unit_millis)
            .and_then(|component| total.checked_add(component))
            .ok_or(ParseToMillisError::Overflow)?;
    }

    if consumed != input.len() || consumed == 0 {
        return Err(ParseToMillisError::InvalidFormat);
    }

    Ok(total)
}
