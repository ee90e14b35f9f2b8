//! Virtual-time arguments: plain seconds or `[[HH:]MM:]SS[.fff]` timecodes.

use crate::error::GraphError;

/// A time value accepted by the clock operations.
///
/// Converts from `f64` seconds and from timecode strings such as `"00:00.500"`
/// or `"00:00:01.000"`.
#[derive(Clone, Debug, PartialEq)]
pub enum TimeArg {
    /// Seconds.
    Seconds(f64),
    /// Unparsed timecode.
    Timecode(String),
}

impl From<f64> for TimeArg {
    fn from(seconds: f64) -> Self {
        Self::Seconds(seconds)
    }
}

impl From<&str> for TimeArg {
    fn from(timecode: &str) -> Self {
        Self::Timecode(timecode.to_string())
    }
}

impl From<String> for TimeArg {
    fn from(timecode: String) -> Self {
        Self::Timecode(timecode)
    }
}

impl TimeArg {
    /// Resolves to seconds. Non-finite values and malformed timecodes fail
    /// with an invalid-argument error attributed to `method`.
    pub fn to_seconds(&self, method: &str) -> Result<f64, GraphError> {
        match self {
            Self::Seconds(s) if s.is_finite() => Ok(*s),
            Self::Seconds(s) => Err(GraphError::invalid_argument(
                method,
                format!("time should be a finite number, got {s}"),
            )),
            Self::Timecode(code) => parse_timecode(code)
                .ok_or_else(|| GraphError::invalid_argument(method, format!("invalid timecode '{code}'"))),
        }
    }
}

/// Parses `[[HH:]MM:]SS[.fff]` into seconds.
///
/// Returns `None` for empty fields, signs, exponents, or more than three fields.
pub fn parse_timecode(code: &str) -> Option<f64> {
    let fields: Vec<&str> = code.trim().split(':').collect();
    if fields.len() > 3 {
        return None;
    }
    let (seconds, whole) = fields.split_last()?;
    let seconds = parse_seconds(seconds)?;

    let mut total = 0.0;
    for field in whole {
        if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u32 = field.parse().ok()?;
        total = total * 60.0 + f64::from(value);
    }
    Some(total * 60.0 + seconds)
}

fn parse_seconds(field: &str) -> Option<f64> {
    let (int, frac) = match field.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (field, None),
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(int) || frac.is_some_and(|f| !digits(f)) {
        return None;
    }
    field.parse().ok()
}
