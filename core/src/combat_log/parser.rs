use chrono::NaiveDate;
use memchr::{memchr, memmem};

use super::{LogLine, ParamValue};
use crate::error::ParseError;

/// Parse one raw line into a [`LogLine`].
///
/// Pure function of the line text; `default_year` fills in timestamps
/// that carry only month and day.
pub fn parse_line(line: &str, default_year: i32) -> Result<LogLine, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let bytes = line.as_bytes();

    let sep = memmem::find(bytes, b"  ").ok_or(ParseError::MissingSeparator)?;
    let timestamp = parse_timestamp(&line[..sep], default_year)?;

    let payload_start = sep + 2;
    let payload = &line[payload_start..];
    let (event_kind, params) = match memchr(b',', payload.as_bytes()) {
        Some(comma) => (&payload[..comma], Some(payload_start + comma + 1)),
        None => (payload, None),
    };

    let event_kind = event_kind.trim();
    if event_kind.is_empty() {
        return Err(ParseError::EmptyEventKind);
    }

    let parameters = match params {
        Some(start) => {
            let mut tokenizer = Tokenizer { src: line, pos: start };
            tokenizer.parse_sequence(None)?
        }
        None => Vec::new(),
    };

    Ok(LogLine {
        timestamp,
        event_kind: event_kind.to_string(),
        parameters,
        raw: line.to_string(),
    })
}

/// Decode `M/D[/YYYY] HH:MM:SS.fff[f][+-Z]` into epoch milliseconds.
pub fn parse_timestamp(input: &str, default_year: i32) -> Result<i64, ParseError> {
    let invalid = || ParseError::InvalidTimestamp(input.to_string());

    let (date, time) = input.trim().split_once(' ').ok_or_else(invalid)?;

    let mut date_parts = date.split('/');
    let month: u32 = parse_digits(date_parts.next()).ok_or_else(invalid)?;
    let day: u32 = parse_digits(date_parts.next()).ok_or_else(invalid)?;
    let year: i32 = match date_parts.next() {
        Some(y) => parse_digits(Some(y)).ok_or_else(invalid)?,
        None => default_year,
    };
    if date_parts.next().is_some() {
        return Err(invalid());
    }

    // Modern headers append a timezone offset (e.g. `-4`); it is not applied.
    let time = match time.find(['+', '-']) {
        Some(pos) => &time[..pos],
        None => time,
    };

    let mut time_parts = time.split(':');
    let hour: u32 = parse_digits(time_parts.next()).ok_or_else(invalid)?;
    let minute: u32 = parse_digits(time_parts.next()).ok_or_else(invalid)?;
    let seconds = time_parts.next().ok_or_else(invalid)?;
    if time_parts.next().is_some() {
        return Err(invalid());
    }

    let (secs, frac) = seconds.split_once('.').unwrap_or((seconds, "0"));
    let second: u32 = parse_digits(Some(secs)).ok_or_else(invalid)?;
    if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let millis = frac
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(3)
        .fold(0u32, |acc, b| acc * 10 + (b - b'0') as u32);

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_milli_opt(hour, minute, second, millis))
        .map(|dt| dt.and_utc().timestamp_millis())
        .ok_or_else(invalid)
}

fn parse_digits<T: std::str::FromStr>(s: Option<&str>) -> Option<T> {
    let s = s?;
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Recursive-descent splitter for the comma-separated parameter list.
struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
}

impl Tokenizer<'_> {
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    /// Parse values until `close` (or end of input when `close` is `None`).
    fn parse_sequence(&mut self, close: Option<u8>) -> Result<Vec<ParamValue>, ParseError> {
        let mut values = Vec::new();

        // Empty sub-list: `[]` or `()`
        if let Some(c) = close
            && self.peek() == Some(c)
        {
            self.pos += 1;
            return Ok(values);
        }

        loop {
            values.push(self.parse_value()?);

            match self.peek() {
                None if close.is_none() => return Ok(values),
                None => return Err(ParseError::UnbalancedBracket(self.pos)),
                Some(b',') => self.pos += 1,
                Some(c) if Some(c) == close => {
                    self.pos += 1;
                    return Ok(values);
                }
                Some(_) => return Err(ParseError::UnbalancedBracket(self.pos)),
            }
        }
    }

    fn parse_value(&mut self) -> Result<ParamValue, ParseError> {
        match self.peek() {
            Some(b'"') => self.parse_quoted(),
            Some(b'[') => {
                self.pos += 1;
                Ok(ParamValue::List(self.parse_sequence(Some(b']'))?))
            }
            Some(b'(') => {
                self.pos += 1;
                Ok(ParamValue::List(self.parse_sequence(Some(b')'))?))
            }
            _ => Ok(self.parse_bare()),
        }
    }

    fn parse_quoted(&mut self) -> Result<ParamValue, ParseError> {
        let open = self.pos;
        let bytes = self.src.as_bytes();
        let mut i = open + 1;
        let mut escaped = false;

        while i < bytes.len() {
            match bytes[i] {
                b'\\' if !escaped => escaped = true,
                b'"' if !escaped => {
                    let inner = &self.src[open + 1..i];
                    self.pos = i + 1;
                    let text = if inner.contains('\\') {
                        inner.replace("\\\"", "\"")
                    } else {
                        inner.to_string()
                    };
                    return Ok(ParamValue::Text(text));
                }
                _ => escaped = false,
            }
            i += 1;
        }

        Err(ParseError::UnterminatedQuote(open))
    }

    fn parse_bare(&mut self) -> ParamValue {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        while self.pos < bytes.len() && !matches!(bytes[self.pos], b',' | b']' | b')' | b'[' | b'(')
        {
            self.pos += 1;
        }
        classify_token(self.src[start..self.pos].trim())
    }
}

fn classify_token(token: &str) -> ParamValue {
    if token == "nil" {
        return ParamValue::Null;
    }

    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        return match u64::from_str_radix(hex, 16) {
            Ok(v) => ParamValue::Int(v as i64),
            Err(_) => ParamValue::Text(token.to_string()),
        };
    }

    let unsigned = token.strip_prefix('-').unwrap_or(token);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    // Leading zeros mark identifiers (e.g. the null GUID), not numbers
    let numeric_int = !int_part.is_empty()
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && (int_part.len() == 1 || !int_part.starts_with('0'));

    if numeric_int {
        match frac_part {
            None => {
                if let Ok(v) = token.parse::<i64>() {
                    return ParamValue::Int(v);
                }
            }
            Some(f) if !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()) => {
                if let Ok(v) = token.parse::<f64>() {
                    return ParamValue::Float(v);
                }
            }
            Some(_) => {}
        }
    }

    ParamValue::Text(token.to_string())
}
