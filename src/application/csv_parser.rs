// Power log parser - CSV text into a SampleSeries
use crate::domain::sample::{Sample, SampleSeries};
use serde::Deserialize;

/// What to do with a line whose timestamp or value could not be coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    #[default]
    Skip,
    PassThrough,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub lines: usize,
    pub blank: usize,
    pub malformed: usize,
    pub accepted: usize,
}

/// Parse `"<unix_seconds>,<watts>"` lines in input order.
///
/// Blank lines never produce a sample. Malformed lines are dropped or kept
/// with their invalid markers according to `policy`.
pub fn parse_log(text: &str, policy: MalformedPolicy) -> (SampleSeries, ParseReport) {
    let mut report = ParseReport::default();
    let mut series = SampleSeries::with_capacity(text.len() / 16);

    for line in text.split('\n') {
        report.lines += 1;

        if line.trim().is_empty() {
            report.blank += 1;
            continue;
        }

        let sample = parse_line(line);
        if !sample.is_valid() {
            report.malformed += 1;
            if policy == MalformedPolicy::Skip {
                tracing::debug!("Skipping malformed log line: {:?}", line);
                continue;
            }
        }

        series.push(sample);
        report.accepted += 1;
    }

    (series, report)
}

/// Coerce one line. Only the first two comma separated fields are read.
pub fn parse_line(line: &str) -> Sample {
    let mut fields = line.split(',');
    let seconds = fields.next().and_then(parse_int_prefix);
    let watts = fields.next().map(parse_float_prefix).unwrap_or(f64::NAN);

    match seconds {
        Some(seconds) => Sample::from_unix_seconds(seconds, watts),
        None => Sample::new(None, watts),
    }
}

/// Leading integer of `field`, ignoring leading whitespace and trailing junk.
/// A `0x` / `0X` prefix reads the digits as hexadecimal.
pub fn parse_int_prefix(field: &str) -> Option<i64> {
    let s = field.trim_start();
    let sign_len = usize::from(s.starts_with(['+', '-']));

    let unsigned = &s[sign_len..];
    if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        let hex_digits = hex.bytes().take_while(|b| b.is_ascii_hexdigit()).count();
        if hex_digits == 0 {
            return None;
        }
        let value = i64::from_str_radix(&hex[..hex_digits], 16).ok()?;
        return Some(if s.starts_with('-') { -value } else { value });
    }

    let digits = unsigned
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();

    if digits == 0 {
        return None;
    }

    s[..sign_len + digits].parse().ok()
}

/// Leading decimal literal of `field` (optional exponent or `Infinity`),
/// `NaN` when there is none.
pub fn parse_float_prefix(field: &str) -> f64 {
    let s = field.trim_start();
    let bytes = s.as_bytes();
    let mut end = usize::from(s.starts_with(['+', '-']));

    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
