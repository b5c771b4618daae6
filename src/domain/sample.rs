// Power sample domain models
use chrono::{DateTime, Utc};

/// One (timestamp, wattage) observation from the power log.
///
/// `timestamp` is `None` when the log line did not carry a usable Unix time,
/// and `watts` is `NaN` when the value field was not numeric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: Option<DateTime<Utc>>,
    pub watts: f64,
}

impl Sample {
    pub fn new(timestamp: Option<DateTime<Utc>>, watts: f64) -> Self {
        Self { timestamp, watts }
    }

    /// Build a sample from Unix seconds, stored at millisecond resolution.
    pub fn from_unix_seconds(seconds: i64, watts: f64) -> Self {
        let timestamp = seconds
            .checked_mul(1000)
            .and_then(DateTime::<Utc>::from_timestamp_millis);
        Self::new(timestamp, watts)
    }

    pub fn time_ms(&self) -> Option<i64> {
        self.timestamp.map(|t| t.timestamp_millis())
    }

    pub fn is_valid(&self) -> bool {
        self.timestamp.is_some() && self.watts.is_finite()
    }
}

/// Ordered samples for one page render, in log line order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSeries {
    samples: Vec<Sample>,
}

impl SampleSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }
}

impl FromIterator<Sample> for SampleSeries {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SampleSeries {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_unix_seconds_scales_to_millis() {
        let sample = Sample::from_unix_seconds(1000, 50.5);
        assert_eq!(sample.time_ms(), Some(1_000_000));
        assert_eq!(sample.watts, 50.5);
        assert!(sample.is_valid());
    }

    #[test]
    fn test_from_unix_seconds_out_of_range() {
        let sample = Sample::from_unix_seconds(i64::MAX, 1.0);
        assert_eq!(sample.timestamp, None);
        assert!(!sample.is_valid());
    }

    #[test]
    fn test_nan_watts_is_invalid() {
        let sample = Sample::from_unix_seconds(1, f64::NAN);
        assert!(sample.timestamp.is_some());
        assert!(!sample.is_valid());
    }

    #[test]
    fn test_series_keeps_insertion_order() {
        let mut series = SampleSeries::new();
        series.push(Sample::from_unix_seconds(3, 1.0));
        series.push(Sample::from_unix_seconds(1, 2.0));

        let times: Vec<_> = series.iter().map(|s| s.time_ms()).collect();
        assert_eq!(times, vec![Some(3000), Some(1000)]);
        assert_eq!(series.len(), 2);
    }
}
