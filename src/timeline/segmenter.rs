use crate::error::{ConfigError, Result, TimelineError};

/// One contiguous slice of the source timeline, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSpan {
    pub start: f64,
    pub end: f64,
}

impl SegmentSpan {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Partition a timeline into candidate segments.
///
/// Windows of `split_interval` seconds start at 0 and step by the interval
/// until the window start reaches `duration`. A window that is exactly
/// `split_interval` wide loses its trailing `trim_amount` seconds; the final
/// window, when truncated by the timeline end, is emitted untrimmed. Windows
/// whose trimmed end no longer exceeds their start are dropped. If every
/// window is dropped the segmentation is an explicit error.
pub fn segment(duration: f64, split_interval: f64, trim_amount: f64) -> Result<Vec<SegmentSpan>> {
    if split_interval <= 0.0 {
        return Err(ConfigError::InvalidValue {
            key: "split_interval".to_string(),
            value: split_interval.to_string(),
        }
        .into());
    }
    if trim_amount < 0.0 {
        return Err(ConfigError::InvalidValue {
            key: "trim_amount".to_string(),
            value: trim_amount.to_string(),
        }
        .into());
    }

    let mut spans = Vec::new();
    let mut index = 0u64;
    loop {
        let start = index as f64 * split_interval;
        if start >= duration {
            break;
        }
        let window_end = (start + split_interval).min(duration);
        let truncated = start + split_interval > duration;
        let end = if truncated { window_end } else { window_end - trim_amount };

        if end > start {
            spans.push(SegmentSpan { start, end });
        }
        index += 1;
    }

    if spans.is_empty() {
        return Err(TimelineError::EmptySegmentation {
            duration,
            split: split_interval,
            trim: trim_amount,
        }
        .into());
    }

    Ok(spans)
}

/// Pre-trim window count used as the progress denominator.
///
/// An estimate by design: trimming can drop windows, so the true segment
/// count may be lower.
pub fn estimated_count(duration: f64, split_interval: f64) -> usize {
    if split_interval <= 0.0 {
        return 1;
    }
    ((duration / split_interval).floor() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_scenario_20s_split_6_trim_1() {
        let spans = segment(20.0, 6.0, 1.0).unwrap();
        let expected = [(0.0, 5.0), (6.0, 11.0), (12.0, 17.0), (18.0, 20.0)];
        assert_eq!(spans.len(), expected.len());
        for (span, (start, end)) in spans.iter().zip(expected) {
            assert!((span.start - start).abs() < 1e-9);
            assert!((span.end - end).abs() < 1e-9, "got {:?}", span);
        }
    }

    #[test]
    fn spans_are_ordered_disjoint_and_in_bounds() {
        for (duration, split, trim) in
            [(20.0, 6.0, 1.0), (13.5, 4.0, 0.5), (7.0, 7.0, 0.0), (100.0, 9.0, 2.5)]
        {
            let spans = segment(duration, split, trim).unwrap();
            let mut previous_end = f64::MIN;
            for span in &spans {
                assert!(span.start >= 0.0);
                assert!(span.end <= duration + 1e-9);
                assert!(span.end > span.start);
                assert!(span.start >= previous_end - 1e-9, "overlapping spans: {:?}", spans);
                previous_end = span.end;
            }
        }
    }

    #[test]
    fn segmentation_is_idempotent() {
        let first = segment(47.3, 5.0, 1.25).unwrap();
        let second = segment(47.3, 5.0, 1.25).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn short_source_yields_one_untrimmed_segment() {
        let spans = segment(4.0, 6.0, 1.0).unwrap();
        assert_eq!(spans, vec![SegmentSpan { start: 0.0, end: 4.0 }]);
    }

    #[test]
    fn trim_equal_to_interval_drops_everything() {
        let err = segment(12.0, 6.0, 6.0).unwrap_err();
        assert!(err.to_string().contains("Trimming removed every segment"));
    }

    #[test]
    fn dropped_middle_windows_keep_the_truncated_tail() {
        // full windows are trimmed to nothing; only the truncated tail survives
        let spans = segment(10.0, 4.0, 4.0).unwrap();
        assert_eq!(spans, vec![SegmentSpan { start: 8.0, end: 10.0 }]);
    }

    #[test]
    fn zero_or_negative_split_interval_is_a_config_error() {
        assert!(segment(10.0, 0.0, 1.0).is_err());
        assert!(segment(10.0, -3.0, 1.0).is_err());
    }

    #[test]
    fn negative_trim_is_a_config_error() {
        assert!(segment(10.0, 5.0, -1.0).is_err());
    }

    #[test]
    fn estimated_count_is_floor_of_the_ratio() {
        assert_eq!(estimated_count(20.0, 6.0), 3);
        assert_eq!(estimated_count(5.0, 6.0), 1);
        assert_eq!(estimated_count(60.0, 6.0), 10);
        assert_eq!(estimated_count(0.0, 6.0), 1);
    }
}
