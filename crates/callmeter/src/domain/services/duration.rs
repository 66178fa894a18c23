//! Call duration resolution
//!
//! Providers report duration in several shapes. Resolution order:
//! `duration_ms`, then `duration` (seconds), then `end - start`
//! (millisecond epoch timestamps).

/// Longest duration taken at face value (one day)
pub const MAX_CALL_DURATION_SECONDS: i64 = 86_400;

/// Resolve a call duration in whole seconds.
///
/// The first finite source wins. Negative results clamp to zero, and so do
/// results beyond [`MAX_CALL_DURATION_SECONDS`].
pub fn resolve_duration_seconds(
    duration_ms: Option<f64>,
    duration_secs: Option<f64>,
    start_timestamp_ms: Option<f64>,
    end_timestamp_ms: Option<f64>,
) -> i64 {
    let finite = |v: Option<f64>| v.filter(|n| n.is_finite());

    let seconds = if let Some(ms) = finite(duration_ms) {
        ms / 1000.0
    } else if let Some(secs) = finite(duration_secs) {
        secs
    } else if let (Some(start), Some(end)) = (finite(start_timestamp_ms), finite(end_timestamp_ms)) {
        (end - start) / 1000.0
    } else {
        0.0
    };

    let seconds = seconds.round();
    if seconds <= 0.0 || seconds > MAX_CALL_DURATION_SECONDS as f64 {
        return 0;
    }
    seconds as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_ms_takes_priority() {
        assert_eq!(
            resolve_duration_seconds(Some(90_000.0), Some(45.0), None, None),
            90
        );
    }

    #[test]
    fn test_explicit_seconds_before_timestamps() {
        assert_eq!(
            resolve_duration_seconds(None, Some(45.0), Some(0.0), Some(120_000.0)),
            45
        );
    }

    #[test]
    fn test_timestamp_difference() {
        assert_eq!(
            resolve_duration_seconds(None, None, Some(1_700_000_000_000.0), Some(1_700_000_060_000.0)),
            60
        );
    }

    #[test]
    fn test_garbage_clamps_to_zero() {
        assert_eq!(resolve_duration_seconds(Some(-500.0), None, None, None), 0);
        assert_eq!(resolve_duration_seconds(None, None, Some(10_000.0), Some(5_000.0)), 0);
        assert_eq!(resolve_duration_seconds(None, None, Some(10_000.0), None), 0);
        assert_eq!(resolve_duration_seconds(Some(f64::NAN), Some(12.0), None, None), 12);
        assert_eq!(resolve_duration_seconds(None, None, None, None), 0);
    }

    #[test]
    fn test_sub_second_rounding() {
        assert_eq!(resolve_duration_seconds(Some(125_400.0), None, None, None), 125);
        assert_eq!(resolve_duration_seconds(Some(125_500.0), None, None, None), 126);
    }

    #[test]
    fn test_out_of_range_duration_is_garbage() {
        assert_eq!(resolve_duration_seconds(Some(1e18), None, None, None), 0);
        assert_eq!(resolve_duration_seconds(None, Some(1e300), None, None), 0);
        assert_eq!(resolve_duration_seconds(None, None, Some(0.0), Some(1e15)), 0);
        assert_eq!(
            resolve_duration_seconds(None, Some(MAX_CALL_DURATION_SECONDS as f64), None, None),
            MAX_CALL_DURATION_SECONDS
        );
        assert_eq!(
            resolve_duration_seconds(None, Some(MAX_CALL_DURATION_SECONDS as f64 + 1.0), None, None),
            0
        );
    }
}
