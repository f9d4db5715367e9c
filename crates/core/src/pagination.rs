//! Limit/offset clamping for the read side of the import audit log.

/// Default number of import logs per page.
pub const DEFAULT_LOG_LIMIT: i64 = 20;

/// Maximum number of import logs per page.
pub const MAX_LOG_LIMIT: i64 = 100;

/// Clamp a caller-provided limit into `1..=max`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

/// Clamp a caller-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_when_missing() {
        assert_eq!(clamp_limit(None, DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT), 20);
    }

    #[test]
    fn limit_is_bounded_on_both_sides() {
        assert_eq!(clamp_limit(Some(500), DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT), 100);
        assert_eq!(clamp_limit(Some(0), DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT), 1);
        assert_eq!(clamp_limit(Some(-3), DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT), 1);
    }

    #[test]
    fn offset_never_negative() {
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(-10)), 0);
        assert_eq!(clamp_offset(Some(40)), 40);
    }
}
