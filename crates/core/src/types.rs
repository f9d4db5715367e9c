use chrono::{DateTime, Utc};

/// Generated primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = DateTime<Utc>;

/// Convert partner epoch milliseconds into a [`Timestamp`].
///
/// Returns `None` when the value falls outside chrono's representable range.
pub fn timestamp_from_millis(millis: i64) -> Option<Timestamp> {
    DateTime::from_timestamp_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_epoch_millis() {
        let ts = timestamp_from_millis(1_700_000_000_000).unwrap();
        assert_eq!(ts.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn out_of_range_millis_is_none() {
        assert!(timestamp_from_millis(i64::MAX).is_none());
    }
}
