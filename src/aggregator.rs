use {
    crate::event::AlertEvent,
    std::time::{SystemTime, UNIX_EPOCH},
};

/// One entry of the timeline series: a fixed-width bucket and how many
/// abnormal events landed in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineBucket {
    /// Bucket start, whole seconds since epoch.
    pub start: i64,
    /// Wall-clock `HH:MM:SS` label for the bucket start.
    pub label: String,
    pub count: u64,
}

/// Sliding-window timeline aggregator
///
/// Keeps a raw buffer of every received event and recomputes the full
/// bucket series on each snapshot. Recomputing from raw events (instead of
/// patching buckets incrementally) means the series self-heals as time
/// advances and tolerates out-of-order timestamps.
pub struct TimelineAggregator {
    /// Raw event buffer, in arrival order.
    events: Vec<AlertEvent>,
    /// Largest window a snapshot is expected to ask for, in seconds.
    retention_secs: i64,
}

impl TimelineAggregator {
    pub fn new(retention_secs: i64) -> Self {
        Self {
            events: Vec::new(),
            retention_secs,
        }
    }

    /// Append an event to the raw buffer.
    ///
    /// Normal-traffic events are kept too; they are excluded at snapshot
    /// time, not at ingest time.
    pub fn ingest(&mut self, event: AlertEvent) {
        self.events.push(event);
        self.evict_expired(current_timestamp());
    }

    /// Drop events too old to ever appear in a snapshot again.
    /// Keeps 2x the retention window so a late snapshot near the boundary
    /// still sees everything it needs.
    pub fn evict_expired(&mut self, now: i64) {
        let cutoff = now - self.retention_secs * 2;
        self.events.retain(|event| event.epoch_secs() >= cutoff);
    }

    /// Recompute the trailing window ending at `now`.
    ///
    /// Bucket starts run `now - window_secs, .., now` inclusive, which
    /// yields `window_secs / bucket_secs + 1` buckets. Each bucket counts
    /// abnormal events whose whole-second timestamp falls in
    /// `[start, start + bucket_secs)`; the trailing bucket is computed the
    /// same way even when the window does not divide evenly.
    pub fn snapshot(&self, window_secs: i64, bucket_secs: i64, now: i64) -> Vec<TimelineBucket> {
        let start = now - window_secs;
        let mut series = Vec::with_capacity((window_secs / bucket_secs + 1) as usize);

        let mut bucket_start = start;
        while bucket_start <= now {
            let bucket_end = bucket_start + bucket_secs;
            let count = self
                .events
                .iter()
                .filter(|event| {
                    let ts = event.epoch_secs();
                    ts >= bucket_start && ts < bucket_end && event.is_abnormal()
                })
                .count() as u64;

            series.push(TimelineBucket {
                start: bucket_start,
                label: format_bucket_label(bucket_start),
                count,
            });
            bucket_start += bucket_secs;
        }

        series
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn format_bucket_label(epoch_secs: i64) -> String {
    use chrono::{DateTime, Local, Utc};

    match DateTime::<Utc>::from_timestamp(epoch_secs, 0) {
        Some(dt) => dt.with_timezone(&Local).format("%H:%M:%S").to_string(),
        None => "N/A".to_string(),
    }
}

/// Helper to get current Unix timestamp
pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_alert(alert_type: &str, timestamp: f64) -> AlertEvent {
        AlertEvent {
            alert_type: alert_type.to_string(),
            description: "test".to_string(),
            src_ip: None,
            timestamp,
        }
    }

    #[test]
    fn test_snapshot_bucket_count_and_starts() {
        let agg = TimelineAggregator::new(60);
        let now = 1_000_000;

        let series = agg.snapshot(60, 5, now);

        // inclusive upper bound: 60/5 + 1 buckets
        assert_eq!(series.len(), 13);
        assert_eq!(series[0].start, now - 60);
        assert_eq!(series[12].start, now);
        for pair in series.windows(2) {
            assert_eq!(pair[1].start - pair[0].start, 5);
        }
    }

    #[test]
    fn test_empty_buffer_yields_zero_series() {
        let agg = TimelineAggregator::new(60);
        let series = agg.snapshot(60, 5, 1_000_000);

        assert_eq!(series.len(), 13);
        assert!(series.iter().all(|bucket| bucket.count == 0));
    }

    #[test]
    fn test_normal_traffic_excluded_from_counts() {
        let mut agg = TimelineAggregator::new(60);
        let now = current_timestamp();

        agg.ingest(make_alert("Normal Traffic", (now - 2) as f64));
        agg.ingest(make_alert("Possible Port Scan", (now - 2) as f64));

        let series = agg.snapshot(60, 5, now);
        let total: u64 = series.iter().map(|bucket| bucket.count).sum();
        assert_eq!(total, 1);
        // normal event stays in the buffer
        assert_eq!(agg.len(), 2);
    }

    #[test]
    fn test_half_open_bucket_boundaries() {
        let mut agg = TimelineAggregator::new(60);
        let now = current_timestamp();
        // land exactly on a bucket start: counts in that bucket, not the prior one
        let boundary = now - 10;

        agg.ingest(make_alert("Possible DDoS", boundary as f64));
        let series = agg.snapshot(60, 5, now);

        let hit: Vec<&TimelineBucket> = series.iter().filter(|b| b.count > 0).collect();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].start, boundary);
    }

    #[test]
    fn test_fractional_timestamps_floor_into_bucket() {
        let mut agg = TimelineAggregator::new(60);
        let now = current_timestamp();

        agg.ingest(make_alert("Possible Port Scan", (now - 3) as f64 + 0.73));
        let series = agg.snapshot(60, 5, now);

        let total: u64 = series.iter().map(|bucket| bucket.count).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let mut agg = TimelineAggregator::new(60);
        let now = current_timestamp();
        agg.ingest(make_alert("Possible DDoS", (now - 7) as f64));
        agg.ingest(make_alert("Possible Port Scan", (now - 30) as f64));

        let first = agg.snapshot(60, 5, now);
        let second = agg.snapshot(60, 5, now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_out_of_order_ingest_matches_sorted_ingest() {
        let now = current_timestamp();
        let timestamps = [now - 3, now - 45, now - 12, now - 45, now - 1];

        let mut unsorted = TimelineAggregator::new(60);
        for ts in timestamps {
            unsorted.ingest(make_alert("Possible Port Scan", ts as f64));
        }

        let mut sorted_ts = timestamps;
        sorted_ts.sort();
        let mut sorted = TimelineAggregator::new(60);
        for ts in sorted_ts {
            sorted.ingest(make_alert("Possible Port Scan", ts as f64));
        }

        assert_eq!(unsorted.snapshot(60, 5, now), sorted.snapshot(60, 5, now));
    }

    #[test]
    fn test_uneven_window_keeps_short_tail_bucket() {
        let agg = TimelineAggregator::new(60);
        let now = 1_000_000;

        // 7s window, 5s buckets: starts at now-7 and now-2
        let series = agg.snapshot(7, 5, now);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].start, now - 7);
        assert_eq!(series[1].start, now - 2);
    }

    #[test]
    fn test_retention_evicts_expired_events() {
        let mut agg = TimelineAggregator::new(60);
        let now = current_timestamp();

        agg.ingest(make_alert("Possible DDoS", (now - 300) as f64));
        agg.ingest(make_alert("Possible DDoS", (now - 5) as f64));
        agg.evict_expired(now);

        assert_eq!(agg.len(), 1);
        let series = agg.snapshot(60, 5, now);
        let total: u64 = series.iter().map(|bucket| bucket.count).sum();
        assert_eq!(total, 1);
    }
}
