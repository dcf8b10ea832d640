use {
    crate::aggregator::{TimelineAggregator, TimelineBucket},
    crate::event::AlertEvent,
    crate::results::DetectionResults,
};

/// How many alerts the feed shows before the rest collapses behind the
/// show-more toggle.
pub const FEED_VISIBLE_HEAD: usize = 6;

/// Message sent through the channel from the stream client to the state
/// aggregator task.
#[derive(Debug, Clone)]
pub enum StateMessage {
    Alert(AlertEvent),
    Shutdown,
}

/// Most-recent-first projection of received alerts for display.
///
/// Pure presentation state: the first [`FEED_VISIBLE_HEAD`] entries are
/// always shown, the remainder only while `show_more` is set.
pub struct AlertFeed {
    /// Newest first.
    alerts: Vec<AlertEvent>,
    show_more: bool,
    capacity: usize,
}

impl AlertFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            alerts: Vec::with_capacity(capacity),
            show_more: false,
            capacity,
        }
    }

    /// Prepend a new alert, dropping the oldest entry once over capacity.
    pub fn push(&mut self, event: AlertEvent) {
        self.alerts.insert(0, event);
        if self.alerts.len() > self.capacity {
            self.alerts.truncate(self.capacity);
        }
    }

    /// The always-visible head of the feed.
    pub fn visible(&self) -> &[AlertEvent] {
        let head = self.alerts.len().min(FEED_VISIBLE_HEAD);
        &self.alerts[..head]
    }

    /// Everything behind the toggle.
    pub fn hidden(&self) -> &[AlertEvent] {
        if self.alerts.len() > FEED_VISIBLE_HEAD {
            &self.alerts[FEED_VISIBLE_HEAD..]
        } else {
            &[]
        }
    }

    pub fn toggle_show_more(&mut self) {
        self.show_more = !self.show_more;
    }

    pub fn show_more(&self) -> bool {
        self.show_more
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

/// In-memory state store for the live session
///
/// Uses channel-based ingestion: the stream client sends Alert messages via
/// channel, a background task receives and applies them here.
pub struct State {
    feed: AlertFeed,
    timeline: TimelineAggregator,
    total_events: u64,
    abnormal_events: u64,
    /// One-shot historical results from the backend, when available.
    results: Option<DetectionResults>,
}

impl State {
    pub fn new(feed_capacity: usize, retention_secs: i64) -> Self {
        Self {
            feed: AlertFeed::new(feed_capacity),
            timeline: TimelineAggregator::new(retention_secs),
            total_events: 0,
            abnormal_events: 0,
            results: None,
        }
    }

    /// Apply one decoded alert (called by the background aggregator task).
    pub fn apply_alert(&mut self, event: AlertEvent) {
        self.total_events += 1;
        if event.is_abnormal() {
            self.abnormal_events += 1;
        }

        self.feed.push(event.clone());
        self.timeline.ingest(event);
    }

    pub fn timeline_snapshot(
        &self,
        window_secs: i64,
        bucket_secs: i64,
        now: i64,
    ) -> Vec<TimelineBucket> {
        self.timeline.snapshot(window_secs, bucket_secs, now)
    }

    pub fn feed(&self) -> &AlertFeed {
        &self.feed
    }

    pub fn feed_mut(&mut self) -> &mut AlertFeed {
        &mut self.feed
    }

    pub fn total_events(&self) -> u64 {
        self.total_events
    }

    pub fn abnormal_events(&self) -> u64 {
        self.abnormal_events
    }

    pub fn set_results(&mut self, results: DetectionResults) {
        self.results = Some(results);
    }

    pub fn results(&self) -> Option<&DetectionResults> {
        self.results.as_ref()
    }
}

/// Background task that receives alerts from the channel and applies them
/// to State in arrival order.
pub async fn state_aggregator_task(
    mut receiver: tokio::sync::mpsc::Receiver<StateMessage>,
    state: std::sync::Arc<tokio::sync::RwLock<State>>,
) {
    log::info!("State aggregator task started");

    while let Some(message) = receiver.recv().await {
        match message {
            StateMessage::Alert(event) => {
                let mut state = state.write().await;
                state.apply_alert(event);
            }
            StateMessage::Shutdown => {
                log::info!("State aggregator received shutdown signal");
                break;
            }
        }
    }

    log::info!("State aggregator task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::current_timestamp;
    use std::sync::Arc;
    use tokio::sync::{mpsc, RwLock};

    fn make_alert(alert_type: &str, timestamp: f64) -> AlertEvent {
        AlertEvent {
            alert_type: alert_type.to_string(),
            description: "test".to_string(),
            src_ip: None,
            timestamp,
        }
    }

    #[test]
    fn test_feed_is_most_recent_first() {
        let mut feed = AlertFeed::new(100);
        feed.push(make_alert("A", 1.0));
        feed.push(make_alert("B", 2.0));
        feed.push(make_alert("C", 3.0));

        assert_eq!(feed.visible()[0].alert_type, "C");
        assert_eq!(feed.visible()[2].alert_type, "A");
    }

    #[test]
    fn test_feed_splits_at_visible_head() {
        let mut feed = AlertFeed::new(100);
        for i in 0..9 {
            feed.push(make_alert(&format!("alert-{i}"), i as f64));
        }

        assert_eq!(feed.visible().len(), 6);
        assert_eq!(feed.hidden().len(), 3);
        // newest entry leads the visible head, oldest trails the remainder
        assert_eq!(feed.visible()[0].alert_type, "alert-8");
        assert_eq!(feed.hidden()[2].alert_type, "alert-0");

        assert!(!feed.show_more());
        feed.toggle_show_more();
        assert!(feed.show_more());
    }

    #[test]
    fn test_feed_capacity_drops_oldest() {
        let mut feed = AlertFeed::new(4);
        for i in 0..6 {
            feed.push(make_alert(&format!("alert-{i}"), i as f64));
        }

        assert_eq!(feed.len(), 4);
        assert_eq!(feed.visible()[0].alert_type, "alert-5");
        assert_eq!(feed.visible()[3].alert_type, "alert-2");
    }

    #[test]
    fn test_state_counts_abnormal_separately() {
        let mut state = State::new(100, 60);
        let now = current_timestamp() as f64;

        state.apply_alert(make_alert("Normal Traffic", now));
        state.apply_alert(make_alert("Possible Port Scan", now));
        state.apply_alert(make_alert("Possible DDoS", now));

        assert_eq!(state.total_events(), 3);
        assert_eq!(state.abnormal_events(), 2);
        assert_eq!(state.feed().len(), 3);
    }

    #[tokio::test]
    async fn test_aggregator_task_applies_alerts_in_order() {
        let (tx, rx) = mpsc::channel(16);
        let state = Arc::new(RwLock::new(State::new(100, 60)));

        let task_state = state.clone();
        let handle = tokio::spawn(async move {
            state_aggregator_task(rx, task_state).await;
        });

        let now = current_timestamp() as f64;
        tx.send(StateMessage::Alert(make_alert("first", now)))
            .await
            .unwrap();
        tx.send(StateMessage::Alert(make_alert("second", now)))
            .await
            .unwrap();
        tx.send(StateMessage::Shutdown).await.unwrap();
        handle.await.unwrap();

        let state = state.read().await;
        assert_eq!(state.total_events(), 2);
        assert_eq!(state.feed().visible()[0].alert_type, "second");
        assert_eq!(state.feed().visible()[1].alert_type, "first");
    }
}
