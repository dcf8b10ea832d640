use {
    crate::aggregator::current_timestamp,
    crate::event::AlertEvent,
    crate::state::State,
    crate::stream_core::ConnectionState,
    crate::ui::renderer::{format_accuracy, format_silhouette, format_timestamp},
    ratatui::{
        layout::{Constraint, Layout as RatLayout, Rect},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, Paragraph, Row, Sparkline, Table},
        Frame,
    },
};

/// Render the main UI layout
pub fn render_layout(
    f: &mut Frame,
    area: Rect,
    state: &State,
    connection: ConnectionState,
    window_secs: i64,
    bucket_secs: i64,
) {
    let chunks = RatLayout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header + results
            Constraint::Length(8), // Timeline chart
            Constraint::Min(0),    // Alert feed
            Constraint::Length(3), // Footer/Status
        ])
        .split(area);

    render_header(f, chunks[0], state);
    render_timeline(f, chunks[1], state, window_secs, bucket_secs);
    render_feed(f, chunks[2], state);
    render_footer(f, chunks[3], state, connection);
}

fn render_header(f: &mut Frame, area: Rect, state: &State) {
    let header = Block::default()
        .borders(Borders::ALL)
        .title("Intrusion Detection Monitor");

    let results_line = match state.results() {
        Some(results) => Line::from(vec![
            Span::styled("Models: ", Style::default().fg(Color::Cyan)),
            Span::raw(format!(
                "RF {} | XGB {} | DNN {}",
                format_accuracy(results.classification.rf.accuracy),
                format_accuracy(results.classification.xgb.accuracy),
                format_accuracy(results.classification.dnn.accuracy),
            )),
            Span::raw("   "),
            Span::styled("Clustering: ", Style::default().fg(Color::Cyan)),
            Span::raw(format!(
                "KMeans {} | DBSCAN {} | AE-KMeans {}",
                format_silhouette(results.clustering.kmeans_silhouette),
                format_silhouette(results.clustering.dbscan_silhouette),
                format_silhouette(results.clustering.ae_kmeans_silhouette),
            )),
        ]),
        None => Line::from(Span::styled(
            "Historical results unavailable",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let text = vec![
        Line::from(vec![
            Span::styled(
                "Live Alert Monitor",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" - press 'q' or Esc to quit, 'm' to expand the feed"),
        ]),
        results_line,
    ];

    f.render_widget(Paragraph::new(text).block(header), area);
}

fn render_timeline(f: &mut Frame, area: Rect, state: &State, window_secs: i64, bucket_secs: i64) {
    let series = state.timeline_snapshot(window_secs, bucket_secs, current_timestamp());
    let counts: Vec<u64> = series.iter().map(|bucket| bucket.count).collect();
    let peak = counts.iter().copied().max().unwrap_or(0);

    let title = match (series.first(), series.last()) {
        (Some(first), Some(last)) => format!(
            "Alert Timeline  {} .. {}  (last {}s, {}s buckets, peak {})",
            first.label, last.label, window_secs, bucket_secs, peak
        ),
        _ => "Alert Timeline".to_string(),
    };

    let sparkline = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(&counts)
        .style(Style::default().fg(Color::Red));

    f.render_widget(sparkline, area);
}

fn render_feed(f: &mut Frame, area: Rect, state: &State) {
    let feed = state.feed();

    let header = Row::new(vec!["Time", "Type", "Description"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let visible = feed.visible().iter();
    let expanded: Box<dyn Iterator<Item = &AlertEvent> + '_> = if feed.show_more() {
        Box::new(visible.chain(feed.hidden().iter()))
    } else {
        Box::new(visible)
    };

    let rows: Vec<Row> = expanded.map(feed_row).collect();

    let hidden_count = feed.hidden().len();
    let title = if feed.is_empty() {
        "Live Alerts (none yet)".to_string()
    } else if feed.show_more() {
        format!("Live Alerts ({} total — 'm' to collapse)", feed.len())
    } else if hidden_count > 0 {
        format!("Live Alerts ({} more — 'm' to show)", hidden_count)
    } else {
        "Live Alerts".to_string()
    };

    let widths = [
        Constraint::Length(10),
        Constraint::Length(24),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(table, area);
}

fn feed_row(event: &AlertEvent) -> Row<'static> {
    let color = if event.is_abnormal() {
        Color::Red
    } else {
        Color::Green
    };

    let description = match &event.src_ip {
        Some(src_ip) => format!("{} (src {})", event.description, src_ip),
        None => event.description.clone(),
    };

    Row::new(vec![
        format_timestamp(event.timestamp),
        event.alert_type.clone(),
        description,
    ])
    .style(Style::default().fg(color))
}

fn render_footer(f: &mut Frame, area: Rect, state: &State, connection: ConnectionState) {
    let status_color = match connection {
        ConnectionState::Open => Color::Green,
        ConnectionState::Connecting => Color::Yellow,
        ConnectionState::Closed => Color::Red,
    };

    let text = vec![Line::from(vec![
        Span::styled("Status: ", Style::default().fg(status_color)),
        Span::raw(connection.as_str()),
        Span::raw(" | "),
        Span::styled("Events: ", Style::default().fg(Color::Cyan)),
        Span::raw(state.total_events().to_string()),
        Span::raw(" | "),
        Span::styled("Alerts: ", Style::default().fg(Color::Cyan)),
        Span::raw(state.abnormal_events().to_string()),
    ])];

    let footer = Block::default().borders(Borders::ALL).title("Status");

    f.render_widget(Paragraph::new(text).block(footer), area);
}
