pub mod aggregator;
pub mod config;
pub mod event;
pub mod results;
pub mod state;
pub mod stream_core;
pub mod ui;

use {
    config::Config,
    results::ResultsClient,
    state::{State, StateMessage},
    stream_core::StreamClient,
    std::sync::Arc,
    tokio::sync::{mpsc, RwLock},
};

/// Wire up and run the monitor: state task, one-shot results fetch, stream
/// client, and TUI. Returns when the user quits the UI or the stream client
/// is shut down externally.
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("🚀 Starting alert monitor...");
    log::info!("📊 Configuration:");
    log::info!("   Stream URL: {}", config.ws_url);
    log::info!("   API URL: {}", config.api_url);
    log::info!(
        "   Timeline: {}s window, {}s buckets",
        config.window_secs,
        config.bucket_secs
    );
    log::info!("   Reconnect policy: {:?}", config.reconnect);

    // Bounded channel between the stream client and the state task
    let (tx, rx) = mpsc::channel::<StateMessage>(config.channel_buffer);

    let state = Arc::new(RwLock::new(State::new(
        config.feed_capacity,
        config.window_secs,
    )));

    // Spawn background state aggregator task
    let state_clone = state.clone();
    tokio::spawn(async move {
        state::state_aggregator_task(rx, state_clone).await;
    });

    // One-shot historical results fetch (non-fatal on any failure)
    let results_state = state.clone();
    let api_url = config.api_url.clone();
    tokio::spawn(async move {
        let client = match ResultsClient::new(&api_url) {
            Ok(client) => client,
            Err(error) => {
                log::warn!("Failed to build results client: {}", error);
                return;
            }
        };

        match client.health().await {
            Ok(true) => log::info!("✅ Backend healthy at {}", api_url),
            Ok(false) => log::warn!("Backend health probe returned a non-ok status"),
            Err(error) => log::warn!("Backend health probe failed: {}", error),
        }

        match client.fetch_results().await {
            Ok(results) => {
                results_state.write().await.set_results(results);
                log::info!("✅ Historical results loaded");
            }
            Err(error) => log::warn!("Historical results unavailable: {}", error),
        }
    });

    let (client, handle) = StreamClient::new(config.ws_url.clone(), config.reconnect.clone(), tx.clone());
    let mut stream_task = tokio::spawn(client.run());

    let ui_state = state.clone();
    let ui_stream = handle.clone();
    let (window_secs, bucket_secs) = (config.window_secs, config.bucket_secs);
    let mut ui_task = tokio::spawn(async move {
        if let Err(error) = ui::run_ui(ui_state, ui_stream, window_secs, bucket_secs).await {
            log::error!("UI error: {}", error);
        }
    });

    tokio::select! {
        _ = &mut ui_task => {
            log::info!("UI exited, shutting down stream client");
            handle.shutdown();
            let _ = stream_task.await;
        }
        _ = &mut stream_task => {
            log::info!("Stream client stopped");
            ui_task.abort();
        }
    }

    // Let the state task drain and stop
    let _ = tx.send(StateMessage::Shutdown).await;

    Ok(())
}
