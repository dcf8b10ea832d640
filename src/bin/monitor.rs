//! Live alert monitor binary
//!
//! Usage:
//!   cargo run --release --bin monitor
//!
//! Environment variables (all optional, see config.rs for defaults):
//!   ALERT_WS_URL            - backend alert stream (ws://host/ws/frontend)
//!   ALERT_API_URL           - backend REST base URL
//!   TIMELINE_WINDOW_SECS    - trailing window shown in the chart
//!   TIMELINE_BUCKET_SECS    - chart bucket width
//!   RECONNECT_POLICY        - fixed | exponential
//!   RECONNECT_DELAY_SECS    - base reconnect delay
//!   RUST_LOG                - log filter (stderr)

use alertflow::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;

    // Write logs to stderr (isolated from the alternate-screen UI on stdout)
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.rust_log),
    )
    .target(env_logger::Target::Stderr)
    .init();

    alertflow::run(config).await
}
