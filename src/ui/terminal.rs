use {
    crate::state::State,
    crate::stream_core::{ConnectionState, StreamHandle},
    ratatui::{backend::CrosstermBackend, Terminal},
    std::{sync::Arc, time::Duration},
    tokio::sync::RwLock,
};

/// Run the TUI event loop
///
/// Handles keyboard input ('q'/Esc quits, 'm' toggles the feed's show-more
/// state) and redraws on a fixed cadence. Returns when the user quits.
pub async fn run_ui(
    state: Arc<RwLock<State>>,
    stream: StreamHandle,
    window_secs: i64,
    bucket_secs: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    let stdout = std::io::stdout();
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    crossterm::terminal::enable_raw_mode()?;

    // Alternate screen keeps the dashboard separate from stderr logs
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::cursor::Hide
    )?;

    terminal.clear()?;

    let refresh_interval = Duration::from_millis(500);

    loop {
        // Check for keyboard input (non-blocking)
        if crossterm::event::poll(refresh_interval)? {
            if let crossterm::event::Event::Key(key) = crossterm::event::read()? {
                match key.code {
                    crossterm::event::KeyCode::Char('q') | crossterm::event::KeyCode::Esc => {
                        break;
                    }
                    crossterm::event::KeyCode::Char('m') => {
                        let mut state = state.write().await;
                        state.feed_mut().toggle_show_more();
                    }
                    _ => {}
                }
            }
        }

        let connection: ConnectionState = stream.connection_state();

        // Render UI
        {
            let state = state.read().await;
            let area = terminal.size()?;
            terminal.draw(|f| {
                crate::ui::layout::render_layout(
                    f,
                    area,
                    &state,
                    connection,
                    window_secs,
                    bucket_secs,
                );
            })?;
        }
    }

    // Cleanup - restore terminal state
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    crossterm::terminal::disable_raw_mode()?;
    Ok(())
}
