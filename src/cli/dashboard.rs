//! Dashboard command implementation

use super::{session_history, TickerOptions};
use crate::config::Config;
use crate::feed::{FeedEvent, PriceFeed, SocketFeed};
use crate::widget::{HoverTracker, TerminalRenderer, TickerWidget, UiEvent};
use clap::Args;
use crossterm::{
    cursor::Show,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Write};
use std::time::Duration;
use tokio::sync::mpsc;

/// Redraw cadence while waiting for feed events
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Args, Debug)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub ticker: TickerOptions,
}

impl DashboardArgs {
    pub async fn execute(&self, mut config: Config) -> anyhow::Result<()> {
        self.ticker.apply(&mut config);

        let (width, height) = crossterm::terminal::size()?;
        let renderer = TerminalRenderer::new(width, height);
        let mut widget = match TickerWidget::mount(renderer, session_history(&config), &config.chart)
        {
            Ok(widget) => widget,
            Err(e) => {
                tracing::error!(error = %e, width, height, "Ticker disabled");
                eprintln!("Terminal too small for the dashboard: {}", e);
                return Ok(());
            }
        };
        widget.refresh_chart();

        let feed = SocketFeed::new(config.feed.url.clone());
        let mut events = feed.subscribe().await?;

        let _guard = TerminalGuard::enter(io::stdout())?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

        run_dashboard(&mut terminal, &mut widget, &mut events).await
    }
}

/// Raw mode, alternate screen and mouse capture for as long as it lives
///
/// Dropping the guard restores the terminal, including when setup fails
/// halfway.
struct TerminalGuard<W: Write> {
    out: W,
    raw: bool,
}

impl<W: Write> TerminalGuard<W> {
    fn enter(out: W) -> io::Result<Self> {
        let mut guard = Self { out, raw: false };
        enable_raw_mode()?;
        guard.raw = true;
        execute!(guard.out, EnterAlternateScreen, EnableMouseCapture)?;
        Ok(guard)
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        if self.raw {
            if let Err(e) = disable_raw_mode() {
                tracing::warn!(error = %e, "Failed to leave raw mode");
            }
        }
        if let Err(e) = execute!(self.out, LeaveAlternateScreen, DisableMouseCapture, Show) {
            tracing::warn!(error = %e, "Failed to restore terminal");
        }
    }
}

async fn run_dashboard<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    widget: &mut TickerWidget<TerminalRenderer>,
    events: &mut mpsc::Receiver<FeedEvent>,
) -> anyhow::Result<()> {
    let mut hover = HoverTracker::default();
    let mut feed_open = true;

    loop {
        terminal.draw(|frame| widget.renderer_mut().draw(frame))?;

        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if key.code == KeyCode::Char('q') {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => {
                    let target = widget.renderer().target_at(mouse.column, mouse.row);
                    match mouse.kind {
                        MouseEventKind::Down(MouseButton::Left) => {
                            widget.handle_ui(UiEvent::Click(target));
                        }
                        MouseEventKind::Moved => {
                            for ui_event in hover.moved(target) {
                                widget.handle_ui(ui_event);
                            }
                        }
                        _ => {}
                    }
                }
                Event::Resize(width, height) => widget.renderer_mut().resize(width, height),
                _ => {}
            }
        }

        if feed_open {
            match tokio::time::timeout(FRAME_INTERVAL, events.recv()).await {
                Ok(Some(event)) => widget.handle_event(event),
                Ok(None) => feed_open = false,
                Err(_) => {}
            }
        } else {
            // Socket is gone for good; keep the last state on screen until quit
            tokio::time::sleep(FRAME_INTERVAL).await;
        }
    }
}
