use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use calm_chat_core::{ChatBackend, Config, HttpBackend};
use clap::Parser;
use tracing::info;

mod app;
mod handler;
mod input;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "calm-chat")]
#[command(about = "A quiet terminal chat with a supportive companion")]
#[command(version)]
struct Cli {
    /// Chat backend address (overrides CALM_CHAT_BACKEND_URL and the config file)
    #[arg(short, long)]
    backend_url: Option<String>,

    /// Where to write logs
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = cli.log_file.unwrap_or_else(logging::default_log_path);
    let _log_guard = logging::init_or_warn(&log_path);

    let config = Config::load()?;
    let backend_url = config.resolve_backend_url(cli.backend_url.as_deref());
    let backend: Arc<dyn ChatBackend> =
        Arc::new(HttpBackend::with_timeout(&backend_url, config.request_timeout())?);

    info!(backend = %backend.describe(), "calm chat starting");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(backend, events.sender());
    app.submit_chord_available = tui::keyboard_enhanced();

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    info!(messages = app.chat.transcript().len(), "calm chat exiting");
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}
