// src/ui.rs

pub mod chat;
pub mod documents;
pub mod footer;
pub mod header;
pub mod settings;

use crate::api::{ApiClient, HttpChatBackend};
use crate::app::{App, AppEvent, Command, Reply, Tab};
use crate::chat::ChatBackend;
use crate::config::{get_config, Config};
use crate::panel::{PanelStatus, StatusKind};
use crossterm::{
    event::{self, Event as CEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    Frame, Terminal,
};
use std::{io, thread, time::Duration};
use tokio::sync::mpsc;

pub(crate) fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(Color::LightYellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

pub(crate) fn status_line(status: &PanelStatus) -> Line<'static> {
    let color = match status.kind {
        StatusKind::Info => Color::LightBlue,
        StatusKind::Success => Color::LightGreen,
        StatusKind::Error => Color::Red,
    };
    Line::from(Span::styled(
        format!("  {}", status.message),
        Style::default().fg(color),
    ))
}

pub fn draw<B: ChatBackend>(f: &mut Frame, app: &mut App<B>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    header::draw_header(f, chunks[0], app.tab);
    match app.tab {
        Tab::Chat => chat::draw_chat(f, chunks[1], &mut app.transcript),
        Tab::Settings => settings::draw_settings(f, chunks[1], &app.settings),
        Tab::Documents => documents::draw_documents(f, chunks[1], &app.documents),
    }
    footer::draw_footer(f, chunks[2], app.tab);
}

/// Runs the terminal UI against the installed config until the user quits.
pub async fn run_ui() -> anyhow::Result<()> {
    let config = get_config();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &config).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, config: &Config) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();
    spawn_input_reader(tx.clone(), Duration::from_millis(config.tick_rate_ms));

    let api = ApiClient::new(config.server_url.clone()).with_call_log(config.log_dir.clone());
    let backend = HttpChatBackend::new(
        api.http_client().clone(),
        config.server_url.clone(),
        tx.clone(),
    )
    .with_call_log(config.log_dir.clone());

    let mut app = App::new(backend, config.models.clone(), &config.default_model);
    for command in app.startup() {
        spawn_command(&api, command, tx.clone());
    }

    log::info!("UI started against {}", config.server_url);
    loop {
        terminal.draw(|f| draw(f, &mut app))?;

        let Some(event) = rx.recv().await else {
            break;
        };
        for command in app.update(event) {
            spawn_command(&api, command, tx.clone());
        }
        if app.should_quit {
            break;
        }
    }
    log::info!("UI stopped");

    Ok(())
}

/// Reads terminal input on its own thread; crossterm's `poll` blocks.
/// A tick is emitted whenever the poll times out or the terminal resizes.
fn spawn_input_reader(tx: mpsc::UnboundedSender<AppEvent>, tick_rate: Duration) {
    thread::spawn(move || loop {
        let event = match event::poll(tick_rate) {
            Ok(true) => match event::read() {
                Ok(CEvent::Key(key)) => AppEvent::Key(key),
                Ok(_) => AppEvent::Tick,
                Err(e) => {
                    log::error!("Failed to read terminal event: {}", e);
                    break;
                }
            },
            Ok(false) => AppEvent::Tick,
            Err(e) => {
                log::error!("Failed to poll terminal: {}", e);
                break;
            }
        };
        if tx.send(event).is_err() {
            break;
        }
    });
}

fn spawn_command(api: &ApiClient, command: Command, tx: mpsc::UnboundedSender<AppEvent>) {
    let api = api.clone();
    tokio::spawn(async move {
        let reply = match command {
            Command::SaveSettings(settings) => Reply::SettingsSaved(api.save_settings(&settings).await),
            Command::LoadSources => Reply::SourcesLoaded(api.list_sources().await),
            Command::UploadUrl(request) => Reply::UrlUploaded(api.upload_url(&request).await),
            Command::UploadFiles(paths) => Reply::FilesUploaded(api.upload_files(&paths).await),
            Command::DeleteSource(source) => {
                let result = api.delete_source(&source).await;
                Reply::SourceDeleted { source, result }
            }
        };
        // the receiver is gone only when the UI has exited
        let _ = tx.send(AppEvent::Reply(reply));
    });
}
