mod app;
mod chart;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::keys::KeyOutcome;
use crate::state::app_settings::{AppSettings, CliArgs, CliCommand};
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::PeriodicRefresher;
use crossterm::event::{self as crossterm_event, Event, KeyEventKind};
use crossterm::{cursor, execute, terminal};
use log::{debug, error, info};
use scoreboard_api::client::ScoreboardApi;
use std::io::Stdout;
use std::sync::Arc;
use std::time::Duration;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(cli) = handle_cli_args() else {
        return Ok(());
    };

    // A missing .env file is fine; everything it sets can come from the shell.
    let _ = dotenvy::dotenv();
    let settings = match AppSettings::resolve(cli, |key| std::env::var(key).ok()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("scoreboard-tui: {e:#}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(settings.log_level)?;
    tui_logger::set_default_level(settings.log_level);
    info!("watching {} ({})", settings.base_url, settings.mode);

    let mut client = ScoreboardApi::new(settings.base_url.clone()).with_timeout(REQUEST_TIMEOUT);
    if let Some(cookie) = &settings.session {
        client = client.with_session(cookie.clone());
    }
    let mode = settings.mode;
    let update_interval = settings.update_interval;
    let app = Arc::new(Mutex::new(App::new(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(client, mode, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Periodic refresh, stopped when the loop ends
    let refresher = PeriodicRefresher::new(ui_event_tx.clone(), update_interval).start();

    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    refresher.stop().await;
    input_handler.abort();
    network_task.abort();
    cleanup_terminal()?;

    Ok(())
}

/// `None` when the process should exit after printing help or version.
fn handle_cli_args() -> Option<CliArgs> {
    match CliCommand::parse(std::env::args().skip(1)) {
        Ok(CliCommand::Run(cli)) => Some(cli),
        Ok(CliCommand::Help) => {
            println!("{}", usage_text());
            None
        }
        Ok(CliCommand::Version) => {
            println!("scoreboard-tui {}", env!("CARGO_PKG_VERSION"));
            None
        }
        Err(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "scoreboard-tui - live CTF scoreboard in the terminal

Usage:
  scoreboard-tui [OPTIONS] [URL]
  scoreboard-tui --help
  scoreboard-tui --version

Options:
  --teams | --users        Competitor mode (default users)
  --chart-options PATH     JSON object merged over the chart options
  --interval MS            Poll interval in milliseconds (default 300000)
  --log-level LEVEL        off, error, warn, info, debug or trace (default error)

Environment (also read from .env):
  SCOREBOARD_URL           Scoreboard base URL, when not given as an argument
  SCOREBOARD_MODE          users or teams
  SCOREBOARD_CHART_OPTIONS Path to the chart option overrides
  SCOREBOARD_INTERVAL_MS   Poll interval in milliseconds
  SCOREBOARD_SESSION       Cookie header sent with every request
  SCOREBOARD_LOG           Log level"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let Some(should_redraw) = handle_ui_event(ui_event, &app, &network_requests).await else {
                    return;
                };
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                handle_network_response(response, &app, &network_requests, &mut loading).await;
                let mut app_guard = app.lock().await;
                draw::draw(&mut terminal, &mut app_guard, loading);
            }

            else => return,
        }
    }
}

/// `None` means quit.
async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> Option<bool> {
    match ui_event {
        UiEvent::AppStarted => {
            let _ = network_requests.send(NetworkRequest::LoadInitial).await;
            Some(true)
        }
        UiEvent::KeyPressed(key_event) => {
            match keys::handle_key_bindings(key_event, app, network_requests).await {
                KeyOutcome::Quit => None,
                KeyOutcome::Continue => Some(true),
            }
        }
        UiEvent::Resize => Some(true),
        UiEvent::RefreshTick => {
            let bracket = app.lock().await.active_bracket();
            debug!("poll tick, refreshing for bracket {bracket:?}");
            let _ = network_requests.send(NetworkRequest::LoadStandings).await;
            let _ = network_requests
                .send(NetworkRequest::RefreshChart { bracket })
                .await;
            Some(false)
        }
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) {
    let mut guard = app.lock().await;
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => *loading = loading_state,
        NetworkResponse::BracketsLoaded { brackets } => guard.on_brackets_loaded(brackets),
        NetworkResponse::StandingsLoaded { standings } => guard.on_standings_loaded(standings),
        NetworkResponse::InitialLoadFinished => {
            let bracket = guard.active_bracket();
            drop(guard);
            let _ = network_requests
                .send(NetworkRequest::RefreshChart { bracket })
                .await;
        }
        NetworkResponse::TopLoaded { bracket, top } => guard.on_top_loaded(bracket, top),
        NetworkResponse::ChartFailed { bracket, message } => guard.on_chart_failed(bracket, message),
        NetworkResponse::Error { message } => guard.on_error(message),
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    while !ui_events.is_closed() {
        // crossterm blocks, so poll with a timeout off the async workers and
        // notice when the UI loop has gone away.
        let polled = tokio::task::spawn_blocking(|| -> io::Result<Option<Event>> {
            if crossterm_event::poll(INPUT_POLL_TIMEOUT)? {
                crossterm_event::read().map(Some)
            } else {
                Ok(None)
            }
        })
        .await;

        let event = match polled {
            Ok(Ok(Some(event))) => event,
            Ok(Ok(None)) => continue,
            Ok(Err(e)) => {
                error!("Failed to read terminal input: {e}");
                break;
            }
            Err(_) => break,
        };
        let ui_event = match event {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                Some(UiEvent::KeyPressed(key_event))
            }
            Event::Resize(_, _) => Some(UiEvent::Resize),
            _ => None,
        };

        if let Some(ui_event) = ui_event
            && ui_events.send(ui_event).await.is_err()
        {
            break;
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::MoveTo(0, 0))?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    execute!(stdout, terminal::LeaveAlternateScreen)?;
    execute!(stdout, cursor::Show)?;
    terminal::disable_raw_mode()
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let _ = cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
