use crate::app::{App, MenuItem};
use crate::chart::ScoreChart;
use crate::state::messages::NetworkRequest;
use crate::ui::view::nav_view;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> KeyOutcome {
    let mut guard = app.lock().await;
    let mut filter_changed = false;
    // Bracket keys stand in for clicking the nav, so they only work while it is shown.
    let nav_shown = nav_view(&guard.state.scoreboard).is_some();

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => return KeyOutcome::Quit,

        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Bracket nav
        (MenuItem::Scoreboard, Char('l') | KeyCode::Right | KeyCode::Tab, _) if nav_shown => {
            filter_changed = guard.step_bracket(1);
        }
        (MenuItem::Scoreboard, Char('h') | KeyCode::Left | KeyCode::BackTab, _) if nav_shown => {
            filter_changed = guard.step_bracket(-1);
        }
        (MenuItem::Scoreboard, Char('a') | Char('0'), _) if nav_shown => {
            filter_changed = guard.select_bracket(None);
        }
        (MenuItem::Scoreboard, Char(c @ '1'..='9'), _) if nav_shown => {
            let index = c.to_digit(10).unwrap_or_default() as usize;
            filter_changed = guard.select_nav_index(index);
        }

        // Table
        (MenuItem::Scoreboard, Char('j') | KeyCode::Down, _) => guard.select_next_row(),
        (MenuItem::Scoreboard, Char('k') | KeyCode::Up, _) => guard.select_prev_row(),

        // Chart
        (MenuItem::Scoreboard, Char('+') | Char('='), _) => guard.with_chart(ScoreChart::zoom_in),
        (MenuItem::Scoreboard, Char('-'), _) => guard.with_chart(ScoreChart::zoom_out),
        (MenuItem::Scoreboard, Char('<') | Char(','), _) => guard.with_chart(ScoreChart::pan_left),
        (MenuItem::Scoreboard, Char('>') | Char('.'), _) => guard.with_chart(ScoreChart::pan_right),
        (MenuItem::Scoreboard, Char('['), _) => guard.with_chart(|c| c.scroll_legend(-1)),
        (MenuItem::Scoreboard, Char(']'), _) => guard.with_chart(|c| c.scroll_legend(1)),

        (_, Char('r'), _) => {
            let bracket = guard.active_bracket();
            drop(guard);
            let _ = network_requests.send(NetworkRequest::LoadStandings).await;
            let _ = network_requests
                .send(NetworkRequest::RefreshChart { bracket })
                .await;
            return KeyOutcome::Continue;
        }

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    if filter_changed {
        let bracket = guard.active_bracket();
        drop(guard);
        let _ = network_requests
            .send(NetworkRequest::RefreshChart { bracket })
            .await;
    }
    KeyOutcome::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_settings::AppSettings;
    use scoreboard_api::{Bracket, BracketId, Standing};

    fn app_with(brackets_only: bool) -> Arc<Mutex<App>> {
        let mut app = App::new(AppSettings::default());
        app.on_brackets_loaded(vec![
            Bracket { id: BracketId(1), name: "Open".into() },
            Bracket { id: BracketId(2), name: "Students".into() },
        ]);
        if !brackets_only {
            app.on_standings_loaded(vec![Standing {
                name: "rooters".into(),
                bracket_id: Some(BracketId(1)),
                ..Default::default()
            }]);
        }
        Arc::new(Mutex::new(app))
    }

    fn app_with_brackets() -> Arc<Mutex<App>> {
        app_with(false)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn digits_switch_the_filter_and_refresh_the_chart() {
        let app = app_with_brackets();
        let (tx, mut rx) = mpsc::channel(8);

        let outcome = handle_key_bindings(press(Char('2')), &app, &tx).await;
        assert_eq!(outcome, KeyOutcome::Continue);
        assert!(matches!(
            rx.try_recv(),
            Ok(NetworkRequest::RefreshChart { bracket: Some(BracketId(2)) })
        ));
        assert_eq!(app.lock().await.active_bracket(), Some(BracketId(2)));
    }

    #[tokio::test]
    async fn reselecting_the_active_bracket_sends_nothing() {
        let app = app_with_brackets();
        let (tx, mut rx) = mpsc::channel(8);

        handle_key_bindings(press(Char('a')), &app, &tx).await;
        handle_key_bindings(press(Char('7')), &app, &tx).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn bracket_keys_do_nothing_while_the_nav_is_hidden() {
        let app = app_with(true);
        let (tx, mut rx) = mpsc::channel(8);

        for code in [Char('2'), KeyCode::Right, KeyCode::Left, Char('a')] {
            handle_key_bindings(press(code), &app, &tx).await;
        }
        assert!(rx.try_recv().is_err());
        assert_eq!(app.lock().await.active_bracket(), None);

        app.lock().await.on_standings_loaded(vec![Standing::default()]);
        handle_key_bindings(press(KeyCode::Right), &app, &tx).await;
        assert!(matches!(
            rx.try_recv(),
            Ok(NetworkRequest::RefreshChart { bracket: Some(BracketId(1)) })
        ));
    }

    #[tokio::test]
    async fn refresh_key_reloads_standings_and_chart() {
        let app = app_with_brackets();
        let (tx, mut rx) = mpsc::channel(8);

        handle_key_bindings(press(Char('r')), &app, &tx).await;
        assert!(matches!(rx.try_recv(), Ok(NetworkRequest::LoadStandings)));
        assert!(matches!(rx.try_recv(), Ok(NetworkRequest::RefreshChart { bracket: None })));
    }

    #[tokio::test]
    async fn quit_keys_end_the_loop() {
        let app = app_with_brackets();
        let (tx, _rx) = mpsc::channel(8);

        assert_eq!(handle_key_bindings(press(Char('q')), &app, &tx).await, KeyOutcome::Quit);
        let ctrl_c = KeyEvent::new(Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_bindings(ctrl_c, &app, &tx).await, KeyOutcome::Quit);
    }

    #[tokio::test]
    async fn nav_keys_are_ignored_on_the_help_tab() {
        let app = app_with_brackets();
        let (tx, mut rx) = mpsc::channel(8);

        handle_key_bindings(press(Char('?')), &app, &tx).await;
        handle_key_bindings(press(KeyCode::Right), &app, &tx).await;
        assert!(rx.try_recv().is_err());
        handle_key_bindings(press(KeyCode::Esc), &app, &tx).await;
        assert_eq!(app.lock().await.state.active_tab, MenuItem::Scoreboard);
    }
}
