use log::error;
use tui::Frame;
use tui::Terminal;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::bracket_nav::BracketNav;
use crate::components::score_chart::ScoreChartWidget;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::{LayoutAreas, ScoreboardAreas};
use crate::ui::view::{StandingRow, StandingsView, nav_view, standings_view};

static TABS: &[&str; 2] = &["Scoreboard", "Help"];

const HELP_LINES: &[(&str, &str)] = &[
    ("q, Ctrl-c", "quit"),
    ("←/h →/l, Tab", "previous / next bracket"),
    ("a, 0", "all brackets"),
    ("1-9", "n-th bracket"),
    ("↑/k ↓/j", "select row"),
    ("+ / -", "zoom chart in / out"),
    ("< / >", "pan chart"),
    ("[ / ]", "scroll chart legend"),
    ("r", "refresh now"),
    ("f", "full screen"),
    ("\"", "show / hide logs"),
    ("?, Esc", "open / close help"),
];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        let full = f.area();
        layout.update(full, app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Scoreboard => draw_scoreboard(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if app.state.show_logs {
            draw_logs(f, layout.logs);
        }

        draw_loading_spinner(f, layout.tab_bar[1], full, app, loading);
    });

    if let Err(e) = result {
        error!("Failed to draw frame: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Scoreboard => 0,
        MenuItem::Help => 1,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let updated = match &app.state.last_updated {
        Some(time) => format!("Updated {time}  Help: ? "),
        None => "Help: ? ".to_string(),
    };
    let help = Paragraph::new(updated)
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_scoreboard(f: &mut Frame, area: Rect, app: &App) {
    let scoreboard = &app.state.scoreboard;
    let buttons = nav_view(scoreboard);
    let chart = app
        .state
        .chart
        .chart
        .as_ref()
        .filter(|_| app.state.chart.visible);
    let areas = ScoreboardAreas::new(area, buttons.is_some(), chart.is_some());

    if let Some(buttons) = &buttons {
        f.render_widget(BracketNav { buttons }, areas.nav);
    }

    let title = format!(" Scoreboard · {} ", app.settings.mode.noun());
    let block = default_border(Color::White).title(title);
    let inner = block.inner(areas.table);
    f.render_widget(block, areas.table);

    match standings_view(scoreboard, app.settings.mode, &app.settings.base_url) {
        StandingsView::Loading => draw_placeholder(f, inner, "Loading standings..."),
        StandingsView::Empty => draw_placeholder(f, inner, "No standings for this bracket yet"),
        StandingsView::Table(rows) => {
            let selected = scoreboard.selected_row.min(rows.len().saturating_sub(1));
            draw_details(f, areas.details, rows.get(selected));
            draw_standings_table(f, inner, &rows, selected);
        }
    }

    if let Some(chart) = chart {
        let mut block = default_border(Color::DarkGray);
        let pending = app.chart_is_pending();
        if pending {
            block = block.title(" Updating... ");
        }
        let inner = block.inner(areas.chart);
        f.render_widget(block, areas.chart);
        f.render_widget(ScoreChartWidget { chart }, inner);
        // The plot belongs to the previous filter until the refresh lands.
        if pending {
            f.buffer_mut()
                .set_style(inner, Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM));
        }
    }
}

fn draw_standings_table(f: &mut Frame, area: Rect, rows: &[StandingRow], selected: usize) {
    let header = Row::new(["Place", "Name", "Bracket", "Score"])
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));

    let body = rows.iter().map(|row| {
        let mut name = vec![Span::raw(row.name.clone())];
        if row.official_url.is_some() {
            name.push(Span::styled(" Official", Style::default().fg(Color::Yellow)));
        }
        Row::new([
            Cell::from(row.position.to_string()),
            Cell::from(Line::from(name)),
            Cell::from(row.bracket_badge.clone().unwrap_or_default())
                .style(Style::default().fg(Color::Cyan)),
            Cell::from(row.score.to_string()),
        ])
    });

    let widths = [
        Constraint::Length(6),
        Constraint::Fill(1),
        Constraint::Length(14),
        Constraint::Length(8),
    ];
    let table = Table::new(body, widths)
        .header(header)
        .row_highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = TableState::default().with_selected(Some(selected));
    f.render_stateful_widget(table, area, &mut state);
}

/// Links for the selected row, in place of clickable anchors.
fn draw_details(f: &mut Frame, area: Rect, row: Option<&StandingRow>) {
    let Some(row) = row else {
        return;
    };
    let mut spans = Vec::with_capacity(4);
    if let Some(url) = &row.account_url {
        spans.push(Span::styled(url.clone(), Style::default().fg(Color::Blue)));
    }
    if let Some(url) = &row.official_url {
        spans.push(Span::raw("  Official: "));
        spans.push(Span::styled(url.clone(), Style::default().fg(Color::Yellow)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::White).title(" Help ");
    let rows = HELP_LINES
        .iter()
        .map(|(keys, action)| Row::new([Cell::from(*keys).style(Style::default().fg(Color::Cyan)), Cell::from(*action)]));
    let table = Table::new(rows, [Constraint::Length(16), Constraint::Fill(1)]).block(block);
    f.render_widget(table, area);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::Gray));
    f.render_widget(Clear, area);
    f.render_widget(logs, area);
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

fn draw_loading_spinner(f: &mut Frame, status_area: Rect, full: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string()).style(style);
    let area = if app.settings.full_screen {
        Rect::new(full.width.saturating_sub(3), full.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(status_area.x + 1, status_area.y + 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_settings::AppSettings;
    use chrono::{TimeZone, Utc};
    use scoreboard_api::{Bracket, BracketId, Solve, Standing, TopEntry, TopStandings, UserMode};
    use tui::backend::TestBackend;

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app() -> App {
        App::new(AppSettings {
            base_url: "https://ctf.example.com".to_string(),
            mode: UserMode::Teams,
            ..Default::default()
        })
    }

    fn top(name: &str) -> TopStandings {
        TopStandings {
            entries: vec![TopEntry {
                place: "1".into(),
                id: "1".into(),
                name: name.to_string(),
                solves: vec![
                    Solve { date: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()), value: 100 },
                    Solve { date: Some(Utc.with_ymd_and_hms(2024, 3, 1, 14, 0, 0).unwrap()), value: 200 },
                ],
            }],
        }
    }

    #[test]
    fn renders_rows_and_nav() {
        let mut app = app();
        app.on_brackets_loaded(vec![Bracket { id: BracketId(1), name: "Open".into() }]);
        app.on_standings_loaded(vec![Standing {
            name: "rooters".into(),
            account_url: "/teams/1".into(),
            score: 1337,
            bracket_id: Some(BracketId(1)),
            ..Default::default()
        }]);

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        draw(&mut terminal, &mut app, LoadingState::default());

        let text = screen(&terminal);
        assert!(text.contains("rooters"));
        assert!(text.contains("1337"));
        assert!(text.contains("a:All"));
        assert!(text.contains("https://ctf.example.com/teams/1"));
    }

    #[test]
    fn empty_filter_shows_the_empty_state() {
        let mut app = app();
        app.on_brackets_loaded(vec![
            Bracket { id: BracketId(1), name: "Open".into() },
            Bracket { id: BracketId(2), name: "Students".into() },
        ]);
        app.on_standings_loaded(vec![Standing {
            name: "rooters".into(),
            bracket_id: Some(BracketId(1)),
            ..Default::default()
        }]);
        app.select_bracket(Some(BracketId(2)));

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        draw(&mut terminal, &mut app, LoadingState::default());
        assert!(screen(&terminal).contains("No standings for this bracket yet"));
    }

    #[test]
    fn chart_for_the_previous_filter_is_marked_updating() {
        let mut app = app();
        app.on_brackets_loaded(vec![Bracket { id: BracketId(1), name: "Open".into() }]);
        app.on_standings_loaded(vec![Standing {
            name: "rooters".into(),
            bracket_id: Some(BracketId(1)),
            ..Default::default()
        }]);
        app.on_top_loaded(None, top("global-leader"));

        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        draw(&mut terminal, &mut app, LoadingState::default());
        assert!(screen(&terminal).contains("global-leader"));
        assert!(!screen(&terminal).contains("Updating..."));

        app.select_bracket(Some(BracketId(1)));
        draw(&mut terminal, &mut app, LoadingState::default());
        let text = screen(&terminal);
        assert!(text.contains("Updating..."));
        assert!(text.contains("global-leader"));
    }

    #[test]
    fn tiny_terminals_are_not_drawn() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(10, 40)).unwrap();
        draw(&mut terminal, &mut app, LoadingState::default());
        assert!(screen(&terminal).trim().is_empty());
    }
}
