use crate::chart::ScoreChart;
use crate::chart::option::build_chart_option;
use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use chrono::Local;
use log::{debug, error, info};
use scoreboard_api::{Bracket, BracketId, Standing, TopStandings};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Scoreboard,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            state: AppState::new(),
            settings,
        }
    }

    // -----------------------------------------------------------------------
    // Network response handlers — called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_brackets_loaded(&mut self, brackets: Vec<Bracket>) {
        info!("loaded {} brackets", brackets.len());
        if self.state.scoreboard.replace_brackets(brackets) {
            info!("active bracket no longer exists, showing all");
        }
    }

    pub fn on_standings_loaded(&mut self, standings: Vec<Standing>) {
        debug!("loaded {} standings", standings.len());
        self.state.scoreboard.replace_standings(standings);
        self.state.last_updated = Some(Local::now().format("%H:%M:%S").to_string());
    }

    /// Replace the chart with `top`, unless the filter changed since it was
    /// requested.
    pub fn on_top_loaded(&mut self, bracket: Option<BracketId>, top: TopStandings) {
        if bracket != self.state.scoreboard.active_bracket {
            debug!("discarding top 10 for stale filter {bracket:?}");
            return;
        }
        if top.is_empty() {
            self.state.chart.hide_and_clear();
            return;
        }

        let option = build_chart_option(self.settings.mode, &top, self.settings.chart_overrides.as_ref());
        self.state.chart.visible = true;
        self.state.chart.shown_bracket = bracket;
        self.state
            .chart
            .chart
            .get_or_insert_with(ScoreChart::new)
            .set_option(option);
    }

    /// True while the visible chart still shows a filter other than the
    /// active one, until its refresh lands.
    pub fn chart_is_pending(&self) -> bool {
        self.state.chart.visible && self.state.chart.shown_bracket != self.state.scoreboard.active_bracket
    }

    pub fn on_chart_failed(&mut self, bracket: Option<BracketId>, message: String) {
        error!("Failed to refresh chart: {message}");
        if bracket != self.state.scoreboard.active_bracket {
            return;
        }
        self.state.chart.hide_and_clear();
    }

    pub fn on_error(&mut self, message: String) {
        error!("Network error: {message}");
    }

    // -----------------------------------------------------------------------
    // Bracket filter — each returns true when the filter actually changed,
    // which is the caller's cue to refresh the chart.
    // -----------------------------------------------------------------------

    pub fn active_bracket(&self) -> Option<BracketId> {
        self.state.scoreboard.active_bracket
    }

    pub fn select_bracket(&mut self, value: Option<BracketId>) -> bool {
        self.state.scoreboard.set_active_bracket(value)
    }

    pub fn select_nav_index(&mut self, index: usize) -> bool {
        match self.state.scoreboard.nav_value(index) {
            Some(value) => self.select_bracket(value),
            None => false,
        }
    }

    pub fn step_bracket(&mut self, delta: isize) -> bool {
        let next = self.state.scoreboard.step_nav(delta);
        self.select_bracket(next)
    }

    // -----------------------------------------------------------------------
    // Table and chart navigation
    // -----------------------------------------------------------------------

    pub fn select_next_row(&mut self) {
        self.state.scoreboard.select_next_row();
    }

    pub fn select_prev_row(&mut self) {
        self.state.scoreboard.select_prev_row();
    }

    pub fn with_chart(&mut self, f: impl FnOnce(&mut ScoreChart)) {
        if let Some(chart) = self.state.chart.chart.as_mut() {
            f(chart);
        }
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }
}
