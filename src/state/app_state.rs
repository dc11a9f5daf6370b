use crate::app::MenuItem;
use crate::chart::ScoreChart;
use scoreboard_api::{Bracket, BracketId, Standing};

// ---------------------------------------------------------------------------
// Standings / bracket filter state
// ---------------------------------------------------------------------------

/// Everything the table and the nav render from. The single active filter is
/// shared by the table and the chart.
#[derive(Debug, Default)]
pub struct ScoreboardState {
    pub standings: Vec<Standing>,
    pub brackets: Vec<Bracket>,
    /// `None` is the "All" pseudo-bracket.
    pub active_bracket: Option<BracketId>,
    /// True once standings have been received at least once.
    pub standings_loaded: bool,
    /// Selected row within the filtered table.
    pub selected_row: usize,
}

impl ScoreboardState {
    /// Replace the bracket list. Returns true when the active bracket
    /// disappeared and the filter was reset to "All".
    pub fn replace_brackets(&mut self, brackets: Vec<Bracket>) -> bool {
        self.brackets = brackets;
        let Some(active) = self.active_bracket else {
            return false;
        };
        if self.brackets.iter().any(|b| b.id == active) {
            return false;
        }
        self.active_bracket = None;
        self.selected_row = 0;
        true
    }

    pub fn replace_standings(&mut self, standings: Vec<Standing>) {
        self.standings = standings;
        self.standings_loaded = true;
        self.clamp_selection();
    }

    /// Returns false, and changes nothing, when `value` is already active.
    pub fn set_active_bracket(&mut self, value: Option<BracketId>) -> bool {
        if value == self.active_bracket {
            return false;
        }
        self.active_bracket = value;
        self.selected_row = 0;
        true
    }

    /// Standings matching the active filter, in API order.
    pub fn filtered(&self) -> Vec<&Standing> {
        filter_standings(&self.standings, self.active_bracket)
    }

    /// Filter values in nav order: "All" first, then each bracket.
    pub fn nav_values(&self) -> Vec<Option<BracketId>> {
        std::iter::once(None)
            .chain(self.brackets.iter().map(|b| Some(b.id)))
            .collect()
    }

    /// The nav value `delta` steps away from the active one, wrapping.
    pub fn step_nav(&self, delta: isize) -> Option<BracketId> {
        let values = self.nav_values();
        let current = values
            .iter()
            .position(|v| *v == self.active_bracket)
            .unwrap_or(0) as isize;
        let len = values.len() as isize;
        values[(current + delta).rem_euclid(len) as usize]
    }

    /// The n-th nav button's value, if there is such a button.
    pub fn nav_value(&self, index: usize) -> Option<Option<BracketId>> {
        self.nav_values().get(index).copied()
    }

    pub fn select_next_row(&mut self) {
        let max = self.filtered().len().saturating_sub(1);
        self.selected_row = (self.selected_row + 1).min(max);
    }

    pub fn select_prev_row(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let max = self.filtered().len().saturating_sub(1);
        self.selected_row = self.selected_row.min(max);
    }
}

/// Exact id match, or everything when unfiltered. Order is preserved.
pub fn filter_standings(standings: &[Standing], active: Option<BracketId>) -> Vec<&Standing> {
    match active {
        Some(id) => standings.iter().filter(|s| s.bracket_id == Some(id)).collect(),
        None => standings.iter().collect(),
    }
}

// ---------------------------------------------------------------------------
// Chart area state
// ---------------------------------------------------------------------------

/// The chart area is either hidden, or visible with a chart. The instance is
/// created lazily and then kept for the rest of the session.
#[derive(Debug, Default)]
pub struct ChartPaneState {
    pub visible: bool,
    pub chart: Option<ScoreChart>,
    /// Filter the plotted data was fetched for.
    pub shown_bracket: Option<BracketId>,
}

impl ChartPaneState {
    pub fn hide_and_clear(&mut self) {
        if let Some(chart) = &mut self.chart {
            chart.clear();
        }
        self.visible = false;
    }
}

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    /// Local time of the last successful standings load.
    pub last_updated: Option<String>,
    pub scoreboard: ScoreboardState,
    pub chart: ChartPaneState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
