use tui::layout::{Constraint, Layout, Rect, Size};
pub const TAB_BAR_HEIGHT: u16 = 3;
pub const NAV_HEIGHT: u16 = 3;
pub const DETAILS_HEIGHT: u16 = 1;
pub const LOG_PANE_HEIGHT: u16 = 8;

/// Pre-computed layout areas for the main draw loop.
pub struct LayoutAreas {
    pub tab_bar: [Rect; 2],
    pub main: Rect,
    pub logs: Rect,
}

impl LayoutAreas {
    pub fn new(size: Size) -> Self {
        let rect = Rect::new(0, 0, size.width, size.height);
        Self::from_rect(rect, false, false)
    }

    pub fn update(&mut self, area: Rect, full_screen: bool, show_logs: bool) {
        *self = Self::from_rect(area, full_screen, show_logs);
    }

    fn from_rect(area: Rect, full_screen: bool, show_logs: bool) -> Self {
        let log_height = if show_logs { LOG_PANE_HEIGHT } else { 0 };

        if full_screen {
            let [main, logs] =
                Layout::vertical([Constraint::Fill(1), Constraint::Length(log_height)]).areas(area);
            return LayoutAreas {
                tab_bar: [Rect::ZERO, Rect::ZERO],
                main,
                logs,
            };
        }

        let [tab, main, logs] = Layout::vertical([
            Constraint::Length(TAB_BAR_HEIGHT),
            Constraint::Fill(1),
            Constraint::Length(log_height),
        ])
        .areas(area);

        LayoutAreas {
            tab_bar: Self::split_tab_bar(tab),
            main,
            logs,
        }
    }

    fn split_tab_bar(area: Rect) -> [Rect; 2] {
        Layout::horizontal([Constraint::Percentage(70), Constraint::Percentage(30)]).areas(area)
    }
}

/// The scoreboard page: bracket nav, the table with a details line under it,
/// and the chart beside (wide terminals) or below (narrow ones) the table.
pub struct ScoreboardAreas {
    pub nav: Rect,
    pub table: Rect,
    pub details: Rect,
    pub chart: Rect,
}

impl ScoreboardAreas {
    pub const SIDE_BY_SIDE_MIN_WIDTH: u16 = 120;

    pub fn new(area: Rect, show_nav: bool, show_chart: bool) -> Self {
        let nav_height = if show_nav { NAV_HEIGHT } else { 0 };
        let [nav, body] =
            Layout::vertical([Constraint::Length(nav_height), Constraint::Fill(1)]).areas(area);

        let (standings, chart) = if !show_chart {
            (body, Rect::ZERO)
        } else if body.width >= Self::SIDE_BY_SIDE_MIN_WIDTH {
            let [standings, chart] =
                Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(body);
            (standings, chart)
        } else {
            let [standings, chart] =
                Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(body);
            (standings, chart)
        };

        let [table, details] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(DETAILS_HEIGHT)]).areas(standings);

        Self { nav, table, details, chart }
    }
}
