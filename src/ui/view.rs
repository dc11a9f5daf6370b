//! Declarative views: plain data built from state, rendered by `draw`.

use crate::state::app_state::ScoreboardState;
use scoreboard_api::{BracketId, Standing, UserMode};
use url::Url;

const PROFILE_HOST: &str = "https://majorleaguecyber.org/";

#[derive(Debug, Clone, PartialEq)]
pub struct StandingRow {
    /// 1-based position within the filtered view.
    pub position: usize,
    pub name: String,
    pub account_url: Option<String>,
    pub bracket_badge: Option<String>,
    /// Present for accounts carrying the "Official" badge.
    pub official_url: Option<String>,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StandingsView {
    /// Nothing received yet.
    Loading,
    /// Received, but no rows for the active filter: show the empty state.
    Empty,
    Table(Vec<StandingRow>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavButton {
    pub label: String,
    pub value: Option<BracketId>,
    pub active: bool,
}

pub fn standings_view(state: &ScoreboardState, mode: UserMode, base_url: &str) -> StandingsView {
    if !state.standings_loaded {
        return StandingsView::Loading;
    }
    let filtered = state.filtered();
    if filtered.is_empty() {
        return StandingsView::Empty;
    }
    StandingsView::Table(
        filtered
            .into_iter()
            .enumerate()
            .map(|(index, standing)| standing_row(index + 1, standing, mode, base_url))
            .collect(),
    )
}

fn standing_row(position: usize, standing: &Standing, mode: UserMode, base_url: &str) -> StandingRow {
    StandingRow {
        position,
        name: standing.name.clone(),
        account_url: resolve_link(base_url, &standing.account_url),
        bracket_badge: standing.bracket_name.clone().filter(|n| !n.is_empty()),
        official_url: standing
            .is_official()
            .then(|| official_profile_url(mode, &standing.name))
            .flatten(),
        score: standing.score,
    }
}

/// `None` when the nav should be hidden: no brackets, or no standings at all.
pub fn nav_view(state: &ScoreboardState) -> Option<Vec<NavButton>> {
    if state.brackets.is_empty() || state.standings.is_empty() {
        return None;
    }
    let all = NavButton {
        label: "All".to_string(),
        value: None,
        active: state.active_bracket.is_none(),
    };
    let buttons = std::iter::once(all)
        .chain(state.brackets.iter().map(|b| NavButton {
            label: b.name.clone(),
            value: Some(b.id),
            active: state.active_bracket == Some(b.id),
        }))
        .collect();
    Some(buttons)
}

/// Resolve an account link the way a browser resolves an `href` on the page.
pub fn resolve_link(base_url: &str, href: &str) -> Option<String> {
    if href.is_empty() {
        return None;
    }
    let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/'))).ok()?;
    base.join(href).ok().map(String::from)
}

/// External profile page: `/t/<team>` or `/u/<user>`, name percent-encoded.
pub fn official_profile_url(mode: UserMode, name: &str) -> Option<String> {
    let mut url = Url::parse(PROFILE_HOST).ok()?;
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .push(mode.profile_segment())
        .push(name);
    Some(url.into())
}
