use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use scoreboard_api::{Bracket, BracketId, Standing, TopStandings};

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    /// Brackets and standings together, fetched concurrently.
    LoadInitial,
    LoadStandings,
    RefreshChart { bracket: Option<BracketId> },
}

impl NetworkRequest {
    pub fn shows_spinner(&self) -> bool {
        matches!(self, NetworkRequest::RefreshChart { .. })
    }
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    BracketsLoaded { brackets: Vec<Bracket> },
    StandingsLoaded { standings: Vec<Standing> },
    /// Both initial loads have settled, successfully or not.
    InitialLoadFinished,
    /// `bracket` is the filter the chart was requested for.
    TopLoaded { bracket: Option<BracketId>, top: TopStandings },
    ChartFailed { bracket: Option<BracketId>, message: String },
    Error { message: String },
}

impl NetworkResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, NetworkResponse::ChartFailed { .. } | NetworkResponse::Error { .. })
    }
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    RefreshTick,
}
