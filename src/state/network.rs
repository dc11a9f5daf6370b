use crate::state::messages::{NetworkRequest, NetworkResponse};
use log::{debug, error};
use scoreboard_api::client::{ApiResult, ScoreboardApi};
use scoreboard_api::{BracketId, UserMode};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Runs requests one at a time, in the order they were queued, so a later
/// refresh can never be overwritten by an earlier one finishing late.
pub struct NetworkWorker {
    client: ScoreboardApi,
    mode: UserMode,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        client: ScoreboardApi,
        mode: UserMode,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            mode,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            let spinner = request.shows_spinner();
            if spinner {
                self.start_loading_animation().await;
            }

            let results = match request {
                NetworkRequest::LoadInitial => self.handle_load_initial().await,
                NetworkRequest::LoadStandings => vec![self.handle_load_standings().await],
                NetworkRequest::RefreshChart { bracket } => vec![self.handle_refresh_chart(bracket).await],
            };

            debug!("network request complete");
            if spinner {
                let is_ok = !results.iter().any(NetworkResponse::is_error);
                self.stop_loading_animation(is_ok).await;
            }

            for response in results {
                if let Err(e) = self.responses.send(response).await {
                    error!("Failed to send network response: {e}");
                    return;
                }
            }
        }
    }

    async fn handle_load_initial(&self) -> Vec<NetworkResponse> {
        debug!("loading brackets ({}) and standings", self.mode);
        let (brackets, standings) =
            tokio::join!(self.client.fetch_brackets(self.mode), self.client.fetch_standings());
        vec![
            into_response(brackets, |brackets| NetworkResponse::BracketsLoaded { brackets }),
            into_response(standings, |standings| NetworkResponse::StandingsLoaded { standings }),
            NetworkResponse::InitialLoadFinished,
        ]
    }

    async fn handle_load_standings(&self) -> NetworkResponse {
        debug!("refreshing standings");
        into_response(self.client.fetch_standings().await, |standings| {
            NetworkResponse::StandingsLoaded { standings }
        })
    }

    async fn handle_refresh_chart(&self, bracket: Option<BracketId>) -> NetworkResponse {
        debug!("loading top 10 for bracket {bracket:?}");
        match self.client.fetch_top(bracket).await {
            Ok(top) => NetworkResponse::TopLoaded { bracket, top },
            Err(e) => NetworkResponse::ChartFailed { bracket, message: e.to_string() },
        }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    /// Always runs after a spinner request, whatever the outcome.
    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

fn into_response<T>(result: ApiResult<T>, ok: impl FnOnce(T) -> NetworkResponse) -> NetworkResponse {
    result
        .map(ok)
        .unwrap_or_else(|err| NetworkResponse::Error { message: err.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn serve(body: &'static str, path: &'static str) -> (mockito::ServerGuard, mockito::Mock) {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", path)
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        (server, mock)
    }

    async fn run_one(server_url: String, request: NetworkRequest) -> Vec<NetworkResponse> {
        let (req_tx, req_rx) = mpsc::channel(4);
        let (resp_tx, mut resp_rx) = mpsc::channel(64);
        let worker = NetworkWorker::new(ScoreboardApi::new(server_url), UserMode::Teams, req_rx, resp_tx);
        let task = tokio::spawn(worker.run());
        req_tx.send(request).await.unwrap();
        drop(req_tx);
        task.await.unwrap();

        let mut out = Vec::new();
        while let Ok(response) = resp_rx.try_recv() {
            if !matches!(response, NetworkResponse::LoadingStateChanged { .. }) {
                out.push(response);
            }
        }
        out
    }

    #[tokio::test]
    async fn initial_load_reports_each_loader_then_finishes() {
        let mut server = mockito::Server::new_async().await;
        let _brackets = server
            .mock("GET", "/api/v1/brackets")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;
        let _standings = server
            .mock("GET", "/api/v1/scoreboard")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "data": [{"name": "rooters", "score": 10}]}"#)
            .create_async()
            .await;

        let responses = run_one(server.url(), NetworkRequest::LoadInitial).await;
        assert_eq!(responses.len(), 3);
        assert!(matches!(responses[0], NetworkResponse::Error { .. }));
        assert!(matches!(&responses[1], NetworkResponse::StandingsLoaded { standings } if standings.len() == 1));
        assert!(matches!(responses[2], NetworkResponse::InitialLoadFinished));
    }

    #[tokio::test]
    async fn chart_refresh_is_tagged_with_its_filter() {
        let (server, _mock) = serve(r#"{"success": true, "data": {}}"#, "/api/v1/scoreboard/top/10").await;
        let responses =
            run_one(server.url(), NetworkRequest::RefreshChart { bracket: Some(BracketId(2)) }).await;
        assert!(matches!(
            &responses[..],
            [NetworkResponse::TopLoaded { bracket: Some(BracketId(2)), top }] if top.is_empty()
        ));
    }

    #[tokio::test]
    async fn chart_failure_is_reported_as_chart_failed() {
        let (server, _mock) = serve(r#"{"success": false, "errors": ["nope"]}"#, "/api/v1/scoreboard/top/10").await;
        let responses = run_one(server.url(), NetworkRequest::RefreshChart { bracket: None }).await;
        assert!(matches!(
            &responses[..],
            [NetworkResponse::ChartFailed { bracket: None, message }] if message.contains("nope")
        ));
    }

    #[tokio::test]
    async fn spinner_is_always_cleared_after_a_chart_request() {
        let (server, _mock) = serve(r#"{"success": false}"#, "/api/v1/scoreboard/top/10").await;
        let (req_tx, req_rx) = mpsc::channel(4);
        let (resp_tx, mut resp_rx) = mpsc::channel(256);
        let worker = NetworkWorker::new(ScoreboardApi::new(server.url()), UserMode::Users, req_rx, resp_tx);
        let task = tokio::spawn(worker.run());
        req_tx.send(NetworkRequest::RefreshChart { bracket: None }).await.unwrap();
        drop(req_tx);
        task.await.unwrap();

        let mut last_loading = None;
        while let Ok(response) = resp_rx.try_recv() {
            if let NetworkResponse::LoadingStateChanged { loading_state } = response {
                last_loading = Some(loading_state);
            }
        }
        let last = last_loading.expect("spinner state was reported");
        assert!(!last.is_loading);
        assert_eq!(last.spinner_char, ERROR_CHAR);
    }
}
