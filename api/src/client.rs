use crate::wire::{Envelope, WireSolve, WireTopEntry, error_message, id_to_string};
use crate::{Bracket, BracketId, Solve, Standing, TopEntry, TopStandings, UserMode};
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;
use url::Url;

pub type ApiResult<T> = Result<T, ApiError>;

const BRACKETS_PATH: &str = "/api/v1/brackets";
const SCOREBOARD_PATH: &str = "/api/v1/scoreboard";
const TOP_PATH: &str = "/api/v1/scoreboard/top/10";

/// Scoreboard API client rooted at a deployment's base URL.
#[derive(Debug, Clone)]
pub struct ScoreboardApi {
    client: Client,
    base_url: String,
    session: Option<String>,
    timeout: Duration,
}

#[derive(Debug)]
pub enum ApiError {
    /// The request never produced a response.
    Network(reqwest::Error, String),
    /// The server answered with a non-success status.
    Fetch { url: String, status: StatusCode },
    /// The body was not the JSON shape we expected.
    Parsing(String, String),
    /// The envelope reported `"success": false`.
    Api(String),
    InvalidUrl(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Fetch { url, status } => write!(f, "Failed to fetch {url} ({status})"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Api(msg) => write!(f, "API error: {msg}"),
            ApiError::InvalidUrl(msg) => write!(f, "Invalid URL: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ScoreboardApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("scoreboard-tui/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Send `cookie` with every request, as a logged-in browser session would.
    pub fn with_session(mut self, cookie: impl Into<String>) -> Self {
        self.session = Some(cookie.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the brackets (divisions) defined for `mode`.
    pub async fn fetch_brackets(&self, mode: UserMode) -> ApiResult<Vec<Bracket>> {
        let url = brackets_url(&self.base_url, mode)?;
        self.get(url).await
    }

    /// Fetch the full, unfiltered standings, already ordered by rank.
    pub async fn fetch_standings(&self) -> ApiResult<Vec<Standing>> {
        let url = scoreboard_url(&self.base_url)?;
        self.get(url).await
    }

    /// Fetch score-over-time data for the top ten, optionally limited to one bracket.
    pub async fn fetch_top(&self, bracket: Option<BracketId>) -> ApiResult<TopStandings> {
        let url = top_url(&self.base_url, bracket)?;
        let location = url.to_string();
        let raw: Map<String, Value> = self.get(url).await?;
        map_top_standings(raw).map_err(|e| ApiError::Parsing(e, location))
    }

    async fn get<T: Default + DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        let location = url.to_string();
        let mut request = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header(ACCEPT, "application/json");
        if let Some(cookie) = &self.session {
            request = request.header(COOKIE, cookie.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e, location.clone()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Fetch { url: location, status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e, location.clone()))?;
        let envelope: Envelope<T> = serde_json::from_slice(&body)
            .map_err(|e| ApiError::Parsing(e.to_string(), location.clone()))?;

        if envelope.is_failure() {
            return Err(ApiError::Api(error_message(envelope.errors.as_ref())));
        }
        Ok(envelope.data.unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Endpoint URLs
// ---------------------------------------------------------------------------

pub fn brackets_url(base: &str, mode: UserMode) -> ApiResult<Url> {
    let mut url = endpoint(base, BRACKETS_PATH)?;
    url.query_pairs_mut().append_pair("type", mode.as_str());
    Ok(url)
}

pub fn scoreboard_url(base: &str) -> ApiResult<Url> {
    endpoint(base, SCOREBOARD_PATH)
}

/// The `bracket_id` parameter is only present when a bracket is active.
pub fn top_url(base: &str, bracket: Option<BracketId>) -> ApiResult<Url> {
    let mut url = endpoint(base, TOP_PATH)?;
    if let Some(id) = bracket {
        url.query_pairs_mut().append_pair("bracket_id", &id.to_string());
    }
    Ok(url)
}

fn endpoint(base: &str, path: &str) -> ApiResult<Url> {
    let raw = format!("{}{path}", base.trim_end_matches('/'));
    Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
}

// ---------------------------------------------------------------------------
// Mapping: wire types → domain types
// ---------------------------------------------------------------------------

/// Map the top-10 object into entries in the order a browser walks its keys:
/// integer keys ascending, then any other key in payload order. Null entries
/// are skipped.
fn map_top_standings(raw: Map<String, Value>) -> Result<TopStandings, String> {
    let mut keyed: Vec<(String, Value)> = raw.into_iter().filter(|(_, v)| !v.is_null()).collect();
    keyed.sort_by_key(|(place, _)| match array_index(place) {
        Some(index) => (0, index),
        None => (1, 0),
    });

    let mut entries = Vec::with_capacity(keyed.len());
    for (place, value) in keyed {
        let wire: WireTopEntry =
            serde_json::from_value(value).map_err(|e| format!("entry {place}: {e}"))?;
        entries.push(map_top_entry(place, wire));
    }
    Ok(TopStandings { entries })
}

/// Canonical decimal below 2^32 - 1, with no sign and no leading zeros.
fn array_index(key: &str) -> Option<u32> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<u32>().ok().filter(|i| *i != u32::MAX)
}

fn map_top_entry(place: String, wire: WireTopEntry) -> TopEntry {
    TopEntry {
        place,
        id: id_to_string(wire.id.as_ref()),
        name: wire.name,
        solves: wire.solves.into_iter().map(map_solve).collect(),
    }
}

fn map_solve(wire: WireSolve) -> Solve {
    Solve {
        date: wire.date.as_deref().and_then(parse_solve_date),
        value: wire.value.unwrap_or(0),
    }
}

/// Accept RFC 3339 timestamps, and naive ISO timestamps which are taken as UTC.
pub fn parse_solve_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::Matcher;

    const JSON: &str = "application/json";

    #[test]
    fn brackets_url_always_carries_the_mode() {
        let url = brackets_url("https://ctf.example.com/", UserMode::Teams).unwrap();
        assert_eq!(url.as_str(), "https://ctf.example.com/api/v1/brackets?type=teams");
    }

    #[test]
    fn top_url_only_filters_when_a_bracket_is_active() {
        let all = top_url("https://ctf.example.com", None).unwrap();
        assert_eq!(all.as_str(), "https://ctf.example.com/api/v1/scoreboard/top/10");

        let filtered = top_url("https://ctf.example.com", Some(BracketId(3))).unwrap();
        assert_eq!(
            filtered.as_str(),
            "https://ctf.example.com/api/v1/scoreboard/top/10?bracket_id=3"
        );
    }

    #[test]
    fn endpoints_keep_the_url_root_prefix() {
        let url = scoreboard_url("https://example.com/ctf").unwrap();
        assert_eq!(url.as_str(), "https://example.com/ctf/api/v1/scoreboard");
    }

    #[test]
    fn invalid_base_is_reported() {
        let err = scoreboard_url("not a url").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn solve_dates_accept_rfc3339_and_naive_iso() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_solve_date("2024-03-01T10:00:00Z"), Some(expected));
        assert_eq!(parse_solve_date("2024-03-01T12:00:00+02:00"), Some(expected));
        assert_eq!(parse_solve_date("2024-03-01T10:00:00"), Some(expected));
        assert!(parse_solve_date("2024-03-01T10:00:00.250000").is_some());
        assert_eq!(parse_solve_date("yesterday"), None);
    }

    #[test]
    fn error_messages_are_flattened() {
        let arr = serde_json::json!(["first", "second"]);
        assert_eq!(error_message(Some(&arr)), "first,second");

        let obj = serde_json::json!({"bracket_id": ["is invalid"], "type": "bad"});
        assert_eq!(error_message(Some(&obj)), "is invalid,bad");

        assert_eq!(error_message(None), "Unknown error");
        assert_eq!(error_message(Some(&serde_json::json!([]))), "Unknown error");
    }

    #[tokio::test]
    async fn fetch_standings_unwraps_the_envelope() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/scoreboard")
            .match_header("accept", JSON)
            .with_status(200)
            .with_header("content-type", JSON)
            .with_body(
                r#"{"success": true, "data": [
                    {"pos": 1, "account_id": 7, "account_url": "/teams/7", "name": "rooters",
                     "oauth_id": 99, "score": 1200, "bracket_id": 2, "bracket_name": "Students"},
                    {"pos": 2, "account_id": 3, "account_url": "/teams/3", "name": "null ptrs",
                     "oauth_id": null, "score": 900, "bracket_id": null}
                ]}"#,
            )
            .create_async()
            .await;

        let api = ScoreboardApi::new(server.url());
        let standings = api.fetch_standings().await.unwrap();
        mock.assert_async().await;

        assert_eq!(standings.len(), 2);
        assert_eq!(standings[0].name, "rooters");
        assert_eq!(standings[0].bracket_id, Some(BracketId(2)));
        assert!(standings[0].is_official());
        assert_eq!(standings[1].bracket_id, None);
        assert!(!standings[1].is_official());
    }

    #[tokio::test]
    async fn fetch_brackets_sends_mode_and_session() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/brackets")
            .match_query(Matcher::UrlEncoded("type".into(), "teams".into()))
            .match_header("cookie", "session=abc")
            .with_status(200)
            .with_header("content-type", JSON)
            .with_body(r#"{"success": true, "data": [{"id": 1, "name": "Open"}, {"id": 2, "name": "Students"}]}"#)
            .create_async()
            .await;

        let api = ScoreboardApi::new(server.url()).with_session("session=abc");
        let brackets = api.fetch_brackets(UserMode::Teams).await.unwrap();
        mock.assert_async().await;

        assert_eq!(
            brackets,
            vec![
                Bracket { id: BracketId(1), name: "Open".into() },
                Bracket { id: BracketId(2), name: "Students".into() },
            ]
        );
    }

    #[tokio::test]
    async fn null_data_is_an_empty_list() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/scoreboard")
            .with_status(200)
            .with_header("content-type", JSON)
            .with_body(r#"{"success": true, "data": null}"#)
            .create_async()
            .await;

        let api = ScoreboardApi::new(server.url());
        assert!(api.fetch_standings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_error_naming_the_url() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/scoreboard")
            .with_status(503)
            .create_async()
            .await;

        let api = ScoreboardApi::new(server.url());
        let err = api.fetch_standings().await.unwrap_err();
        match &err {
            ApiError::Fetch { url, status } => {
                assert!(url.ends_with("/api/v1/scoreboard"));
                assert_eq!(*status, StatusCode::SERVICE_UNAVAILABLE);
            }
            other => panic!("expected fetch error, got {other:?}"),
        }
        assert!(err.to_string().starts_with("Failed to fetch "));
    }

    #[tokio::test]
    async fn explicit_failure_carries_server_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/brackets")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", JSON)
            .with_body(r#"{"success": false, "errors": ["Scoreboard is hidden", "try later"]}"#)
            .create_async()
            .await;

        let api = ScoreboardApi::new(server.url());
        let err = api.fetch_brackets(UserMode::Users).await.unwrap_err();
        match err {
            ApiError::Api(msg) => assert_eq!(msg, "Scoreboard is hidden,try later"),
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn garbage_body_is_a_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/scoreboard")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let api = ScoreboardApi::new(server.url());
        let err = api.fetch_standings().await.unwrap_err();
        assert!(matches!(err, ApiError::Parsing(_, _)));
    }

    #[tokio::test]
    async fn fetch_top_preserves_payload_order_and_defaults() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/scoreboard/top/10")
            .match_query(Matcher::UrlEncoded("bracket_id".into(), "4".into()))
            .with_status(200)
            .with_header("content-type", JSON)
            .with_body(
                r#"{"success": true, "data": {
                    "2": {"id": 11, "name": "beta", "solves": [
                        {"date": "2024-03-01T10:00:00Z", "value": 100},
                        {"date": "2024-03-01T11:00:00Z"}
                    ]},
                    "1": {"id": "alpha-id", "name": "alpha", "solves": []},
                    "3": null
                }}"#,
            )
            .create_async()
            .await;

        let api = ScoreboardApi::new(server.url());
        let top = api.fetch_top(Some(BracketId(4))).await.unwrap();
        mock.assert_async().await;

        let places: Vec<_> = top.entries.iter().map(|e| e.place.as_str()).collect();
        assert_eq!(places, vec!["1", "2"]);
        assert_eq!(top.entries[0].id, "alpha-id");
        assert_eq!(top.entries[1].id, "11");
        assert_eq!(top.entries[1].solves[1].value, 0);
        assert!(top.entries[1].solves[0].date.is_some());
    }

    #[test]
    fn top_places_sort_numerically_before_other_keys() {
        let raw = serde_json::json!({
            "10": {"id": 10, "name": "ten", "solves": []},
            "x": {"id": 99, "name": "named", "solves": []},
            "2": {"id": 2, "name": "two", "solves": []},
            "01": {"id": 1, "name": "padded", "solves": []},
            "1": {"id": 1, "name": "one", "solves": []}
        });
        let Value::Object(raw) = raw else { unreachable!() };

        let top = map_top_standings(raw).unwrap();
        let names: Vec<_> = top.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two", "ten", "named", "padded"]);
    }

    #[tokio::test]
    async fn empty_top_object_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/scoreboard/top/10")
            .with_status(200)
            .with_header("content-type", JSON)
            .with_body(r#"{"success": true, "data": {}}"#)
            .create_async()
            .await;

        let api = ScoreboardApi::new(server.url());
        assert!(api.fetch_top(None).await.unwrap().is_empty());
    }
}
