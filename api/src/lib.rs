pub mod client;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Domain types — clean model, independent of the JSON envelope
// ---------------------------------------------------------------------------

/// Whether the competition ranks individual users or teams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserMode {
    #[default]
    Users,
    Teams,
}

impl UserMode {
    /// Value sent as the `type` query parameter of the brackets endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserMode::Users => "users",
            UserMode::Teams => "teams",
        }
    }

    /// Plural noun used in titles ("Top 10 Teams").
    pub fn noun(&self) -> &'static str {
        match self {
            UserMode::Users => "Users",
            UserMode::Teams => "Teams",
        }
    }

    /// Path segment of the external profile page: `/t/<name>` or `/u/<name>`.
    pub fn profile_segment(&self) -> &'static str {
        match self {
            UserMode::Users => "u",
            UserMode::Teams => "t",
        }
    }
}

impl FromStr for UserMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "users" | "user" => Ok(UserMode::Users),
            "teams" | "team" => Ok(UserMode::Teams),
            other => Err(format!("unknown competitor mode '{other}' (expected users or teams)")),
        }
    }
}

impl fmt::Display for UserMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BracketId(pub u64);

impl fmt::Display for BracketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A competition division. The "All" pseudo-bracket is `None` wherever an
/// `Option<BracketId>` is used as a filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub id: BracketId,
    pub name: String,
}

/// One row of the scoreboard. Rank is implicit in the order the API returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    #[serde(default)]
    pub pos: Option<u32>,
    #[serde(default)]
    pub account_id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub account_url: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub bracket_id: Option<BracketId>,
    #[serde(default)]
    pub bracket_name: Option<String>,
    #[serde(default)]
    pub oauth_id: Option<u64>,
}

impl Standing {
    /// Accounts linked through the external identity provider get an "Official" badge.
    pub fn is_official(&self) -> bool {
        matches!(self.oauth_id, Some(id) if id != 0)
    }
}

/// Score-over-time data for the leading entries, in the order the API listed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopStandings {
    pub entries: Vec<TopEntry>,
}

impl TopStandings {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopEntry {
    /// Key of the entry in the response object (the place, "1".."10").
    pub place: String,
    pub id: String,
    pub name: String,
    pub solves: Vec<Solve>,
}

/// A single score event. `value` is a delta, not a running total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Solve {
    /// `None` when the server sent a timestamp that could not be parsed.
    pub date: Option<DateTime<Utc>>,
    pub value: i64,
}
