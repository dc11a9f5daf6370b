/// Wire types for the scoreboard REST API.
/// Every endpoint wraps its payload as `{"success": bool, "data": ..., "errors": ...}`.
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize, Debug)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Value>,
}

impl<T> Envelope<T> {
    /// Only an explicit `"success": false` is a failure; a missing flag is not.
    pub fn is_failure(&self) -> bool {
        self.success == Some(false)
    }
}

#[derive(Deserialize, Default, Debug)]
pub struct WireTopEntry {
    /// Accounts are numeric on most deployments but some send strings.
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub solves: Vec<WireSolve>,
}

#[derive(Deserialize, Default, Debug)]
pub struct WireSolve {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub value: Option<i64>,
}

/// Flatten the `errors` member into one message.
///
/// Arrays are joined with `,`, objects (field → messages) contribute their
/// values in order, anything missing or empty becomes "Unknown error".
pub fn error_message(errors: Option<&Value>) -> String {
    let mut parts = Vec::new();
    if let Some(errors) = errors {
        collect_messages(errors, &mut parts);
    }
    if parts.is_empty() {
        "Unknown error".to_string()
    } else {
        parts.join(",")
    }
}

fn collect_messages(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|item| collect_messages(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_messages(item, out)),
        other => out.push(other.to_string()),
    }
}

/// Render an account id the way it appears in the payload: numbers and
/// strings verbatim, nothing for null.
pub fn id_to_string(id: Option<&Value>) -> String {
    match id {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
