//! Count formatting for the subscriptions tiles.
//!
//! A count is displayed either as a two-character, zero-padded string (values
//! below ten) or as the scalar the backend returned. The asymmetry is part of
//! the display contract: `7` becomes `"07"` but `12` stays the number `12`.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A value shown in one of the count tiles (`string | number`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayCount {
    Number(Number),
    Text(String),
    /// Non-numeric scalar handed back by the backend, shown as-is.
    Raw(Value),
}

impl Default for DisplayCount {
    fn default() -> Self {
        Self::Number(Number::from(0))
    }
}

impl std::fmt::Display for DisplayCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Raw(v) => write!(f, "{v}"),
        }
    }
}

/// Format the first scalar of a count query.
///
/// Values whose numeric reading is below ten are rendered as the last two
/// characters of `"0" + value`. Everything else passes through unchanged.
/// Numeric strings (`"7"`) are compared numerically; other scalars never pad.
pub fn format_count(value: &Value) -> DisplayCount {
    let numeric = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    if let Some(x) = numeric
        && x < 10.0
    {
        return DisplayCount::Text(last_two_chars(&format!("0{}", scalar_text(value))));
    }

    match value {
        Value::Number(n) => DisplayCount::Number(n.clone()),
        Value::String(s) => DisplayCount::Text(s.clone()),
        other => DisplayCount::Raw(other.clone()),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                // f64 Display drops a trailing ".0" (7.0 -> "7")
                n.as_f64().map(|f| f.to_string()).unwrap_or_default()
            }
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn last_two_chars(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let start = chars.len().saturating_sub(2);
    chars[start..].iter().collect()
}
