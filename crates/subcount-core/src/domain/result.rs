//! Query results delivered through the host channel.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rows returned for one dispatch. Each row is a list of scalars.
///
/// An empty row list means "no data", which is not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn new(data: Vec<Vec<Value>>) -> Self {
        Self { data }
    }

    /// A result carrying exactly one scalar (`[[value]]`).
    pub fn single(value: impl Into<Value>) -> Self {
        Self::new(vec![vec![value.into()]])
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The only value a count query is read for: `data[0][0]`.
    pub fn first_scalar(&self) -> Option<&Value> {
        self.data.first()?.first()
    }
}
