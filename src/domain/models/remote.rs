//! Entities as reported by the PERF API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::command::DataSourceKind;

/// A PERF project (node).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerfProject {
    pub id: i64,
    pub name: String,
}

/// A data source as it currently exists in PERF.
///
/// Always re-read before diffing; never cached across reconciliations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteDataSource {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_source_type: String,
    #[serde(default, deserialize_with = "deserialize_active")]
    pub active: bool,
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl RemoteDataSource {
    /// Kind parsed from the remote type, ignoring case.
    pub fn kind(&self) -> Option<DataSourceKind> {
        DataSourceKind::from_remote_type(&self.data_source_type)
    }

    /// String entries of the list stored under `field`, in remote order.
    ///
    /// Missing fields and non-string entries are ignored.
    pub fn identifiers(&self, field: &str) -> Vec<String> {
        self.config
            .get(field)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

// Older PERF releases report `active` as a string.
fn deserialize_active<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::String(s) => Ok(s.eq_ignore_ascii_case("true")),
        Value::Null => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid value for active: {other}"
        ))),
    }
}
