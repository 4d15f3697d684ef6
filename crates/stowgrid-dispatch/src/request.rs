//! Calculation request — the body of one queue delivery.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DispatchResult;

/// Ask for a distribution plan for one supply.
///
/// Identifiers are accepted as JSON strings or integers; upstream
/// producers emit numeric database ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub request_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub supply_id: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub source_warehouse_id: Option<String>,
    #[serde(default)]
    pub initiated_by_user_id: Option<i64>,
    #[serde(default)]
    pub initiated_by_username: Option<String>,
}

impl CalculationRequest {
    pub fn new(request_id: impl Into<String>, supply_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            supply_id: supply_id.into(),
            source_warehouse_id: None,
            initiated_by_user_id: None,
            initiated_by_username: None,
        }
    }

    pub fn from_slice(body: &[u8]) -> DispatchResult<Self> {
        Ok(serde_json::from_slice(body)?)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    RawId::deserialize(d).map(String::from)
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<RawId>::deserialize(d)?.map(String::from))
}
