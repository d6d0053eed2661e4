//! Lenient numeric input.
//!
//! HTML form fields reach the server as either JSON numbers or numeric
//! strings (`"100"`). Both are accepted. An empty string or `null` counts as
//! an omitted field, while `0` and `"0"` are real values.
//!
//! ```ignore
//! #[serde(default, deserialize_with = "farm_types::amount::deserialize_opt")]
//! purchase_weight: Option<f64>,
//! ```

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

/// Deserialize an optional amount from a number, numeric string, or null.
pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawAmount>::deserialize(deserializer)?;
    let value = match raw {
        None => return Ok(None),
        Some(RawAmount::Number(n)) => n,
        Some(RawAmount::Text(s)) if s.trim().is_empty() => return Ok(None),
        Some(RawAmount::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid number: {s:?}")))?,
    };
    if !value.is_finite() {
        return Err(serde::de::Error::custom("number must be finite"));
    }
    Ok(Some(value))
}
