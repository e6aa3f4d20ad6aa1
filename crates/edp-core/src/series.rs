//! Bracketed list literals used for the `series` cell of stacked files,
//! e.g. `[1.0, 2.5, nan]`.

use serde::{Deserialize, Deserializer, Serializer};

use crate::error::{EdpError, EdpResult};

pub fn encode_series(values: &[f64]) -> String {
    let mut out = String::with_capacity(values.len() * 6 + 2);
    out.push('[');
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if value.is_nan() {
            out.push_str("nan");
        } else {
            // Debug keeps the shortest representation that parses back exactly.
            out.push_str(&format!("{value:?}"));
        }
    }
    out.push(']');
    out
}

pub fn decode_series(literal: &str) -> EdpResult<Vec<f64>> {
    let trimmed = literal.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| {
            EdpError::Parse(format!(
                "series literal must be enclosed in brackets: '{}'",
                abbreviate(trimmed)
            ))
        })?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(|item| parse_value(item.trim()))
        .collect()
}

fn parse_value(item: &str) -> EdpResult<f64> {
    match item {
        "nan" | "NaN" | "None" => Ok(f64::NAN),
        _ => item
            .parse::<f64>()
            .map_err(|err| EdpError::Parse(format!("invalid series value '{item}': {err}"))),
    }
}

fn abbreviate(value: &str) -> String {
    const LIMIT: usize = 40;
    if value.chars().count() <= LIMIT {
        value.to_string()
    } else {
        let head: String = value.chars().take(LIMIT).collect();
        format!("{head}...")
    }
}

/// Serde adapter for the `series` cell.
pub mod series_cell {
    use super::*;

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode_series(values))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        decode_series(&raw).map_err(serde::de::Error::custom)
    }
}
