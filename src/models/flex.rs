//! Lenient deserializers for wallet API payloads.
//!
//! The wallet API serializes decimals as strings ("100.00") on some
//! endpoints and as numbers on others, and occasionally sends `null`.
//! These helpers accept all three shapes and fall back to zero or `None`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn value_to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|x| x.is_finite())
}

pub fn f64_or_zero<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(value_to_f64(&v).unwrap_or(0.0))
}

pub fn i64_or_zero<'de, D>(de: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(value_to_f64(&v).map(|x| x.round() as i64).unwrap_or(0))
}

/// Ids arrive as numbers or strings depending on the endpoint.
pub fn string_or_number<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(match v {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

pub fn opt_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(match v {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// List endpoints answer with either a bare array or a paginated
/// `{"results": [...]}` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListOrPage<T> {
    List(Vec<T>),
    Page {
        #[serde(default = "Vec::new")]
        results: Vec<T>,
    },
}

impl<T> ListOrPage<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListOrPage::List(v) => v,
            ListOrPage::Page { results } => results,
        }
    }
}
