//! Tolerant deserializers for upstream JSON.
//!
//! Congress.gov and FEC are inconsistent about numeric fields (numbers,
//! numeric strings, or `null`) and about single-vs-list values.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A field that may hold a single object or an array of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn first(&self) -> Option<&T> {
        match self {
            OneOrMany::Many(items) => items.first(),
            OneOrMany::One(item) => Some(item),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// `2025`, `"2025"`, `null`, or absent.
pub fn opt_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_to_i64)
        .map(|year| year as i32))
}

/// Numeric or numeric-string amount; anything else is `None`.
pub fn opt_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_f64))
}

/// Amount that defaults to zero when missing or malformed.
pub fn amount_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_amount(deserializer)?.unwrap_or(0.0))
}

/// District as text. Districts come back as numbers or strings; a numeric
/// `0` marks an at-large seat and is treated as absent.
pub fn opt_district<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "opt_year")]
        year: Option<i32>,
        #[serde(default, deserialize_with = "amount_or_zero")]
        amount: f64,
        #[serde(default, deserialize_with = "opt_district")]
        district: Option<String>,
        #[serde(default)]
        items: OneOrMany<u8>,
    }

    #[test]
    fn test_year_accepts_numbers_and_strings() {
        let p: Sample = serde_json::from_str(r#"{"year": 2027}"#).unwrap();
        assert_eq!(p.year, Some(2027));

        let p: Sample = serde_json::from_str(r#"{"year": "2019"}"#).unwrap();
        assert_eq!(p.year, Some(2019));

        let p: Sample = serde_json::from_str(r#"{"year": null}"#).unwrap();
        assert_eq!(p.year, None);

        let p: Sample = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(p.year, None);
    }

    #[test]
    fn test_amount_defaults_to_zero() {
        let p: Sample = serde_json::from_str(r#"{"amount": null}"#).unwrap();
        assert_eq!(p.amount, 0.0);

        let p: Sample = serde_json::from_str(r#"{"amount": "12.5"}"#).unwrap();
        assert_eq!(p.amount, 12.5);
    }

    #[test]
    fn test_district_number_or_string() {
        let p: Sample = serde_json::from_str(r#"{"district": 7}"#).unwrap();
        assert_eq!(p.district.as_deref(), Some("7"));

        let p: Sample = serde_json::from_str(r#"{"district": ""}"#).unwrap();
        assert_eq!(p.district, None);

        let p: Sample = serde_json::from_str(r#"{"district": 0}"#).unwrap();
        assert_eq!(p.district, None);

        let p: Sample = serde_json::from_str(r#"{"district": "0"}"#).unwrap();
        assert_eq!(p.district.as_deref(), Some("0"));
    }

    #[test]
    fn test_one_or_many() {
        let p: Sample = serde_json::from_str(r#"{"items": 3}"#).unwrap();
        assert_eq!(p.items.into_vec(), vec![3]);

        let p: Sample = serde_json::from_str(r#"{"items": [1, 2]}"#).unwrap();
        assert_eq!(p.items.first(), Some(&1));
        assert_eq!(p.items.into_vec(), vec![1, 2]);
    }
}
