//! Upstream explorers are loose with their JSON: numbers arrive as strings,
//! strings arrive as `null`. These deserializers read such fields as zero or
//! empty instead of failing the whole response.

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

pub fn f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value))
}

pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Arrays where `null` means empty and unreadable items are skipped.
pub fn vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

pub fn value_to_f64(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if parsed.is_finite() { parsed } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "super::f64")]
        balance: f64,
        #[serde(default, deserialize_with = "super::string")]
        name: String,
    }

    #[derive(Deserialize)]
    struct Page {
        #[serde(default, deserialize_with = "super::vec")]
        items: Vec<Row>,
    }

    #[test]
    fn test_vec_tolerates_null_and_bad_items() {
        let page: Page = serde_json::from_str(r#"{"items": null}"#).unwrap();
        assert!(page.items.is_empty());

        let page: Page = serde_json::from_str(r#"{"items": [{"balance": "1"}, 5, {"name": "x"}]}"#).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].balance, 1.0);
    }

    #[test]
    fn test_reads_numbers_from_strings_and_nulls() {
        let row: Row = serde_json::from_str(r#"{"balance": "12.5", "name": null}"#).unwrap();
        assert_eq!(row.balance, 12.5);
        assert_eq!(row.name, "");

        let row: Row = serde_json::from_str(r#"{"balance": 3}"#).unwrap();
        assert_eq!(row.balance, 3.0);

        let row: Row = serde_json::from_str(r#"{"balance": "n/a", "name": 7}"#).unwrap();
        assert_eq!(row.balance, 0.0);
        assert_eq!(row.name, "7");
    }
}
