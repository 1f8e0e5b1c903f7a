//! # Common Utilities
//!
//! Utilitários e helpers comuns para loaders: conversão de valores para
//! JSON e formatação de valores de partição.

use crate::types::{DataRow, DataValue};

/// Utilitários para formatação de dados
pub struct DataFormatter;

impl DataFormatter {
    /// Converte DataValue para serde_json::Value
    pub fn value_to_json(value: &DataValue) -> serde_json::Value {
        match value {
            DataValue::String(s) => serde_json::Value::String(s.clone()),
            DataValue::Integer(i) => serde_json::Value::Number(serde_json::Number::from(*i)),
            DataValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            DataValue::Boolean(b) => serde_json::Value::Bool(*b),
            DataValue::Null => serde_json::Value::Null,
            DataValue::Array(arr) => {
                let values: Vec<serde_json::Value> =
                    arr.iter().map(Self::value_to_json).collect();
                serde_json::Value::Array(values)
            }
            DataValue::Object(obj) => {
                let mut map = serde_json::Map::new();
                for (key, value) in obj {
                    map.insert(key.clone(), Self::value_to_json(value));
                }
                serde_json::Value::Object(map)
            }
            DataValue::Date(date) => {
                serde_json::Value::String(date.format("%Y-%m-%d").to_string())
            }
            DataValue::DateTime(dt) => {
                serde_json::Value::String(dt.format("%Y-%m-%d %H:%M:%S").to_string())
            }
            DataValue::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
        }
    }

    /// Converte DataRow para serde_json::Value
    pub fn row_to_json(row: &DataRow) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (key, value) in row {
            map.insert(key.clone(), Self::value_to_json(value));
        }
        serde_json::Value::Object(map)
    }

    /// Formata um valor para compor o segmento `coluna=valor` de partição
    pub fn format_partition_value(value: &DataValue) -> String {
        match value {
            DataValue::String(s) => s.clone(),
            DataValue::Integer(i) => i.to_string(),
            DataValue::Float(f) => f.to_string(),
            DataValue::Boolean(b) => b.to_string(),
            DataValue::Null => "null".to_string(),
            DataValue::Date(date) => date.format("%Y-%m-%d").to_string(),
            DataValue::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            DataValue::Timestamp(ts) => ts.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            DataValue::Array(_) | DataValue::Object(_) => {
                serde_json::to_string(&Self::value_to_json(value)).unwrap_or_default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_value_to_json() {
        assert_eq!(
            DataFormatter::value_to_json(&DataValue::String("teste".to_string())),
            serde_json::json!("teste")
        );
        assert_eq!(
            DataFormatter::value_to_json(&DataValue::Integer(42)),
            serde_json::json!(42)
        );
        assert_eq!(
            DataFormatter::value_to_json(&DataValue::Null),
            serde_json::Value::Null
        );
    }

    #[test]
    fn test_row_to_json() {
        let mut row = HashMap::new();
        row.insert("nome".to_string(), DataValue::String("teste".to_string()));
        row.insert("idade".to_string(), DataValue::Integer(25));

        let json = DataFormatter::row_to_json(&row);
        assert_eq!(json["nome"], "teste");
        assert_eq!(json["idade"], 25);
    }

    #[test]
    fn test_format_partition_value() {
        assert_eq!(
            DataFormatter::format_partition_value(&DataValue::String("2024-01-01".to_string())),
            "2024-01-01"
        );
        assert_eq!(
            DataFormatter::format_partition_value(&DataValue::Integer(7)),
            "7"
        );
        assert_eq!(
            DataFormatter::format_partition_value(&DataValue::Null),
            "null"
        );
    }
}
