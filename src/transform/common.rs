use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::{Result, TransformError};
use crate::traits::Transformer;
use crate::types::{DataValue, Table};

/// Transformador que remove linhas com valor nulo na coluna informada
///
/// Uma linha sem a coluna é tratada como linha de valor nulo.
#[derive(Debug, Clone)]
pub struct DropNullRowsTransform {
    column: String,
}

impl DropNullRowsTransform {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

#[async_trait]
impl Transformer for DropNullRowsTransform {
    async fn transform(&self, table: Table) -> Result<Table> {
        let rows = table
            .into_rows()
            .into_iter()
            .filter(|row| matches!(row.get(&self.column), Some(value) if !value.is_null()))
            .collect();

        Ok(Table::from_rows(rows))
    }
}

/// Transformador que remove linhas duplicadas pela coluna informada
///
/// Mantém a primeira ocorrência de cada valor distinto, na ordem de
/// chegada das linhas.
#[derive(Debug, Clone)]
pub struct DeduplicateTransform {
    column: String,
}

impl DeduplicateTransform {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

#[async_trait]
impl Transformer for DeduplicateTransform {
    async fn transform(&self, table: Table) -> Result<Table> {
        let mut seen: HashSet<DataValue> = HashSet::new();
        let rows = table
            .into_rows()
            .into_iter()
            .filter(|row| {
                let key = row.get(&self.column).cloned().unwrap_or(DataValue::Null);
                seen.insert(key)
            })
            .collect();

        Ok(Table::from_rows(rows))
    }
}

/// Regra de limpeza por coluna-chave aplicada pelo runner
///
/// Dois passos fixos: remove linhas com chave nula, depois deduplica
/// pela chave mantendo a primeira ocorrência. A aplicação é idempotente.
/// Uma tabela não vazia em que nenhuma linha possui a coluna-chave é um
/// erro do chamador.
#[derive(Debug, Clone)]
pub struct CleanColumnTransform {
    column: String,
}

impl CleanColumnTransform {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

#[async_trait]
impl Transformer for CleanColumnTransform {
    async fn transform(&self, table: Table) -> Result<Table> {
        if !table.is_empty() && !table.has_column(&self.column) {
            return Err(TransformError::MissingColumn(self.column.clone()).into());
        }

        let without_nulls = DropNullRowsTransform::new(&self.column)
            .transform(table)
            .await?;

        DeduplicateTransform::new(&self.column)
            .transform(without_nulls)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;
    use crate::types::DataRow;

    fn row(dt: Option<&str>, valor: i64) -> DataRow {
        let mut row = DataRow::new();
        match dt {
            Some(value) => row.insert("dt".to_string(), DataValue::String(value.to_string())),
            None => row.insert("dt".to_string(), DataValue::Null),
        };
        row.insert("valor".to_string(), DataValue::Integer(valor));
        row
    }

    #[tokio::test]
    async fn test_drop_null_rows() {
        let table = Table::from_rows(vec![
            row(Some("2024-01-01"), 1),
            row(None, 2),
            row(Some("2024-01-02"), 3),
        ]);

        let result = DropNullRowsTransform::new("dt").transform(table).await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result
            .rows()
            .iter()
            .all(|r| !r.get("dt").map(DataValue::is_null).unwrap_or(true)));
    }

    #[tokio::test]
    async fn test_drop_rows_missing_column_value() {
        let mut bare = DataRow::new();
        bare.insert("valor".to_string(), DataValue::Integer(9));

        let table = Table::from_rows(vec![row(Some("2024-01-01"), 1), bare]);
        let result = DropNullRowsTransform::new("dt").transform(table).await.unwrap();

        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn test_deduplicate_keeps_first_seen() {
        let table = Table::from_rows(vec![
            row(Some("2024-01-01"), 1),
            row(Some("2024-01-01"), 2),
            row(Some("2024-01-02"), 3),
            row(Some("2024-01-01"), 4),
        ]);

        let result = DeduplicateTransform::new("dt").transform(table).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(
            result.rows()[0].get("valor"),
            Some(&DataValue::Integer(1))
        );
        assert_eq!(
            result.rows()[1].get("valor"),
            Some(&DataValue::Integer(3))
        );
    }

    #[tokio::test]
    async fn test_clean_applies_both_steps() {
        let table = Table::from_rows(vec![
            row(None, 1),
            row(Some("2024-01-01"), 2),
            row(Some("2024-01-01"), 3),
            row(Some("2024-01-02"), 4),
        ]);

        let result = CleanColumnTransform::new("dt").transform(table).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(
            result.rows()[0].get("valor"),
            Some(&DataValue::Integer(2))
        );
    }

    #[tokio::test]
    async fn test_clean_is_idempotent() {
        let table = Table::from_rows(vec![
            row(None, 1),
            row(Some("2024-01-01"), 2),
            row(Some("2024-01-01"), 3),
            row(Some("2024-01-02"), 4),
        ]);

        let clean = CleanColumnTransform::new("dt");
        let once = clean.transform(table).await.unwrap();
        let twice = clean.transform(once.clone()).await.unwrap();

        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_clean_missing_key_column_is_caller_error() {
        let mut bare = DataRow::new();
        bare.insert("valor".to_string(), DataValue::Integer(1));
        let table = Table::from_rows(vec![bare]);

        let err = CleanColumnTransform::new("dt").transform(table).await.unwrap_err();
        assert!(matches!(
            err,
            EtlError::Transform(TransformError::MissingColumn(_))
        ));
    }

    #[tokio::test]
    async fn test_clean_empty_table_passes_through() {
        let result = CleanColumnTransform::new("dt")
            .transform(Table::new())
            .await
            .unwrap();
        assert!(result.is_empty());
    }
}
