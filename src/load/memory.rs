//! # Memory Loader
//!
//! Carregador em memória que registra cada chamada recebida.
//! Especialmente útil para testes de ponta a ponta do runner, onde
//! interessa inspecionar a tabela e a requisição entregues ao destino.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{LoadError, Result};
use crate::traits::{LoadRequest, Loader};
use crate::types::{Table, WritePathSet};

/// Uma chamada de carga registrada
#[derive(Debug, Clone)]
pub struct RecordedLoad {
    pub table: Table,
    pub request: LoadRequest,
}

/// Carregador que acumula chamadas em memória
///
/// Os caminhos devolvidos são configuráveis; por padrão devolve o caminho
/// lógico da própria requisição.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    loads: Arc<Mutex<Vec<RecordedLoad>>>,
    paths: Option<WritePathSet>,
    fail_write: bool,
    unhealthy: bool,
}

impl MemoryLoader {
    /// Cria um novo MemoryLoader
    pub fn new() -> Self {
        Self::default()
    }

    /// Define os caminhos devolvidos em cada carga
    pub fn with_paths(mut self, paths: WritePathSet) -> Self {
        self.paths = Some(paths);
        self
    }

    /// Configura o loader para falhar na escrita
    pub fn failing() -> Self {
        Self {
            fail_write: true,
            ..Self::default()
        }
    }

    /// Configura o loader para reprovar no health check
    pub fn unhealthy() -> Self {
        Self {
            unhealthy: true,
            ..Self::default()
        }
    }

    /// Obtém uma cópia das chamadas registradas
    pub fn get_loads(&self) -> Vec<RecordedLoad> {
        self.loads.lock().unwrap().clone()
    }

    /// Número de chamadas registradas
    pub fn len(&self) -> usize {
        self.loads.lock().unwrap().len()
    }

    /// Verifica se nenhuma carga foi recebida
    pub fn is_empty(&self) -> bool {
        self.loads.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl Loader for MemoryLoader {
    async fn load(&self, table: Table, request: &LoadRequest) -> Result<WritePathSet> {
        if self.fail_write {
            return Err(LoadError::WriteError(format!(
                "destino indisponível: {}",
                request.path
            ))
            .into());
        }

        self.loads.lock().unwrap().push(RecordedLoad {
            table,
            request: request.clone(),
        });

        Ok(self
            .paths
            .clone()
            .unwrap_or_else(|| WritePathSet::from_paths(vec![request.path.clone()])))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.unhealthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WriteMode;
    use crate::error::EtlError;
    use crate::types::{DataRow, DataValue};

    fn sample_request() -> LoadRequest {
        LoadRequest {
            path: "s3://trusted/area=ex/source=api/table=pedidos".to_string(),
            partition_columns: vec!["dt".to_string()],
            mode: WriteMode::OverwritePartitions,
            catalog_database: None,
            catalog_table: None,
        }
    }

    fn sample_table() -> Table {
        let mut row = DataRow::new();
        row.insert("dt".to_string(), DataValue::String("2024-01-01".to_string()));
        Table::from_rows(vec![row])
    }

    #[tokio::test]
    async fn test_memory_loader_records_calls() {
        let loader = MemoryLoader::new();

        let paths = loader
            .load(sample_table(), &sample_request())
            .await
            .unwrap();

        assert_eq!(
            paths.paths(),
            ["s3://trusted/area=ex/source=api/table=pedidos"]
        );
        assert_eq!(loader.len(), 1);

        let loads = loader.get_loads();
        assert_eq!(loads[0].table.len(), 1);
        assert_eq!(loads[0].request.mode, WriteMode::OverwritePartitions);
    }

    #[tokio::test]
    async fn test_memory_loader_configurable_paths() {
        let loader = MemoryLoader::new().with_paths(WritePathSet::from_paths(vec![
            "s3://trusted/dt=2024-01-01/part-0.parquet".to_string(),
        ]));

        let paths = loader
            .load(sample_table(), &sample_request())
            .await
            .unwrap();

        assert_eq!(paths.len(), 1);
        assert!(paths.paths()[0].ends_with("part-0.parquet"));
    }

    #[tokio::test]
    async fn test_memory_loader_failing_mode() {
        let loader = MemoryLoader::failing();

        let err = loader
            .load(sample_table(), &sample_request())
            .await
            .unwrap_err();

        assert!(matches!(err, EtlError::Load(LoadError::WriteError(_))));
        assert!(loader.is_empty());
    }

    #[tokio::test]
    async fn test_memory_loader_health_check() {
        assert!(MemoryLoader::new().health_check().await.unwrap());
        assert!(!MemoryLoader::unhealthy().health_check().await.unwrap());
    }
}
