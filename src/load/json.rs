//! # Partitioned JSON Loader
//!
//! Módulo para carregamento de tabelas em diretórios particionados no
//! estilo hive (`coluna=valor/`), um arquivo JSON Lines por partição.
//! Suporta os modos de escrita append, overwrite e overwrite_partitions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::WriteMode;
use crate::error::{LoadError, Result};
use crate::load::common::DataFormatter;
use crate::traits::{LoadRequest, Loader};
use crate::types::{DataRow, Table, WritePathSet};

/// Carregador que escreve partições JSON Lines sob um diretório base
///
/// O caminho lógico da requisição identifica o dataset; a escrita física
/// acontece sob o diretório base do loader. Os nomes de catálogo da
/// requisição são repassados sem interpretação.
#[derive(Debug, Clone)]
pub struct PartitionedJsonLoader {
    base_dir: PathBuf,
}

impl PartitionedJsonLoader {
    /// Cria um novo loader com o diretório base informado
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Deriva o subdiretório de partição de uma linha
    fn partition_dir(&self, row: &DataRow, columns: &[String]) -> Result<PathBuf> {
        let mut dir = self.base_dir.clone();
        for column in columns {
            let value = row.get(column).ok_or_else(|| {
                LoadError::MissingPartitionColumn(column.clone())
            })?;
            dir.push(format!(
                "{}={}",
                column,
                DataFormatter::format_partition_value(value)
            ));
        }
        Ok(dir)
    }

    /// Próximo nome de arquivo livre dentro de uma partição
    async fn next_part_file(&self, dir: &Path) -> Result<PathBuf> {
        let mut index = 0usize;
        loop {
            let candidate = dir.join(format!("part-{:05}.jsonl", index));
            if !candidate.exists() {
                return Ok(candidate);
            }
            index += 1;
        }
    }

    async fn write_partition(&self, dir: &Path, rows: &[DataRow]) -> Result<String> {
        tokio::fs::create_dir_all(dir).await?;

        let file = self.next_part_file(dir).await?;
        let mut lines = String::new();
        for row in rows {
            lines.push_str(&serde_json::to_string(&DataFormatter::row_to_json(row))?);
            lines.push('\n');
        }
        tokio::fs::write(&file, lines).await?;

        Ok(file.to_string_lossy().to_string())
    }
}

#[async_trait]
impl Loader for PartitionedJsonLoader {
    async fn load(&self, table: Table, request: &LoadRequest) -> Result<WritePathSet> {
        // Agrupa as linhas por partição preservando a ordem de chegada
        let mut order: Vec<PathBuf> = Vec::new();
        let mut groups: HashMap<PathBuf, Vec<DataRow>> = HashMap::new();

        for row in table.into_rows() {
            let dir = self.partition_dir(&row, &request.partition_columns)?;
            if !groups.contains_key(&dir) {
                order.push(dir.clone());
            }
            groups.entry(dir).or_default().push(row);
        }

        match request.mode {
            WriteMode::Overwrite => {
                if self.base_dir.exists() {
                    tokio::fs::remove_dir_all(&self.base_dir).await?;
                }
            }
            WriteMode::OverwritePartitions => {
                for dir in &order {
                    if dir.exists() {
                        tokio::fs::remove_dir_all(dir).await?;
                    }
                }
            }
            WriteMode::Append => {}
        }

        let mut paths = WritePathSet::new();
        for dir in &order {
            let rows = &groups[dir];
            paths.push(self.write_partition(dir, rows).await?);
        }

        tracing::info!(
            dataset = %request.path,
            partitions = order.len(),
            mode = %request.mode,
            catalog_database = ?request.catalog_database,
            catalog_table = ?request.catalog_table,
            "Carga particionada concluída"
        );

        Ok(paths)
    }

    async fn health_check(&self) -> Result<bool> {
        // O diretório base (ou seu pai) precisa existir para a escrita
        if self.base_dir.exists() {
            return Ok(true);
        }
        match self.base_dir.parent() {
            Some(parent) => Ok(parent.exists()),
            None => Ok(true),
        }
    }
}
