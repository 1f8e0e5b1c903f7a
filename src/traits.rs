use async_trait::async_trait;
use crate::config::WriteMode;
use crate::error::Result;
use crate::event::SourceObject;
use crate::types::{Table, WritePathSet};

/// Trait para colaboradores que extraem dados de um objeto do lake
///
/// Falhas de extração (formato não suportado, falha de I/O na origem)
/// propagam ao chamador; o runner não as trata como sucesso parcial.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extrai o objeto apontado pelo evento como uma tabela
    async fn extract(&self, object: &SourceObject) -> Result<Table>;
}

/// Trait para componentes que transformam tabelas
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Transforma uma tabela inteira
    async fn transform(&self, table: Table) -> Result<Table>;
}

/// Requisição de carga entregue ao colaborador de destino
///
/// Os nomes de catálogo são repassados sem interpretação.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub path: String,
    pub partition_columns: Vec<String>,
    pub mode: WriteMode,
    pub catalog_database: Option<String>,
    pub catalog_table: Option<String>,
}

/// Trait para colaboradores que carregam tabelas no destino
#[async_trait]
pub trait Loader: Send + Sync {
    /// Carrega a tabela no destino descrito pela requisição
    async fn load(&self, table: Table, request: &LoadRequest) -> Result<WritePathSet>;

    /// Verifica se o destino está disponível
    async fn health_check(&self) -> Result<bool> {
        Ok(true) // Implementação padrão
    }
}

/// Trait para emissão de eventos de execução
#[async_trait]
pub trait EventEmitter: Send + Sync {
    /// Emite um evento da execução
    async fn emit(&self, event: crate::types::RunEvent) -> Result<()>;
}
