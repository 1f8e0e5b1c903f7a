//! # Lakeflow - Utilitários ETL orientados a eventos
//!
//! Uma biblioteca de utilitários ETL (Extract, Transform, Load) para data
//! lakes construída em Rust, com foco em segurança, previsibilidade e
//! facilidade de teste.
//!
//! ## Características Principais
//!
//! - 📬 **Orientada a eventos**: cada execução é disparada por uma
//!   notificação de criação de objeto e conduzida de ponta a ponta
//! - 🚦 **Tolerante a rate limit**: extração HTTP com retentativa limitada,
//!   respeitando a dica `Retry-After` do servidor
//! - 🧹 **Limpeza por coluna-chave**: remoção de nulos e deduplicação com
//!   primeira ocorrência preservada, de forma idempotente
//! - 🗂️ **Carga particionada**: partições no estilo hive com modos de
//!   escrita append, overwrite e overwrite_partitions
//! - 🎯 **Erros tipados**: taxonomia explícita em vez de mensagens soltas
//!
//! ## Exemplo Rápido
//!
//! ```rust,no_run
//! use lakeflow::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = LakeConfig::builder()
//!         .trusted_bucket("trusted")
//!         .area("vendas")
//!         .source("api")
//!         .table("pedidos")
//!         .build()?;
//!
//!     let runner = EtlRunner::with_config(config)
//!         .extract(MemoryExtractor::new())
//!         .load(PartitionedJsonLoader::new("./dados/trusted"))
//!         .build();
//!
//!     let event = serde_json::json!({
//!         "Records": [{ "s3": {
//!             "bucket": { "name": "raw" },
//!             "object": { "key": "pedidos/2024-01-01.parquet" }
//!         }}]
//!     });
//!
//!     let response = runner.handle(&event).await?;
//!     println!("statusCode: {}", response.status_code);
//!     Ok(())
//! }
//! ```
//!
//! ## Arquitetura
//!
//! A biblioteca é estruturada em torno de dois componentes:
//!
//! ### RateLimitedFetcher
//! Executa uma chamada HTTP lógica com retentativa transparente quando o
//! servidor sinaliza rate limit (429), limitada por número de tentativas.
//!
//! ### EtlRunner
//! Sequencia as etapas de um evento de gatilho — interpretar, extrair,
//! limpar, carregar — e mapeia o desfecho para o contrato do host
//! (200 com caminhos escritos, 204 sem dados, falha propagada).

pub mod config;
pub mod error;
pub mod event;
pub mod events;
pub mod extract;
pub mod load;
pub mod pipeline;
pub mod traits;
pub mod transform;
pub mod types;

// Re-exports para facilitar o uso
pub use config::{LakeConfig, WriteMode};
pub use error::{EtlError, Result};
pub use event::{parse_object_event, SourceObject};
pub use events::{InMemoryEventEmitter, LoggingEventEmitter};
pub use pipeline::EtlRunner;
pub use traits::*;
pub use types::{
    DataRow, DataValue, HandlerResponse, RunEvent, RunOutcome, RunStage, Table, WritePathSet,
};

/// Prelude com imports mais comuns
pub mod prelude {
    pub use crate::config::{LakeConfig, WriteMode};
    pub use crate::error::{EtlError, Result};
    pub use crate::event::{parse_object_event, SourceObject};
    pub use crate::events::{InMemoryEventEmitter, LoggingEventEmitter};
    pub use crate::pipeline::EtlRunner;
    pub use crate::traits::{EventEmitter, Extractor, LoadRequest, Loader, Transformer};
    pub use crate::types::{
        DataRow, DataValue, HandlerResponse, RunOutcome, RunStage, Table, WritePathSet,
    };

    // Extractors
    pub use crate::extract::api::{
        FetchPayload, FetchRequest, HttpMethod, RateLimitedFetcher,
    };
    pub use crate::extract::memory::MemoryExtractor;

    // Transformers
    pub use crate::transform::common::{
        CleanColumnTransform, DeduplicateTransform, DropNullRowsTransform,
    };

    // Loaders
    pub use crate::load::common::DataFormatter;
    pub use crate::load::json::PartitionedJsonLoader;
    pub use crate::load::memory::MemoryLoader;
}

/// Informações sobre a versão da biblioteca
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Informações sobre a biblioteca
pub fn about() -> &'static str {
    env!("CARGO_PKG_DESCRIPTION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_about() {
        assert!(!about().is_empty());
    }
}
